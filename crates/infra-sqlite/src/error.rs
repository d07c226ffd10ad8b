// sqlx::Error -> AppError::Storage

use tidemq_core::error::AppError;

/// Build a converter that tags sqlx errors with the failing operation
pub(crate) fn map_sqlx_error(op: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |err| AppError::storage(op, describe(&err))
}

fn describe(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            // SQLite result codes: https://www.sqlite.org/rescode.html
            Some(code) => match code.as_ref() {
                "5" => format!("database locked (SQLITE_BUSY): {}", db_err.message()),
                "13" => format!("database full: {}", db_err.message()),
                "8" => format!("database is read-only: {}", db_err.message()),
                "11" => format!("database file is corrupt: {}", db_err.message()),
                other => format!("database error [{}]: {}", other, db_err.message()),
            },
            None => format!("database error: {}", db_err.message()),
        },
        sqlx::Error::ColumnNotFound(col) => format!("column not found: {}", col),
        sqlx::Error::ColumnDecode { index, source } => {
            format!("cannot decode column {}: {}", index, source)
        }
        // Connection, pool, io, protocol errors
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_tagged_with_operation() {
        let err = map_sqlx_error("dequeue")(sqlx::Error::PoolTimedOut);
        match err {
            AppError::Storage { op, message } => {
                assert_eq!(op, "dequeue");
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
