//! Classification of sqlx errors into the domain taxonomy.

use carline_core::error::CoreError;

/// SQLSTATE 57P01: the server is shutting down.
const ADMIN_SHUTDOWN: &str = "57P01";

/// Map a sqlx error onto [`CoreError`].
///
/// - Connection, pool, TLS and protocol failures map to `StoreUnavailable`.
/// - SQLSTATE class 08 (connection exception) and admin shutdown likewise.
/// - Everything else is an `Internal` error.
pub fn store_error(err: sqlx::Error) -> CoreError {
    let unavailable = match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code.starts_with("08") || code == ADMIN_SHUTDOWN),
        _ => false,
    };

    if unavailable {
        tracing::warn!(error = %err, "Store unavailable");
        CoreError::StoreUnavailable(err.to_string())
    } else {
        tracing::error!(error = %err, "Database error");
        CoreError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn pool_timeout_is_unavailable() {
        assert_matches!(
            store_error(sqlx::Error::PoolTimedOut),
            CoreError::StoreUnavailable(_)
        );
    }

    #[test]
    fn io_error_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert_matches!(store_error(sqlx::Error::Io(io)), CoreError::StoreUnavailable(_));
    }

    #[test]
    fn row_not_found_is_internal() {
        assert_matches!(store_error(sqlx::Error::RowNotFound), CoreError::Internal(_));
    }
}
