//! Conversions from external infrastructure errors into domain errors.

use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use stocksync_domain::StockSyncError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub StockSyncError);

impl From<InfraError> for StockSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<StockSyncError> for InfraError {
    fn from(value: StockSyncError) -> Self {
        InfraError(value)
    }
}

trait IntoStockSyncError {
    fn into_stocksync(self) -> StockSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → StockSyncError */
/* -------------------------------------------------------------------------- */

impl IntoStockSyncError for SqlError {
    fn into_stocksync(self) -> StockSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        StockSyncError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        StockSyncError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        StockSyncError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        StockSyncError::Database("foreign key constraint violation".into())
                    }
                    _ => StockSyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => StockSyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                StockSyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                StockSyncError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => StockSyncError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => StockSyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_stocksync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → StockSyncError */
/* -------------------------------------------------------------------------- */

impl IntoStockSyncError for PoolError {
    fn into_stocksync(self) -> StockSyncError {
        StockSyncError::Database(format!("connection pool unavailable: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_stocksync())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → StockSyncError */
/* -------------------------------------------------------------------------- */

impl IntoStockSyncError for HttpError {
    fn into_stocksync(self) -> StockSyncError {
        if self.is_timeout() {
            return StockSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return StockSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => StockSyncError::Auth(message),
                404 => StockSyncError::NotFound(message),
                400..=499 if code != 429 => StockSyncError::InvalidInput(message),
                _ => StockSyncError::Network(message),
            };
        }

        if self.is_builder() {
            return StockSyncError::Config(format!("invalid HTTP request: {self}"));
        }

        StockSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_stocksync())
    }
}

/// Shorthand used by adapters: `.map_err(to_domain)`.
pub(crate) fn to_domain<E>(err: E) -> StockSyncError
where
    InfraError: From<E>,
{
    StockSyncError::from(InfraError::from(err))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: StockSyncError = InfraError::from(err).into();
        assert_eq!(mapped, StockSyncError::Database("database is busy".into()));
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let mapped = to_domain(SqlError::QueryReturnedNoRows);
        assert!(matches!(mapped, StockSyncError::NotFound(_)));
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped = to_domain(error);
        assert!(
            matches!(&mapped, StockSyncError::Auth(msg) if msg.contains("401")),
            "expected auth error, got {mapped:?}"
        );
    }

    #[tokio::test]
    async fn http_status_429_maps_to_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(429)).mount(&server).await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        assert!(matches!(to_domain(error), StockSyncError::Network(_)));
    }
}
