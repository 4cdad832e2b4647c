use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum ApiError {
    #[snafu(display("Database query failed: {}", source))]
    DatabaseQuery { source: sqlx::Error },

    #[snafu(display("Database migration failed: {}", source))]
    Migration { source: sqlx::migrate::MigrateError },

    #[snafu(display("Invalid database URL: {}", message))]
    InvalidDatabaseUrl { message: String },
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseQuery { source: err }
    }
}

impl From<sqlx::migrate::MigrateError> for ApiError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        ApiError::Migration { source: err }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
