use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    /// The database could not be reached (I/O, TLS, pool exhausted or closed).
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DatabaseError::Unavailable(_))
    }
}

const ER_DUP_ENTRY: u16 = 1062;
const ER_LOCK_DEADLOCK: u16 = 1213;

/// MySQL errors that mean a concurrent writer got there first.
fn is_conflict_number(number: u16) -> bool {
    matches!(number, ER_DUP_ENTRY | ER_LOCK_DEADLOCK)
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db)
                if db
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .is_some_and(|e| is_conflict_number(e.number())) =>
            {
                tracing::debug!("write conflict: {}", db);
                DatabaseError::Conflict("conflicting concurrent write".into())
            }
            sqlx::Error::Io(e) => DatabaseError::Unavailable(e.to_string()),
            sqlx::Error::Tls(e) => DatabaseError::Unavailable(e.to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::Unavailable("connection pool timed out".into()),
            sqlx::Error::PoolClosed => DatabaseError::Unavailable("connection pool closed".into()),
            sqlx::Error::WorkerCrashed => DatabaseError::Unavailable("database worker crashed".into()),
            other => DatabaseError::Sqlx(other),
        }
    }
}
