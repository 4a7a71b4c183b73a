//! FILENAME: app/src/error.rs

use crossfilter::GraphError;
use dataset::SchemaError;
use persistence::PersistenceError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown session: {0}")]
    UnknownSession(Uuid),

    #[error("Session state lock poisoned")]
    LockPoisoned,
}
