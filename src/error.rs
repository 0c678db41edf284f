use thiserror::Error;

use crate::engine::EngineError;
use crate::event_bus::EventError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
