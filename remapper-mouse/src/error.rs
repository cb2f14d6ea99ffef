//! Controller error types

use remapper_transport::{ProtocolError, TransportError};
use thiserror::Error;

/// Errors from controller operations
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Command could not be framed for the active revision
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// SET_IDENTITY was written but the PERSIST_CONFIG that follows it failed.
    /// The new identity may be live until the next power cycle.
    #[error("Identity written but not persisted: {0}")]
    IdentityNotPersisted(#[source] TransportError),
}

impl ControllerError {
    /// True when the device may be left in a state the caller did not ask for
    pub fn is_partial(&self) -> bool {
        matches!(self, ControllerError::IdentityNotPersisted(_))
    }
}
