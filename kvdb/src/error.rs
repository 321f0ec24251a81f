//! Error types for kvdb.

use thiserror::Error;

/// Errors that can occur in kvdb operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The connection could not be established or was lost.
    #[error("kvdb: connection error: {0}")]
    Connection(String),

    /// A page of the bootstrap scan failed.
    #[error("kvdb: scan incomplete after {pages} pages: {source}")]
    ScanIncomplete {
        /// Pages applied to the index before the failure.
        pages: usize,
        #[source]
        source: Box<Error>,
    },

    /// A single command failed on an established connection.
    #[error("kvdb: store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store replied with something of unexpected shape.
    #[error("kvdb: malformed response: {0}")]
    MalformedResponse(String),

    #[error("kvdb: invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for kvdb operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Reports whether the error means the connection itself is gone.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Error::Connection(_) => true,
            Error::ScanIncomplete { source, .. } => source.is_connection_error(),
            _ => false,
        }
    }

    /// Reports whether the error is a per-command store failure.
    ///
    /// Malformed replies count here too: callers treat them the same way.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_) | Error::MalformedResponse(_))
    }
}

impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
            if e.is_timeout() {
                return Error::StoreUnavailable(e.to_string());
            }
            return Error::Connection(e.to_string());
        }
        match e.kind() {
            redis::ErrorKind::TypeError => Error::MalformedResponse(e.to_string()),
            _ => Error::StoreUnavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_through_scan() {
        let err = Error::ScanIncomplete {
            pages: 3,
            source: Box::new(Error::Connection("reset".into())),
        };
        assert!(err.is_connection_error());
        assert!(!err.is_unavailable());
        assert_eq!(
            err.to_string(),
            "kvdb: scan incomplete after 3 pages: kvdb: connection error: reset"
        );

        let err = Error::ScanIncomplete {
            pages: 0,
            source: Box::new(Error::StoreUnavailable("busy".into())),
        };
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_malformed_counts_as_unavailable() {
        assert!(Error::MalformedResponse("int".into()).is_unavailable());
        assert!(Error::StoreUnavailable("oom".into()).is_unavailable());
        assert!(!Error::Connection("eof".into()).is_unavailable());
    }

    #[test]
    fn test_from_redis_type_error() {
        let e = redis::RedisError::from((redis::ErrorKind::TypeError, "not a string"));
        assert!(matches!(Error::from(e), Error::MalformedResponse(_)));

        let e = redis::RedisError::from((redis::ErrorKind::ResponseError, "ERR oom"));
        assert!(matches!(Error::from(e), Error::StoreUnavailable(_)));

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(Error::from(redis::RedisError::from(io)).is_connection_error());
    }
}
