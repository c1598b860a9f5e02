use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Why a catalog request produced no value.
///
/// Exactly one variant is reported per call, checked in declaration order:
/// the request target is built first, then sent, then its status checked,
/// then its body decoded.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("invalid request URL: {0}")]
    MalformedRequest(String),

    #[error("network error: {0}")]
    Transport(#[source] Arc<dyn StdError + Send + Sync>),

    #[error("server error with status code: {status}")]
    Protocol { status: u16 },

    #[error("failed to decode response: {0}")]
    Decode(#[source] Arc<serde_json::Error>),
}

impl FetchError {
    pub fn transport<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        FetchError::Transport(Arc::new(err))
    }

    pub fn decode(err: serde_json::Error) -> Self {
        FetchError::Decode(Arc::new(err))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Protocol { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn messages_name_the_failure_class() {
        let err = FetchError::Protocol { status: 404 };
        assert_eq!(err.to_string(), "server error with status code: 404");
        assert_eq!(err.status_code(), Some(404));

        let err = FetchError::transport(io::Error::new(io::ErrorKind::NotConnected, "offline"));
        assert!(err.to_string().starts_with("network error"));
        assert!(err.source().is_some());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn decode_error_keeps_parser_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FetchError::decode(cause);
        let cloned = err.clone();
        assert!(matches!(cloned, FetchError::Decode(_)));
        assert!(err.to_string().starts_with("failed to decode response"));
    }
}
