//! Top-level error type for the `lumac` binary.
//!
//! This is distinct from [`luma_util::Diagnostics`]: diagnostics are
//! pipeline-stage findings about the program being compiled, while
//! `LumacError` covers failures of the driver itself (a missing file, a
//! broken config, logging that couldn't initialize).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LumacError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, LumacError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = LumacError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "configuration error: missing field");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LumacError = io_err.into();
        assert!(matches!(err, LumacError::Io(_)));
    }
}
