use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for everything around the resolver core.
#[derive(Debug, Error, Diagnostic)]
pub enum CondorError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed descriptor file.
    #[error("Descriptor error: {message}")]
    #[diagnostic(help("Check the descriptor for syntax errors and malformed artifact keys"))]
    Descriptor { message: String },

    /// Invalid global configuration.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.condor/config.toml"))]
    Config { message: String },

    /// A resolution outcome the caller decided to treat as fatal.
    #[error("Resolution failed: {message}")]
    Resolution { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type CondorResult<T> = miette::Result<T>;
