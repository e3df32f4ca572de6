//! Top-level error wrapper types.

use crate::{ConfigError, ServerError};

/// This is the foundation error enum. Additional variants are added by other
/// lexgate crates as the workspace grows.
///
/// # Examples
///
/// ```
/// use lexgate_error::{ConfigError, LexgateError};
///
/// let cfg_err = ConfigError::new("bad value");
/// let err: LexgateError = cfg_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum LexgateErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP server error
    #[from(ServerError)]
    Server(ServerError),
}

/// Lexgate error with kind discrimination.
///
/// # Examples
///
/// ```
/// use lexgate_error::{ConfigError, LexgateResult};
///
/// fn might_fail() -> LexgateResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Lexgate Error: {}", _0)]
pub struct LexgateError(Box<LexgateErrorKind>);

impl LexgateError {
    /// Create a new error from a kind.
    pub fn new(kind: LexgateErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &LexgateErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to LexgateErrorKind
impl<T> From<T> for LexgateError
where
    T: Into<LexgateErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for lexgate operations.
///
/// # Examples
///
/// ```
/// use lexgate_error::{ConfigError, LexgateResult};
///
/// fn load() -> LexgateResult<String> {
///     Err(ConfigError::new("no such file"))?
/// }
/// ```
pub type LexgateResult<T> = std::result::Result<T, LexgateError>;
