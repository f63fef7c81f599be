//! Application-level errors for the `cart` binary, with Sentry integration.
//!
//! Cart operations never surface errors (see [`crate::cart`]); these cover
//! startup and I/O around them.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Local store could not be read.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Capture the error to Sentry and log it. Configuration mistakes are
    /// only logged.
    pub fn report(&self) {
        if matches!(self, Self::Config(_)) {
            tracing::error!(error = %self, "Command failed");
            return;
        }

        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Command failed"
        );
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config(ConfigError::MissingEnvVar("CATALOG_API_URL".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: CATALOG_API_URL"
        );

        let err = AppError::Catalog(CatalogError::RateLimited(5));
        assert_eq!(
            err.to_string(),
            "Catalog error: Rate limited, retry after 5 seconds"
        );
    }
}
