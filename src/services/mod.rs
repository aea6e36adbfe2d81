//! Services behind the asset routes.
pub mod assets;
pub mod bundle;
pub mod runtime_config;
pub mod templates;

/// Convenience alias for service results.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to inspect override directory")]
    Override(#[source] std::io::Error),
    #[error("failed to read bundle")]
    Bundle(#[source] std::io::Error),
}
