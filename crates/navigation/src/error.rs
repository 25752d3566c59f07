use catalog::{CatalogError, FetchError};

use crate::transform::TransformError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Metadata or imagery could not be retrieved.
    Fetch(FetchError),
    /// A panorama id is absent from the catalog (or from the live hotspot set).
    NotFound(String),
    /// Degenerate deployment settings, e.g. a zero world extent.
    Configuration(String),
}

impl std::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationError::Fetch(err) => err.fmt(f),
            NavigationError::NotFound(id) => write!(f, "panorama not found: {id}"),
            NavigationError::Configuration(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for NavigationError {}

impl From<FetchError> for NavigationError {
    fn from(err: FetchError) -> Self {
        NavigationError::Fetch(err)
    }
}

impl From<CatalogError> for NavigationError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => NavigationError::NotFound(id),
            CatalogError::Fetch(err) => NavigationError::Fetch(err),
        }
    }
}

impl From<TransformError> for NavigationError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Configuration(msg) => NavigationError::Configuration(msg),
        }
    }
}
