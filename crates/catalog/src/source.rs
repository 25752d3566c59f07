use std::future::Future;
use std::sync::Arc;

use crate::{CatalogSnapshot, FetchError};

/// Somewhere a panorama feed can be loaded from.
///
/// Failures are returned as-is; retry policy belongs to the caller.
pub trait CatalogSource {
    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;

    fn load(&self) -> impl Future<Output = Result<CatalogSnapshot, FetchError>> + Send;
}

/// Serves a fixed snapshot. Used for tests and for embedding a feed.
#[derive(Debug, Clone)]
pub struct StaticCatalogSource {
    snapshot: Arc<CatalogSnapshot>,
}

impl StaticCatalogSource {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

impl CatalogSource for StaticCatalogSource {
    fn describe(&self) -> String {
        format!("static feed ({} panoramas)", self.snapshot.len())
    }

    fn load(&self) -> impl Future<Output = Result<CatalogSnapshot, FetchError>> + Send {
        let snapshot = Arc::clone(&self.snapshot);
        async move { Ok(snapshot.as_ref().clone()) }
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogSource, StaticCatalogSource};
    use crate::{CatalogSnapshot, PanoramaRecord};

    #[test]
    fn static_source_returns_its_snapshot() {
        let snap = CatalogSnapshot::from_records(vec![PanoramaRecord::new("a", 1.0, 2.0)]).unwrap();
        let source = StaticCatalogSource::new(snap.clone());
        let loaded = pollster::block_on(source.load()).unwrap();
        assert_eq!(loaded, snap);
        assert!(source.describe().contains("1 panoramas"));
    }
}
