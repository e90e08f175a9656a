use crate::config::OutlinerSettings;
use std::sync::Arc;

/// Supplies the configuration used for one outline request.
///
/// Implementations return an immutable snapshot; later setting changes never
/// affect a snapshot that was already handed out.
pub trait ConfigurationProvider: Send + Sync {
    fn snapshot(&self) -> Arc<OutlinerSettings>;
}

impl ConfigurationProvider for OutlinerSettings {
    fn snapshot(&self) -> Arc<OutlinerSettings> {
        Arc::new(self.clone())
    }
}
