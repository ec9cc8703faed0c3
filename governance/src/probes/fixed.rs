//! Probe for snapshots reported by external subsystems.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use compliance::IntegrityComponent;

use super::{HealthProbe, ProbeSnapshot};
use crate::error::ProbeError;

/// Serves the last snapshot pushed by the owning subsystem.
///
/// Backup health, for example, is measured by the backup subsystem and
/// pushed here rather than probed directly.
#[derive(Clone)]
pub struct StaticProbe {
    component: IntegrityComponent,
    latest: Arc<RwLock<Option<ProbeSnapshot>>>,
}

impl StaticProbe {
    /// Create with no snapshot reported yet.
    pub fn new(component: IntegrityComponent) -> Self {
        Self {
            component,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Create with an initial snapshot.
    pub fn with_snapshot(component: IntegrityComponent, snapshot: ProbeSnapshot) -> Self {
        Self {
            component,
            latest: Arc::new(RwLock::new(Some(snapshot))),
        }
    }

    /// Replace the reported snapshot.
    pub async fn report(&self, snapshot: ProbeSnapshot) {
        *self.latest.write().await = Some(snapshot);
    }

    /// Forget the reported snapshot.
    pub async fn clear(&self) {
        *self.latest.write().await = None;
    }
}

#[async_trait]
impl HealthProbe for StaticProbe {
    fn component(&self) -> IntegrityComponent {
        self.component
    }

    async fn snapshot(&self) -> Result<ProbeSnapshot, ProbeError> {
        self.latest.read().await.clone().ok_or_else(|| {
            ProbeError::Unavailable(format!("no {} snapshot reported", self.component))
        })
    }
}
