//! Fire-and-forget usage tracking
//!
//! [`UsageTracker::track`] hands the event to a spawned task and returns immediately; the
//! transport's outcome never reaches the caller. Because the process may exit before those tasks
//! finish, the binary gives them a bounded [`UsageTracker::flush`] window at the end.

pub mod http;

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use uuid::Uuid;

/// A single usage event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    pub id: Uuid,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_id: Option<u64>,
    pub metadata: BTreeMap<String, String>,
    pub version: String,
}

/// Port for delivering usage events
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageTransport: Send + Sync {
    /// Deliver `event`
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError`]; the tracker only logs it.
    async fn send(&self, event: UsageEvent) -> Result<(), TelemetryError>;
}

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Usage event could not be delivered: {0}")]
    Transport(String),

    #[error("Usage endpoint responded with {0}")]
    Status(u16),
}

/// Metadata helper: `metadata([("authType", "oauth")])`
#[must_use]
pub fn metadata<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Emits usage events without ever blocking or failing the caller
pub struct UsageTracker {
    transport: Option<Arc<dyn UsageTransport>>,
    pending: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl UsageTracker {
    #[must_use]
    pub fn new(transport: Arc<dyn UsageTransport>) -> Self {
        Self {
            transport: Some(transport),
            pending: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A tracker that drops every event
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            transport: None,
            pending: std::sync::Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Schedule `command`'s usage event for delivery
    pub fn track(&self, command: &str, metadata: BTreeMap<String, String>, portal_id: Option<u64>) {
        let Some(transport) = &self.transport else {
            trace!(command, "usage tracking disabled");
            return;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(command, "no async runtime; usage event dropped");
            return;
        };

        let event = UsageEvent {
            id: Uuid::new_v4(),
            command: command.to_string(),
            portal_id,
            metadata,
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        trace!(?event, "tracking usage");

        let transport = Arc::clone(transport);
        let handle = runtime.spawn(async move {
            if let Err(e) = transport.send(event).await {
                debug!("{e}");
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }
    }

    /// Wait at most `timeout` for scheduled events to be delivered
    pub async fn flush(&self, timeout: Duration) {
        let handles = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };
        if handles.is_empty() {
            return;
        }

        if tokio::time::timeout(timeout, futures::future::join_all(handles))
            .await
            .is_err()
        {
            debug!("usage events still in flight after {timeout:?}; giving up");
        }
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::disabled()
    }
}
