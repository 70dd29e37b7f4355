//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default wait for the "expand all lines" affordance after a reveal.
pub const DEFAULT_REVEAL_TIMEOUT_MS: u64 = 3_000;

/// Tunables for [`TreeSync`](crate::TreeSync).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// How long a reveal keeps watching its region for the expand-all affordance.
    pub reveal_timeout_ms: u64,
}

impl SyncConfig {
    pub fn reveal_timeout(&self) -> Duration {
        Duration::from_millis(self.reveal_timeout_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reveal_timeout_ms: DEFAULT_REVEAL_TIMEOUT_MS,
        }
    }
}
