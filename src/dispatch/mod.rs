use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;

use crate::campaign::{CampaignId, CampaignStatus};
use crate::recipient::{DeliveryState, RecipientId};

pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Which ledger states a batch run picks up. Records in `sent`, `received`,
/// or `sending` are never eligible.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DispatchMode {
    /// First pass: `pending` records only.
    Initial,
    /// Re-attempt: `pending` plus previously `failed` records.
    Retry,
}

impl DispatchMode {
    pub fn eligible_states(self) -> &'static [DeliveryState] {
        match self {
            DispatchMode::Initial => &[DeliveryState::Pending],
            DispatchMode::Retry => &[DeliveryState::Pending, DeliveryState::Failed],
        }
    }
}

/// Cooperative stop signal checked between recipients; an in-flight send is
/// never interrupted.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tracks the cancel flag of each campaign's in-flight batch so a separate
/// request can stop it between recipients.
#[derive(Debug, Default)]
pub struct CancelRegistry {
    in_flight: Mutex<HashMap<CampaignId, CancelFlag>>,
}

impl CancelRegistry {
    pub fn new() -> CancelRegistry {
        CancelRegistry::default()
    }

    /// Registers a batch for the campaign, replacing any stale entry.
    pub fn begin(&self, campaign_id: CampaignId) -> CancelFlag {
        let flag = CancelFlag::new();
        self.in_flight
            .lock()
            .unwrap()
            .insert(campaign_id, flag.clone());
        flag
    }

    pub fn finish(&self, campaign_id: CampaignId) {
        self.in_flight.lock().unwrap().remove(&campaign_id);
    }

    /// Raises the campaign's cancel flag; false when no batch is in flight.
    pub fn cancel(&self, campaign_id: CampaignId) -> bool {
        match self.in_flight.lock().unwrap().get(&campaign_id) {
            Some(flag) => {
                flag.cancel();
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DispatchFailure {
    pub recipient_id: RecipientId,
    pub address: String,
    pub reason: String,
}

/// Outcome of one batch run. Always produced, partial failure included; the
/// per-recipient detail lives in `failures`.
#[derive(Clone, Debug, Serialize)]
pub struct DispatchSummary {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
    /// Records not attempted: lost to another in-flight run claiming them
    /// first, or whose rendered content could not be persisted. The latter
    /// also appear in `failures` with a reason.
    pub skipped: usize,
    /// Eligible records left untouched because the batch was canceled.
    pub canceled: usize,
    pub failures: Vec<DispatchFailure>,
    pub campaign_status: CampaignStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_cancels_only_in_flight_batches() {
        let registry = CancelRegistry::new();
        let campaign_id = CampaignId::new();

        assert!(!registry.cancel(campaign_id));

        let flag = registry.begin(campaign_id);
        assert!(!flag.is_canceled());
        assert!(registry.cancel(campaign_id));
        assert!(flag.is_canceled());
    }

    #[test]
    fn finished_batch_is_unreachable() {
        let registry = CancelRegistry::new();
        let campaign_id = CampaignId::new();

        registry.begin(campaign_id);
        registry.finish(campaign_id);

        assert!(!registry.cancel(campaign_id));
    }
}
