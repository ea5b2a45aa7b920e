//! Scripted ERP status sync

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use procura_core::ErpStatusSync;
use procura_domain::{ExternalStatus, SyncReport};

/// A status push observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedStatus {
    pub tenant_id: String,
    pub external_order_ref: String,
    pub status: ExternalStatus,
}

/// Returns queued reports in order, then `SyncReport::synced(0)`.
#[derive(Default, Clone)]
pub struct ScriptedErp {
    replies: Arc<Mutex<VecDeque<SyncReport>>>,
    pushes: Arc<Mutex<Vec<PushedStatus>>>,
}

impl ScriptedErp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_with(&self, report: SyncReport) {
        self.replies.lock().expect("replies lock").push_back(report);
    }

    pub fn pushes(&self) -> Vec<PushedStatus> {
        self.pushes.lock().expect("pushes lock").clone()
    }
}

#[async_trait]
impl ErpStatusSync for ScriptedErp {
    async fn push_status(
        &self,
        tenant_id: &str,
        external_order_ref: &str,
        status: ExternalStatus,
    ) -> SyncReport {
        self.pushes.lock().expect("pushes lock").push(PushedStatus {
            tenant_id: tenant_id.to_string(),
            external_order_ref: external_order_ref.to_string(),
            status,
        });
        self.replies.lock().expect("replies lock").pop_front().unwrap_or_else(|| SyncReport::synced(0))
    }
}
