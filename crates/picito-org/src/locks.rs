//! Per-organization write serialization.
//!
//! Membership writes, project creates and the delete of one organization
//! run one at a time inside this process. Across processes the store
//! carries the owner check: owner-dropping writes repeat it and conflict
//! on the organization's owner guard, and reconcile removes memberships
//! and projects that outlived a deleted organization.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct OrgLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl OrgLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `organization_id`. The guard
    /// releases it on drop.
    pub async fn lock(&self, organization_id: Uuid) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().await;
            // Drop slots nobody holds or waits on.
            map.retain(|_, slot| Arc::strong_count(slot) > 1);
            map.entry(organization_id).or_default().clone()
        };
        slot.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_organization_is_exclusive() {
        let locks = OrgLocks::new();
        let org = Uuid::new_v4();

        let guard = locks.lock(org).await;
        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.lock(org)).await;
        assert!(waiting.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(50), locks.lock(org)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn different_organizations_do_not_block() {
        let locks = OrgLocks::new();
        let _a = locks.lock(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.lock(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }
}
