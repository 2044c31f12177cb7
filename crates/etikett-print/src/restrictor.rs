// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Admission control for subprocess work.
//
// Each printer resource (`host/name`) gets one worker slot. A job holds the
// slot from its readiness probe until its last `lpr` exits, so jobs for the
// same printer run one after another while other printers are unaffected.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use etikett_core::EtikettError;
use etikett_core::error::Result;

/// Registry of per-resource worker slots. Clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct Restrictor {
    slots: Arc<Mutex<HashMap<String, Arc<Semaphore>>>>,
}

impl Restrictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the slot of `key`. The slot is released when the permit drops.
    pub async fn acquire(&self, key: &str) -> Result<OwnedSemaphorePermit> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                slots
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Semaphore::new(1))),
            )
        };

        if slot.available_permits() == 0 {
            debug!(resource = key, "waiting for worker slot");
        }
        slot.acquire_owned()
            .await
            .map_err(|_| EtikettError::TaskFailed(format!("worker slot for {key} was closed")))
    }

    /// Number of resources that have been seen so far.
    pub fn slot_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_key_waits_for_release() {
        let restrictor = Restrictor::new();
        let permit = restrictor.acquire("localhost/zebra").await.unwrap();

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), restrictor.acquire("localhost/zebra"))
                .await;
        assert!(blocked.is_err());

        drop(permit);
        let again =
            tokio::time::timeout(Duration::from_millis(500), restrictor.acquire("localhost/zebra"))
                .await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let restrictor = Restrictor::new();
        let _zebra = restrictor.acquire("localhost/zebra").await.unwrap();
        let citizen =
            tokio::time::timeout(Duration::from_millis(50), restrictor.acquire("localhost/citizen"))
                .await;
        assert!(citizen.is_ok());
        assert_eq!(restrictor.slot_count(), 2);
    }

    #[tokio::test]
    async fn clones_share_slots() {
        let restrictor = Restrictor::new();
        let shared = restrictor.clone();
        let _permit = restrictor.acquire("printhost/default").await.unwrap();
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), shared.acquire("printhost/default"))
                .await;
        assert!(blocked.is_err());
    }
}
