//! Periodic Configuration Reconciliation
//!
//! Each data server runs one reconciliation loop. Every tick pulls the
//! current configuration from the shardmaster, refreshes the locally owned
//! intervals, and pushes every record this server no longer owns to its new
//! owner with retry-until-success puts. This loop is the only mechanism
//! that moves data after a configuration change; Join and Leave on the
//! shardmaster do not push anything.

use super::memory::{install_config, ShardKv};
use crate::keys::schema::{SchemaKey, ALL_USERS_KEY};
use crate::shard::interval::covers;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// How often each data server refreshes the configuration and migrates
/// out-of-range records.
pub const RECONCILE_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the reconciliation loop forever. Spawned once per server; passes
/// never overlap because each one holds the server lock.
pub async fn run_reconciler(kv: Arc<ShardKv>) {
    let mut interval = tokio::time::interval(RECONCILE_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = kv.reconcile_once().await {
            tracing::warn!("{}: reconcile pass skipped: {}", kv.address, e);
        }
    }
}

impl ShardKv {
    /// One reconciliation pass: refresh the configuration, then migrate
    /// every record whose id left this server's intervals.
    ///
    /// The configuration is fetched before the state lock is taken; the
    /// shardmaster may be mid GDPR fan-out into this very server, and a
    /// pass holding the lock across the query would wedge against it. The
    /// lock is then held for the remainder of the pass, migrations
    /// included.
    pub async fn reconcile_once(&self) -> anyhow::Result<()> {
        let entries = self.master.query().await?;
        let mut state = self.state.lock().await;
        install_config(&mut state, entries, &self.address);

        let mut keep = HashMap::new();
        let mut migrate = Vec::new();
        for (key, value) in std::mem::take(&mut state.kv) {
            if key == ALL_USERS_KEY {
                keep.insert(key, value);
                continue;
            }
            match SchemaKey::parse(&key).ok().and_then(|k| k.shard_id()) {
                Some(id) if !covers(&state.local, id) => migrate.push((key, value, id)),
                _ => {
                    keep.insert(key, value);
                }
            }
        }
        state.kv = keep;

        if !migrate.is_empty() {
            tracing::info!("{}: migrating {} record(s)", self.address, migrate.len());
        }
        for (key, value, id) in migrate {
            let Some(owner) = state.owner_of(id).map(str::to_string) else {
                // Nobody owns this id right now; keep the record and let a
                // later pass place it.
                state.kv.insert(key, value);
                continue;
            };
            self.peers.put(&owner, &key, &value, "").await;
            if matches!(SchemaKey::parse(&key), Ok(SchemaKey::User(_))) {
                state.remove_from_all_users(&key);
            }
            tracing::debug!("{}: migrated {} to {}", self.address, key, owner);
        }
        Ok(())
    }
}
