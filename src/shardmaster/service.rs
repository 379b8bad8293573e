use crate::client::PeerClient;
use crate::error::StoreError;
use crate::keys::schema::SchemaKey;
use crate::shard::interval::{
    covers, get_overlap, partition, OverlapStatus, Shard, MAX_KEY, MIN_KEY,
};
use crate::shardmaster::protocol::ConfigEntry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Authoritative owner of the key-space configuration.
///
/// All operations take the single state lock for their whole run. The GDPR
/// fan-out keeps holding it across its peer retries, so configuration
/// changes queue behind a destructive delete in flight.
pub struct ShardMaster {
    state: Mutex<MasterState>,
    peers: PeerClient,
}

#[derive(Default)]
struct MasterState {
    /// Server addresses in join order; partition assignment is positional.
    order: Vec<String>,
    /// Current interval ownership per server.
    assignment: HashMap<String, Vec<Shard>>,
}

impl ShardMaster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MasterState::default()),
            peers: PeerClient::new(),
        })
    }

    /// Adds a server and rebalances the key space over all members.
    ///
    /// The first server takes the whole range; later joins repartition
    /// `|order| + 1` ways, reassigning by join order with the newcomer
    /// taking the last interval.
    pub async fn join(&self, server: &str) -> Result<(), StoreError> {
        if server.is_empty() {
            return Err(StoreError::EmptyServer);
        }
        let mut state = self.state.lock().await;
        if state.assignment.contains_key(server) {
            return Err(StoreError::DuplicateServer(server.to_string()));
        }
        if state.order.is_empty() {
            state.order.push(server.to_string());
            state
                .assignment
                .insert(server.to_string(), vec![Shard::new(MIN_KEY, MAX_KEY)]);
            tracing::info!("server {} joined as the first member", server);
            return Ok(());
        }
        let shards = partition(state.order.len() + 1, MIN_KEY, MAX_KEY)?;
        let MasterState { order, assignment } = &mut *state;
        for (i, existing) in order.iter().enumerate() {
            assignment.insert(existing.clone(), vec![shards[i]]);
        }
        order.push(server.to_string());
        assignment.insert(server.to_string(), vec![shards[order.len() - 1]]);
        tracing::info!("server {} joined; cluster size {}", server, order.len());
        Ok(())
    }

    /// Removes the given servers and rebalances over the survivors.
    ///
    /// The whole list is validated before anything is removed; a rejected
    /// Leave does not touch the configuration.
    pub async fn leave(&self, servers: &[String]) -> Result<(), StoreError> {
        if servers.is_empty() {
            return Err(StoreError::EmptyServerList);
        }
        let mut state = self.state.lock().await;
        let mut departing: HashSet<&str> = HashSet::new();
        for server in servers {
            if !state.assignment.contains_key(server.as_str()) || !departing.insert(server.as_str()) {
                return Err(StoreError::UnknownServer(server.clone()));
            }
        }
        state.order.retain(|s| !departing.contains(s.as_str()));
        for server in servers {
            state.assignment.remove(server);
        }
        tracing::info!("{} server(s) left; cluster size {}", servers.len(), state.order.len());
        if state.order.is_empty() {
            return Ok(());
        }
        let shards = partition(state.order.len(), MIN_KEY, MAX_KEY)?;
        let MasterState { order, assignment } = &mut *state;
        for (i, survivor) in order.iter().enumerate() {
            assignment.insert(survivor.clone(), vec![shards[i]]);
        }
        Ok(())
    }

    /// Reassigns the interval `moved` to `server`, carving it out of every
    /// current owner. Afterwards a server may own several non-adjacent
    /// intervals; coverage and disjointness are preserved.
    pub async fn move_shard(&self, server: &str, moved: Shard) -> Result<(), StoreError> {
        if server.is_empty() {
            return Err(StoreError::EmptyServer);
        }
        if moved.lower > moved.upper {
            return Err(StoreError::InvalidShard(moved.lower, moved.upper));
        }
        let mut state = self.state.lock().await;
        if !state.assignment.contains_key(server) {
            return Err(StoreError::UnknownServer(server.to_string()));
        }
        for shards in state.assignment.values_mut() {
            let mut kept = Vec::with_capacity(shards.len() + 1);
            for existing in shards.iter() {
                match get_overlap(&moved, existing) {
                    OverlapStatus::NoOverlap => kept.push(*existing),
                    OverlapStatus::ContainsOther => {}
                    OverlapStatus::ContainedInOther => {
                        if existing.lower < moved.lower {
                            kept.push(Shard::new(existing.lower, moved.lower - 1));
                        }
                        if moved.upper < existing.upper {
                            kept.push(Shard::new(moved.upper + 1, existing.upper));
                        }
                    }
                    OverlapStatus::CoversUpperEnd => {
                        // Empty when the bounds coincide and the moved
                        // interval swallows this one whole.
                        if existing.lower < moved.lower {
                            kept.push(Shard::new(existing.lower, moved.lower - 1));
                        }
                    }
                    OverlapStatus::CoversLowerEnd => {
                        if moved.upper < existing.upper {
                            kept.push(Shard::new(moved.upper + 1, existing.upper));
                        }
                    }
                }
            }
            *shards = kept;
        }
        if let Some(dest) = state.assignment.get_mut(server) {
            dest.push(moved);
        }
        tracing::info!(
            "moved [{}, {}] to server {}",
            moved.lower,
            moved.upper,
            server
        );
        Ok(())
    }

    /// Snapshot of the configuration, in join order. Never fails; an empty
    /// cluster yields an empty list.
    pub async fn query(&self) -> Vec<ConfigEntry> {
        let state = self.state.lock().await;
        state
            .order
            .iter()
            .map(|server| ConfigEntry {
                server: server.clone(),
                shards: state.assignment.get(server).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Erases `key` from whichever server owns its id, retrying the Delete
    /// until it succeeds. Deleting a user cascades to their posts on the
    /// data plane.
    pub async fn gdpr_delete(&self, key: &str) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let Some(id) = SchemaKey::parse(key)?.shard_id() else {
            return Err(StoreError::IllegalKey(key.to_string()));
        };
        let state = self.state.lock().await;
        for (server, shards) in &state.assignment {
            if covers(shards, id) {
                tracing::info!("gdpr delete of {} fanning out to {}", key, server);
                self.peers.delete(server, key).await;
            }
        }
        Ok(())
    }

    /// Counters for the stats endpoint: member count and total interval
    /// count.
    pub async fn counts(&self) -> (usize, usize) {
        let state = self.state.lock().await;
        let shards = state.assignment.values().map(Vec::len).sum();
        (state.order.len(), shards)
    }
}
