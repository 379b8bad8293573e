use crate::client::{MasterClient, PeerClient};
use crate::error::StoreError;
use crate::keys::schema::{SchemaKey, ALL_USERS_KEY};
use crate::shard::interval::{covers, Shard};
use crate::shardmaster::protocol::ConfigEntry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One data server's store: the key/value map, the intervals it currently
/// owns, its last observed full configuration and the tombstones of keys it
/// has deleted.
///
/// A single lock guards everything and is held for the entire duration of
/// each operation, including outbound peer retries, so local operations
/// serialize behind remote fan-out.
pub struct ShardKv {
    /// Public address of this server; how it identifies itself in the
    /// shardmaster configuration.
    pub address: String,
    pub(crate) state: Mutex<KvState>,
    pub(crate) peers: PeerClient,
    pub(crate) master: MasterClient,
}

pub(crate) struct KvState {
    pub(crate) kv: HashMap<String, String>,
    /// Intervals this server owns, per the last reconciled configuration.
    pub(crate) local: Vec<Shard>,
    /// Full `server -> intervals` view, used to route fan-out calls.
    pub(crate) config: HashMap<String, Vec<Shard>>,
    /// Keys deleted on this server since creation; repeated deletes of a
    /// tombstoned post succeed.
    pub(crate) tombstones: HashSet<String>,
}

impl KvState {
    fn new() -> Self {
        let mut kv = HashMap::new();
        // The roster always exists, even when empty.
        kv.insert(ALL_USERS_KEY.to_string(), String::new());
        Self {
            kv,
            local: Vec::new(),
            config: HashMap::new(),
            tombstones: HashSet::new(),
        }
    }

    /// The server whose intervals cover `id`, if any.
    pub(crate) fn owner_of(&self, id: u32) -> Option<&str> {
        self.config
            .iter()
            .find(|(_, shards)| covers(shards, id))
            .map(|(server, _)| server.as_str())
    }

    pub(crate) fn append_all_users(&mut self, user_key: &str) {
        let roster = self.kv.entry(ALL_USERS_KEY.to_string()).or_default();
        roster.push_str(user_key);
        roster.push(',');
    }

    pub(crate) fn remove_from_all_users(&mut self, user_key: &str) {
        if let Some(roster) = self.kv.get_mut(ALL_USERS_KEY) {
            *roster = roster
                .split_terminator(',')
                .filter(|user| *user != user_key)
                .fold(String::new(), |mut acc, user| {
                    acc.push_str(user);
                    acc.push(',');
                    acc
                });
        }
    }
}

fn ensure_local(state: &KvState, id: u32, key: &str) -> Result<(), StoreError> {
    if covers(&state.local, id) {
        Ok(())
    } else {
        Err(StoreError::NotResponsible(key.to_string()))
    }
}

impl ShardKv {
    pub fn new(address: impl Into<String>, master_addr: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            address: address.into(),
            state: Mutex::new(KvState::new()),
            peers: PeerClient::new(),
            master: MasterClient::new(master_addr),
        })
    }

    /// Looks up a key. `all_users` always answers with the local roster;
    /// any other key must fall inside this server's intervals.
    pub async fn get(&self, key: &str) -> Result<String, StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let parsed = SchemaKey::parse(key)?;
        let state = self.state.lock().await;
        match parsed {
            SchemaKey::AllUsers => Ok(state
                .kv
                .get(ALL_USERS_KEY)
                .cloned()
                .unwrap_or_default()),
            SchemaKey::User(id) | SchemaKey::Post(id) | SchemaKey::UserPosts(id) => {
                ensure_local(&state, id, key)?;
                state
                    .kv
                    .get(key)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(key.to_string()))
            }
        }
    }

    /// Inserts or overwrites a key.
    ///
    /// Storing a fresh post under a named author also links it into the
    /// author's posts list, on this server or on the author's owner; the
    /// peer call retries until it succeeds while the local lock stays held.
    pub async fn put(&self, key: &str, data: &str, user: &str) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let parsed = SchemaKey::parse(key)?;
        let mut state = self.state.lock().await;
        match parsed {
            SchemaKey::AllUsers => Err(StoreError::IllegalKey(key.to_string())),
            SchemaKey::User(id) => {
                ensure_local(&state, id, key)?;
                if state.kv.insert(key.to_string(), data.to_string()).is_none() {
                    state.append_all_users(key);
                }
                Ok(())
            }
            SchemaKey::UserPosts(id) => {
                ensure_local(&state, id, key)?;
                // Only the internal migration transfer writes a posts list
                // wholesale; clients grow it through post puts.
                if !user.is_empty() {
                    return Err(StoreError::IllegalKey(key.to_string()));
                }
                state.kv.insert(key.to_string(), data.to_string());
                Ok(())
            }
            SchemaKey::Post(id) => {
                ensure_local(&state, id, key)?;
                if user.is_empty() {
                    // Internal migration transfer; links already exist.
                    state.kv.insert(key.to_string(), data.to_string());
                    return Ok(());
                }
                if state.kv.insert(key.to_string(), data.to_string()).is_some() {
                    // Updating an existing post leaves its links untouched.
                    return Ok(());
                }
                self.link_post(&mut state, key, user).await
            }
        }
    }

    /// Records a freshly inserted post in its author's posts list.
    async fn link_post(
        &self,
        state: &mut KvState,
        post_key: &str,
        user: &str,
    ) -> Result<(), StoreError> {
        let Ok(SchemaKey::User(uid)) = SchemaKey::parse(user) else {
            return Err(StoreError::MalformedKey(user.to_string()));
        };
        let posts_key = format!("{}_posts", user);
        if covers(&state.local, uid) {
            if !state.kv.contains_key(user) {
                state.kv.insert(user.to_string(), String::new());
                state.append_all_users(user);
            }
            let list = state.kv.entry(posts_key).or_default();
            list.push_str(post_key);
            list.push(',');
            return Ok(());
        }
        let Some(owner) = state.owner_of(uid).map(str::to_string) else {
            tracing::warn!(
                "no server owns user id {}; post {} stays unlinked",
                uid,
                post_key
            );
            return Ok(());
        };
        self.peers
            .append(&owner, &posts_key, &format!("{},", post_key))
            .await;
        Ok(())
    }

    /// Concatenates `data` onto a key. Missing users and posts lists are
    /// created; a missing post cannot be, since there is no author to link
    /// it to.
    pub async fn append(&self, key: &str, data: &str) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let parsed = SchemaKey::parse(key)?;
        let mut state = self.state.lock().await;
        match parsed {
            SchemaKey::AllUsers => Err(StoreError::IllegalKey(key.to_string())),
            SchemaKey::UserPosts(id) => {
                ensure_local(&state, id, key)?;
                state.kv.entry(key.to_string()).or_default().push_str(data);
                Ok(())
            }
            SchemaKey::User(id) => {
                ensure_local(&state, id, key)?;
                if let Some(value) = state.kv.get_mut(key) {
                    value.push_str(data);
                } else {
                    state.kv.insert(key.to_string(), data.to_string());
                    state.append_all_users(key);
                }
                Ok(())
            }
            SchemaKey::Post(id) => {
                ensure_local(&state, id, key)?;
                match state.kv.get_mut(key) {
                    Some(value) => {
                        value.push_str(data);
                        Ok(())
                    }
                    None => Err(StoreError::NeedsUserContext(key.to_string())),
                }
            }
        }
    }

    /// Removes a key.
    ///
    /// Posts are tombstoned so a repeated delete stays successful. Deleting
    /// a user erases their posts too, cascading to peer owners with
    /// retry-until-success calls, and drops the user from the roster.
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let parsed = SchemaKey::parse(key)?;
        let mut state = self.state.lock().await;
        match parsed {
            SchemaKey::AllUsers => Err(StoreError::IllegalKey(key.to_string())),
            SchemaKey::Post(id) => {
                ensure_local(&state, id, key)?;
                if state.kv.remove(key).is_some() {
                    state.tombstones.insert(key.to_string());
                    return Ok(());
                }
                if state.tombstones.contains(key) {
                    Ok(())
                } else {
                    Err(StoreError::NotFound(key.to_string()))
                }
            }
            SchemaKey::UserPosts(id) => {
                ensure_local(&state, id, key)?;
                // The posts list lives and dies with its user; a direct
                // delete is accepted and ignored.
                Ok(())
            }
            SchemaKey::User(id) => {
                ensure_local(&state, id, key)?;
                if state.kv.remove(key).is_none() {
                    return Err(StoreError::NotFound(key.to_string()));
                }
                let posts_key = format!("{}_posts", key);
                let posts = state.kv.get(&posts_key).cloned().unwrap_or_default();
                for post in posts.split_terminator(',') {
                    if state.kv.remove(post).is_some() {
                        state.tombstones.insert(post.to_string());
                        continue;
                    }
                    let post_id = SchemaKey::parse(post).ok().and_then(|k| k.shard_id());
                    let Some(post_id) = post_id else {
                        tracing::warn!("skipping malformed entry {} in {}", post, posts_key);
                        continue;
                    };
                    match state.owner_of(post_id).map(str::to_string) {
                        Some(owner) if owner != self.address => {
                            self.peers.delete(&owner, post).await;
                        }
                        // Locally owned but already gone, or no owner known.
                        _ => {}
                    }
                }
                state.remove_from_all_users(key);
                state.kv.remove(&posts_key);
                Ok(())
            }
        }
    }

    /// Counters for the stats endpoint: entries, owned intervals and
    /// tombstones.
    pub async fn local_counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock().await;
        (state.kv.len(), state.local.len(), state.tombstones.len())
    }
}

/// Installs a configuration snapshot into the state, refreshing the
/// locally owned intervals. A server absent from the configuration owns
/// nothing until a later snapshot names it.
pub(crate) fn install_config(state: &mut KvState, entries: Vec<ConfigEntry>, address: &str) {
    state.config = entries
        .into_iter()
        .map(|entry| (entry.server, entry.shards))
        .collect();
    state.local = state.config.get(address).cloned().unwrap_or_default();
}
