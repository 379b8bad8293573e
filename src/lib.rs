//! Sharded Social-Graph Key/Value Cluster Library
//!
//! This library crate defines the core modules that make up the store.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`shard`**: The key-space partitioning algebra. Deterministic interval
//!   arithmetic that cuts the fixed key range into disjoint shards and
//!   classifies how two shards overlap.
//! - **`keys`**: The schema-key codec. Parses `user_<id>` / `post_<id>` /
//!   `user_<id>_posts` / `all_users` keys into typed values.
//! - **`shardmaster`**: The control plane. Owns the `server -> intervals`
//!   configuration and serves Join/Leave/Move/Query/GDPRDelete.
//! - **`shardkv`**: The data plane. Per-server in-memory store with
//!   cross-record consistency rules and the background reconciler that
//!   migrates records after configuration changes.
//! - **`client`**: Cross-server RPC helpers: the retry-until-success peer
//!   client and the shardmaster client.

pub mod client;
pub mod error;
pub mod keys;
pub mod shard;
pub mod shardkv;
pub mod shardmaster;
