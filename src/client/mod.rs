//! Cross-Server RPC Clients
//!
//! Thin HTTP wrappers over the two wire surfaces:
//!
//! - **`PeerClient`**: data-plane calls between shardkv servers. Every call
//!   retries until the peer acknowledges success; callers only ever block,
//!   they never observe failure.
//! - **`MasterClient`**: control-plane calls against the shardmaster. The
//!   query used by the reconciler is a single attempt (a failed tick is
//!   simply skipped); the admin helpers report errors to the caller.

pub mod master;
pub mod peers;

pub use master::MasterClient;
pub use peers::PeerClient;
