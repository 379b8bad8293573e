//! Shardkv Data Plane
//!
//! The per-server in-memory store plus the background reconciliation that
//! keeps data placement converged with the shardmaster configuration.
//!
//! ## Core Concepts
//! - **Responsibility**: a server only serves keys whose embedded id falls
//!   inside its currently owned intervals.
//! - **Cross-record rules**: writing a post links it into the author's
//!   posts list (locally or on a peer); deleting a user cascades to their
//!   posts; `all_users` mirrors the locally stored users.
//! - **Reconciliation**: a periodic pass pulls the configuration and pushes
//!   out-of-range records to their new owners, retrying until they stick.

pub mod handlers;
pub mod memory;
pub mod protocol;
pub mod reconciler;
