//! Shardmaster Control Plane
//!
//! Owns the authoritative mapping from the key space to the set of data
//! servers and rebalances it as servers join and leave.
//!
//! ## Core Concepts
//! - **Configuration**: the join-ordered server list plus each server's
//!   interval set; the union is always the whole key space, disjoint.
//! - **Rebalancing**: Join and Leave repartition deterministically by join
//!   order; Move splices an arbitrary interval onto one server.
//! - **GDPR deletion**: a destructive fan-out that erases a key (and, for
//!   users, their posts) across the cluster with retry-until-success calls.

pub mod handlers;
pub mod protocol;
pub mod service;

#[cfg(test)]
mod tests;
