//! Structured Key Vocabulary
//!
//! The data plane stores four kinds of keys: `user_<id>`, `post_<id>`,
//! `user_<id>_posts` and the per-server `all_users` roster. `SchemaKey`
//! parses the textual form into a typed value and exposes the embedded id
//! that places the key in the shard space.

pub mod schema;
