use crate::error::StoreError;

/// Reserved key holding the per-server user roster, comma-terminated.
pub const ALL_USERS_KEY: &str = "all_users";

/// A parsed data-plane key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKey {
    /// `all_users` — the local roster aggregation, pinned to every server.
    AllUsers,
    /// `user_<id>` — a user's display name.
    User(u32),
    /// `post_<id>` — a post body.
    Post(u32),
    /// `user_<id>_posts` — the comma-terminated list of a user's post keys.
    UserPosts(u32),
}

impl SchemaKey {
    pub fn parse(key: &str) -> Result<Self, StoreError> {
        if key == ALL_USERS_KEY {
            return Ok(SchemaKey::AllUsers);
        }
        let tokens: Vec<&str> = key.split('_').collect();
        match tokens.as_slice() {
            ["user", id] => Ok(SchemaKey::User(parse_id(key, id)?)),
            ["post", id] => Ok(SchemaKey::Post(parse_id(key, id)?)),
            ["user", id, "posts"] => Ok(SchemaKey::UserPosts(parse_id(key, id)?)),
            _ => Err(StoreError::MalformedKey(key.to_string())),
        }
    }

    /// The id that places this key in the key space. `AllUsers` is local to
    /// every server and has none.
    pub fn shard_id(&self) -> Option<u32> {
        match self {
            SchemaKey::AllUsers => None,
            SchemaKey::User(id) | SchemaKey::Post(id) | SchemaKey::UserPosts(id) => Some(*id),
        }
    }
}

fn parse_id(key: &str, token: &str) -> Result<u32, StoreError> {
    token
        .parse()
        .map_err(|_| StoreError::MalformedKey(key.to_string()))
}
