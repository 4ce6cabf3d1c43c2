//! Route modules shipped with the server, listed by their path below `api/`.
//!
//! Keep in sync with the tree, or regenerate with [`pfadfinder::codegen::write_catalog`].
//! A file on disk without an entry here is reported as missing its export.

use pfadfinder::discovery::ModuleCatalog;
use pfadfinder::state::AppState;

#[path = "../api/v1/index.rs"]
mod v1_index;
#[path = "../api/v1/users/[id]/posts.rs"]
mod v1_users_id_posts;
#[path = "../api/v1/users/[id].rs"]
mod v1_users_id;
#[path = "../api/v1/users/index.rs"]
mod v1_users_index;
#[path = "../api/v1/users/me.rs"]
mod v1_users_me;
#[path = "../api/v2/users/[id].rs"]
mod v2_users_id;

pub fn catalog() -> ModuleCatalog<AppState> {
    ModuleCatalog::new()
        .module("v1/index.rs", v1_index::register)
        .module("v1/users/[id]/posts.rs", v1_users_id_posts::register)
        .module("v1/users/[id].rs", v1_users_id::register)
        .module("v1/users/index.rs", v1_users_index::register)
        .module("v1/users/me.rs", v1_users_me::register)
        .module("v2/users/[id].rs", v2_users_id::register)
}

/// In-memory fixtures served by the demo modules.
pub(crate) mod sample {
    use serde_json::{json, Value};

    pub struct User {
        pub id: &'static str,
        pub name: &'static str,
        pub posts: &'static [&'static str],
    }

    pub const USERS: &[User] = &[
        User { id: "1", name: "Ada", posts: &["Notes on the Analytical Engine"] },
        User { id: "2", name: "Grace", posts: &["Compilers for everyone", "Nanoseconds"] },
        User { id: "3", name: "Linus", posts: &[] },
    ];

    pub fn find(id: &str) -> Option<&'static User> {
        USERS.iter().find(|u| u.id == id)
    }

    pub fn to_json(user: &User) -> Value {
        json!({ "id": user.id, "name": user.name })
    }
}
