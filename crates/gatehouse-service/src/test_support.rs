//! Shared fixtures for service tests.

use std::sync::Arc;

use gatehouse_auth::{AuthorizationEngine, PasswordHasher};
use gatehouse_core::config::AuthConfig;
use gatehouse_database::{MemoryStore, RoleStore, Stores, UserStore};
use gatehouse_entity::Status;
use gatehouse_entity::user::{NewUser, User};

use crate::context::RequestContext;

pub(crate) struct Fixture {
    pub store: MemoryStore,
    pub stores: Stores,
    pub engine: AuthorizationEngine,
    pub hasher: Arc<PasswordHasher>,
    pub config: AuthConfig,
}

/// In-memory store seeded with the built-in roles and a cheap hasher.
pub(crate) async fn fixture() -> Fixture {
    let store = MemoryStore::with_builtin_rbac().await.unwrap();
    let stores = Stores::memory(store.clone());
    let config = AuthConfig {
        jwt_secret: "test-secret".into(),
        password_memory_kib: 64,
        password_iterations: 1,
        ..AuthConfig::default()
    };
    Fixture {
        engine: AuthorizationEngine::new(stores.permissions.clone()),
        hasher: Arc::new(PasswordHasher::new(&config).unwrap()),
        store,
        stores,
        config,
    }
}

impl Fixture {
    /// Insert an enabled user holding the roles with the given codes.
    pub async fn add_user(&self, username: &str, password: &str, role_codes: &[&str]) -> User {
        let user = UserStore::create(
            &self.store,
            &NewUser {
                username: username.into(),
                password_hash: self.hasher.hash_password(password).unwrap(),
                email: None,
                phone: None,
                real_name: None,
                status: Status::Enabled,
                created_by: None,
            },
        )
        .await
        .unwrap();

        let mut role_ids = Vec::new();
        for code in role_codes {
            let role = RoleStore::find_by_code(&self.store, code)
                .await
                .unwrap()
                .unwrap();
            role_ids.push(role.id);
        }
        self.store
            .replace_roles(user.id, &role_ids, None)
            .await
            .unwrap();
        user
    }
}

pub(crate) fn ctx(user: &User) -> RequestContext {
    RequestContext::new(user.id, user.username.clone(), "127.0.0.1".into(), None)
}
