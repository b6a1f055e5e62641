//! Process-wide dialect registry.
//!
//! Callers that only know a dialect by name (CLI flags, config files) look
//! it up here instead of matching on strings themselves. Pre-populated
//! with the four built-in dialects; additional dialects can be registered
//! at startup.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use super::{Dialect, MySqlDialect, OracleDialect, PostgresDialect, SqliteDialect};

type Registry = RwLock<HashMap<String, Arc<dyn Dialect>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<String, Arc<dyn Dialect>> = HashMap::new();
        map.insert("mysql".to_string(), Arc::new(MySqlDialect::default()));
        map.insert("postgres".to_string(), Arc::new(PostgresDialect::default()));
        map.insert("oracle".to_string(), Arc::new(OracleDialect::default()));
        map.insert("sqlite".to_string(), Arc::new(SqliteDialect::default()));
        RwLock::new(map)
    })
}

/// Registers (or replaces) a dialect under the given name.
pub fn register(name: impl Into<String>, dialect: Arc<dyn Dialect>) {
    registry()
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .insert(name.into(), dialect);
}

/// Looks up a dialect by name. Returns `None` if no dialect is registered
/// under that name.
#[must_use]
pub fn lookup(name: &str) -> Option<Arc<dyn Dialect>> {
    registry().read().unwrap_or_else(std::sync::PoisonError::into_inner).get(name).cloned()
}
