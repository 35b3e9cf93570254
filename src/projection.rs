//! In-memory projection cache
//!
//! Stand-in for the browser's tab-scoped storage. Holds at most one
//! [`SessionProjection`] and forgets it on clear.

use std::sync::Mutex;

use crate::session::SessionProjection;
use crate::traits::ProjectionCache;

/// Tab-scoped projection cache backed by a mutex-guarded slot.
#[derive(Debug, Default)]
pub struct MemoryProjectionCache {
    slot: Mutex<Option<SessionProjection>>,
}

impl MemoryProjectionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectionCache for MemoryProjectionCache {
    fn set(&self, projection: SessionProjection) {
        *self.slot.lock().unwrap() = Some(projection);
    }

    fn get(&self) -> Option<SessionProjection> {
        self.slot.lock().unwrap().clone()
    }

    fn clear(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn test_set_get_clear() {
        let cache = MemoryProjectionCache::new();
        assert_eq!(cache.get(), None);

        cache.set(SessionProjection {
            role: Role::Client,
            display_name: "Ana Torres".to_string(),
        });
        let projection = cache.get().unwrap();
        assert_eq!(projection.role, Role::Client);
        assert_eq!(projection.display_name, "Ana Torres");

        cache.clear();
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let cache = MemoryProjectionCache::new();
        cache.set(SessionProjection {
            role: Role::Client,
            display_name: "Ana".to_string(),
        });
        cache.set(SessionProjection {
            role: Role::Admin,
            display_name: "Marco".to_string(),
        });
        assert_eq!(cache.get().unwrap().role, Role::Admin);
    }
}
