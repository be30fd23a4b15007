//! Process-wide registry of live facades.
//!
//! Facades built from equal construction arguments share one inner state,
//! so they also share tokens and rate buckets. Entries are held weakly and
//! disappear once the last handle is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

static REGISTRY: OnceLock<Mutex<HashMap<String, Weak<super::ApiInner>>>> = OnceLock::new();

/// Returns the live facade for `key`, or registers the one `make` builds.
pub fn shared<F>(key: String, make: F) -> crate::Result<Arc<super::ApiInner>>
where
    F: FnOnce() -> crate::Result<super::ApiInner>,
{
    let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
    let mut entries = registry.lock().unwrap_or_else(PoisonError::into_inner);
    entries.retain(|_, entry| entry.strong_count() > 0);

    if let Some(existing) = entries.get(&key).and_then(Weak::upgrade) {
        tracing::debug!("reusing facade with identical construction arguments");
        return Ok(existing);
    }

    let inner = Arc::new(make()?);
    entries.insert(key, Arc::downgrade(&inner));
    Ok(inner)
}
