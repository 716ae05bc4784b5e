use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info};

use crate::form::SubscriptionRecord;

/// Key holding the JSON array of newsletter sign-ups.
pub const SUBSCRIBERS_KEY: &str = "newsletter_subscribers";
/// Key holding the decimal page-load counter.
pub const VISITS_KEY: &str = "site_visits";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("write to {key} rejected: {reason}")]
    Write { key: String, reason: String },
    #[error("corrupt value under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key-value persistence, shaped after the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same entries, the way two tabs share
/// one origin's storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read all persisted sign-ups, oldest first.
pub fn load_subscribers(store: &dyn KeyValueStore) -> Result<Vec<SubscriptionRecord>, StorageError> {
    match store.get(SUBSCRIBERS_KEY)? {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: SUBSCRIBERS_KEY.to_string(),
            source,
        }),
    }
}

/// Append one sign-up to the persisted log and return the new length.
///
/// A corrupt log is reported and left untouched rather than overwritten.
pub fn append_subscriber(
    store: &mut dyn KeyValueStore,
    record: SubscriptionRecord,
) -> Result<usize, StorageError> {
    let mut subscribers = load_subscribers(store)?;
    subscribers.push(record);
    let encoded = serde_json::to_string(&subscribers)?;
    store.set(SUBSCRIBERS_KEY, &encoded)?;
    debug!(count = subscribers.len(), "Subscriber appended");
    Ok(subscribers.len())
}

/// Count this page load. Not atomic across tabs: two tabs loading at once
/// may both write the same value.
///
/// A missing or unparsable counter restarts at zero.
pub fn record_visit(store: &mut dyn KeyValueStore) -> Result<u64, StorageError> {
    let previous = store
        .get(VISITS_KEY)?
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let visits = previous.saturating_add(1);
    store.set(VISITS_KEY, &visits.to_string())?;
    info!(visits, "Visit count");
    Ok(visits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(name: &str) -> SubscriptionRecord {
        SubscriptionRecord {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            submitted_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().unwrap_or_default(),
        }
    }

    #[test]
    fn visits_count_up_from_zero() {
        let mut store = MemoryStore::new();
        assert_eq!(record_visit(&mut store).ok(), Some(1));
        assert_eq!(record_visit(&mut store).ok(), Some(2));
        assert_eq!(store.get(VISITS_KEY).ok().flatten().as_deref(), Some("2"));
    }

    #[test]
    fn garbage_counter_restarts() {
        let mut store = MemoryStore::new();
        let _ = store.set(VISITS_KEY, "NaN");
        assert_eq!(record_visit(&mut store).ok(), Some(1));
    }

    #[test]
    fn subscribers_append_in_order() {
        let mut store = MemoryStore::new();
        assert_eq!(append_subscriber(&mut store, record("Ada")).ok(), Some(1));
        assert_eq!(append_subscriber(&mut store, record("Grace")).ok(), Some(2));

        let all = load_subscribers(&store).unwrap_or_default();
        let names: Vec<&str> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Grace"]);
    }

    #[test]
    fn corrupt_log_is_not_overwritten() {
        let mut store = MemoryStore::new();
        let _ = store.set(SUBSCRIBERS_KEY, "{not json");
        let result = append_subscriber(&mut store, record("Ada"));
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
        assert_eq!(
            store.get(SUBSCRIBERS_KEY).ok().flatten().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn records_use_the_date_field() {
        let mut store = MemoryStore::new();
        let _ = append_subscriber(&mut store, record("Ada"));
        let raw = store.get(SUBSCRIBERS_KEY).ok().flatten().unwrap_or_default();
        assert!(raw.contains(r#""date":"2024-03-01T12:00:00Z""#), "{raw}");
    }

    #[test]
    fn clones_share_entries() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        let _ = a.set("k", "v");
        assert_eq!(b.get("k").ok().flatten().as_deref(), Some("v"));
    }
}
