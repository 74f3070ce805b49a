//! Per-session runtime context.
//!
//! A [`Session`] is one conversation's owner of hidden state. Components that
//! need state scoped to a conversation (the plan, for example) claim a slot
//! by a static key and get back a shared handle, created on first access.
//! Nothing is persisted; the state lives exactly as long as the `Session`.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// A slot in the session holds a value of a different type than requested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session slot '{key}' holds a value that is not a {expected}")]
    TypeMismatch {
        key: &'static str,
        expected: &'static str,
    },
}

/// Generate a unique session ID.
pub fn generate_session_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("ses-{ts:x}-{count:04x}")
}

type Slot = Arc<dyn Any + Send + Sync>;

/// One conversation's runtime context.
///
/// # Example
///
/// ```
/// use cognitive_rs::agent::session::Session;
/// use std::sync::Mutex;
///
/// let session = Session::new();
/// let counter = session.get_or_init("counter", || Mutex::new(0u32)).unwrap();
/// *counter.lock().unwrap() += 1;
///
/// let again = session.get::<Mutex<u32>>("counter").unwrap().unwrap();
/// assert_eq!(*again.lock().unwrap(), 1);
/// ```
pub struct Session {
    id: String,
    slots: Mutex<HashMap<&'static str, Slot>>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(generate_session_id())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<&'static str, Slot>> {
        // A panic while holding the map cannot leave it half-updated.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the value in slot `key`, creating it with `init` if empty.
    ///
    /// Fails if the slot is occupied by a value of another type.
    pub fn get_or_init<T, F>(&self, key: &'static str, init: F) -> Result<Arc<T>, SessionError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let mut slots = self.slots();
        let slot = slots
            .entry(key)
            .or_insert_with(|| Arc::new(init()) as Slot)
            .clone();
        downcast(key, slot)
    }

    /// Return the value in slot `key`, or `None` if the slot is empty.
    pub fn get<T: Any + Send + Sync>(&self, key: &'static str) -> Result<Option<Arc<T>>, SessionError> {
        match self.slots().get(key).cloned() {
            Some(slot) => downcast(key, slot).map(Some),
            None => Ok(None),
        }
    }

    /// Put `value` into slot `key`, replacing whatever was there.
    pub fn insert<T: Any + Send + Sync>(&self, key: &'static str, value: T) {
        self.slots().insert(key, Arc::new(value));
    }

    pub fn contains(&self, key: &'static str) -> bool {
        self.slots().contains_key(key)
    }
}

fn downcast<T: Any + Send + Sync>(key: &'static str, slot: Slot) -> Result<Arc<T>, SessionError> {
    slot.downcast::<T>().map_err(|_| SessionError::TypeMismatch {
        key,
        expected: type_name::<T>(),
    })
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.slots().keys().copied().collect();
        keys.sort_unstable();
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("slots", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        let a = Session::new();
        let b = Session::new();
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with("ses-"));
    }

    #[test]
    fn get_or_init_creates_once() {
        let session = Session::new();
        let first = session.get_or_init("n", || Mutex::new(1u8)).unwrap();
        *first.lock().unwrap() = 7;
        let second = session.get_or_init("n", || Mutex::new(1u8)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second.lock().unwrap(), 7);
    }

    #[test]
    fn get_on_empty_slot_is_none() {
        let session = Session::new();
        assert!(session.get::<String>("missing").unwrap().is_none());
        assert!(!session.contains("missing"));
    }

    #[test]
    fn wrong_type_is_a_mismatch() {
        let session = Session::new();
        session.insert("slot", String::from("not a number"));
        let err = session.get_or_init("slot", || 0u32).unwrap_err();
        assert_eq!(
            err,
            SessionError::TypeMismatch {
                key: "slot",
                expected: "u32"
            }
        );
        assert!(err.to_string().contains("slot"));
        assert!(session.get::<u32>("slot").is_err());
    }

    #[test]
    fn sessions_do_not_share_slots() {
        let a = Session::new();
        let b = Session::new();
        a.insert("k", 1u32);
        assert!(b.get::<u32>("k").unwrap().is_none());
    }

    #[test]
    fn debug_lists_slot_keys() {
        let session = Session::with_id("ses-x");
        session.insert("plan", 0u8);
        let dbg = format!("{session:?}");
        assert!(dbg.contains("ses-x"));
        assert!(dbg.contains("plan"));
    }
}
