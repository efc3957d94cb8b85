//! Process-wide serialization of commands per session id.
//!
//! Two overlapping commands in one shell would interleave their markers and
//! output, so `run` holds the session's lock for the whole call.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

static SESSION_LOCKS: LazyLock<Mutex<HashMap<String, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// The lock shared by every controller attached to `session`.
pub fn session_lock(session: &str) -> Arc<Mutex<()>> {
    let mut locks = SESSION_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(session.to_string()).or_default())
}

/// Acquire `lock`, recovering from poisoning: a panic in an earlier command
/// leaves no state behind the unit mutex worth protecting.
pub fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
