//! Session management on top of the key-value cache.

use crate::{cache_key, Cache, CacheError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;

/// Maximum retry attempts for optimistic concurrency control.
const MAX_UPDATE_RETRIES: u32 = 3;

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new cryptographically secure session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Check that a client-supplied id has the shape [`SessionId::generate`]
    /// produces, so arbitrary cookie values never become store keys.
    pub fn parse(raw: &str) -> Option<Self> {
        let body = raw.strip_prefix("sess_")?;
        let well_formed = body.len() == 24
            && body
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        well_formed.then(|| Self(raw.to_string()))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session data stored in the cache.
///
/// Generic over the user data type `T`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    /// The session ID.
    pub id: SessionId,
    /// User-defined session data.
    pub data: T,
    /// Version for optimistic concurrency control.
    pub version: u64,
    /// When the session was created (Unix timestamp).
    pub created_at: u64,
    /// When the session was last written (Unix timestamp).
    pub last_accessed: u64,
}

/// Session store for per-visitor state.
///
/// # Example
///
/// ```rust,ignore
/// use bazaar_cache::{Cache, Session, SessionId};
///
/// let sessions = Session::<Cart>::new(Cache::in_memory());
/// let id = SessionId::generate();
///
/// sessions.update(&id, |cart| cart.quick_add(ProductId::new(3)))?;
/// let cart = sessions.get_or_default(&id)?;
/// ```
pub struct Session<T> {
    cache: Cache,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> Session<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    /// Create a session store over the given cache.
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            _phantom: PhantomData,
        }
    }

    /// Get session data if it exists.
    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self.get_versioned(id)?.map(|s| s.data))
    }

    /// Get session data, or `T::default()` for an unknown session.
    ///
    /// Nothing is written for an unknown session; it only starts existing
    /// once it is first [`set`](Self::set) or [`update`](Self::update)d.
    pub fn get_or_default(&self, id: &SessionId) -> Result<T, CacheError> {
        Ok(self.get(id)?.unwrap_or_default())
    }

    /// Get full session data including version.
    pub fn get_versioned(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        self.cache.get::<SessionData<T>>(&session_key(id))
    }

    /// Set session data (unconditional write).
    pub fn set(&self, id: &SessionId, data: &T) -> Result<(), CacheError> {
        let previous = self.get_versioned(id)?;
        let envelope = envelope(id, data.clone(), previous.as_ref());
        self.cache.set(&session_key(id), &envelope)
    }

    /// Delete a session.
    pub fn delete(&self, id: &SessionId) -> Result<(), CacheError> {
        self.cache.delete(&session_key(id))
    }

    /// Check if a session exists.
    pub fn exists(&self, id: &SessionId) -> Result<bool, CacheError> {
        self.cache.exists(&session_key(id))
    }

    /// Update session data with a closure, using optimistic concurrency control.
    ///
    /// The closure receives the current data (or `T::default()` for a new
    /// session) and returns a value that is passed back to the caller. The
    /// write only lands if nobody else wrote the session in between;
    /// otherwise the closure is re-run on fresh data, up to
    /// `MAX_UPDATE_RETRIES` times.
    ///
    /// # Returns
    /// - `Ok((T, R))` - The written data and the closure's result
    /// - `Err(CacheError::ConcurrentModification)` - If all retries failed
    pub fn update<R, F>(&self, id: &SessionId, mut f: F) -> Result<(T, R), CacheError>
    where
        F: FnMut(&mut T) -> R,
    {
        let key = session_key(id);

        for attempt in 0..MAX_UPDATE_RETRIES {
            let raw = self.cache.get_raw(&key)?;
            let current: Option<SessionData<T>> = raw
                .as_deref()
                .map(serde_json::from_slice)
                .transpose()?;

            let mut data = current
                .as_ref()
                .map(|s| s.data.clone())
                .unwrap_or_default();
            let output = f(&mut data);

            let next = envelope(id, data.clone(), current.as_ref());
            let bytes = serde_json::to_vec(&next)?;

            if self.cache.compare_and_swap(&key, raw.as_deref(), bytes)? {
                return Ok((data, output));
            }
            tracing::debug!(session = %id, attempt, "session changed concurrently, retrying");
        }

        Err(CacheError::ConcurrentModification(
            "max retries exceeded".to_string(),
        ))
    }
}

fn session_key(id: &SessionId) -> String {
    cache_key!("session", id)
}

fn envelope<T>(id: &SessionId, data: T, previous: Option<&SessionData<T>>) -> SessionData<T> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    SessionData {
        id: id.clone(),
        data,
        version: previous.map(|p| p.version + 1).unwrap_or(1),
        created_at: previous.map(|p| p.created_at).unwrap_or(now),
        last_accessed: now,
    }
}
