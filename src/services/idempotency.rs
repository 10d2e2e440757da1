//! In-process idempotency key registry.
//!
//! A mutating request that carries an `Idempotency-Key` header is registered
//! here before it runs. Duplicates either wait out the first attempt
//! (`InFlight`), replay its stored response, or are refused when the same key
//! is reused with a different body.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Response captured from the first execution of a key
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
enum Slot {
    InFlight {
        fingerprint: String,
        started: Instant,
    },
    Completed {
        fingerprint: String,
        response: StoredResponse,
        stored: Instant,
    },
}

impl Slot {
    fn fingerprint(&self) -> &str {
        match self {
            Slot::InFlight { fingerprint, .. } | Slot::Completed { fingerprint, .. } => fingerprint,
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        match self {
            Slot::InFlight { started, .. } => started.elapsed() > ttl,
            Slot::Completed { stored, .. } => stored.elapsed() > ttl,
        }
    }
}

/// Outcome of registering a key
#[derive(Debug, Clone, PartialEq)]
pub enum Begin {
    /// First sighting; the caller runs the request and reports back
    Proceed,
    /// Same key still being processed
    InFlight,
    /// Same key and body already completed
    Replay(StoredResponse),
    /// Same key used with a different request
    Mismatch,
}

#[derive(Clone)]
pub struct IdempotencyStore {
    entries: Arc<DashMap<String, Slot>>,
    ttl: Duration,
}

impl IdempotencyStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Key namespaced by caller so two users never collide
    pub fn scoped_key(scope: &str, key: &str) -> String {
        format!("{}:{}", scope, key)
    }

    /// Hash of method, path and body identifying one logical request
    pub fn fingerprint(method: &str, path: &str, body: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(method.as_bytes());
        hasher.update(b"\n");
        hasher.update(path.as_bytes());
        hasher.update(b"\n");
        hasher.update(body);
        hex::encode(hasher.finalize())
    }

    pub fn begin(&self, key: &str, fingerprint: &str) -> Begin {
        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) => {
                if occupied.get().is_expired(self.ttl) {
                    occupied.insert(Slot::InFlight {
                        fingerprint: fingerprint.to_string(),
                        started: Instant::now(),
                    });
                    return Begin::Proceed;
                }
                let slot = occupied.get();
                if slot.fingerprint() != fingerprint {
                    return Begin::Mismatch;
                }
                match slot {
                    Slot::InFlight { .. } => Begin::InFlight,
                    Slot::Completed { response, .. } => Begin::Replay(response.clone()),
                }
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Slot::InFlight {
                    fingerprint: fingerprint.to_string(),
                    started: Instant::now(),
                });
                Begin::Proceed
            }
        }
    }

    /// Record the response of a key registered with [`begin`](Self::begin)
    pub fn complete(&self, key: &str, response: StoredResponse) {
        if let Some(mut slot) = self.entries.get_mut(key) {
            let fingerprint = slot.fingerprint().to_string();
            *slot = Slot::Completed {
                fingerprint,
                response,
                stored: Instant::now(),
            };
        }
    }

    /// Forget a key so the client may retry it
    pub fn abandon(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop expired entries
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, slot| !slot.is_expired(ttl));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Purged expired idempotency keys");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Guard that abandons the key unless completed, covering cancelled requests
    pub fn guard(&self, key: String) -> InFlightGuard {
        InFlightGuard {
            store: self.clone(),
            key: Some(key),
        }
    }
}

/// Releases an in-flight key when the request future is dropped early
pub struct InFlightGuard {
    store: IdempotencyStore,
    key: Option<String>,
}

impl InFlightGuard {
    pub fn complete(mut self, response: StoredResponse) {
        if let Some(key) = self.key.take() {
            self.store.complete(&key, response);
        }
    }

    pub fn abandon(mut self) {
        if let Some(key) = self.key.take() {
            self.store.abandon(&key);
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.store.abandon(&key);
        }
    }
}
