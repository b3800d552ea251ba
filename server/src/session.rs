//! Server-side session store.
//!
//! Logging in issues an opaque token that maps to a player until it expires.
//! Callers present the token on every request and it is resolved explicitly.

use std::{
    collections::HashMap,
    sync::RwLock,
    time::{Duration, Instant},
};
use tally_types::Player;
use tracing::{debug, error};
use uuid::Uuid;

struct Session {
    player: Player,
    expires_at: Instant,
}

pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a new token for `player`. Expired sessions are evicted first, so
    /// the store never holds more than the sessions still alive.
    pub fn create(&self, player: Player) -> Option<String> {
        let token = Uuid::new_v4().to_string();
        let mut sessions = match self.sessions.write() {
            Ok(sessions) => sessions,
            Err(e) => {
                error!("Failed to acquire write lock in create: {}", e);
                return None;
            }
        };
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        if sessions.len() < before {
            debug!(evicted = before - sessions.len(), "evicted expired sessions");
        }
        sessions.insert(
            token.clone(),
            Session {
                player,
                expires_at: now + self.ttl,
            },
        );
        Some(token)
    }

    /// Resolve a token to its player. Expired tokens are dropped.
    pub fn resolve(&self, token: &str) -> Option<Player> {
        let now = Instant::now();
        {
            let sessions = match self.sessions.read() {
                Ok(sessions) => sessions,
                Err(e) => {
                    error!("Failed to acquire read lock in resolve: {}", e);
                    return None;
                }
            };
            let session = sessions.get(token)?;
            if now < session.expires_at {
                return Some(session.player.clone());
            }
        } // Release read lock before removing

        debug!("session expired");
        self.remove(token);
        None
    }

    /// Remove a token. Returns whether it existed.
    pub fn remove(&self, token: &str) -> bool {
        match self.sessions.write() {
            Ok(mut sessions) => sessions.remove(token).is_some(),
            Err(e) => {
                error!("Failed to acquire write lock in remove: {}", e);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
