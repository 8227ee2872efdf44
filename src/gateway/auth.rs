//! Client-credential token issuing for the task API.
//!
//! Clients exchange a configured `client_id`/`client_secret` for a bearer
//! token. Issued tokens are kept only as SHA-256 hashes and expire after the
//! configured TTL.

use crate::config::ClientCredential;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Failed exchanges before lockout.
const MAX_FAILURES: u32 = 5;
/// Lockout duration in seconds after too many failures.
const LOCKOUT_SECS: u64 = 300;

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Constant-time equality comparison for secret strings.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn generate_bearer_token() -> String {
    use rand::RngCore;
    let mut buf = [0u8; 32];
    rand::rng().fill_bytes(&mut buf);
    format!("cp_{}", hex::encode(buf))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueError {
    InvalidCredentials,
    /// Seconds until another attempt is accepted
    LockedOut(u64),
}

#[derive(Default)]
struct Throttle {
    failures: u32,
    lockout_until: Option<Instant>,
}

pub struct TokenIssuer {
    clients: Vec<ClientCredential>,
    ttl: Duration,
    /// Token hash to issue time. Expired entries are dropped on every access.
    issued: Mutex<HashMap<String, Instant>>,
    throttle: Mutex<Throttle>,
}

impl TokenIssuer {
    pub fn new(clients: &[ClientCredential], ttl_secs: u64) -> Self {
        Self {
            clients: clients
                .iter()
                .filter(|c| !c.id.trim().is_empty() && !c.secret.is_empty())
                .cloned()
                .collect(),
            ttl: Duration::from_secs(ttl_secs),
            issued: Mutex::new(HashMap::new()),
            throttle: Mutex::new(Throttle::default()),
        }
    }

    pub fn has_clients(&self) -> bool {
        !self.clients.is_empty()
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }

    /// Exchange client credentials for a bearer token.
    pub fn issue(&self, client_id: &str, client_secret: &str) -> Result<IssuedToken, IssueError> {
        {
            let throttle = self
                .throttle
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(until) = throttle.lockout_until {
                let remaining = until.saturating_duration_since(Instant::now());
                if !remaining.is_zero() {
                    return Err(IssueError::LockedOut(remaining.as_secs().max(1)));
                }
            }
        }

        // Every configured client is checked so timing does not reveal which id matched.
        let mut matched = false;
        for client in &self.clients {
            let id_ok = constant_time_eq(client_id.trim(), client.id.trim());
            let secret_ok = constant_time_eq(client_secret, &client.secret);
            matched |= id_ok && secret_ok;
        }

        let mut throttle = self
            .throttle
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !matched {
            throttle.failures += 1;
            if throttle.failures >= MAX_FAILURES {
                throttle.lockout_until = Some(Instant::now() + Duration::from_secs(LOCKOUT_SECS));
                throttle.failures = 0;
            }
            return Err(IssueError::InvalidCredentials);
        }
        throttle.failures = 0;
        drop(throttle);

        let token = generate_bearer_token();
        let mut issued = self
            .issued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Instant::now();
        self.prune_expired(&mut issued, now);
        issued.insert(hash_token(&token), now);

        Ok(IssuedToken {
            access_token: token,
            expires_in: self.ttl.as_secs(),
        })
    }

    /// Validate a bearer token against issued hashes, respecting TTL.
    pub fn is_authenticated(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        let hash = hash_token(token);
        let mut issued = self
            .issued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.prune_expired(&mut issued, Instant::now());
        // Keys are digests, so the map lookup reveals nothing about the token itself.
        issued
            .get_key_value(&hash)
            .is_some_and(|(stored, _)| constant_time_eq(stored, &hash))
    }

    fn prune_expired(&self, issued: &mut HashMap<String, Instant>, now: Instant) {
        issued.retain(|_, issued_at| self.is_within_ttl(now, *issued_at));
    }

    fn is_within_ttl(&self, now: Instant, issued_at: Instant) -> bool {
        now.duration_since(issued_at) < self.ttl
    }

    #[cfg(test)]
    fn live_token_count(&self) -> usize {
        self.issued.lock().map(|guard| guard.len()).unwrap_or_default()
    }
}
