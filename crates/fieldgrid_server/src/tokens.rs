//! Anti-forgery tokens for mutating endpoints.

use fieldgrid_core::constants::MAX_LIVE_TOKENS;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

const TOKEN_LEN: usize = 32;

#[derive(Debug, Default)]
struct Issued {
    next_seq: u64,
    /// Token -> (issue order, issue time).
    tokens: HashMap<String, (u64, Instant)>,
}

/// Issues random tokens and accepts them until their lifetime ends.
///
/// A token may be presented any number of times while it is live. At most
/// `capacity` tokens are tracked; issuing past that evicts the oldest.
#[derive(Debug)]
pub struct TokenRegistry {
    ttl: Duration,
    capacity: usize,
    issued: Mutex<Issued>,
}

impl TokenRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, MAX_LIVE_TOKENS)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            issued: Mutex::new(Issued::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Issued> {
        self.issued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Issue a fresh token, dropping expired ones and then the oldest live
    /// ones while the registry is full.
    pub fn issue(&self) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let now = Instant::now();
        let mut issued = self.lock();
        issued
            .tokens
            .retain(|_, (_, at)| now.duration_since(*at) < self.ttl);

        let mut evicted = 0usize;
        while issued.tokens.len() >= self.capacity {
            let oldest = issued
                .tokens
                .iter()
                .min_by_key(|(_, (seq, _))| *seq)
                .map(|(token, _)| token.clone());
            match oldest {
                Some(oldest) => {
                    issued.tokens.remove(&oldest);
                    evicted += 1;
                }
                None => break,
            }
        }
        if evicted > 0 {
            tracing::debug!(evicted, capacity = self.capacity, "Evicted oldest tokens");
        }

        let seq = issued.next_seq;
        issued.next_seq += 1;
        issued.tokens.insert(token.clone(), (seq, now));
        token
    }

    /// Whether `token` was issued here and is still live.
    pub fn verify(&self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        let issued = self.lock();
        issued
            .tokens
            .get(token)
            .is_some_and(|(_, at)| at.elapsed() < self.ttl)
    }

    /// Number of tokens currently tracked.
    pub fn len(&self) -> usize {
        self.lock().tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
