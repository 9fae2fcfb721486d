//! Security middleware: API key authentication and per-session limits on
//! generation calls.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use uuid::Uuid;

use super::AppState;

/// Sliding-window limiter keyed by session id.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    requests: Arc<Mutex<HashMap<Uuid, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Per-minute limiter, or `None` when `max_per_minute` is zero.
    pub fn per_minute(max_per_minute: u32) -> Option<Self> {
        (max_per_minute > 0).then(|| Self::new(max_per_minute, Duration::from_secs(60)))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Vec<Instant>>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a call for `session` if it is under the limit.
    /// Returns false if rate limited.
    pub fn check(&self, session: Uuid) -> bool {
        let now = Instant::now();
        let mut requests = self.lock();
        let entry = requests.entry(session).or_default();

        entry.retain(|&t| now.duration_since(t) < self.window);

        if entry.len() < self.max_requests as usize {
            entry.push(now);
            true
        } else {
            false
        }
    }

    /// Drop the history of an ended session.
    pub fn forget(&self, session: Uuid) {
        self.lock().remove(&session);
    }

    /// Drop expired entries. Called from the session sweeper.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let mut requests = self.lock();
        requests.retain(|_, timestamps| {
            timestamps.retain(|&t| now.duration_since(t) < self.window);
            !timestamps.is_empty()
        });
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.lock().len()
    }
}

/// Authentication middleware that checks for a valid bearer token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected_key = match state.api_key.as_deref() {
        Some(key) => key,
        None => return Ok(next.run(request).await),
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if token == expected_key => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Invalid API key provided");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing or malformed Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
