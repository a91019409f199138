//! Single-flight credential renewal.
//!
//! Any number of callers may notice an expired access token at the same
//! time; exactly one renewal call may reach the identity provider. The
//! first caller to find the coordinator idle becomes the round's leader
//! and performs the call; everyone else suspends as a waiter and receives
//! the leader's outcome. A failed round clears the credential store — a
//! rejected refresh token is treated as permanently invalid, so callers
//! re-authenticate instead of retrying into a storm.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::api::models::{RefreshRequest, TokenResponse};
use crate::auth::store::TokenStore;
use crate::auth::TokenPair;
use crate::traits::{Headers, HttpClient};

/// Outcome delivered to every participant of a renewal round: the fresh
/// access token, or the failure shared by the whole round.
pub type RoundOutcome = Result<String, RefreshError>;

/// Renewal errors.
///
/// `Clone` so a single round's outcome can fan out to every waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// No refresh token is stored; renewal is impossible
    NoRefreshToken,
    /// The provider call failed, either in transport or with a
    /// non-success status, or its response carried no usable pair
    ProviderRejected { message: String },
}

impl std::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshError::NoRefreshToken => write!(f, "No refresh token available"),
            RefreshError::ProviderRejected { message } => {
                write!(f, "Credential renewal rejected: {}", message)
            }
        }
    }
}

impl std::error::Error for RefreshError {}

/// Round bookkeeping. Only ever touched with the state lock held.
enum RoundState {
    Idle,
    InFlight(Vec<oneshot::Sender<RoundOutcome>>),
}

/// The role a caller takes in the current round.
enum Participation<'a> {
    Leader(RoundGuard<'a>),
    Waiter(oneshot::Receiver<RoundOutcome>),
}

/// Releases the in-flight round on every exit path.
///
/// If the leader's future is dropped before it resolves the round, the
/// `Drop` impl releases waiting callers with a failure instead of leaving
/// them suspended against a round that no longer exists.
struct RoundGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    resolved: bool,
}

impl RoundGuard<'_> {
    fn resolve(mut self, outcome: &RoundOutcome) {
        self.resolved = true;
        self.coordinator.finish_round(outcome);
    }
}

impl Drop for RoundGuard<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.coordinator.finish_round(&Err(RefreshError::ProviderRejected {
                message: "renewal interrupted before completion".to_string(),
            }));
        }
    }
}

/// Coordinates access-token renewal so at most one provider call is in
/// flight at a time.
pub struct RefreshCoordinator {
    store: Arc<TokenStore>,
    http: Arc<dyn HttpClient>,
    refresh_url: String,
    state: Mutex<RoundState>,
}

impl RefreshCoordinator {
    /// Create a coordinator renewing against `{base_url}/auth/refresh`.
    pub fn new(store: Arc<TokenStore>, http: Arc<dyn HttpClient>, base_url: &str) -> Self {
        Self {
            store,
            http,
            refresh_url: format!("{}/auth/refresh", base_url),
            state: Mutex::new(RoundState::Idle),
        }
    }

    /// Obtain a fresh access token.
    ///
    /// The first caller while the coordinator is idle performs the provider
    /// call; concurrent callers wait and receive the identical outcome.
    /// On success the new pair is already in the store by the time this
    /// returns. On failure the store has been cleared.
    pub async fn renew(&self) -> RoundOutcome {
        match self.participate() {
            Participation::Waiter(rx) => {
                debug!("Renewal already in flight, waiting for its outcome");
                rx.await.unwrap_or_else(|_| {
                    Err(RefreshError::ProviderRejected {
                        message: "renewal round dropped".to_string(),
                    })
                })
            }
            Participation::Leader(guard) => {
                debug!("Leading a renewal round");
                let outcome = self.run_round().await;
                guard.resolve(&outcome);
                outcome
            }
        }
    }

    /// Join the current round, or open a new one.
    fn participate(&self) -> Participation<'_> {
        let mut state = self.state.lock().unwrap();
        match &mut *state {
            RoundState::Idle => {
                *state = RoundState::InFlight(Vec::new());
                Participation::Leader(RoundGuard {
                    coordinator: self,
                    resolved: false,
                })
            }
            RoundState::InFlight(waiters) => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Participation::Waiter(rx)
            }
        }
    }

    /// One provider call plus the store update. Runs without the state
    /// lock; the round guard owns the InFlight release.
    async fn run_round(&self) -> RoundOutcome {
        let refresh_token = match self.store.refresh_token() {
            Some(token) => token,
            None => {
                warn!("Renewal requested but no refresh token is stored");
                self.store.clear().await;
                return Err(RefreshError::NoRefreshToken);
            }
        };

        info!("Renewing access credentials");

        let request = RefreshRequest { refresh_token };
        let body = match serde_json::to_vec(&request) {
            Ok(body) => body,
            Err(err) => {
                self.store.clear().await;
                return Err(RefreshError::ProviderRejected {
                    message: format!("failed to encode refresh request: {}", err),
                });
            }
        };

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let response = match self
            .http
            .post(&self.refresh_url, Bytes::from(body), &headers)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("Renewal call failed in transport: {}", err);
                self.store.clear().await;
                return Err(RefreshError::ProviderRejected {
                    message: err.to_string(),
                });
            }
        };

        if !response.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(
                "Renewal rejected by provider ({}): {}",
                response.status, message
            );
            self.store.clear().await;
            return Err(RefreshError::ProviderRejected {
                message: format!("refresh endpoint returned {}: {}", response.status, message),
            });
        }

        let tokens: TokenResponse = match response.json() {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!("Renewal response did not contain a credential pair: {}", err);
                self.store.clear().await;
                return Err(RefreshError::ProviderRejected {
                    message: format!("invalid refresh response: {}", err),
                });
            }
        };

        let pair = TokenPair::new(tokens.access_token, tokens.refresh_token);
        let access_token = pair.access_token.clone();

        // The store write completes before any waiter is released, so no
        // participant can observe an idle coordinator with a stale pair.
        self.store.set(pair).await;

        info!("Credential renewal succeeded");
        Ok(access_token)
    }

    /// Flip the round to Idle and deliver the outcome to every waiter in
    /// registration order.
    fn finish_round(&self, outcome: &RoundOutcome) {
        let waiters = {
            let mut state = self.state.lock().unwrap();
            match std::mem::replace(&mut *state, RoundState::Idle) {
                RoundState::InFlight(waiters) => waiters,
                RoundState::Idle => Vec::new(),
            }
        };

        if !waiters.is_empty() {
            debug!("Releasing {} renewal waiter(s)", waiters.len());
        }

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}
