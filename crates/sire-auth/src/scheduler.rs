//! Token refresh scheduler
//!
//! Keeps the active bearer token fresh without user interaction, using only
//! the token's embedded expiry. One watch task per scheduler: it wakes on a
//! short fixed interval, refreshes once the expiry comes within the
//! threshold, and forces a logout if the expiry has already passed.
//!
//! Each successful refresh restarts the watch on the new token rather than
//! mutating the running one, so there is never a stale token captured by a
//! live watch.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::api::AuthApi;
use crate::bearer::BearerToken;
use crate::store::SessionStore;
use crate::token::decode_expiry;

/// How often the watch re-checks the expiry.
const TICK_INTERVAL: Duration = Duration::from_secs(5);
/// How close to expiry a proactive refresh is attempted.
const REFRESH_THRESHOLD_SECS: i64 = 60;

/// Invoked from the watch task when the token is found already expired.
pub type ExpiredHook = Box<dyn Fn() + Send + Sync>;

pub struct RefreshScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn AuthApi>,
    store: SessionStore,
    bearer: BearerToken,
    on_expired: ExpiredHook,
    tick_interval: Duration,
    refresh_threshold: ChronoDuration,
    watch: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: SessionStore,
        bearer: BearerToken,
        on_expired: ExpiredHook,
    ) -> Self {
        Self::with_timing(
            api,
            store,
            bearer,
            on_expired,
            TICK_INTERVAL,
            ChronoDuration::seconds(REFRESH_THRESHOLD_SECS),
        )
    }

    pub fn with_timing(
        api: Arc<dyn AuthApi>,
        store: SessionStore,
        bearer: BearerToken,
        on_expired: ExpiredHook,
        tick_interval: Duration,
        refresh_threshold: ChronoDuration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                bearer,
                on_expired,
                tick_interval,
                refresh_threshold,
                watch: Mutex::new(None),
            }),
        }
    }

    /// Begin watching a token. Cancels any prior watch; a token whose
    /// expiry cannot be decoded installs no watch at all.
    pub fn start(&self, token: &str) {
        Inner::start(Arc::clone(&self.inner), token);
    }

    /// Cancel the current watch, if any. Safe to call when idle.
    pub fn stop(&self) {
        if let Some(handle) = self.inner.watch.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Inner {
    fn start(this: Arc<Self>, token: &str) {
        let expires_at = match decode_expiry(token) {
            Ok(exp) => exp,
            Err(e) => {
                // Malformed tokens are not fatal to the caller; the
                // session simply runs without a refresh watch.
                tracing::warn!(error = %e, "Not watching token; expiry undecodable");
                return;
            }
        };

        let mut watch = this.watch.lock();
        if let Some(prior) = watch.take() {
            prior.abort();
        }

        let task = tokio::spawn(Self::watch_loop(
            Arc::clone(&this),
            token.to_string(),
            expires_at,
        ));
        *watch = Some(task);

        tracing::debug!(expires_at = %expires_at, "Watching token expiry");
    }

    async fn watch_loop(this: Arc<Self>, token: String, expires_at: DateTime<Utc>) {
        let mut ticker = tokio::time::interval(this.tick_interval);
        // interval fires immediately; the first real check happens one
        // tick after start
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let now = Utc::now();

            if now >= expires_at {
                tracing::info!("Token expired; forcing logout");
                (this.on_expired)();
                return;
            }

            if expires_at - now <= this.refresh_threshold {
                match this.api.refresh_token(&token).await {
                    Ok(new_token) => {
                        // A logout may have landed while the refresh was in
                        // flight; a gone session means this watch is stale
                        // and must not re-arm the bearer or reschedule
                        if !this.persist_token(&new_token) {
                            tracing::debug!("Session gone during refresh; ending watch");
                            return;
                        }
                        this.bearer.set(&new_token);
                        tracing::info!("Token renewed");

                        // Restart on the new token; this watch is done
                        Self::start(Arc::clone(&this), &new_token);
                        return;
                    }
                    Err(e) => {
                        // Transient by assumption: the threshold condition
                        // still holds, so the next tick retries
                        tracing::warn!(error = %e, "Token refresh failed; will retry");
                    }
                }
            }
        }
    }

    /// Write the renewed token into the stored session, leaving the user
    /// and role untouched. Returns whether a session was there to receive
    /// it; callers treat a missing session as the end of the watch.
    fn persist_token(&self, new_token: &str) -> bool {
        match self.store.load() {
            Ok(Some(mut session)) => {
                session.token = new_token.to_string();
                if let Err(e) = self.store.save(&session) {
                    tracing::error!(error = %e, "Failed to persist renewed token");
                }
                true
            }
            Ok(None) => {
                tracing::warn!("No stored session to receive renewed token");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load session for token renewal");
                false
            }
        }
    }
}
