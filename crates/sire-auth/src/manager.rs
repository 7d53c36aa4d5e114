//! Authentication session manager
//!
//! Orchestrates login, multi-role resolution, role switching, and logout,
//! wiring the session store, bearer slot, and refresh scheduler together.
//! The UI shell subscribes to the exposed `{authenticated, loading}` state
//! and re-renders on change.

use std::sync::Arc;
use tokio::sync::watch;

use crate::api::AuthApi;
use crate::bearer::BearerToken;
use crate::error::AuthError;
use crate::scheduler::RefreshScheduler;
use crate::session::{Role, Session};
use crate::store::SessionStore;
use crate::Result;

/// Observable auth state for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthState {
    pub authenticated: bool,
    /// True only while the persisted session is being restored at startup
    pub loading: bool,
}

/// Result of a successful credential login.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Single-role account: the session is finalized and authenticated.
    Complete,
    /// Multi-role account: the caller must present `roles` and hand the
    /// user's choice back to [`AuthManager::confirm_role`] together with
    /// the pending payload. Nothing is persisted until then.
    RoleSelection { roles: Vec<Role>, pending: Session },
}

pub struct AuthManager {
    api: Arc<dyn AuthApi>,
    store: SessionStore,
    bearer: BearerToken,
    scheduler: RefreshScheduler,
    state: watch::Sender<AuthState>,
}

impl AuthManager {
    pub fn new(api: Arc<dyn AuthApi>, store: SessionStore, bearer: BearerToken) -> Self {
        let (state, _) = watch::channel(AuthState {
            authenticated: false,
            loading: true,
        });

        // An expired token logs the user out from the watch task: flip the
        // state, drop the stored session, clear the outbound header. The
        // expired watch ends itself.
        let hook_store = store.clone();
        let hook_bearer = bearer.clone();
        let hook_state = state.clone();
        let scheduler = RefreshScheduler::new(
            Arc::clone(&api),
            store.clone(),
            bearer.clone(),
            Box::new(move || {
                hook_state.send_modify(|s| s.authenticated = false);
                if let Err(e) = hook_store.clear() {
                    tracing::error!(error = %e, "Failed to clear session on expiry");
                }
                hook_bearer.clear();
            }),
        );

        Self {
            api,
            store,
            bearer,
            scheduler,
            state,
        }
    }

    /// Subscribe to auth state changes. The current value is readable
    /// immediately via [`watch::Receiver::borrow`].
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Restore the persisted session at startup. A stored record with both
    /// a token and an active role comes back authenticated and watched;
    /// anything else leaves the user logged out. Always ends the loading
    /// phase.
    pub fn initialize(&self) {
        match self.store.load() {
            Ok(Some(session)) if session.is_authenticated() => {
                self.bearer.set(&session.token);
                self.state.send_modify(|s| s.authenticated = true);
                self.scheduler.start(&session.token);
                tracing::info!(
                    role = %session.role.as_ref().map(Role::as_str).unwrap_or_default(),
                    "Restored authenticated session"
                );
            }
            Ok(Some(_)) => {
                tracing::debug!("Stored session has no active role; staying logged out");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to load stored session");
            }
        }

        self.state.send_modify(|s| s.loading = false);
    }

    /// Exchange credentials for a session. Accounts with exactly one role
    /// are finalized immediately; accounts with several report the choice
    /// back to the caller; accounts with none are rejected.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let session = self.api.login(username, password).await?;

        match session.user.groups.as_slice() {
            [] => Err(AuthError::NoAccessibleRoles),
            [role] => {
                let role = role.clone();
                self.finalize_role(session, role)?;
                Ok(LoginOutcome::Complete)
            }
            _ => {
                let roles = session.user.groups.clone();
                Ok(LoginOutcome::RoleSelection {
                    roles,
                    pending: session,
                })
            }
        }
    }

    /// Complete a multi-role login with the user's chosen role. `None`
    /// means the user dismissed the choice: the pending payload is dropped
    /// and nothing is persisted.
    pub fn confirm_role(&self, role: Option<Role>, pending: Session) -> Result<()> {
        match role {
            Some(role) => self.finalize_role(pending, role),
            None => {
                tracing::debug!("Role selection dismissed; discarding pending session");
                Ok(())
            }
        }
    }

    /// Switch an authenticated user to another of their roles. Returns
    /// `true` when the role changed — the shell is expected to reload the
    /// primary view so role-dependent UI re-initializes. A role the
    /// account does not hold is a silent no-op.
    pub fn switch_role(&self, new_role: &Role) -> Result<bool> {
        let Some(session) = self.store.load()? else {
            return Ok(false);
        };

        if !session.permits(new_role) {
            tracing::debug!(role = %new_role, "Ignoring switch to unpermitted role");
            return Ok(false);
        }

        self.finalize_role(session, new_role.clone())?;
        tracing::info!(role = %new_role, "Switched active role");
        Ok(true)
    }

    /// Drop the session entirely. Idempotent and always succeeds.
    pub fn logout(&self) {
        self.state.send_modify(|s| s.authenticated = false);
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear stored session");
        }
        self.bearer.clear();
        self.scheduler.stop();
        tracing::info!("Logged out");
    }

    /// Read-only copy of the stored session for the UI (header shows the
    /// first name, current role, and available roles).
    pub fn session_snapshot(&self) -> Option<Session> {
        self.store.load().ok().flatten()
    }

    /// Activate a role on a session payload: persist it, arm the outbound
    /// header, mark authenticated, and start watching the token.
    fn finalize_role(&self, mut session: Session, role: Role) -> Result<()> {
        session.role = Some(role);
        self.store.save(&session)?;
        self.bearer.set(&session.token);
        self.state.send_modify(|s| s.authenticated = true);
        self.scheduler.start(&session.token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserProfile;
    use crate::token::encode_test_token;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use sire_storage::Database;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockApi {
        groups: Vec<Role>,
        reject_login: bool,
        token_lifetime: ChronoDuration,
        refresh_calls: AtomicUsize,
    }

    impl MockApi {
        fn with_groups(groups: Vec<Role>) -> Arc<Self> {
            Arc::new(Self {
                groups,
                reject_login: false,
                token_lifetime: ChronoDuration::minutes(30),
                refresh_calls: AtomicUsize::new(0),
            })
        }

        /// Hands out tokens already inside the refresh threshold.
        fn with_short_lived_tokens(groups: Vec<Role>) -> Arc<Self> {
            Arc::new(Self {
                groups,
                reject_login: false,
                token_lifetime: ChronoDuration::seconds(30),
                refresh_calls: AtomicUsize::new(0),
            })
        }

        fn rejecting() -> Arc<Self> {
            Arc::new(Self {
                groups: Vec::new(),
                reject_login: true,
                token_lifetime: ChronoDuration::minutes(30),
                refresh_calls: AtomicUsize::new(0),
            })
        }

        fn refresh_count(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthApi for MockApi {
        async fn login(&self, _username: &str, _password: &str) -> Result<Session> {
            if self.reject_login {
                return Err(AuthError::Authentication("invalid credentials".into()));
            }
            Ok(Session {
                token: encode_test_token(Utc::now() + self.token_lifetime),
                user: UserProfile {
                    first_name: "Ana".to_string(),
                    groups: self.groups.clone(),
                },
                role: None,
            })
        }

        async fn refresh_token(&self, token: &str) -> Result<String> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            Ok(token.to_string())
        }
    }

    fn manager_with(api: Arc<MockApi>) -> (AuthManager, SessionStore, BearerToken) {
        let store = SessionStore::new(Database::open_in_memory().unwrap());
        let bearer = BearerToken::new();
        let manager = AuthManager::new(api, store.clone(), bearer.clone());
        (manager, store, bearer)
    }

    #[tokio::test]
    async fn single_role_login_completes_immediately() {
        let (manager, store, bearer) = manager_with(MockApi::with_groups(vec![Role::Professor]));

        let outcome = manager.login("ana", "secret").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Complete));

        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.role, Some(Role::Professor));
        assert!(manager.state().authenticated);
        assert!(bearer.header_value().is_some());
    }

    #[tokio::test]
    async fn multi_role_login_requires_selection() {
        let (manager, store, _) =
            manager_with(MockApi::with_groups(vec![Role::Student, Role::Revisor]));

        let outcome = manager.login("ana", "secret").await.unwrap();
        let LoginOutcome::RoleSelection { roles, pending } = outcome else {
            panic!("expected role selection");
        };
        assert_eq!(roles, vec![Role::Student, Role::Revisor]);

        // Nothing persisted, nothing authenticated, no role auto-picked
        assert!(store.load().unwrap().is_none());
        assert!(!manager.state().authenticated);

        manager.confirm_role(Some(Role::Student), pending).unwrap();
        assert_eq!(store.load().unwrap().unwrap().role, Some(Role::Student));
        assert!(manager.state().authenticated);
    }

    #[tokio::test]
    async fn dismissed_role_selection_discards_pending_session() {
        let (manager, store, bearer) =
            manager_with(MockApi::with_groups(vec![Role::Student, Role::Revisor]));

        let outcome = manager.login("ana", "secret").await.unwrap();
        let LoginOutcome::RoleSelection { pending, .. } = outcome else {
            panic!("expected role selection");
        };

        manager.confirm_role(None, pending).unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!manager.state().authenticated);
        assert!(bearer.get().is_none());
    }

    #[tokio::test]
    async fn login_without_groups_is_an_authorization_error() {
        let (manager, store, _) = manager_with(MockApi::with_groups(vec![]));

        let err = manager.login("ana", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::NoAccessibleRoles));
        assert!(store.load().unwrap().is_none());
        assert!(!manager.state().authenticated);
    }

    #[tokio::test]
    async fn rejected_credentials_propagate() {
        let (manager, _, _) = manager_with(MockApi::rejecting());

        let err = manager.login("ana", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Authentication(_)));
        assert!(!manager.state().authenticated);
    }

    #[tokio::test]
    async fn switch_role_honors_group_membership() {
        let (manager, store, _) =
            manager_with(MockApi::with_groups(vec![Role::Student, Role::Revisor]));

        let outcome = manager.login("ana", "secret").await.unwrap();
        let LoginOutcome::RoleSelection { pending, .. } = outcome else {
            panic!("expected role selection");
        };
        manager.confirm_role(Some(Role::Student), pending).unwrap();

        // Permitted switch
        assert!(manager.switch_role(&Role::Revisor).unwrap());
        assert_eq!(store.load().unwrap().unwrap().role, Some(Role::Revisor));

        // Unpermitted switch is a no-op with no storage write
        assert!(!manager.switch_role(&Role::Admin).unwrap());
        assert_eq!(store.load().unwrap().unwrap().role, Some(Role::Revisor));
    }

    #[tokio::test]
    async fn initialize_restores_a_complete_session() {
        let (manager, store, bearer) = manager_with(MockApi::with_groups(vec![]));
        store
            .save(&Session {
                token: encode_test_token(Utc::now() + ChronoDuration::minutes(30)),
                user: UserProfile {
                    first_name: "Ana".to_string(),
                    groups: vec![Role::Admin],
                },
                role: Some(Role::Admin),
            })
            .unwrap();

        assert!(manager.state().loading);
        manager.initialize();

        let state = manager.state();
        assert!(state.authenticated);
        assert!(!state.loading);
        assert!(bearer.header_value().is_some());
    }

    #[tokio::test]
    async fn initialize_ignores_session_without_role() {
        let (manager, store, _) = manager_with(MockApi::with_groups(vec![]));
        store
            .save(&Session {
                token: encode_test_token(Utc::now() + ChronoDuration::minutes(30)),
                user: UserProfile::default(),
                role: None,
            })
            .unwrap();

        manager.initialize();

        let state = manager.state();
        assert!(!state.authenticated);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn initialize_with_empty_storage_just_ends_loading() {
        let (manager, _, _) = manager_with(MockApi::with_groups(vec![]));

        manager.initialize();

        let state = manager.state();
        assert!(!state.authenticated);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn logout_clears_everything_and_is_idempotent() {
        let (manager, store, bearer) = manager_with(MockApi::with_groups(vec![Role::Professor]));
        manager.login("ana", "secret").await.unwrap();
        assert!(manager.state().authenticated);

        manager.logout();
        assert!(!manager.state().authenticated);
        assert!(store.load().unwrap().is_none());
        assert!(bearer.get().is_none());

        manager.logout();
        assert!(!manager.state().authenticated);

        // A fresh initialize after logout stays logged out
        manager.initialize();
        assert!(!manager.state().authenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn no_refresh_attempts_after_logout() {
        // The token is already inside the refresh threshold at login, so a
        // surviving watch would refresh on its very next tick
        let api = MockApi::with_short_lived_tokens(vec![Role::Professor]);
        let (manager, store, bearer) = manager_with(Arc::clone(&api));

        manager.login("ana", "secret").await.unwrap();
        assert!(manager.state().authenticated);

        manager.logout();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(api.refresh_count(), 0, "no refresh may fire after logout");
        assert!(store.load().unwrap().is_none());
        assert!(bearer.get().is_none());
        assert!(!manager.state().authenticated);
    }

    #[tokio::test]
    async fn subscribers_observe_state_changes() {
        let (manager, _, _) = manager_with(MockApi::with_groups(vec![Role::Professor]));
        let mut rx = manager.subscribe();
        assert!(rx.borrow().loading);

        manager.login("ana", "secret").await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().authenticated);

        manager.logout();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().authenticated);
    }
}
