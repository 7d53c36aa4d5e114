//! SIRE Client Authentication
//!
//! Owns the authenticated session lifecycle:
//! - A Session is the token, user profile, and active role, persisted locally
//! - A session is authenticated only when both token and role are present
//! - Multi-role accounts pick a role before being considered authenticated
//! - Tokens are silently refreshed shortly before expiry; a token that has
//!   already expired forces a logout

mod api;
mod bearer;
mod error;
mod manager;
mod scheduler;
mod session;
mod store;
mod token;

pub use api::AuthApi;
pub use bearer::BearerToken;
pub use error::AuthError;
pub use manager::{AuthManager, AuthState, LoginOutcome};
pub use scheduler::{ExpiredHook, RefreshScheduler};
pub use session::{Role, Session, UserProfile};
pub use store::SessionStore;
pub use token::decode_expiry;

pub type Result<T> = std::result::Result<T, AuthError>;
