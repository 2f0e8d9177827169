//! `storefront-identity` — externally managed account profiles and the
//! identity events that keep the local user store in sync with them.

pub mod event;
pub mod user;

pub use event::{AccountProfile, IdentityEvent};
pub use user::User;
