use serde::{Deserialize, Serialize};

use storefront_cart::CartSnapshot;
use storefront_core::UserId;

use crate::event::AccountProfile;

/// Local user record mirroring an externally managed account, plus the
/// server-side copy of the user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub image_url: String,
    /// Stored cart snapshot, mutated by cart sync and cleared on checkout.
    /// Never touched by identity upserts of an existing record.
    #[serde(default)]
    pub cart: CartSnapshot,
}

impl User {
    /// A fresh record from a provider profile, with an empty cart.
    pub fn from_profile(profile: AccountProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            image_url: profile.image_url,
            cart: CartSnapshot::new(),
        }
    }

    /// Overwrite the profile fields, keeping the stored cart.
    pub fn apply_profile(&mut self, profile: AccountProfile) {
        self.id = profile.id;
        self.email = profile.email;
        self.name = profile.name;
        self.image_url = profile.image_url;
    }
}
