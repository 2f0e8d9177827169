use serde::{Deserialize, Serialize};

use storefront_core::UserId;

/// Profile fields as issued by the external identity provider.
///
/// Wire field names match the provider payload (`imageUrl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// A notification that an externally managed account changed.
///
/// `created` and `updated` carry the full profile; the distinction between
/// them is cosmetic — both are applied as one idempotent upsert. `deleted`
/// carries only the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdentityEvent {
    Created(AccountProfile),
    Updated(AccountProfile),
    Deleted { id: UserId },
}

impl IdentityEvent {
    /// Stable wire kind tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted { .. } => "deleted",
        }
    }

    /// The account the event concerns.
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Created(profile) | Self::Updated(profile) => &profile.id,
            Self::Deleted { id } => id,
        }
    }
}
