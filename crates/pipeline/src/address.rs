use serde::{Deserialize, Serialize};

use storefront_core::{AddressId, UserId};

/// A shipping address. Immutable after creation; a user may have many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub full_name: String,
    pub phone_number: String,
    pub pincode: String,
    pub area: String,
    pub city: String,
    pub state: String,
}
