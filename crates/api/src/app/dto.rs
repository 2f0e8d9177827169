//! Request/response shapes for the HTTP surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storefront_cart::CartSnapshot;

/// `{ success, message? }` response shape shared by mutation endpoints.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

}

/// Checkout confirmation: the success message plus the charged total.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub message: &'static str,
    pub amount: u64,
}

/// Full-snapshot cart overwrite. Quantities arrive as raw integers and are
/// validated server-side (negatives rejected, zeros dropped).
#[derive(Debug, Deserialize)]
pub struct CartUpdateRequest {
    pub cart: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: CartSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemDto {
    pub product: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct OrderCreateRequest {
    /// Selected address id; absent means the submission is rejected.
    pub address: Option<String>,
    pub items: Vec<OrderItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAddressRequest {
    pub full_name: String,
    pub phone_number: String,
    pub pincode: String,
    pub area: String,
    pub city: String,
    pub state: String,
}
