use storefront_core::UserId;

/// The verified caller of a request.
///
/// Transport authentication happens upstream; by the time a request reaches
/// the handlers, the caller's identity travels in the `x-user-id` header and
/// is carried through the router as this extension.
#[derive(Debug, Clone)]
pub struct CallerContext {
    user_id: UserId,
}

impl CallerContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
