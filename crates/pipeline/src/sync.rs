//! Idempotent application of identity events to the user store.

use tracing::{debug, error};

use storefront_core::{DomainError, DomainResult, UserId};
use storefront_identity::{AccountProfile, IdentityEvent, User};

use crate::retry::{RetryPolicy, retry_blocking};
use crate::store::UserStore;

/// Applies identity-provider events to the local user store.
///
/// `created` and `updated` share one upsert-by-id: the distinction between
/// the two kinds is cosmetic. Handlers are safe under at-least-once delivery
/// because re-applying the same event reproduces the same stored state.
/// Events are applied in delivery order; there is no timestamp-based
/// reconciliation of reordered deliveries.
#[derive(Debug, Clone)]
pub struct UserSync<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S: UserStore> UserSync<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn apply(&self, event: &IdentityEvent) -> DomainResult<()> {
        match event {
            IdentityEvent::Created(profile) | IdentityEvent::Updated(profile) => {
                self.upsert(profile)
            }
            IdentityEvent::Deleted { id } => self.delete(id),
        }
    }

    /// Upsert-by-id: overwrite profile fields, create when absent. The
    /// stored cart of an existing record is preserved.
    fn upsert(&self, profile: &AccountProfile) -> DomainResult<()> {
        let result = retry_blocking(&self.retry, "user_upsert", || {
            let user = match self.store.get(&profile.id)? {
                Some(mut existing) => {
                    existing.apply_profile(profile.clone());
                    existing
                }
                None => User::from_profile(profile.clone()),
            };
            self.store.upsert(user)
        });

        match result {
            Ok(()) => {
                debug!(user = %profile.id, "identity upsert applied");
                Ok(())
            }
            Err(err) => {
                error!(user = %profile.id, error = %err, "identity upsert exhausted retries");
                Err(DomainError::persistence(err.to_string()))
            }
        }
    }

    /// Remove-by-id. Deleting a record that was never seen (or was already
    /// deleted by an earlier delivery) is a success.
    fn delete(&self, id: &UserId) -> DomainResult<()> {
        let result = retry_blocking(&self.retry, "user_delete", || self.store.delete(id));

        match result {
            Ok(()) => {
                debug!(user = %id, "identity delete applied");
                Ok(())
            }
            Err(err) => {
                error!(user = %id, error = %err, "identity delete exhausted retries");
                Err(DomainError::persistence(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use storefront_cart::CartSnapshot;
    use storefront_core::ProductId;

    use crate::store::{InMemoryUserStore, StoreError};

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn profile(id: &str, name: &str) -> AccountProfile {
        AccountProfile {
            id: uid(id),
            email: format!("{id}@example.com"),
            name: name.to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn created_and_updated_share_one_upsert() {
        let store = Arc::new(InMemoryUserStore::new());
        let sync = UserSync::new(store.clone());

        // `updated` for an absent record creates it.
        sync.apply(&IdentityEvent::Updated(profile("u1", "Ada")))
            .unwrap();
        assert_eq!(store.get(&uid("u1")).unwrap().unwrap().name, "Ada");

        // A later `created` overwrites the same record, no duplicate.
        sync.apply(&IdentityEvent::Created(profile("u1", "Ada L")))
            .unwrap();
        assert_eq!(store.get(&uid("u1")).unwrap().unwrap().name, "Ada L");
    }

    #[test]
    fn reapplying_the_same_event_is_idempotent() {
        let store = Arc::new(InMemoryUserStore::new());
        let sync = UserSync::new(store.clone());
        let event = IdentityEvent::Created(profile("u1", "Ada"));

        sync.apply(&event).unwrap();
        let first = store.get(&uid("u1")).unwrap();
        sync.apply(&event).unwrap();
        assert_eq!(store.get(&uid("u1")).unwrap(), first);
    }

    #[test]
    fn update_preserves_the_stored_cart() {
        let store = Arc::new(InMemoryUserStore::new());
        let sync = UserSync::new(store.clone());

        sync.apply(&IdentityEvent::Created(profile("u1", "Ada")))
            .unwrap();
        let cart: CartSnapshot = [(ProductId::new("p1").unwrap(), 3)].into_iter().collect();
        store.set_cart(&uid("u1"), cart.clone()).unwrap();

        sync.apply(&IdentityEvent::Updated(profile("u1", "Ada L")))
            .unwrap();
        let user = store.get(&uid("u1")).unwrap().unwrap();
        assert_eq!(user.name, "Ada L");
        assert_eq!(user.cart, cart);
    }

    #[test]
    fn deleting_a_never_seen_user_is_a_no_op_success() {
        let store = Arc::new(InMemoryUserStore::new());
        let sync = UserSync::new(store);

        sync.apply(&IdentityEvent::Deleted { id: uid("ghost") })
            .unwrap();
    }

    struct FlakyUserStore {
        inner: InMemoryUserStore,
        failures_left: AtomicU32,
    }

    impl UserStore for FlakyUserStore {
        fn upsert(&self, user: User) -> Result<(), StoreError> {
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(StoreError::Storage("write rejected".to_string()));
            }
            self.inner.upsert(user)
        }

        fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
            self.inner.get(id)
        }

        fn delete(&self, id: &UserId) -> Result<(), StoreError> {
            self.inner.delete(id)
        }

        fn set_cart(&self, id: &UserId, cart: CartSnapshot) -> Result<(), StoreError> {
            self.inner.set_cart(id, cart)
        }
    }

    #[test]
    fn transient_store_failures_are_retried() {
        let store = Arc::new(FlakyUserStore {
            inner: InMemoryUserStore::new(),
            failures_left: AtomicU32::new(2),
        });
        let sync = UserSync::new(store.clone())
            .with_retry(RetryPolicy::fixed(3, Duration::from_millis(1)));

        sync.apply(&IdentityEvent::Created(profile("u1", "Ada")))
            .unwrap();
        assert!(store.get(&uid("u1")).unwrap().is_some());
    }

    #[test]
    fn exhausted_retries_surface_as_persistence_failure() {
        let store = Arc::new(FlakyUserStore {
            inner: InMemoryUserStore::new(),
            failures_left: AtomicU32::new(100),
        });
        let sync = UserSync::new(store)
            .with_retry(RetryPolicy::fixed(1, Duration::from_millis(1)));

        let err = sync
            .apply(&IdentityEvent::Created(profile("u1", "Ada")))
            .unwrap_err();
        assert!(matches!(err, DomainError::PersistenceFailure(_)));
    }
}
