//! Storage abstractions and in-memory implementations.
//!
//! Store-level failures stay in [`StoreError`]; they cross into the domain
//! as `DomainError::PersistenceFailure` at the call sites that need to.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use storefront_cart::CartSnapshot;
use storefront_core::{AddressId, DomainError, OrderId, UserId};
use storefront_identity::User;
use storefront_orders::Order;

use crate::address::Address;

/// Storage-layer error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store lock poisoned")]
    Poisoned,
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound,
            other => DomainError::persistence(other.to_string()),
        }
    }
}

/// Durable user records, keyed by externally issued id.
///
/// Single-record upsert semantics: conflicting writes to the same record are
/// serialized by the store; no multi-record transactions.
pub trait UserStore: Send + Sync {
    fn upsert(&self, user: User) -> Result<(), StoreError>;

    fn get(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Remove a record. Absence is success.
    fn delete(&self, id: &UserId) -> Result<(), StoreError>;

    /// Overwrite the stored cart of an existing user.
    fn set_cart(&self, id: &UserId, cart: CartSnapshot) -> Result<(), StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn upsert(&self, user: User) -> Result<(), StoreError> {
        (**self).upsert(user)
    }

    fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        (**self).get(id)
    }

    fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn set_cart(&self, id: &UserId, cart: CartSnapshot) -> Result<(), StoreError> {
        (**self).set_cart(id, cart)
    }
}

/// Address records. Create-once, list per user.
pub trait AddressStore: Send + Sync {
    fn add(&self, address: Address) -> Result<(), StoreError>;

    fn get(&self, id: &AddressId) -> Result<Option<Address>, StoreError>;

    fn for_user(&self, user: &UserId) -> Result<Vec<Address>, StoreError>;
}

impl<S> AddressStore for Arc<S>
where
    S: AddressStore + ?Sized,
{
    fn add(&self, address: Address) -> Result<(), StoreError> {
        (**self).add(address)
    }

    fn get(&self, id: &AddressId) -> Result<Option<Address>, StoreError> {
        (**self).get(id)
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<Address>, StoreError> {
        (**self).for_user(user)
    }
}

/// Persisted orders.
pub trait OrderStore: Send + Sync {
    /// Insert a whole batch atomically: either every order lands or none
    /// does. Returns the number inserted.
    fn insert_batch(&self, orders: Vec<Order>) -> Result<usize, StoreError>;

    fn for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn insert_batch(&self, orders: Vec<Order>) -> Result<usize, StoreError> {
        (**self).insert_batch(orders)
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        (**self).for_user(user)
    }
}

/// In-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn upsert(&self, user: User) -> Result<(), StoreError> {
        let mut map = self.users.write().map_err(|_| StoreError::Poisoned)?;
        map.insert(user.id.clone(), user);
        Ok(())
    }

    fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let map = self.users.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        let mut map = self.users.write().map_err(|_| StoreError::Poisoned)?;
        map.remove(id);
        Ok(())
    }

    fn set_cart(&self, id: &UserId, cart: CartSnapshot) -> Result<(), StoreError> {
        let mut map = self.users.write().map_err(|_| StoreError::Poisoned)?;
        match map.get_mut(id) {
            Some(user) => {
                user.cart = cart;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}

/// In-memory address store.
#[derive(Debug, Default)]
pub struct InMemoryAddressStore {
    addresses: RwLock<HashMap<AddressId, Address>>,
}

impl InMemoryAddressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AddressStore for InMemoryAddressStore {
    fn add(&self, address: Address) -> Result<(), StoreError> {
        let mut map = self.addresses.write().map_err(|_| StoreError::Poisoned)?;
        map.insert(address.id, address);
        Ok(())
    }

    fn get(&self, id: &AddressId) -> Result<Option<Address>, StoreError> {
        let map = self.addresses.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<Address>, StoreError> {
        let map = self.addresses.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.values().filter(|a| &a.user_id == user).cloned().collect())
    }
}

/// In-memory order store. Insertion order is preserved.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &OrderId) -> Option<Order> {
        let orders = self.orders.read().ok()?;
        orders.iter().find(|o| &o.id == id).cloned()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert_batch(&self, orders: Vec<Order>) -> Result<usize, StoreError> {
        let mut vec = self.orders.write().map_err(|_| StoreError::Poisoned)?;
        let count = orders.len();
        vec.extend(orders);
        Ok(count)
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        let vec = self.orders.read().map_err(|_| StoreError::Poisoned)?;
        Ok(vec.iter().filter(|o| &o.user_id == user).cloned().collect())
    }
}
