// ============================================================================
// Order Store - relational persistence seam
// ============================================================================
//
// The repository talks to storage only through these traits:
// - `OrderStore` opens write transactions and serves the read path
// - `OrderTransaction` performs the inserts of a single order
//
// Dropping a transaction without calling `commit` rolls it back.
//
// ============================================================================

mod postgres;
#[cfg(test)]
pub mod memory;

pub use postgres::PgOrderStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

pub use crate::domain::order::BoxError;

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AddressRow {
    pub id: Uuid,
    pub line1: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_address_id: Option<Uuid>,
    pub billing_address_id: Option<Uuid>,
    pub status: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub total_price: Decimal,
}

// ============================================================================
// Insert parameters
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderRow {
    pub user_id: Uuid,
    pub shipping_address_id: Option<Uuid>,
    pub billing_address_id: Option<Uuid>,
    pub status: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItemRow {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub total_price: Decimal,
}

// ============================================================================
// Capability traits
// ============================================================================

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, BoxError>;

    async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderRow>, BoxError>;

    /// Items come back in the order they were stored.
    async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItemRow>, BoxError>;

    async fn get_address(&self, id: Uuid) -> Result<Option<AddressRow>, BoxError>;
}

#[async_trait]
pub trait OrderTransaction: Send {
    async fn create_address(&mut self, address: NewAddress) -> Result<Uuid, BoxError>;

    async fn create_order(&mut self, order: NewOrderRow) -> Result<Uuid, BoxError>;

    async fn create_order_item(&mut self, item: NewOrderItemRow) -> Result<Uuid, BoxError>;

    async fn commit(self: Box<Self>) -> Result<(), BoxError>;
}
