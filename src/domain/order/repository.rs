use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::store::{AddressRow, NewAddress, NewOrderItemRow, NewOrderRow, OrderRow, OrderStore};

use super::address::normalize;
use super::codec::{decode_id, decode_money, encode_id, encode_money};
use super::commands::NewOrder;
use super::errors::OrderError;
use super::value_objects::{Address, Order, OrderItem};

// ============================================================================
// Order Repository - relational ingestion and listing
// ============================================================================
//
// Write path: everything is encoded up front, then the address, order and
// item inserts run in one transaction that commits only after the last item.
// Read path: orders are rebuilt by joining their addresses and items back.
//
// ============================================================================

pub struct OrderRepository {
    store: Arc<dyn OrderStore>,
    country: String,
    deadline: Duration,
}

/// A fully encoded order, ready to be inserted.
struct EncodedOrder {
    shipping_address: Option<NewAddress>,
    billing_address: Option<NewAddress>,
    user_id: Uuid,
    status: String,
    total_amount: rust_decimal::Decimal,
    items: Vec<EncodedItem>,
}

struct EncodedItem {
    product_id: Uuid,
    quantity: i32,
    price: rust_decimal::Decimal,
    total_price: rust_decimal::Decimal,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn OrderStore>, country: impl Into<String>, deadline: Duration) -> Self {
        Self {
            store,
            country: country.into(),
            deadline,
        }
    }

    /// Persist the order and return its store-assigned id.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Uuid, OrderError> {
        let encoded = self.encode(order)?;

        match tokio::time::timeout(self.deadline, self.insert(encoded)).await {
            Ok(result) => result,
            Err(_) => Err(OrderError::Timeout {
                operation: "create order",
                deadline: self.deadline,
            }),
        }
    }

    fn encode(&self, order: &NewOrder) -> Result<EncodedOrder, OrderError> {
        let user_id = encode_id("user_id", &order.user_id)?;
        let total_amount = encode_money("total_amount", order.total_amount)?;

        let items = order
            .items
            .iter()
            .map(|item| {
                Ok(EncodedItem {
                    price: encode_money("price", item.price)?,
                    total_price: encode_money("total_price", item.total_price)?,
                    product_id: encode_id("product_id", &item.product_id)?,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, OrderError>>()?;

        Ok(EncodedOrder {
            shipping_address: normalize(&order.shipping_address, &self.country),
            billing_address: normalize(&order.billing_address, &self.country),
            user_id,
            status: order.status.as_str().to_string(),
            total_amount,
            items,
        })
    }

    async fn insert(&self, order: EncodedOrder) -> Result<Uuid, OrderError> {
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|e| OrderError::transport("failed to begin transaction", e))?;

        let shipping_address_id = match order.shipping_address {
            Some(address) => Some(
                tx.create_address(address)
                    .await
                    .map_err(|e| OrderError::transport("failed to insert shipping address", e))?,
            ),
            None => None,
        };

        let billing_address_id = match order.billing_address {
            Some(address) => Some(
                tx.create_address(address)
                    .await
                    .map_err(|e| OrderError::transport("failed to insert billing address", e))?,
            ),
            None => None,
        };

        let order_id = tx
            .create_order(NewOrderRow {
                user_id: order.user_id,
                shipping_address_id,
                billing_address_id,
                status: order.status,
                total_amount: order.total_amount,
            })
            .await
            .map_err(|e| OrderError::transport("failed to create order", e))?;

        let item_count = order.items.len();
        for item in order.items {
            tx.create_order_item(NewOrderItemRow {
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                total_price: item.total_price,
            })
            .await
            .map_err(|e| OrderError::transport("failed to create order item", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| OrderError::transport("failed to commit order", e))?;

        tracing::info!(
            order_id = %order_id,
            user_id = %order.user_id,
            item_count,
            "✅ Successfully created an order"
        );

        Ok(order_id)
    }

    /// Rebuild every order of a user. One failing order fails the listing.
    pub async fn list_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderError> {
        let user_uuid = encode_id("user_id", user_id)?;

        match tokio::time::timeout(self.deadline, self.fetch(user_uuid)).await {
            Ok(result) => result,
            Err(_) => Err(OrderError::Timeout {
                operation: "list orders",
                deadline: self.deadline,
            }),
        }
    }

    async fn fetch(&self, user_uuid: Uuid) -> Result<Vec<Order>, OrderError> {

        let rows = self
            .store
            .list_orders(user_uuid)
            .await
            .map_err(|e| OrderError::transport("failed to fetch orders", e))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.rebuild(row).await?);
        }

        tracing::debug!(user_id = %user_uuid, count = orders.len(), "Listed user orders");

        Ok(orders)
    }

    async fn rebuild(&self, row: OrderRow) -> Result<Order, OrderError> {
        let shipping_address = self
            .resolve_address(row.shipping_address_id, "shipping", row.id)
            .await?;
        let billing_address = self
            .resolve_address(row.billing_address_id, "billing", row.id)
            .await?;

        let items = self
            .store
            .list_order_items(row.id)
            .await
            .map_err(|e| OrderError::transport(format!("failed to fetch order items for {}", row.id), e))?
            .into_iter()
            .map(|item| {
                Ok(OrderItem {
                    product_id: decode_id(item.product_id),
                    quantity: item.quantity,
                    price: decode_money("price", item.price)?,
                    total_price: decode_money("total_price", item.total_price)?,
                })
            })
            .collect::<Result<Vec<_>, OrderError>>()?;

        Ok(Order {
            order_id: Some(decode_id(row.id)),
            user_id: Some(decode_id(row.user_id)),
            items,
            shipping_address,
            billing_address,
            total_amount: Some(decode_money("total_amount", row.total_amount)?),
            status: Some(row.status),
        })
    }

    /// A NULL reference is an address that was never provided.
    async fn resolve_address(
        &self,
        id: Option<Uuid>,
        role: &'static str,
        order_id: Uuid,
    ) -> Result<Address, OrderError> {
        let Some(id) = id else {
            return Ok(Address::default());
        };

        let operation = format!("failed to fetch {} address for {}", role, order_id);
        let row = self
            .store
            .get_address(id)
            .await
            .map_err(|e| OrderError::transport(operation.clone(), e))?
            .ok_or(OrderError::NotFound {
                operation,
                entity: "address",
                id,
            })?;

        Ok(from_row(row))
    }
}

fn from_row(row: AddressRow) -> Address {
    Address {
        line1: row.line1,
        city: row.city,
        state: row.state,
        country: row.country,
        ..Default::default()
    }
}

// ============================================================================
// Tests
// ============================================================================
