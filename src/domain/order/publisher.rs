use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::messaging::schema::{AddressMessage, OrderItemMessage, OrderMessage, OrderStatusMessage};
use crate::messaging::{MessageTransport, OutboundMessage};

use super::commands::NewOrder;
use super::errors::OrderError;
use super::value_objects::{Address, OrderStatus};

// ============================================================================
// Order Publisher - broker-backed ingestion
// ============================================================================

pub struct OrderPublisher {
    transport: Arc<dyn MessageTransport>,
    deadline: Duration,
}

impl OrderPublisher {
    pub fn new(transport: Arc<dyn MessageTransport>, deadline: Duration) -> Self {
        Self {
            transport,
            deadline,
        }
    }

    pub async fn publish(&self, order: &NewOrder) -> Result<(), OrderError> {
        let message = OutboundMessage::encode(&to_message(order));

        tracing::debug!(
            order_id = %order.order_id,
            message_type = message.message_type.as_str(),
            bytes = message.body.len(),
            "Publishing order"
        );

        match tokio::time::timeout(self.deadline, self.transport.publish(message)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(OrderError::transport("failed to publish order", e)),
            Err(_) => Err(OrderError::Timeout {
                operation: "publish order",
                deadline: self.deadline,
            }),
        }
    }
}

pub fn to_message(order: &NewOrder) -> OrderMessage {
    let now = Utc::now();

    OrderMessage {
        order_id: order.order_id.clone(),
        user_id: order.user_id.clone(),
        items: order
            .items
            .iter()
            .map(|item| OrderItemMessage {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                price: item.price,
                total_price: item.total_price,
            })
            .collect(),
        shipping_address: Some(to_address_message(&order.shipping_address)),
        billing_address: Some(to_address_message(&order.billing_address)),
        total_amount: order.total_amount,
        order_status: status_to_wire(order.status) as i32,
        created_at: Some(prost_types::Timestamp {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos() as i32,
        }),
    }
}

fn to_address_message(address: &Address) -> AddressMessage {
    AddressMessage {
        city: address.city.clone(),
        state: address.state.clone(),
    }
}

fn status_to_wire(status: OrderStatus) -> OrderStatusMessage {
    match status {
        OrderStatus::Unspecified => OrderStatusMessage::Unspecified,
        OrderStatus::Pending => OrderStatusMessage::Pending,
        OrderStatus::Shipped => OrderStatusMessage::Shipped,
        OrderStatus::Delivered => OrderStatusMessage::Delivered,
        OrderStatus::Cancelled => OrderStatusMessage::Cancelled,
    }
}
