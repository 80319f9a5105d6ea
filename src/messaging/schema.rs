// ============================================================================
// Wire schema - protobuf messages published to the broker
// ============================================================================
//
// Hand-derived prost messages; tags are part of the wire contract with
// downstream consumers and must not be renumbered.
//
// ============================================================================

use super::{MessageType, RoutedMessage};

#[derive(Clone, PartialEq, prost::Message)]
pub struct OrderMessage {
    #[prost(string, tag = "1")]
    pub order_id: String,
    #[prost(string, tag = "2")]
    pub user_id: String,
    #[prost(message, repeated, tag = "3")]
    pub items: Vec<OrderItemMessage>,
    #[prost(message, optional, tag = "4")]
    pub shipping_address: Option<AddressMessage>,
    #[prost(message, optional, tag = "5")]
    pub billing_address: Option<AddressMessage>,
    #[prost(double, tag = "6")]
    pub total_amount: f64,
    #[prost(enumeration = "OrderStatusMessage", tag = "7")]
    pub order_status: i32,
    #[prost(message, optional, tag = "8")]
    pub created_at: Option<prost_types::Timestamp>,
}

impl RoutedMessage for OrderMessage {
    const MESSAGE_TYPE: MessageType = MessageType::Order;
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct OrderItemMessage {
    #[prost(string, tag = "1")]
    pub product_id: String,
    #[prost(int32, tag = "2")]
    pub quantity: i32,
    #[prost(double, tag = "3")]
    pub price: f64,
    #[prost(double, tag = "4")]
    pub total_price: f64,
}

/// Only the city and state of an address travel on the wire.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AddressMessage {
    #[prost(string, tag = "1")]
    pub city: String,
    #[prost(string, tag = "2")]
    pub state: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum OrderStatusMessage {
    Unspecified = 0,
    Pending = 1,
    Shipped = 2,
    Delivered = 3,
    Cancelled = 4,
}
