// ============================================================================
// Messaging - broker seam for the publish path
// ============================================================================
//
// Each wire message declares its `MessageType`. Exchange, routing key and
// consumer queue are looked up in `ROUTING_TABLE`; nothing is passed in by
// the caller.
//
// ============================================================================

mod rabbitmq;
pub mod schema;

pub use rabbitmq::{RabbitMqConfig, RabbitMqTransport};

use async_trait::async_trait;
use prost::Message;

use crate::domain::order::BoxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Order,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Order => "order",
        }
    }

    pub fn route(&self) -> Option<&'static MessageRoute> {
        ROUTING_TABLE
            .iter()
            .find(|(message_type, _)| message_type == self)
            .map(|(_, route)| route)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRoute {
    pub exchange: &'static str,
    pub routing_key: &'static str,
    /// Queue a consumer declares and binds to the exchange.
    pub queue: &'static str,
}

pub const ROUTING_TABLE: &[(MessageType, MessageRoute)] = &[(
    MessageType::Order,
    MessageRoute {
        exchange: "orders",
        routing_key: "orders.created",
        queue: "orders.created",
    },
)];

/// Implemented by protobuf messages that can be published.
pub trait RoutedMessage: Message {
    const MESSAGE_TYPE: MessageType;
}

/// An encoded message ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub message_type: MessageType,
    pub body: Vec<u8>,
}

impl OutboundMessage {
    pub fn encode<M: RoutedMessage>(message: &M) -> Self {
        Self {
            message_type: M::MESSAGE_TYPE,
            body: message.encode_to_vec(),
        }
    }

    pub fn route(&self) -> Result<&'static MessageRoute, TransportError> {
        self.message_type
            .route()
            .ok_or(TransportError::Unrouted(self.message_type.as_str()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("publish: failed to open a channel: {0}")]
    Channel(#[source] BoxError),

    #[error("publish: failed to declare an exchange: {0}")]
    ExchangeDeclare(#[source] BoxError),

    #[error("failed to publish {message_type}: {source}")]
    Publish {
        message_type: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("no route configured for {0}")]
    Unrouted(&'static str),
}

#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn publish(&self, message: OutboundMessage) -> Result<(), TransportError>;
}
