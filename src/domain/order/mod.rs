// ============================================================================
// Order Domain - ingestion and listing pipeline
// ============================================================================
//
// - Value objects (Order, OrderItem, Address, OrderStatus)
// - Commands (NewOrder, field-presence validation)
// - Errors (OrderError, ValidationErrors)
// - Codec (money and identifier conversion)
// - Address normalizer
// - Repository (relational write and read)
// - Publisher (broker write)
// - Command handler (OrderIngestor)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod codec;
pub mod address;
pub mod repository;
pub mod publisher;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use repository::*;
pub use publisher::OrderPublisher;
pub use command_handler::*;
