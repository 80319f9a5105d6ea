use uuid::Uuid;

use super::commands::NewOrder;
use super::errors::OrderError;
use super::publisher::OrderPublisher;
use super::repository::OrderRepository;
use super::value_objects::Order;

// ============================================================================
// Order Ingestor
// ============================================================================
//
// Orchestrates: Payload → Validation → Repository write | Broker publish
//
// The backend is fixed when the ingestor is built; a single instance never
// both stores and publishes.
//
// ============================================================================

pub enum IngestionBackend {
    RepositoryBacked(OrderRepository),
    BrokerBacked(OrderPublisher),
}

impl IngestionBackend {
    pub fn name(&self) -> &'static str {
        match self {
            IngestionBackend::RepositoryBacked(_) => "repository",
            IngestionBackend::BrokerBacked(_) => "broker",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionOutcome {
    Persisted(Uuid),
    Published,
}

pub struct OrderIngestor {
    backend: IngestionBackend,
}

impl OrderIngestor {
    pub fn new(backend: IngestionBackend) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Validate the payload and hand it to the configured backend.
    pub async fn ingest(&self, payload: Order) -> Result<IngestionOutcome, OrderError> {
        let order = NewOrder::try_from(payload).map_err(OrderError::Validation)?;

        tracing::info!(
            order_id = %order.order_id,
            backend = self.backend.name(),
            item_count = order.items.len(),
            "Ingesting order"
        );

        match &self.backend {
            IngestionBackend::RepositoryBacked(repository) => {
                let id = repository.create_order(&order).await?;
                Ok(IngestionOutcome::Persisted(id))
            }
            IngestionBackend::BrokerBacked(publisher) => {
                publisher.publish(&order).await?;
                Ok(IngestionOutcome::Published)
            }
        }
    }
}
