// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::metrics_handler;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order ingestion (throughput, latency, failures by kind)
// - Validation rejections by field
// - Order listings
// - Broker publishes
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Ingestion Metrics
    pub orders_ingested: IntCounterVec,
    pub orders_rejected: IntCounterVec,
    pub ingestion_failures: IntCounterVec,
    pub ingestion_duration: HistogramVec,

    // Listing Metrics
    pub listings: IntCounterVec,
    pub listing_duration: Histogram,

    // Broker Metrics
    pub messages_published: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let orders_ingested = IntCounterVec::new(
            Opts::new("orders_ingested_total", "Total orders accepted by the ingestion pipeline"),
            &["backend"],
        )?;
        registry.register(Box::new(orders_ingested.clone()))?;

        let orders_rejected = IntCounterVec::new(
            Opts::new("orders_rejected_total", "Webhook payloads rejected by validation"),
            &["field"],
        )?;
        registry.register(Box::new(orders_rejected.clone()))?;

        let ingestion_failures = IntCounterVec::new(
            Opts::new("order_ingestion_failures_total", "Orders that failed after validation"),
            &["backend", "kind"],
        )?;
        registry.register(Box::new(ingestion_failures.clone()))?;

        let ingestion_duration = HistogramVec::new(
            HistogramOpts::new("order_ingestion_duration_seconds", "Order ingestion duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
            &["backend"],
        )?;
        registry.register(Box::new(ingestion_duration.clone()))?;

        let listings = IntCounterVec::new(
            Opts::new("order_listings_total", "Order listing requests"),
            &["outcome"],
        )?;
        registry.register(Box::new(listings.clone()))?;

        let listing_duration = Histogram::with_opts(
            HistogramOpts::new("order_listing_duration_seconds", "Order listing duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(listing_duration.clone()))?;

        let messages_published = IntCounterVec::new(
            Opts::new("messages_published_total", "Messages handed to the broker"),
            &["message_type"],
        )?;
        registry.register(Box::new(messages_published.clone()))?;

        Ok(Self {
            registry,
            orders_ingested,
            orders_rejected,
            ingestion_failures,
            ingestion_duration,
            listings,
            listing_duration,
            messages_published,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_ingested(&self, backend: &str, duration_secs: f64) {
        self.orders_ingested.with_label_values(&[backend]).inc();
        self.ingestion_duration.with_label_values(&[backend]).observe(duration_secs);
    }

    pub fn record_rejected<'a>(&self, fields: impl IntoIterator<Item = &'a str>) {
        for field in fields {
            self.orders_rejected.with_label_values(&[field]).inc();
        }
    }

    pub fn record_ingestion_failure(&self, backend: &str, kind: &str, duration_secs: f64) {
        self.ingestion_failures.with_label_values(&[backend, kind]).inc();
        self.ingestion_duration.with_label_values(&[backend]).observe(duration_secs);
    }

    pub fn record_published(&self, message_type: &str) {
        self.messages_published.with_label_values(&[message_type]).inc();
    }

    pub fn record_listing(&self, success: bool, duration_secs: f64) {
        let outcome = if success { "success" } else { "failure" };
        self.listings.with_label_values(&[outcome]).inc();
        self.listing_duration.observe(duration_secs);
    }
}
