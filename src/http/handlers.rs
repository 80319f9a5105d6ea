use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::domain::order::{
    IngestionOutcome, Order, OrderError, OrderIngestor, OrderRepository, ValidationErrors,
};
use crate::messaging::MessageType;
use crate::metrics::Metrics;

/// Shared state handed to every handler.
pub struct AppState {
    pub ingestor: Arc<OrderIngestor>,
    pub orders: Arc<OrderRepository>,
    pub metrics: Arc<Metrics>,
    pub request_timeout: Duration,
}

/// JSON envelope used by every endpoint. The HTTP status mirrors `status_code`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errs: Option<ValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn respond<T: Serialize>(
    status: StatusCode,
    message: &str,
    errs: Option<ValidationErrors>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status).json(Envelope {
        message: message.to_string(),
        status_code: status.as_u16(),
        errs,
        data,
    })
}

fn message_only(status: StatusCode, message: &str) -> HttpResponse {
    respond::<()>(status, message, None, None)
}

// ============================================================================
// POST /webhooks/orders
// ============================================================================

pub async fn receive_order(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let payload: Order = match serde_json::from_slice(&body) {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected webhook with malformed body");
            return message_only(StatusCode::UNPROCESSABLE_ENTITY, "invalid json");
        }
    };

    let backend = state.ingestor.backend_name();
    let started = Instant::now();

    let result = match tokio::time::timeout(state.request_timeout, state.ingestor.ingest(payload)).await {
        Ok(result) => result,
        Err(_) => Err(OrderError::Timeout {
            operation: "process order",
            deadline: state.request_timeout,
        }),
    };
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(outcome) => {
            state.metrics.record_ingested(backend, elapsed);
            match outcome {
                IngestionOutcome::Persisted(id) => {
                    tracing::info!(order_id = %id, "Order stored");
                }
                IngestionOutcome::Published => {
                    state.metrics.record_published(MessageType::Order.as_str());
                    tracing::info!("Order published");
                }
            }
            message_only(StatusCode::CREATED, "Order Created")
        }
        Err(OrderError::Validation(errs)) => {
            state.metrics.record_rejected(errs.fields());
            tracing::info!(errors = %errs, "Order failed validation");
            respond::<()>(
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation failed",
                Some(errs),
                None,
            )
        }
        Err(e) => {
            state.metrics.record_ingestion_failure(backend, e.kind(), elapsed);
            tracing::error!(error = %e, kind = e.kind(), backend, "❌ Failed to process order");
            message_only(StatusCode::INTERNAL_SERVER_ERROR, "failed to process order")
        }
    }
}

// ============================================================================
// GET /orders/{user_id}
// ============================================================================

pub async fn list_orders(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let user_id = path.into_inner();
    let started = Instant::now();

    let listing = state.orders.list_orders_for_user(&user_id);
    let result = match tokio::time::timeout(state.request_timeout, listing).await {
        Ok(result) => result,
        Err(_) => Err(OrderError::Timeout {
            operation: "fetch orders",
            deadline: state.request_timeout,
        }),
    };
    state
        .metrics
        .record_listing(result.is_ok(), started.elapsed().as_secs_f64());

    match result {
        Ok(orders) => respond(StatusCode::OK, "OK", None, Some(orders)),
        Err(e) => {
            tracing::error!(error = %e, user_id = %user_id, "❌ Failed to fetch orders");
            message_only(StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch orders")
        }
    }
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body(":)")
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use prost::Message;
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::order::{IngestionBackend, OrderPublisher};
    use crate::http::routes;
    use crate::messaging::schema::OrderMessage;
    use crate::messaging::testing::RecordingTransport;
    use crate::store::memory::MemoryOrderStore;

    const USER: &str = "5d3c2b1a-9f8e-4d7c-8b6a-5f4e3d2c1b0a";
    const PRODUCT: &str = "1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d";

    fn payload(user_id: &str, product_id: &str) -> Value {
        json!({
            "order_id": "test-123",
            "user_id": user_id,
            "items": [
                { "product_id": product_id, "quantity": 2, "price": 19.99, "total_price": 39.98 }
            ],
            "shipping_address": {
                "line1": "123 Example St",
                "city": "ExampleCity",
                "state": "CA",
                "postal_code": "12345",
                "country": "US"
            },
            "billing_address": {},
            "total_amount": 39.98,
            "status": "PENDING"
        })
    }

    fn repository(store: &MemoryOrderStore) -> OrderRepository {
        OrderRepository::new(Arc::new(store.clone()), "GB", Duration::from_secs(10))
    }

    fn repository_state(store: &MemoryOrderStore) -> AppState {
        AppState {
            ingestor: Arc::new(OrderIngestor::new(IngestionBackend::RepositoryBacked(
                repository(store),
            ))),
            orders: Arc::new(repository(store)),
            metrics: Arc::new(Metrics::new().unwrap()),
            request_timeout: Duration::from_secs(8),
        }
    }

    fn broker_state(store: &MemoryOrderStore, transport: Arc<RecordingTransport>) -> AppState {
        let publisher = OrderPublisher::new(transport, Duration::from_secs(10));
        AppState {
            ingestor: Arc::new(OrderIngestor::new(IngestionBackend::BrokerBacked(publisher))),
            orders: Arc::new(repository(store)),
            metrics: Arc::new(Metrics::new().unwrap()),
            request_timeout: Duration::from_secs(8),
        }
    }

    macro_rules! app {
        ($state:expr) => {{
            let state = web::Data::new($state);
            let metrics = web::Data::new(state.metrics.clone());
            test::init_service(App::new().app_data(state).app_data(metrics).configure(routes)).await
        }};
    }

    #[actix_web::test]
    async fn test_missing_fields_are_rejected_with_reasons() {
        for field in ["order_id", "user_id", "total_amount", "status"] {
            let store = MemoryOrderStore::new();
            let app = app!(repository_state(&store));

            let mut body = payload(USER, PRODUCT);
            body.as_object_mut().unwrap().remove(field);

            let req = test::TestRequest::post()
                .uri("/webhooks/orders")
                .set_json(&body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

            let json: Value = test::read_body_json(resp).await;
            assert_eq!(json["message"], "validation failed");
            assert_eq!(json["status_code"], 422);
            assert_eq!(json["errs"][field], "is required");
            assert_eq!(store.insert_attempts(), 0);
        }
    }

    #[actix_web::test]
    async fn test_empty_items_pass_validation() {
        let transport = Arc::new(RecordingTransport::default());
        let store = MemoryOrderStore::new();
        let app = app!(broker_state(&store, transport.clone()));

        let mut body = payload("user-456", "p-789");
        body["items"] = json!([]);

        let req = test::TestRequest::post()
            .uri("/webhooks/orders")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let message = OrderMessage::decode(transport.published()[0].body.as_slice()).unwrap();
        assert!(message.items.is_empty());
    }

    #[actix_web::test]
    async fn test_malformed_json_is_rejected() {
        let store = MemoryOrderStore::new();
        let app = app!(repository_state(&store));

        let req = test::TestRequest::post()
            .uri("/webhooks/orders")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"order_id\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "invalid json");
        assert!(json.get("errs").is_none());
    }

    #[actix_web::test]
    async fn test_broker_mode_publishes_order() {
        let transport = Arc::new(RecordingTransport::default());
        let store = MemoryOrderStore::new();
        let app = app!(broker_state(&store, transport.clone()));

        let req = test::TestRequest::post()
            .uri("/webhooks/orders")
            .set_json(payload("user-456", "p-789"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "Order Created");
        assert_eq!(json["status_code"], 201);

        let published = transport.published();
        assert_eq!(published.len(), 1);
        let message = OrderMessage::decode(published[0].body.as_slice()).unwrap();
        assert_eq!(message.order_id, "test-123");
        assert_eq!(message.user_id, "user-456");
        assert_eq!(message.items[0].product_id, "p-789");
        assert_eq!(store.insert_attempts(), 0);
    }

    #[actix_web::test]
    async fn test_broker_failure_is_internal_error() {
        let transport = Arc::new(RecordingTransport::failing());
        let store = MemoryOrderStore::new();
        let app = app!(broker_state(&store, transport));

        let req = test::TestRequest::post()
            .uri("/webhooks/orders")
            .set_json(payload("user-456", "p-789"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "failed to process order");
    }

    #[actix_web::test]
    async fn test_request_budget_exceeded_is_internal_error() {
        let transport = Arc::new(RecordingTransport::stalling(Duration::from_secs(3600)));
        let store = MemoryOrderStore::new();
        let mut state = broker_state(&store, transport.clone());
        state.request_timeout = Duration::from_millis(50);
        let metrics = state.metrics.clone();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/webhooks/orders")
            .set_json(payload("user-456", "p-789"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "failed to process order");
        assert!(transport.published().is_empty());
        assert_eq!(
            metrics
                .ingestion_failures
                .with_label_values(&["broker", "timeout"])
                .get(),
            1
        );
    }

    #[actix_web::test]
    async fn test_repository_mode_stores_then_lists_order() {
        let store = MemoryOrderStore::new();
        let app = app!(repository_state(&store));

        let req = test::TestRequest::post()
            .uri("/webhooks/orders")
            .set_json(payload(USER, PRODUCT))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(store.committed_counts(), (1, 1, 1));

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{USER}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "OK");
        let orders = json["data"].as_array().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["total_amount"], 39.98);
        assert_eq!(orders[0]["status"], "PENDING");
        assert_eq!(orders[0]["items"].as_array().unwrap().len(), 1);
        assert_eq!(orders[0]["shipping_address"]["country"], "GB");
    }

    #[actix_web::test]
    async fn test_repository_mode_rejects_non_uuid_ids() {
        let store = MemoryOrderStore::new();
        let app = app!(repository_state(&store));

        let req = test::TestRequest::post()
            .uri("/webhooks/orders")
            .set_json(payload("user-456", PRODUCT))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.insert_attempts(), 0);
    }

    #[actix_web::test]
    async fn test_listing_for_unknown_user_is_empty() {
        let store = MemoryOrderStore::new();
        let app = app!(repository_state(&store));

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{USER}"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["data"], json!([]));
    }

    #[actix_web::test]
    async fn test_listing_failure_is_internal_error() {
        let store = MemoryOrderStore::new();
        store.fail_reads();
        let app = app!(repository_state(&store));

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{USER}"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "failed to fetch orders");
    }

    #[actix_web::test]
    async fn test_health_check_and_metrics() {
        let store = MemoryOrderStore::new();
        let app = app!(repository_state(&store));

        let req = test::TestRequest::get().uri("/health-check").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, ":)");

        let req = test::TestRequest::post()
            .uri("/webhooks/orders")
            .set_json(payload(USER, PRODUCT))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("orders_ingested_total"));
    }
}
