use super::errors::ValidationErrors;
use super::value_objects::{Address, Order, OrderItem, OrderStatus};

// ============================================================================
// NewOrder - a webhook payload that passed field-presence validation
// ============================================================================

pub const REQUIRED: &str = "is required";

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub total_amount: f64,
    pub status: OrderStatus,
}

impl TryFrom<Order> for NewOrder {
    type Error = ValidationErrors;

    /// Only the order-level fields are checked; items and addresses pass
    /// through untouched.
    fn try_from(order: Order) -> Result<Self, Self::Error> {
        let mut errs = ValidationErrors::new();

        if order.order_id.is_none() {
            errs.add("order_id", REQUIRED);
        }
        if order.user_id.is_none() {
            errs.add("user_id", REQUIRED);
        }
        if order.total_amount.is_none() {
            errs.add("total_amount", REQUIRED);
        }

        let status = match order.status.as_deref() {
            None => {
                errs.add("status", REQUIRED);
                None
            }
            Some(raw) => match raw.parse::<OrderStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    errs.add("status", invalid_status_reason());
                    None
                }
            },
        };

        match (order.order_id, order.user_id, order.total_amount, status) {
            (Some(order_id), Some(user_id), Some(total_amount), Some(status)) if errs.is_empty() => {
                Ok(NewOrder {
                    order_id,
                    user_id,
                    items: order.items,
                    shipping_address: order.shipping_address,
                    billing_address: order.billing_address,
                    total_amount,
                    status,
                })
            }
            _ => Err(errs),
        }
    }
}

fn invalid_status_reason() -> String {
    let names: Vec<&str> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
    format!("must be one of {}", names.join(", "))
}
