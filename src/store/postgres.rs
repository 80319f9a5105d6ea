use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{
    AddressRow, BoxError, NewAddress, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow,
    OrderStore, OrderTransaction,
};

// ============================================================================
// PostgreSQL Order Store
// ============================================================================

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Create the order tables when they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS addresses (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                line1 TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                country TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL,
                shipping_address_id UUID REFERENCES addresses(id),
                billing_address_id UUID REFERENCES addresses(id),
                status TEXT NOT NULL,
                total_amount NUMERIC(12, 2) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS order_items (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                position BIGSERIAL,
                order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                product_id UUID NOT NULL,
                quantity INTEGER NOT NULL,
                price NUMERIC(12, 2) NOT NULL,
                total_price NUMERIC(12, 2) NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items(order_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, BoxError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgOrderTransaction { tx }))
    }

    async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderRow>, BoxError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, shipping_address_id, billing_address_id, status, total_amount
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItemRow>, BoxError> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, product_id, quantity, price, total_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_address(&self, id: Uuid) -> Result<Option<AddressRow>, BoxError> {
        let row: Option<AddressRow> = sqlx::query_as(
            r#"
            SELECT id, line1, city, state, country
            FROM addresses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

// ============================================================================
// Write transaction
// ============================================================================

pub struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
    async fn create_address(&mut self, address: NewAddress) -> Result<Uuid, BoxError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO addresses (line1, city, state, country)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&address.line1)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.country)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn create_order(&mut self, order: NewOrderRow) -> Result<Uuid, BoxError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO orders (user_id, shipping_address_id, billing_address_id, status, total_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(order.user_id)
        .bind(order.shipping_address_id)
        .bind(order.billing_address_id)
        .bind(&order.status)
        .bind(order.total_amount)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn create_order_item(&mut self, item: NewOrderItemRow) -> Result<Uuid, BoxError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price, total_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.total_price)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), BoxError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }
}
