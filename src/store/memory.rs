use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    AddressRow, BoxError, NewAddress, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow,
    OrderStore, OrderTransaction,
};

// ============================================================================
// In-memory Order Store (test double)
// ============================================================================
//
// Inserts are staged inside the transaction and only become visible on
// commit. Insert attempts are counted even when they fail or are rolled
// back, so tests can assert that nothing was attempted at all.
//
// ============================================================================

#[derive(Default)]
struct Tables {
    addresses: Vec<AddressRow>,
    orders: Vec<OrderRow>,
    items: Vec<OrderItemRow>,
}

#[derive(Default)]
struct Inner {
    tables: Mutex<Tables>,
    inserts: AtomicUsize,
    item_inserts: AtomicUsize,
    fail_item_insert_at: Mutex<Option<usize>>,
    fail_reads: Mutex<bool>,
    item_insert_delay: Mutex<Option<Duration>>,
    read_delay: Mutex<Option<Duration>>,
}

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    inner: Arc<Inner>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the n-th item insert (0-based, counted across transactions) fail.
    pub fn fail_item_insert_at(&self, index: usize) {
        *self.inner.fail_item_insert_at.lock().unwrap() = Some(index);
    }

    pub fn fail_reads(&self) {
        *self.inner.fail_reads.lock().unwrap() = true;
    }

    /// Every item insert sleeps this long before it runs.
    pub fn delay_item_inserts(&self, delay: Duration) {
        *self.inner.item_insert_delay.lock().unwrap() = Some(delay);
    }

    /// Every listing sleeps this long before it reads.
    pub fn delay_reads(&self, delay: Duration) {
        *self.inner.read_delay.lock().unwrap() = Some(delay);
    }

    pub fn insert_attempts(&self) -> usize {
        self.inner.inserts.load(Ordering::SeqCst)
    }

    pub fn committed_counts(&self) -> (usize, usize, usize) {
        let tables = self.inner.tables.lock().unwrap();
        (tables.addresses.len(), tables.orders.len(), tables.items.len())
    }

    /// Insert an order row directly, bypassing the transaction.
    pub fn seed_order(&self, row: OrderRow) {
        self.inner.tables.lock().unwrap().orders.push(row);
    }

    fn check_reads(&self) -> Result<(), BoxError> {
        if *self.inner.fail_reads.lock().unwrap() {
            return Err("connection refused".into());
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, BoxError> {
        Ok(Box::new(MemoryTransaction {
            inner: self.inner.clone(),
            staged: Tables::default(),
        }))
    }

    async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderRow>, BoxError> {
        let delay = *self.inner.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_reads()?;
        let tables = self.inner.tables.lock().unwrap();
        Ok(tables
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItemRow>, BoxError> {
        self.check_reads()?;
        let tables = self.inner.tables.lock().unwrap();
        Ok(tables
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn get_address(&self, id: Uuid) -> Result<Option<AddressRow>, BoxError> {
        self.check_reads()?;
        let tables = self.inner.tables.lock().unwrap();
        Ok(tables.addresses.iter().find(|a| a.id == id).cloned())
    }
}

struct MemoryTransaction {
    inner: Arc<Inner>,
    staged: Tables,
}

#[async_trait]
impl OrderTransaction for MemoryTransaction {
    async fn create_address(&mut self, address: NewAddress) -> Result<Uuid, BoxError> {
        self.inner.inserts.fetch_add(1, Ordering::SeqCst);
        let id = Uuid::now_v7();
        self.staged.addresses.push(AddressRow {
            id,
            line1: address.line1,
            city: address.city,
            state: address.state,
            country: address.country,
        });
        Ok(id)
    }

    async fn create_order(&mut self, order: NewOrderRow) -> Result<Uuid, BoxError> {
        self.inner.inserts.fetch_add(1, Ordering::SeqCst);
        let id = Uuid::now_v7();
        self.staged.orders.push(OrderRow {
            id,
            user_id: order.user_id,
            shipping_address_id: order.shipping_address_id,
            billing_address_id: order.billing_address_id,
            status: order.status,
            total_amount: order.total_amount,
        });
        Ok(id)
    }

    async fn create_order_item(&mut self, item: NewOrderItemRow) -> Result<Uuid, BoxError> {
        self.inner.inserts.fetch_add(1, Ordering::SeqCst);
        let index = self.inner.item_inserts.fetch_add(1, Ordering::SeqCst);
        let delay = *self.inner.item_insert_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.inner.fail_item_insert_at.lock().unwrap() == Some(index) {
            return Err("duplicate key value violates unique constraint".into());
        }

        let id = Uuid::now_v7();
        self.staged.items.push(OrderItemRow {
            id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            total_price: item.total_price,
        });
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), BoxError> {
        let MemoryTransaction { inner, staged } = *self;
        let mut tables = inner.tables.lock().unwrap();
        tables.addresses.extend(staged.addresses);
        tables.orders.extend(staged.orders);
        tables.items.extend(staged.items);
        Ok(())
    }
}
