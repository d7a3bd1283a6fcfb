//! Order state machine
//!
//! Owns the single legal lifecycle NEW → PROCESS → DONE and the
//! creation-time notes snapshot.
//!
//! # Transition flow
//!
//! ```text
//! start_processing(order_id) / complete(order_id)
//!     ├─ 1. Begin write transaction (redb serializes writers)
//!     ├─ 2. Read order inside the transaction
//!     ├─ 3. Check current status == expected (else InvalidTransition)
//!     ├─ 4. Write new status
//!     ├─ 5. Append order.status_changed audit entry
//!     └─ 6. Commit — precondition and write are one isolated unit
//! ```
//!
//! Two concurrent transitions from the same prior state therefore resolve
//! to exactly one success and one `InvalidTransition`.

pub mod snapshot;

pub use snapshot::{ConfiguredDotGainPolicy, DotGainPolicy, build_notes_snapshot};

use crate::audit::AuditTrail;
use crate::core::error::{CoreError, CoreResult};
use crate::store::Store;
use shared::models::{ColorMode, EventContext, Order, OrderStatus};
use shared::util::{new_id, now_millis};
use std::sync::Arc;

/// Order list filter (HTTP query surface)
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub client_id: Option<String>,
    pub color_mode: Option<ColorMode>,
}

/// Order state machine service
#[derive(Clone)]
pub struct OrderService {
    store: Store,
    audit: AuditTrail,
    dot_gain_policy: Arc<dyn DotGainPolicy>,
}

impl OrderService {
    pub fn new(store: Store, audit: AuditTrail, dot_gain_policy: Arc<dyn DotGainPolicy>) -> Self {
        Self {
            store,
            audit,
            dot_gain_policy,
        }
    }

    /// Create an order in status NEW with a frozen notes snapshot.
    ///
    /// The snapshot is built from the client's notes as they exist right
    /// now; later edits to the client never touch it.
    pub fn create_order(&self, client_id: &str, color_mode: ColorMode) -> CoreResult<Order> {
        let txn = self.store.begin_write()?;

        let client = self
            .store
            .get_client_txn(&txn, client_id)?
            .ok_or_else(|| CoreError::NotFound(format!("Client {client_id}")))?;

        let notes_snapshot = build_notes_snapshot(&client, color_mode, &*self.dot_gain_policy);
        let now = now_millis();
        let order = Order {
            id: new_id(),
            client_id: client.id.clone(),
            color_mode,
            status: OrderStatus::New,
            notes_snapshot,
            created_at: now,
            updated_at: now,
        };

        self.store.put_order(&txn, &order)?;
        self.audit.append_in(
            &txn,
            "order.created",
            EventContext::Order,
            serde_json::json!({
                "order_id": order.id,
                "client_id": order.client_id,
                "color_mode": order.color_mode,
                "status": order.status,
                "created_at": order.created_at,
                "notes_snapshot": order.notes_snapshot,
            }),
        )?;
        txn.commit()?;

        tracing::info!(order_id = %order.id, client_id = %order.client_id,
            color_mode = %order.color_mode, "Order created");
        Ok(order)
    }

    /// NEW → PROCESS
    pub fn start_processing(&self, order_id: &str) -> CoreResult<Order> {
        self.transition(order_id, OrderStatus::New, OrderStatus::Process, "start processing")
    }

    /// PROCESS → DONE
    pub fn complete(&self, order_id: &str) -> CoreResult<Order> {
        self.transition(order_id, OrderStatus::Process, OrderStatus::Done, "complete")
    }

    /// Atomic compare-and-swap on the status field.
    ///
    /// The read, the precondition check and the write share one write
    /// transaction; the check can never run against a stale copy.
    fn transition(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        action: &'static str,
    ) -> CoreResult<Order> {
        let txn = self.store.begin_write()?;

        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| CoreError::NotFound(format!("Order {order_id}")))?;

        if order.status != expected {
            return Err(CoreError::InvalidTransition {
                from: order.status,
                action,
            });
        }

        let old_status = order.status;
        order.status = next;
        order.updated_at = now_millis();

        self.store.put_order(&txn, &order)?;
        self.audit.append_in(
            &txn,
            "order.status_changed",
            EventContext::Order,
            serde_json::json!({
                "order_id": order.id,
                "old_status": old_status,
                "new_status": order.status,
                "changed_at": order.updated_at,
            }),
        )?;
        txn.commit()?;

        tracing::info!(order_id = %order.id, from = %old_status, to = %order.status,
            "Order status changed");
        Ok(order)
    }

    pub fn get_order(&self, order_id: &str) -> CoreResult<Order> {
        self.store
            .get_order(order_id)?
            .ok_or_else(|| CoreError::NotFound(format!("Order {order_id}")))
    }

    /// Orders matching the filter, newest first
    pub fn list_orders(&self, filter: &OrderFilter) -> CoreResult<Vec<Order>> {
        let mut orders = self.store.list_orders()?;
        orders.retain(|o| {
            filter.status.is_none_or(|s| o.status == s)
                && filter.client_id.as_deref().is_none_or(|c| o.client_id == c)
                && filter.color_mode.is_none_or(|m| o.color_mode == m)
        });
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }
}
