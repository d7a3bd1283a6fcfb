//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `clients` | `client_id` | `Client` | 客户档案 |
//! | `orders` | `order_id` | `Order` | 订单（状态机的唯一可变共享资源） |
//! | `plate_types` | `plate_type_id` | `PlateType` | 版材型号档案 |
//! | `movements` | `(plate_type_id, sequence)` | `PlateMovement` | 动向台账 (append-only) |
//! | `event_log` | `sequence` | `EventLogEntry` | 事件日志 (append-only) |
//! | `sequences` | `()` keys | `u64` | 全局序列号 |
//!
//! # Durability & isolation
//!
//! redb commits are persistent as soon as `commit()` returns (copy-on-write
//! with atomic pointer swap). Write transactions are serialized: a status
//! precondition checked inside a write transaction cannot be invalidated by
//! a concurrent writer, which is exactly the read-check-write atomicity the
//! order state machine needs. Readers see consistent MVCC snapshots.
//!
//! All mutations to orders and movements flow through the two service entry
//! points (`OrderService`, `StockService`); no handler touches these tables
//! directly.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{Client, EventLogEntry, Order, PlateMovement, PlateType};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// 客户档案: key = client_id, value = JSON-serialized Client
const CLIENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("clients");

/// 订单: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// 版材型号: key = plate_type_id, value = JSON-serialized PlateType
const PLATE_TYPES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("plate_types");

/// 动向台账: key = (plate_type_id, sequence), value = JSON-serialized PlateMovement
///
/// Append-only: no update or delete path exists for this table.
const MOVEMENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("movements");

/// 事件日志: key = sequence, value = JSON-serialized EventLogEntry
///
/// Append-only: no update or delete path exists for this table.
const EVENT_LOG_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("event_log");

/// 序列号: key = "movement_seq" | "event_seq", value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const MOVEMENT_SEQ_KEY: &str = "movement_seq";
const EVENT_SEQ_KEY: &str = "event_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backed by redb
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(CLIENTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(PLATE_TYPES_TABLE)?;
            let _ = write_txn.open_table(MOVEMENTS_TABLE)?;
            let _ = write_txn.open_table(EVENT_LOG_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(MOVEMENT_SEQ_KEY)?.is_none() {
                seq_table.insert(MOVEMENT_SEQ_KEY, 0u64)?;
            }
            if seq_table.get(EVENT_SEQ_KEY)?.is_none() {
                seq_table.insert(EVENT_SEQ_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    ///
    /// Writers are serialized by redb; every domain operation performs all
    /// of its writes (including the audit entry) in one transaction.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Generic helpers ==========

    fn get_json<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        id: &str,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_json_txn<T: DeserializeOwned>(
        &self,
        txn: &WriteTransaction,
        table: TableDefinition<&str, &[u8]>,
        id: &str,
    ) -> StorageResult<Option<T>> {
        let table = txn.open_table(table)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        table: TableDefinition<&str, &[u8]>,
        id: &str,
        value: &T,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(table)?;
        let bytes = serde_json::to_vec(value)?;
        table.insert(id, bytes.as_slice())?;
        Ok(())
    }

    fn list_json<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
    ) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        let mut items = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }

    // ========== Clients ==========

    pub fn put_client(&self, txn: &WriteTransaction, client: &Client) -> StorageResult<()> {
        self.put_json(txn, CLIENTS_TABLE, &client.id, client)
    }

    pub fn get_client(&self, id: &str) -> StorageResult<Option<Client>> {
        self.get_json(CLIENTS_TABLE, id)
    }

    pub fn get_client_txn(
        &self,
        txn: &WriteTransaction,
        id: &str,
    ) -> StorageResult<Option<Client>> {
        self.get_json_txn(txn, CLIENTS_TABLE, id)
    }

    pub fn list_clients(&self) -> StorageResult<Vec<Client>> {
        self.list_json(CLIENTS_TABLE)
    }

    // ========== Orders ==========

    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        self.put_json(txn, ORDERS_TABLE, &order.id, order)
    }

    pub fn get_order(&self, id: &str) -> StorageResult<Option<Order>> {
        self.get_json(ORDERS_TABLE, id)
    }

    /// Get an order within a write transaction.
    ///
    /// Status preconditions must be checked through this method so the
    /// check-and-write pair is one isolated unit.
    pub fn get_order_txn(&self, txn: &WriteTransaction, id: &str) -> StorageResult<Option<Order>> {
        self.get_json_txn(txn, ORDERS_TABLE, id)
    }

    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        self.list_json(ORDERS_TABLE)
    }

    // ========== Plate types ==========

    pub fn put_plate_type(&self, txn: &WriteTransaction, pt: &PlateType) -> StorageResult<()> {
        self.put_json(txn, PLATE_TYPES_TABLE, &pt.id, pt)
    }

    pub fn get_plate_type(&self, id: &str) -> StorageResult<Option<PlateType>> {
        self.get_json(PLATE_TYPES_TABLE, id)
    }

    pub fn get_plate_type_txn(
        &self,
        txn: &WriteTransaction,
        id: &str,
    ) -> StorageResult<Option<PlateType>> {
        self.get_json_txn(txn, PLATE_TYPES_TABLE, id)
    }

    pub fn list_plate_types(&self) -> StorageResult<Vec<PlateType>> {
        self.list_json(PLATE_TYPES_TABLE)
    }

    // ========== Movement ledger (append-only) ==========

    /// Increment and return the global movement sequence number
    pub fn next_movement_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(MOVEMENT_SEQ_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(MOVEMENT_SEQ_KEY, next)?;
        Ok(next)
    }

    /// Append a movement to the ledger
    ///
    /// The key embeds the movement's own sequence; there is no code path
    /// that overwrites or removes an existing movement.
    pub fn append_movement(
        &self,
        txn: &WriteTransaction,
        movement: &PlateMovement,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(MOVEMENTS_TABLE)?;
        let key = (movement.plate_type_id.as_str(), movement.sequence);
        let value = serde_json::to_vec(movement)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// All movements for one plate type, in append order
    pub fn movements_for_type(&self, plate_type_id: &str) -> StorageResult<Vec<PlateMovement>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MOVEMENTS_TABLE)?;

        let mut movements = Vec::new();
        let range_start = (plate_type_id, 0u64);
        let range_end = (plate_type_id, u64::MAX);
        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            movements.push(serde_json::from_slice(value.value())?);
        }
        Ok(movements)
    }

    /// Derived stock for one plate type: sum of signed quantities plus the
    /// highest ledger sequence the sum covers (0 when no movements exist).
    ///
    /// 序列号让调用方能判断两个和谁覆盖了更长的台账前缀。
    pub fn sum_for_type(&self, plate_type_id: &str) -> StorageResult<(i64, u64)> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MOVEMENTS_TABLE)?;

        let mut sum = 0i64;
        let mut last_sequence = 0u64;
        let range_start = (plate_type_id, 0u64);
        let range_end = (plate_type_id, u64::MAX);
        for result in table.range(range_start..=range_end)? {
            let (key, value) = result?;
            let movement: PlateMovement = serde_json::from_slice(value.value())?;
            sum += movement.quantity;
            last_sequence = key.value().1;
        }
        Ok((sum, last_sequence))
    }

    /// Derived stock sums grouped by plate type, each with the highest
    /// covered sequence (types without movements are absent — callers join
    /// against `plate_types`)
    pub fn sum_by_type(&self) -> StorageResult<Vec<(String, i64, u64)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MOVEMENTS_TABLE)?;

        let mut sums: Vec<(String, i64, u64)> = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            let (plate_type_id, sequence) = key.value();
            let movement: PlateMovement = serde_json::from_slice(value.value())?;
            // MOVEMENTS_TABLE iterates in key order, so runs of one type are contiguous
            match sums.last_mut() {
                Some((id, sum, last)) if *id == plate_type_id => {
                    *sum += movement.quantity;
                    *last = sequence;
                }
                _ => sums.push((plate_type_id.to_string(), movement.quantity, sequence)),
            }
        }
        Ok(sums)
    }

    // ========== Event log (append-only) ==========

    /// Increment and return the global event sequence number
    pub fn next_event_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(EVENT_SEQ_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(EVENT_SEQ_KEY, next)?;
        Ok(next)
    }

    /// Append an event log entry within the caller's transaction
    pub fn append_event(&self, txn: &WriteTransaction, entry: &EventLogEntry) -> StorageResult<()> {
        let mut table = txn.open_table(EVENT_LOG_TABLE)?;
        let value = serde_json::to_vec(entry)?;
        table.insert(entry.id, value.as_slice())?;
        Ok(())
    }

    /// Event log entries in sequence order
    pub fn list_events(&self) -> StorageResult<Vec<EventLogEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENT_LOG_TABLE)?;
        let mut entries = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            entries.push(serde_json::from_slice(value.value())?);
        }
        Ok(entries)
    }
}
