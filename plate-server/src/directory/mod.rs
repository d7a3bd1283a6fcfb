//! Reference catalogs: clients and plate types
//!
//! 主数据维护。每次写操作在同一事务里附带审计日志，与订单/库存核心
//! 共用同一套 write-ahead 约定。

use crate::audit::AuditTrail;
use crate::core::error::{CoreError, CoreResult};
use crate::store::Store;
use shared::models::{
    Client, ClientCreate, ClientUpdate, EventContext, PlateType, PlateTypeCreate, PlateTypeUpdate,
};
use shared::util::{new_id, now_millis};

#[derive(Clone)]
pub struct Directory {
    store: Store,
    audit: AuditTrail,
}

impl Directory {
    pub fn new(store: Store, audit: AuditTrail) -> Self {
        Self { store, audit }
    }

    // ========== Clients ==========

    pub fn create_client(&self, payload: ClientCreate) -> CoreResult<Client> {
        if payload.name.trim().is_empty() {
            return Err(CoreError::Validation("client name must not be empty".into()));
        }

        let now = now_millis();
        let client = Client {
            id: new_id(),
            name: payload.name,
            tech_notes: payload.tech_notes,
            created_at: now,
            updated_at: now,
        };

        let txn = self.store.begin_write()?;
        self.store.put_client(&txn, &client)?;
        self.audit.append_in(
            &txn,
            "client.created",
            EventContext::System,
            serde_json::json!({
                "client_id": client.id,
                "name": client.name,
                "tech_notes": client.tech_notes,
            }),
        )?;
        txn.commit()?;

        tracing::info!(client_id = %client.id, name = %client.name, "Client created");
        Ok(client)
    }

    /// Update name and/or tech notes.
    ///
    /// 已有订单的快照不受影响 — 快照在订单创建时冻结。
    pub fn update_client(&self, id: &str, payload: ClientUpdate) -> CoreResult<Client> {
        let txn = self.store.begin_write()?;

        let mut client = self
            .store
            .get_client_txn(&txn, id)?
            .ok_or_else(|| CoreError::NotFound(format!("Client {id}")))?;

        if let Some(name) = payload.name {
            if name.trim().is_empty() {
                return Err(CoreError::Validation("client name must not be empty".into()));
            }
            client.name = name;
        }
        if let Some(tech_notes) = payload.tech_notes {
            client.tech_notes = tech_notes;
        }
        client.updated_at = now_millis();

        self.store.put_client(&txn, &client)?;
        self.audit.append_in(
            &txn,
            "client.updated",
            EventContext::System,
            serde_json::json!({
                "client_id": client.id,
                "name": client.name,
                "tech_notes": client.tech_notes,
            }),
        )?;
        txn.commit()?;

        Ok(client)
    }

    pub fn get_client(&self, id: &str) -> CoreResult<Client> {
        self.store
            .get_client(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Client {id}")))
    }

    pub fn list_clients(&self) -> CoreResult<Vec<Client>> {
        let mut clients = self.store.list_clients()?;
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    // ========== Plate types ==========

    pub fn create_plate_type(&self, payload: PlateTypeCreate) -> CoreResult<PlateType> {
        if payload.format.trim().is_empty() {
            return Err(CoreError::Validation("plate format must not be empty".into()));
        }
        if payload.min_stock_threshold < 0 {
            return Err(CoreError::Validation(
                "min_stock_threshold must be >= 0".into(),
            ));
        }

        let now = now_millis();
        let plate_type = PlateType {
            id: new_id(),
            format: payload.format,
            manufacturer: payload.manufacturer,
            other_params: payload.other_params,
            min_stock_threshold: payload.min_stock_threshold,
            created_at: now,
            updated_at: now,
        };

        let txn = self.store.begin_write()?;
        self.store.put_plate_type(&txn, &plate_type)?;
        self.audit.append_in(
            &txn,
            "plate.type.created",
            EventContext::Stock,
            serde_json::json!({
                "plate_type_id": plate_type.id,
                "format": plate_type.format,
                "manufacturer": plate_type.manufacturer,
                "min_stock_threshold": plate_type.min_stock_threshold,
            }),
        )?;
        txn.commit()?;

        tracing::info!(plate_type_id = %plate_type.id, format = %plate_type.format,
            "Plate type created");
        Ok(plate_type)
    }

    pub fn update_plate_type(&self, id: &str, payload: PlateTypeUpdate) -> CoreResult<PlateType> {
        let txn = self.store.begin_write()?;

        let mut plate_type = self
            .store
            .get_plate_type_txn(&txn, id)?
            .ok_or_else(|| CoreError::NotFound(format!("Plate type {id}")))?;

        if let Some(format) = payload.format {
            if format.trim().is_empty() {
                return Err(CoreError::Validation("plate format must not be empty".into()));
            }
            plate_type.format = format;
        }
        if let Some(manufacturer) = payload.manufacturer {
            plate_type.manufacturer = manufacturer;
        }
        if let Some(other_params) = payload.other_params {
            plate_type.other_params = other_params;
        }
        plate_type.updated_at = now_millis();

        self.store.put_plate_type(&txn, &plate_type)?;
        self.audit.append_in(
            &txn,
            "plate.type.updated",
            EventContext::Stock,
            serde_json::json!({
                "plate_type_id": plate_type.id,
                "format": plate_type.format,
                "manufacturer": plate_type.manufacturer,
            }),
        )?;
        txn.commit()?;

        Ok(plate_type)
    }

    /// Change the deficit threshold. Takes effect on the next deficit
    /// evaluation; no retroactive alerts are produced.
    pub fn update_threshold(&self, id: &str, min_stock_threshold: i64) -> CoreResult<PlateType> {
        if min_stock_threshold < 0 {
            return Err(CoreError::Validation(
                "min_stock_threshold must be >= 0".into(),
            ));
        }

        let txn = self.store.begin_write()?;

        let mut plate_type = self
            .store
            .get_plate_type_txn(&txn, id)?
            .ok_or_else(|| CoreError::NotFound(format!("Plate type {id}")))?;

        let old_threshold = plate_type.min_stock_threshold;
        plate_type.min_stock_threshold = min_stock_threshold;
        plate_type.updated_at = now_millis();

        self.store.put_plate_type(&txn, &plate_type)?;
        self.audit.append_in(
            &txn,
            "plate.threshold.updated",
            EventContext::Stock,
            serde_json::json!({
                "plate_type_id": plate_type.id,
                "old_threshold": old_threshold,
                "new_threshold": min_stock_threshold,
            }),
        )?;
        txn.commit()?;

        tracing::info!(plate_type_id = %plate_type.id, old_threshold, new_threshold = min_stock_threshold,
            "Plate threshold updated");
        Ok(plate_type)
    }

    pub fn get_plate_type(&self, id: &str) -> CoreResult<PlateType> {
        self.store
            .get_plate_type(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Plate type {id}")))
    }

    pub fn list_plate_types(&self) -> CoreResult<Vec<PlateType>> {
        let mut types = self.store.list_plate_types()?;
        types.sort_by(|a, b| a.format.cmp(&b.format).then(a.manufacturer.cmp(&b.manufacturer)));
        Ok(types)
    }
}
