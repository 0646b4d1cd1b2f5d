use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::domain::errors::DomainError;
use crate::domain::ports::SupplierOrderRepository;
use crate::domain::supplier::{
    SupplierOrder, SupplierOrderId, SupplierOrderItem, SupplierOrderStatus,
};

/// Supplier orders kept as a JSON array in a single file, newest first.
///
/// All access goes through one lock, so a single process never interleaves
/// a read-modify-write cycle.
pub struct JsonSupplierOrderStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonSupplierOrderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, DomainError> {
        self.lock
            .lock()
            .map_err(|_| DomainError::Internal("supplier order store lock poisoned".to_string()))
    }

    /// A missing or unreadable file reads as an empty store.
    fn load(&self) -> Vec<SupplierOrder> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                log::warn!("Cannot read {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(orders) => orders,
            Err(e) => {
                log::error!("Malformed supplier order file {}: {}", self.path.display(), e);
                self.set_aside();
                Vec::new()
            }
        }
    }

    /// Moves an unreadable file out of the way so the next write cannot
    /// destroy it.
    fn set_aside(&self) {
        let aside = self.corrupt_path();
        match fs::rename(&self.path, &aside) {
            Ok(()) => log::error!("Moved {} to {}", self.path.display(), aside.display()),
            Err(e) => log::error!("Cannot move {} aside: {}", self.path.display(), e),
        }
    }

    fn corrupt_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "supplier_orders".to_string());
        self.path.with_file_name(format!(
            "{}.corrupt-{}",
            name,
            Utc::now().format("%Y%m%dT%H%M%S%.3f")
        ))
    }

    fn save(&self, orders: &[SupplierOrder]) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }
        let json = serde_json::to_string_pretty(orders)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_error)?;
        fs::rename(&tmp, &self.path).map_err(io_error)?;
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> DomainError {
    DomainError::Internal(format!("supplier order store: {e}"))
}

fn next_id(orders: &[SupplierOrder]) -> SupplierOrderId {
    orders.iter().map(|o| o.id).max().unwrap_or(0) + 1
}

impl SupplierOrderRepository for JsonSupplierOrderStore {
    fn create(
        &self,
        items: &[SupplierOrderItem],
        total: &BigDecimal,
    ) -> Result<SupplierOrderId, DomainError> {
        let _guard = self.guard()?;
        let mut orders = self.load();
        let id = next_id(&orders);
        orders.insert(
            0,
            SupplierOrder {
                id,
                created_at: Utc::now(),
                status: SupplierOrderStatus::InProgress,
                total_cost: total.clone(),
                items: items.to_vec(),
            },
        );
        self.save(&orders)?;
        Ok(id)
    }

    fn find_by_id(&self, id: SupplierOrderId) -> Result<Option<SupplierOrder>, DomainError> {
        let _guard = self.guard()?;
        Ok(self.load().into_iter().find(|o| o.id == id))
    }

    fn list(&self, status: Option<SupplierOrderStatus>) -> Result<Vec<SupplierOrder>, DomainError> {
        let _guard = self.guard()?;
        Ok(self
            .load()
            .into_iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect())
    }

    fn update_status(
        &self,
        id: SupplierOrderId,
        status: SupplierOrderStatus,
    ) -> Result<Option<SupplierOrder>, DomainError> {
        let _guard = self.guard()?;
        let mut orders = self.load();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        let previous = order.clone();
        if previous.status != status {
            order.status = status;
            self.save(&orders)?;
        }
        Ok(Some(previous))
    }
}
