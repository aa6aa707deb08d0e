//! Maintenance mode gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::MaintenanceConfig;
use crate::maintenance::store::{AllowListStore, FileAllowList, StoreError};

/// IP allow-list consulted before every dispatch while maintenance is active.
pub struct MaintenanceGate {
    active: AtomicBool,
    store: Arc<dyn AllowListStore>,
    /// Serializes read-modify-write cycles on the store.
    write_lock: Mutex<()>,
}

impl MaintenanceGate {
    pub fn new(store: Arc<dyn AllowListStore>, active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Gate backed by the configured allow-list file.
    pub fn from_config(config: &MaintenanceConfig) -> Self {
        Self::new(Arc::new(FileAllowList::new(&config.whitelist_path)), config.enabled)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Switch maintenance mode. Returns the previous state.
    pub fn set_active(&self, active: bool) -> bool {
        let previous = self.active.swap(active, Ordering::Relaxed);
        if previous != active {
            tracing::info!(active, "Maintenance mode changed");
        }
        previous
    }

    /// Whether a request from `ip` may proceed.
    ///
    /// An unreadable allow-list while active denies the request.
    pub fn is_allowed(&self, ip: &str) -> bool {
        if !self.is_active() {
            return true;
        }

        match self.store.load() {
            Ok(ips) => ips.iter().any(|allowed| allowed == ip.trim()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read maintenance allow-list");
                false
            }
        }
    }

    pub fn allowed_ips(&self) -> Result<Vec<String>, StoreError> {
        self.store.load()
    }

    /// Add `ip` to the allow-list. Returns false if it was already present.
    pub fn add_allowed_ip(&self, ip: &str) -> Result<bool, StoreError> {
        let ip = ip.trim();
        if ip.is_empty() {
            return Ok(false);
        }

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ips = self.store.load()?;
        if ips.iter().any(|known| known == ip) {
            return Ok(false);
        }

        ips.push(ip.to_string());
        self.store.save(&ips)?;
        tracing::info!(ip, "IP added to maintenance allow-list");
        Ok(true)
    }

    /// Remove `ip` from the allow-list. Returns false if it was absent.
    pub fn remove_allowed_ip(&self, ip: &str) -> Result<bool, StoreError> {
        let ip = ip.trim();

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ips = self.store.load()?;
        let before = ips.len();
        ips.retain(|known| known != ip);
        if ips.len() == before {
            return Ok(false);
        }

        self.store.save(&ips)?;
        tracing::info!(ip, "IP removed from maintenance allow-list");
        Ok(true)
    }
}
