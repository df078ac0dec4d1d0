//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! AppState holds one [`Store`] per record kind, the session table, the
//! password hasher, and an optional handle to the Prometheus recorder.
//! Records live for the lifetime of the process.
//!
//! ## Lock Order
//!
//! Operations that touch several stores take their locks in this order and
//! release them before returning:
//!
//! ```text
//! manufacturers → cars → drivers → sessions
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use taxi_core::{
    Car, CarId, Driver, DriverId, Manufacturer, ManufacturerId, PasswordCost, PasswordError,
    PasswordHasher, RecordId,
};

use crate::auth::SessionStore;

// -- Ordered In-Memory Store --------------------------------------------------

/// The records of one kind, keyed by id, plus the next id to hand out.
#[derive(Debug)]
pub struct Records<I: RecordId, T> {
    rows: BTreeMap<I, T>,
    next_id: u64,
}

impl<I: RecordId, T: Clone> Records<I, T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Allocate the next id and insert the record built from it.
    ///
    /// Ids increase strictly and are never reused, even after a removal.
    pub fn insert_with(&mut self, build: impl FnOnce(I) -> T) -> T {
        let id = I::from_raw(self.next_id);
        self.next_id += 1;
        let record = build(id);
        self.rows.insert(id, record.clone());
        record
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: I) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn remove(&mut self, id: I) -> Option<T> {
        self.rows.remove(&id)
    }

    /// Records in ascending id order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    /// Mutable records in ascending id order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    /// Keep only the records for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.rows.retain(|_, record| keep(record));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Thread-safe, cloneable in-memory store with sequential ids.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because we never hold the lock across `.await` points. `parking_lot::RwLock`
/// is non-poisonable, so a panicking writer does not permanently corrupt the store.
///
/// Single-record operations are available directly. Operations that must check
/// and write atomically (uniqueness, references to other stores) take the
/// guard from [`Store::read`] or [`Store::write`].
#[derive(Debug)]
pub struct Store<I: RecordId, T> {
    data: Arc<RwLock<Records<I, T>>>,
}

impl<I: RecordId, T> Clone for Store<I, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<I: RecordId, T: Clone> Store<I, T> {
    /// Create an empty store whose first id is 1.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Records::new())),
        }
    }

    /// Shared access to every record.
    pub fn read(&self) -> RwLockReadGuard<'_, Records<I, T>> {
        self.data.read()
    }

    /// Exclusive access to every record.
    pub fn write(&self) -> RwLockWriteGuard<'_, Records<I, T>> {
        self.data.write()
    }

    /// Retrieve a record by id.
    pub fn get(&self, id: I) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// All records in ascending id order.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Remove a record by id.
    pub fn remove(&self, id: I) -> Option<T> {
        self.data.write().remove(id)
    }

    pub fn contains(&self, id: I) -> bool {
        self.data.read().contains(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<I: RecordId, T: Clone> Default for Store<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Runtime configuration the application state is built from.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Argon2 cost for hashing new passwords.
    pub password_cost: PasswordCost,
}

// -- Application State --------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub manufacturers: Store<ManufacturerId, Manufacturer>,
    pub cars: Store<CarId, Car>,
    pub drivers: Store<DriverId, Driver>,
    pub sessions: SessionStore,
    pub passwords: PasswordHasher,
    /// Render handle of the installed Prometheus recorder, if any.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("manufacturers", &self.manufacturers.len())
            .field("cars", &self.cars.len())
            .field("drivers", &self.drivers.len())
            .field("sessions", &self.sessions.len())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AppState {
    /// Create empty state with the given configuration.
    pub fn with_config(config: AppConfig) -> Result<Self, PasswordError> {
        Ok(Self {
            manufacturers: Store::new(),
            cars: Store::new(),
            drivers: Store::new(),
            sessions: SessionStore::new(),
            passwords: PasswordHasher::new(config.password_cost)?,
            metrics: None,
        })
    }

    /// Attach the Prometheus render handle served at `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
