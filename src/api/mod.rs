pub mod attendance;
pub mod department;
pub mod employee;
pub mod performance;
pub mod stats;

use crate::engine::ReconciliationEngine;
use crate::store::mysql::MySqlStore;

/// The engine as wired into the running server.
pub type AppEngine = ReconciliationEngine<MySqlStore>;
