//! Crate entrypoint wiring together configuration, DB, validation, DNSSEC and APIs.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod dns;
pub mod error;
pub mod powerdns;
pub mod service;
pub mod validation;

use config::AppConfig;
use db::Db;
use powerdns::DnssecProvider;
use validation::ValidatorRegistry;

use std::sync::Arc;

/// Complete application dependencies shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub db: Db,
    pub validators: ValidatorRegistry,
    /// Signing backend; `None` when DNSSEC is not managed from here.
    pub dnssec: Option<Arc<dyn DnssecProvider>>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Db, dnssec: Option<Arc<dyn DnssecProvider>>) -> Self {
        let validators = ValidatorRegistry::new(&config.validation_config());
        Self {
            config,
            db,
            validators,
            dnssec,
        }
    }

    /// The provider, if DNSSEC is both enabled and configured.
    pub fn dnssec(&self) -> Option<&dyn DnssecProvider> {
        if self.config.dnssec_enabled {
            self.dnssec.as_deref()
        } else {
            None
        }
    }
}

/// Arc-wrapped version of `AppState` passed into Axum extensions.
pub type SharedState = Arc<AppState>;
