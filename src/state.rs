use std::sync::Arc;

use anyhow::Result;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AttendanceService, AuthService, IdentityService, SeaOrmAttendanceService, SeaOrmAuthService,
    SeaOrmIdentityService,
};

/// Long-lived application state shared across the router.
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub clock: Arc<dyn Clock>,

    pub auth_service: Arc<dyn AuthService>,

    pub identity_service: Arc<dyn IdentityService>,

    pub attendance_service: Arc<dyn AttendanceService>,
}

impl SharedState {
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Builds state with an injected clock, used by tests to pin the
    /// attendance edit window to a known date.
    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = Store::new(&config.general.database_path).await?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        ));
        let identity_service = Arc::new(SeaOrmIdentityService::new(store.clone()));
        let attendance_service = Arc::new(SeaOrmAttendanceService::new(
            store.clone(),
            clock.clone(),
        ));

        Ok(Self {
            config,
            store,
            clock,
            auth_service,
            identity_service,
            attendance_service,
        })
    }
}
