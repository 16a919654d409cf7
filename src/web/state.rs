//! # Web Application State
//!
//! Shared state for the HTTP surface: the connection pool, the rescheduling
//! validator built over it, and the loaded configuration.

use sqlx::PgPool;

use crate::config::WorkshopConfig;
use crate::scheduling::RescheduleValidator;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub validator: RescheduleValidator,
    pub config: WorkshopConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: WorkshopConfig) -> Self {
        let validator = RescheduleValidator::new(pool.clone());
        Self {
            pool,
            validator,
            config,
        }
    }
}
