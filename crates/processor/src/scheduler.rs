//! Periodic full recalculation

use sqlx::PgPool;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

use crate::global_score::GlobalScoreCalculator;
use crate::recalculate::recalculate_all;

/// Configuration for the recalculation service
#[derive(Debug, Clone)]
pub struct RecalcConfig {
    /// Interval between runs
    pub interval: Duration,
}

impl Default for RecalcConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl RecalcConfig {
    /// Build from an hour count; 0 disables the service
    pub fn from_hours(hours: u32) -> Option<Self> {
        (hours > 0).then(|| Self {
            interval: Duration::from_secs(hours as u64 * 60 * 60),
        })
    }
}

/// Background service that periodically recalculates all scores
pub struct RecalcService {
    pool: PgPool,
    global_calculator: GlobalScoreCalculator,
    config: RecalcConfig,
}

impl RecalcService {
    pub fn new(
        pool: PgPool,
        global_calculator: GlobalScoreCalculator,
        config: RecalcConfig,
    ) -> Self {
        Self {
            pool,
            global_calculator,
            config,
        }
    }

    /// Start the background loop
    pub async fn run(self) {
        info!(
            "Starting recalculation service (interval: {:?})",
            self.config.interval
        );

        let mut ticker = interval(self.config.interval);

        // Skip the first immediate tick - let the server start up first
        ticker.tick().await;

        loop {
            ticker.tick().await;
            info!("Starting scheduled recalculation");

            if let Err(e) = recalculate_all(&self.pool, &self.global_calculator).await {
                error!("Scheduled recalculation failed: {}", e);
            }
        }
    }
}
