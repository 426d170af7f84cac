//! Application state

use common::Config;
use processor::{
    ActivityEvent, ActivityHandler, AnalyticsService, GlobalScoreCalculator, PerformanceService,
    PipelineReport,
};
use sqlx::PgPool;
use tracing::warn;

/// Shared application state
pub struct AppState {
    pub pool: PgPool,
    pub activity: ActivityHandler,
    pub global_calculator: GlobalScoreCalculator,
    pub analytics: AnalyticsService,
    pub performance: PerformanceService,
}

impl AppState {
    pub fn new(config: &Config, pool: PgPool) -> Self {
        let staleness = chrono::Duration::hours(config.score_staleness_hours as i64);
        let global_calculator = GlobalScoreCalculator::new(pool.clone(), staleness);
        Self {
            activity: ActivityHandler::new(pool.clone(), global_calculator.clone()),
            analytics: AnalyticsService::new(pool.clone()),
            performance: PerformanceService::new(pool.clone()),
            global_calculator,
            pool,
        }
    }

    /// Run the score pipeline for a committed change.
    ///
    /// Failures are logged and swallowed; the change itself already succeeded.
    pub async fn score_activity(&self, event: ActivityEvent) -> Option<PipelineReport> {
        match self.activity.handle(event.clone()).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Score pipeline failed for {:?}: {}", event, e);
                None
            }
        }
    }
}
