//! Score computation, ranking and the activity pipeline

pub mod analytics;
pub mod badges;
pub mod global_score;
pub mod group_score;
pub mod handler;
pub mod metrics;
pub mod performance;
pub mod recalculate;
pub mod scheduler;
pub mod scores;

#[cfg(test)]
mod analytics_test;
#[cfg(test)]
mod badges_test;
#[cfg(test)]
mod handler_test;
#[cfg(test)]
mod metrics_test;
#[cfg(test)]
mod performance_test;
#[cfg(test)]
mod scores_test;
#[cfg(test)]
mod test_support;

pub use analytics::{AnalyticsService, UserAnalytics};
pub use badges::BadgeChecker;
pub use global_score::{GlobalScoreCalculator, GlobalScoreUpdate};
pub use group_score::GroupScoreCalculator;
pub use handler::{ActivityEvent, ActivityHandler, PipelineReport, ScoringStep};
pub use performance::{GroupComparison, PerformanceService};
pub use recalculate::{recalculate_all, RecalculationStats};
pub use scheduler::{RecalcConfig, RecalcService};

pub(crate) fn db_err(e: sqlx::Error) -> common::Error {
    common::Error::Database(e.to_string())
}
