//! Activity event handler
//!
//! Runs the scoring pipeline after a mutation has been committed: group scores
//! for every affected group, then the global score, then best-effort badges
//! and snapshots.

use common::models::{GroupScore, Score};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::badges::BadgeChecker;
use crate::db_err;
use crate::global_score::GlobalScoreCalculator;
use crate::group_score::GroupScoreCalculator;
use crate::performance::PerformanceService;

/// A committed change that may move scores
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEvent {
    ProjectUpdated { project_id: Uuid },
    CourseCreated { course_id: Uuid },
    CourseDeleted { course_id: Uuid },
    GroupJoined { user_id: Uuid, group_id: Uuid },
    GroupLeft { user_id: Uuid, group_id: Uuid },
    /// The group and its score rows are gone; `member_ids` were active in it
    GroupDeleted { group_id: Uuid, member_ids: Vec<Uuid> },
    GithubSynced { user_id: Uuid },
}

/// One unit of scoring work derived from an event
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringStep {
    /// Refresh the derived status of the project's course, then score the course
    ProjectCourse { project_id: Uuid },
    /// Score the course owner in the course's group and sector
    Course { course_id: Uuid },
    /// Re-rank a group without touching any score
    Rerank { group_id: Uuid },
    /// Update the user's score in each group, then their global score
    Pipeline { user_id: Uuid, group_ids: Vec<Uuid> },
}

impl ActivityEvent {
    /// Work to run for this event, in order
    pub fn steps(&self) -> Vec<ScoringStep> {
        match self {
            ActivityEvent::ProjectUpdated { project_id } => vec![ScoringStep::ProjectCourse {
                project_id: *project_id,
            }],
            ActivityEvent::CourseCreated { course_id }
            | ActivityEvent::CourseDeleted { course_id } => vec![ScoringStep::Course {
                course_id: *course_id,
            }],
            ActivityEvent::GroupJoined { user_id, group_id } => vec![ScoringStep::Pipeline {
                user_id: *user_id,
                group_ids: vec![*group_id],
            }],
            // The departed row loses its rank; the rest move up
            ActivityEvent::GroupLeft { user_id, group_id } => vec![
                ScoringStep::Rerank {
                    group_id: *group_id,
                },
                ScoringStep::Pipeline {
                    user_id: *user_id,
                    group_ids: Vec::new(),
                },
            ],
            ActivityEvent::GroupDeleted { member_ids, .. } => member_ids
                .iter()
                .map(|user_id| ScoringStep::Pipeline {
                    user_id: *user_id,
                    group_ids: Vec::new(),
                })
                .collect(),
            ActivityEvent::GithubSynced { user_id } => vec![ScoringStep::Pipeline {
                user_id: *user_id,
                group_ids: Vec::new(),
            }],
        }
    }
}

/// What the pipeline changed
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub group_scores: Vec<GroupScore>,
    /// Global scores, one per rescored user
    pub scores: Vec<Score>,
    pub badges_awarded: Vec<String>,
}

/// Handles activity events
#[derive(Clone)]
pub struct ActivityHandler {
    pool: PgPool,
    group_calculator: GroupScoreCalculator,
    global_calculator: GlobalScoreCalculator,
    badge_checker: BadgeChecker,
    performance: PerformanceService,
}

impl ActivityHandler {
    pub fn new(pool: PgPool, global_calculator: GlobalScoreCalculator) -> Self {
        Self {
            pool: pool.clone(),
            group_calculator: GroupScoreCalculator::new(pool.clone()),
            global_calculator,
            badge_checker: BadgeChecker::new(pool.clone()),
            performance: PerformanceService::new(pool),
        }
    }

    /// Process an activity event.
    ///
    /// A failing user pipeline does not stop the others. The event fails only
    /// when no user could be rescored.
    pub async fn handle(&self, event: ActivityEvent) -> Result<PipelineReport, common::Error> {
        debug!("Handling {:?}", event);

        match &event {
            ActivityEvent::GroupJoined { user_id, group_id } => {
                info!("User {} joined group {}", user_id, group_id)
            }
            ActivityEvent::GroupLeft { user_id, group_id } => {
                info!("User {} left group {}", user_id, group_id)
            }
            ActivityEvent::GroupDeleted {
                group_id,
                member_ids,
            } => info!(
                "Group {} deleted, rescoring {} former members",
                group_id,
                member_ids.len()
            ),
            _ => {}
        }

        let mut report = PipelineReport::default();
        let mut last_error = None;

        for step in event.steps() {
            let (user_id, group_ids) = match step {
                ScoringStep::ProjectCourse { project_id } => {
                    let course_id = db::courses::course_id_for_project(&self.pool, project_id)
                        .await
                        .map_err(db_err)?
                        .ok_or_else(|| {
                            common::Error::NotFound(format!("Project {} not found", project_id))
                        })?;
                    self.load_course(course_id, true).await?
                }
                ScoringStep::Course { course_id } => self.load_course(course_id, false).await?,
                ScoringStep::Rerank { group_id } => {
                    self.group_calculator.recompute_ranks(group_id).await?;
                    continue;
                }
                ScoringStep::Pipeline { user_id, group_ids } => (user_id, group_ids),
            };

            if let Err(e) = self.run_pipeline(&mut report, user_id, &group_ids).await {
                warn!("Score pipeline failed for user {}: {}", user_id, e);
                last_error = Some(e);
            }
        }

        match last_error {
            Some(e) if report.scores.is_empty() => Err(e),
            _ => Ok(report),
        }
    }

    /// Owner and scored groups of a course, refreshing its derived status first
    async fn load_course(
        &self,
        course_id: Uuid,
        refresh_status: bool,
    ) -> Result<(Uuid, Vec<Uuid>), common::Error> {
        let tree = db::courses::get_tree(&self.pool, course_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| common::Error::NotFound(format!("Course {} not found", course_id)))?;

        if refresh_status {
            let status = tree.derived_status();
            if status != tree.course.status {
                db::courses::set_status(&self.pool, course_id, status)
                    .await
                    .map_err(db_err)?;
                info!(
                    "Course {} moved from '{}' to '{}'",
                    course_id, tree.course.status, status
                );
            }
        }

        Ok((tree.course.user_id, tree.course.scored_groups()))
    }

    async fn run_pipeline(
        &self,
        report: &mut PipelineReport,
        user_id: Uuid,
        group_ids: &[Uuid],
    ) -> Result<(), common::Error> {
        for group_id in group_ids {
            let score = self
                .group_calculator
                .update_group_score(user_id, *group_id)
                .await?;
            report.group_scores.push(score);
        }

        let update = self
            .global_calculator
            .update_global_score(user_id, true)
            .await?;
        report.scores.push(update.into_score());

        match self.badge_checker.check_user(user_id).await {
            Ok(awarded) => report.badges_awarded.extend(awarded),
            Err(e) => warn!("Badge check failed for user {}: {}", user_id, e),
        }

        if let Err(e) = self.performance.record_snapshots(user_id).await {
            warn!("Snapshot recording failed for user {}: {}", user_id, e);
        }

        Ok(())
    }
}
