//! Domain models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// A platform user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Platform-wide score record, one per user.
///
/// The GitHub counters are written by the sync ingest; the derived fields are
/// owned by the global score calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub id: Uuid,
    pub user_id: Uuid,
    pub commits: i32,
    pub pull_requests: i32,
    pub issues: i32,
    pub reviews: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub github_score: i64,
    pub group_score_total: i64,
    pub final_score: i64,
    pub last_calculated_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Raw GitHub activity counters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GithubActivity {
    pub commits: i32,
    pub pull_requests: i32,
    pub issues: i32,
    pub reviews: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
}

impl From<&Score> for GithubActivity {
    fn from(score: &Score) -> Self {
        Self {
            commits: score.commits,
            pull_requests: score.pull_requests,
            issues: score.issues,
            reviews: score.reviews,
            current_streak: score.current_streak,
            longest_streak: score.longest_streak,
        }
    }
}

/// Kind of group. Category groups replace the old standalone sectors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupType {
    Custom,
    Category,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Custom => "CUSTOM",
            GroupType::Category => "CATEGORY",
        }
    }
}

impl FromStr for GroupType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOM" => Ok(GroupType::Custom),
            "CATEGORY" => Ok(GroupType::Category),
            other => Err(Error::Validation(format!("unknown group type '{}'", other))),
        }
    }
}

/// A group of users competing on one leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub group_type: GroupType,
    pub created_at: DateTime<Utc>,
}

/// A user's membership in a group. Active while `left_at` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMembership {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
}

impl GroupMembership {
    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }
}

/// Per-user, per-group derived score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupScore {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub courses_started: i32,
    pub average_course_completion: f64,
    pub projects_started: i32,
    pub projects_completed: i32,
    pub total_ai_evaluation_score: f64,
    pub batches_completed: i32,
    pub final_score: i64,
    pub rank: Option<i32>,
    pub last_updated_date: DateTime<Utc>,
}

/// Progress of a course or project
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ProgressStatus {
    #[default]
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not started",
            ProgressStatus::InProgress => "in progress",
            ProgressStatus::Completed => "completed",
        }
    }

    pub fn is_started(&self) -> bool {
        *self != ProgressStatus::NotStarted
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not started" => Ok(ProgressStatus::NotStarted),
            "in progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            other => Err(Error::Validation(format!("unknown status '{}'", other))),
        }
    }
}

/// A generated course roadmap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub group_id: Option<Uuid>,
    /// Category group the course was filed under; scored like `group_id`
    pub sector_id: Option<Uuid>,
    pub status: ProgressStatus,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Groups whose score depends on this course
    pub fn scored_groups(&self) -> Vec<Uuid> {
        let mut groups: Vec<Uuid> = self.group_id.into_iter().collect();
        if let Some(sector) = self.sector_id {
            if !groups.contains(&sector) {
                groups.push(sector);
            }
        }
        groups
    }
}

/// A module within a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
}

/// A project inside a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub title: String,
    pub position: i32,
    pub status: ProgressStatus,
    pub ai_evaluation_score: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// A batch with its projects, ordered by position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTree {
    pub batch: Batch,
    pub projects: Vec<Project>,
}

/// A course with its batches, ordered by position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseTree {
    pub course: Course,
    pub batches: Vec<BatchTree>,
}

impl CourseTree {
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.batches.iter().flat_map(|b| b.projects.iter())
    }

    /// Course status implied by its projects
    pub fn derived_status(&self) -> ProgressStatus {
        let mut total = 0;
        let mut completed = 0;
        let mut started = 0;
        for project in self.projects() {
            total += 1;
            if project.status == ProgressStatus::Completed {
                completed += 1;
            }
            if project.status.is_started() {
                started += 1;
            }
        }

        if total > 0 && completed == total {
            ProgressStatus::Completed
        } else if started > 0 {
            ProgressStatus::InProgress
        } else {
            ProgressStatus::NotStarted
        }
    }
}

/// A badge definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub emoji: String,
}

/// A badge awarded to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBadge {
    pub user_id: Uuid,
    pub badge_id: String,
    pub awarded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Point-in-time copy of a score. `group_id` is unset for the global score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Option<Uuid>,
    pub final_score: i64,
    pub rank: Option<i32>,
    pub taken_at: DateTime<Utc>,
}

/// Global leaderboard entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i32,
    pub user_id: Uuid,
    pub username: String,
    pub github_score: i64,
    pub group_score_total: i64,
    pub final_score: i64,
}

/// Group leaderboard entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupLeaderboardEntry {
    pub rank: Option<i32>,
    pub username: String,
    pub score: GroupScore,
}
