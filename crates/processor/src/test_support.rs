//! Builders for test fixtures

use chrono::{DateTime, TimeZone, Utc};
use common::models::{
    Batch, BatchTree, Course, CourseTree, GroupScore, ProgressStatus, Project, Score,
};
use uuid::Uuid;

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap()
}

pub fn project(status: ProgressStatus, ai_evaluation_score: Option<f64>) -> Project {
    Project {
        id: Uuid::new_v4(),
        batch_id: Uuid::new_v4(),
        title: "Project".to_string(),
        position: 0,
        status,
        ai_evaluation_score,
        updated_at: at(10),
    }
}

/// A course owned by a fresh user with one batch per inner vec
pub fn course(status: ProgressStatus, batches: Vec<Vec<Project>>) -> CourseTree {
    let course = Course {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: "Course".to_string(),
        group_id: Some(Uuid::new_v4()),
        sector_id: None,
        status,
        created_at: at(9),
        deleted_at: None,
    };
    let batches = batches
        .into_iter()
        .enumerate()
        .map(|(idx, projects)| {
            let batch = Batch {
                id: Uuid::new_v4(),
                course_id: course.id,
                title: format!("Batch {}", idx),
                position: idx as i32,
            };
            let projects = projects
                .into_iter()
                .map(|p| Project {
                    batch_id: batch.id,
                    ..p
                })
                .collect();
            BatchTree { batch, projects }
        })
        .collect();
    CourseTree { course, batches }
}

pub fn group_score(
    group_id: Uuid,
    final_score: i64,
    last_updated_date: DateTime<Utc>,
) -> GroupScore {
    GroupScore {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        group_id,
        courses_started: 0,
        average_course_completion: 0.0,
        projects_started: 0,
        projects_completed: 0,
        total_ai_evaluation_score: 0.0,
        batches_completed: 0,
        final_score,
        rank: None,
        last_updated_date,
    }
}

pub fn score(current_streak: i32, longest_streak: i32, final_score: i64) -> Score {
    Score {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        commits: 0,
        pull_requests: 0,
        issues: 0,
        reviews: 0,
        current_streak,
        longest_streak,
        github_score: 0,
        group_score_total: 0,
        final_score,
        last_calculated_at: None,
        updated_at: at(10),
    }
}
