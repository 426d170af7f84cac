use common::models::ProgressStatus::*;

use crate::badges::{defs, earned_badges, BadgeFacts};
use crate::test_support::*;

#[test]
fn test_no_facts_no_badges() {
    assert!(earned_badges(&BadgeFacts::default()).is_empty());
}

#[test]
fn test_first_project_badge() {
    let facts = BadgeFacts {
        projects_completed: 1,
        ..Default::default()
    };
    assert_eq!(earned_badges(&facts), vec![defs::FIRST_PROJECT]);
}

#[test]
fn test_finisher_needs_ten_projects() {
    let nine = BadgeFacts {
        projects_completed: 9,
        ..Default::default()
    };
    let ten = BadgeFacts {
        projects_completed: 10,
        ..Default::default()
    };

    assert!(!earned_badges(&nine).contains(&defs::PROJECT_FINISHER));
    assert!(earned_badges(&ten).contains(&defs::PROJECT_FINISHER));
}

#[test]
fn test_champion_and_streak() {
    let facts = BadgeFacts {
        leads_contested_group: true,
        current_streak: 7,
        ..Default::default()
    };
    assert_eq!(
        earned_badges(&facts),
        vec![defs::GROUP_CHAMPION, defs::STREAK_7]
    );
}

#[test]
fn test_facts_from_courses() {
    let courses = vec![
        course(Completed, vec![vec![project(Completed, None), project(Completed, None)]]),
        course(InProgress, vec![vec![project(Completed, None), project(InProgress, None)]]),
    ];

    let facts = BadgeFacts::from_courses(&courses);

    assert_eq!(facts.projects_completed, 3);
    assert_eq!(facts.courses_completed, 1);
}
