use chrono::Utc;
use common::models::{Batch, Course, ProgressStatus, Project};
use uuid::Uuid;

use crate::courses::{assemble_trees, TreeRow};

fn make_course() -> Course {
    Course {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: "Course".to_string(),
        group_id: None,
        sector_id: None,
        status: ProgressStatus::NotStarted,
        created_at: Utc::now(),
        deleted_at: None,
    }
}

fn make_batch(course: &Course, position: i32) -> Batch {
    Batch {
        id: Uuid::new_v4(),
        course_id: course.id,
        title: format!("Batch {}", position),
        position,
    }
}

fn make_project(batch: &Batch, position: i32) -> Project {
    Project {
        id: Uuid::new_v4(),
        batch_id: batch.id,
        title: format!("Project {}", position),
        position,
        status: ProgressStatus::NotStarted,
        ai_evaluation_score: None,
        updated_at: Utc::now(),
    }
}

#[test]
fn test_assemble_empty() {
    assert!(assemble_trees(vec![]).is_empty());
}

#[test]
fn test_assemble_course_without_batches() {
    let course = make_course();
    let trees = assemble_trees(vec![(course.clone(), None, None)]);

    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].course.id, course.id);
    assert!(trees[0].batches.is_empty());
}

#[test]
fn test_assemble_batch_without_projects() {
    let course = make_course();
    let batch = make_batch(&course, 0);
    let trees = assemble_trees(vec![(course, Some(batch.clone()), None)]);

    assert_eq!(trees[0].batches.len(), 1);
    assert_eq!(trees[0].batches[0].batch.id, batch.id);
    assert!(trees[0].batches[0].projects.is_empty());
}

#[test]
fn test_assemble_groups_rows_by_course_and_batch() {
    let first = make_course();
    let second = make_course();
    let b1 = make_batch(&first, 0);
    let b2 = make_batch(&first, 1);
    let b3 = make_batch(&second, 0);
    let p1 = make_project(&b1, 0);
    let p2 = make_project(&b1, 1);
    let p3 = make_project(&b2, 0);
    let p4 = make_project(&b3, 0);

    let rows: Vec<TreeRow> = vec![
        (first.clone(), Some(b1.clone()), Some(p1.clone())),
        (first.clone(), Some(b1.clone()), Some(p2.clone())),
        (first.clone(), Some(b2.clone()), Some(p3.clone())),
        (second.clone(), Some(b3.clone()), Some(p4.clone())),
    ];

    let trees = assemble_trees(rows);

    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0].course.id, first.id);
    assert_eq!(trees[0].batches.len(), 2);
    assert_eq!(
        trees[0].batches[0]
            .projects
            .iter()
            .map(|p| p.id)
            .collect::<Vec<_>>(),
        vec![p1.id, p2.id]
    );
    assert_eq!(trees[0].batches[1].projects[0].id, p3.id);
    assert_eq!(trees[1].course.id, second.id);
    assert_eq!(trees[1].batches[0].projects[0].id, p4.id);
}
