use uuid::Uuid;

use crate::handler::{ActivityEvent, ScoringStep};

#[test]
fn test_group_deleted_rescores_every_former_member_globally() {
    let group_id = Uuid::new_v4();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let steps = ActivityEvent::GroupDeleted {
        group_id,
        member_ids: vec![alice, bob],
    }
    .steps();

    assert_eq!(
        steps,
        vec![
            ScoringStep::Pipeline {
                user_id: alice,
                group_ids: vec![],
            },
            ScoringStep::Pipeline {
                user_id: bob,
                group_ids: vec![],
            },
        ]
    );
}

#[test]
fn test_group_deleted_steps_never_touch_the_deleted_group() {
    let group_id = Uuid::new_v4();
    let steps = ActivityEvent::GroupDeleted {
        group_id,
        member_ids: vec![Uuid::new_v4()],
    }
    .steps();

    assert!(steps.iter().all(|step| match step {
        ScoringStep::Pipeline { group_ids, .. } => !group_ids.contains(&group_id),
        ScoringStep::Rerank { group_id: g } => *g != group_id,
        _ => true,
    }));
}

#[test]
fn test_group_left_reranks_before_rescoring() {
    let user_id = Uuid::new_v4();
    let group_id = Uuid::new_v4();

    let steps = ActivityEvent::GroupLeft { user_id, group_id }.steps();

    assert_eq!(
        steps,
        vec![
            ScoringStep::Rerank { group_id },
            ScoringStep::Pipeline {
                user_id,
                group_ids: vec![],
            },
        ]
    );
}

#[test]
fn test_group_joined_scores_the_joined_group() {
    let user_id = Uuid::new_v4();
    let group_id = Uuid::new_v4();

    let steps = ActivityEvent::GroupJoined { user_id, group_id }.steps();

    assert_eq!(
        steps,
        vec![ScoringStep::Pipeline {
            user_id,
            group_ids: vec![group_id],
        }]
    );
}

#[test]
fn test_course_events_score_through_the_course() {
    let course_id = Uuid::new_v4();
    let project_id = Uuid::new_v4();

    assert_eq!(
        ActivityEvent::CourseDeleted { course_id }.steps(),
        vec![ScoringStep::Course { course_id }]
    );
    assert_eq!(
        ActivityEvent::ProjectUpdated { project_id }.steps(),
        vec![ScoringStep::ProjectCourse { project_id }]
    );
}
