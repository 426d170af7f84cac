use std::collections::HashSet;

use common::models::{GithubActivity, GroupScore, ProgressStatus::*};
use uuid::Uuid;

use crate::scores::*;
use crate::test_support::*;

#[test]
fn test_no_courses_scores_zero() {
    let values = compute_group_score(&[]);
    assert_eq!(values.final_score, 0);
    assert_eq!(values.courses_started, 0);
    assert_eq!(values.average_course_completion, 0.0);
}

#[test]
fn test_worked_example_scores_249() {
    let courses = vec![course(
        Completed,
        vec![vec![
            project(Completed, Some(80.0)),
            project(Completed, Some(90.0)),
        ]],
    )];

    let values = compute_group_score(&courses);

    assert_eq!(values.courses_started, 1);
    assert_eq!(values.projects_started, 2);
    assert_eq!(values.projects_completed, 2);
    assert_eq!(values.total_ai_evaluation_score, 170.0);
    assert_eq!(values.average_course_completion, 100.0);
    assert_eq!(values.batches_completed, 1);
    // 5 + 200 + 6 + 16 + 17 + 5
    assert_eq!(values.final_score, 249);
}

#[test]
fn test_recomputing_same_courses_is_idempotent() {
    let courses = vec![course(
        InProgress,
        vec![vec![project(Completed, Some(70.0)), project(InProgress, None)]],
    )];

    assert_eq!(compute_group_score(&courses), compute_group_score(&courses));
}

#[test]
fn test_batch_bonus_once_per_batch_regardless_of_size() {
    let small = vec![course(InProgress, vec![vec![project(Completed, None)]])];
    let large = vec![course(
        InProgress,
        vec![vec![
            project(Completed, None),
            project(Completed, None),
            project(Completed, None),
            project(Completed, None),
        ]],
    )];

    assert_eq!(compute_group_score(&small).batches_completed, 1);
    assert_eq!(compute_group_score(&large).batches_completed, 1);
}

#[test]
fn test_partial_batch_gets_no_bonus() {
    let courses = vec![course(
        InProgress,
        vec![
            vec![project(Completed, None), project(InProgress, None)],
            vec![project(Completed, None)],
        ],
    )];

    assert_eq!(compute_group_score(&courses).batches_completed, 1);
}

#[test]
fn test_ai_score_only_counts_completed_projects() {
    let courses = vec![course(
        InProgress,
        vec![vec![project(Completed, Some(50.0)), project(InProgress, Some(99.0))]],
    )];

    assert_eq!(compute_group_score(&courses).total_ai_evaluation_score, 50.0);
}

#[test]
fn test_average_completion_skips_courses_without_projects() {
    let courses = vec![
        course(InProgress, vec![vec![project(Completed, None), project(NotStarted, None)]]),
        course(NotStarted, vec![]),
    ];

    let values = compute_group_score(&courses);

    assert_eq!(values.average_course_completion, 50.0);
    assert_eq!(values.courses_started, 1);
}

#[test]
fn test_not_started_course_and_projects_score_zero() {
    let courses = vec![course(NotStarted, vec![vec![project(NotStarted, None)]])];
    assert_eq!(compute_group_score(&courses).final_score, 0);
}

#[test]
fn test_deleted_courses_are_ignored() {
    let mut deleted = course(Completed, vec![vec![project(Completed, Some(100.0))]]);
    deleted.course.deleted_at = Some(at(12));

    assert_eq!(compute_group_score(&[deleted]).final_score, 0);
}

#[test]
fn test_github_score_linear() {
    let activity = GithubActivity {
        commits: 10,
        pull_requests: 2,
        issues: 3,
        reviews: 4,
        current_streak: 5,
        longest_streak: 6,
    };
    // 10 + 10 + 6 + 12 + 10 + 6
    assert_eq!(github_score(&activity), 54);
    assert_eq!(github_score(&GithubActivity::default()), 0);
}

#[test]
fn test_blend_final_score() {
    assert_eq!(blend_final_score(100, 249), 189); // 40 + 149.4
    assert_eq!(blend_final_score(0, 0), 0);
    assert_eq!(blend_final_score(1, 0), 0); // 0.4 rounds down
    assert_eq!(blend_final_score(0, 1), 1); // 0.6 rounds up
}

#[test]
fn test_ranks_ordered_by_score() {
    let group = Uuid::new_v4();
    let low = group_score(group, 10, at(10));
    let high = group_score(group, 50, at(10));
    let mid = group_score(group, 30, at(10));

    let ranks = assign_ranks(&[low.clone(), high.clone(), mid.clone()]);

    assert_eq!(ranks, vec![(high.id, 1), (mid.id, 2), (low.id, 3)]);
}

#[test]
fn test_rank_tie_broken_by_most_recent_update() {
    let group = Uuid::new_v4();
    let older = group_score(group, 40, at(8));
    let newer = group_score(group, 40, at(11));

    let ranks = assign_ranks(&[older.clone(), newer.clone()]);

    assert_eq!(ranks, vec![(newer.id, 1), (older.id, 2)]);
}

#[test]
fn test_rank_full_tie_broken_by_id() {
    let group = Uuid::new_v4();
    let a = group_score(group, 40, at(8));
    let b = group_score(group, 40, at(8));
    let (first, second) = if a.id < b.id { (a, b) } else { (b, a) };

    let ranks = assign_ranks(&[second.clone(), first.clone()]);

    assert_eq!(ranks, vec![(first.id, 1), (second.id, 2)]);
}

#[test]
fn test_ranks_are_dense_permutation() {
    let group = Uuid::new_v4();
    let rows: Vec<_> = [5, 5, 0, 12, 5, 7, 0]
        .iter()
        .enumerate()
        .map(|(i, s)| group_score(group, *s, at(i as u32)))
        .collect();

    let ranks = assign_ranks(&rows);

    let assigned: HashSet<i32> = ranks.iter().map(|(_, r)| *r).collect();
    let expected: HashSet<i32> = (1..=rows.len() as i32).collect();
    assert_eq!(assigned, expected);

    let ids: HashSet<Uuid> = ranks.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids.len(), rows.len());
}

#[test]
fn test_ranks_empty_group() {
    assert!(assign_ranks(&[]).is_empty());
}

#[test]
fn test_departed_members_are_not_ranked() {
    let group = Uuid::new_v4();
    let leader = group_score(group, 50, at(1));
    let runner_up = group_score(group, 20, at(2));
    // Left while holding first place
    let departed = GroupScore {
        rank: Some(1),
        ..group_score(group, 90, at(3))
    };
    let active: HashSet<Uuid> = [leader.user_id, runner_up.user_id].into_iter().collect();

    let partition = partition_ranks(
        &[departed.clone(), runner_up.clone(), leader.clone()],
        &active,
    );

    assert_eq!(partition.ranks, vec![(leader.id, 1), (runner_up.id, 2)]);
    assert_eq!(partition.cleared, vec![departed.id]);
}

#[test]
fn test_unranked_departed_rows_need_no_clearing() {
    let group = Uuid::new_v4();
    let member = group_score(group, 10, at(1));
    let departed = group_score(group, 40, at(2));
    let active: HashSet<Uuid> = [member.user_id].into_iter().collect();

    let partition = partition_ranks(&[member.clone(), departed], &active);

    assert_eq!(partition.ranks, vec![(member.id, 1)]);
    assert!(partition.cleared.is_empty());
}

#[test]
fn test_group_with_everyone_departed_clears_all_ranks() {
    let group = Uuid::new_v4();
    let rows: Vec<GroupScore> = (1..=3)
        .map(|rank| GroupScore {
            rank: Some(rank),
            ..group_score(group, 10 * rank as i64, at(rank as u32))
        })
        .collect();

    let partition = partition_ranks(&rows, &HashSet::new());

    assert!(partition.ranks.is_empty());
    assert_eq!(partition.cleared, rows.iter().map(|r| r.id).collect::<Vec<_>>());
}

#[test]
fn test_course_started_follows_project_progress() {
    // Stored status not yet refreshed after the first project started
    let courses = vec![course(NotStarted, vec![vec![project(InProgress, None)]])];

    let values = compute_group_score(&courses);

    assert_eq!(values.courses_started, 1);
    assert_eq!(values.projects_started, 1);
}
