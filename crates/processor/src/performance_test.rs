use uuid::Uuid;

use crate::performance::compare_in_group;
use crate::scores::assign_ranks;
use crate::test_support::*;

fn ranked_group(scores: &[i64]) -> Vec<common::models::GroupScore> {
    let group = Uuid::new_v4();
    let mut rows: Vec<_> = scores.iter().map(|s| group_score(group, *s, at(10))).collect();
    for (id, rank) in assign_ranks(&rows) {
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.rank = Some(rank);
        }
    }
    rows
}

#[test]
fn test_compare_missing_user() {
    let rows = ranked_group(&[10, 20]);
    assert_eq!(compare_in_group(Uuid::new_v4(), &rows), None);
}

#[test]
fn test_compare_against_group() {
    let rows = ranked_group(&[10, 20, 60]);
    let leader = rows.iter().find(|r| r.final_score == 60).unwrap();

    let comparison = compare_in_group(leader.user_id, &rows).unwrap();

    assert_eq!(comparison.user_score, 60);
    assert_eq!(comparison.rank, Some(1));
    assert_eq!(comparison.member_count, 3);
    assert_eq!(comparison.group_average, 30.0);
    assert_eq!(comparison.group_top, 60);
    assert_eq!(comparison.percentile, Some(100.0));
}

#[test]
fn test_compare_last_place() {
    let rows = ranked_group(&[10, 20, 60]);
    let last = rows.iter().find(|r| r.final_score == 10).unwrap();

    let comparison = compare_in_group(last.user_id, &rows).unwrap();

    assert_eq!(comparison.rank, Some(3));
    assert_eq!(comparison.percentile, Some(0.0));
}

#[test]
fn test_compare_unranked_row_has_no_percentile() {
    let group = Uuid::new_v4();
    let row = group_score(group, 15, at(10));

    let comparison = compare_in_group(row.user_id, &[row]).unwrap();

    assert_eq!(comparison.rank, None);
    assert_eq!(comparison.percentile, None);
}
