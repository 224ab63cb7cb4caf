use std::sync::Arc;

use quarry::error::QuarryError;
use quarry::prelude::*;
use quarry::{Cardinality, Clause, ClauseKind};

fn users() -> Query {
    Query::new("users")
}

#[test]
fn test_select_composition() {
    let q = users().select(["id", "name"]).unwrap();
    assert!(matches!(
        q.select(["email"]),
        Err(QuarryError::InvalidComposition(_))
    ));

    let replaced = q.replace_select([col("email")]);
    assert_eq!(replaced.count_of(ClauseKind::Select), 1);
    assert_eq!(
        replaced.clauses_of(ClauseKind::Select).next(),
        Some(&Clause::Select(vec![Projection::from("email")]))
    );
}

#[test]
fn test_then_by_before_order_by() {
    let err = users().then_by("name").unwrap_err();
    assert!(matches!(err, QuarryError::MissingPrecedingClause(_)));
    assert!(err.is_invalid_composition());
    assert!(users().then_by_descending("name").is_err());
}

#[test]
fn test_order_by_list_sets_precedence() {
    let q = users().order_by_all(["last_name", "first_name"]).unwrap();
    let keys: Vec<String> = q
        .clauses_of(ClauseKind::OrderBy)
        .map(ToString::to_string)
        .collect();
    assert_eq!(keys, ["ORDER BY last_name ASC", "ORDER BY first_name ASC"]);
}

#[test]
fn test_single_valued_clauses_keep_latest() {
    let q = users()
        .skip(1)
        .skip(2)
        .take(5)
        .take(6)
        .distinct()
        .distinct()
        .for_update(true)
        .for_update(false);
    for kind in [
        ClauseKind::Skip,
        ClauseKind::Take,
        ClauseKind::Distinct,
        ClauseKind::ForUpdate,
    ] {
        assert_eq!(q.count_of(kind), 1, "{kind:?}");
    }
    assert_eq!(q.skip_value(), Some(2));
    assert_eq!(q.take_value(), Some(6));
    assert!(
        q.clauses()
            .contains(&Clause::ForUpdate { skip_locked: false })
    );
}

#[test]
fn test_clear_round_trip() {
    let (q, _) = users()
        .select(["id"])
        .unwrap()
        .r#where(eq(col("active"), true))
        .unwrap()
        .having(gt(col("logins"), 3))
        .unwrap()
        .order_by("id")
        .skip(10)
        .take(5)
        .distinct()
        .for_update(false)
        .with_many("orders")
        .unwrap()
        .join("teams", JoinKind::Inner)
        .unwrap()
        .on(eq(col("teams.id"), col("users.team_id")))
        .unwrap()
        .with_total_count();

    let named: [(ClauseKind, Query); 11] = [
        (ClauseKind::Select, q.clear_select()),
        (ClauseKind::Where, q.clear_where()),
        (ClauseKind::Having, q.clear_having()),
        (ClauseKind::OrderBy, q.clear_order_by()),
        (ClauseKind::Skip, q.clear_skip()),
        (ClauseKind::Take, q.clear_take()),
        (ClauseKind::Distinct, q.clear_distinct()),
        (ClauseKind::ForUpdate, q.clear_for_update()),
        (ClauseKind::With, q.clear_with()),
        (ClauseKind::Join, q.clear_joins()),
        (ClauseKind::WithTotalCount, q.clear_with_total_count()),
    ];
    for (kind, cleared) in named {
        assert_eq!(cleared.count_of(kind), 0, "{kind:?}");
        assert_eq!(cleared, q.clear(kind));
        for other in ClauseKind::ALL.into_iter().filter(|k| *k != kind) {
            assert_eq!(cleared.count_of(other), q.count_of(other));
        }
    }
}

#[test]
fn test_includes_carry_cardinality() {
    let q = users().with_one("profile").unwrap();
    match q.clauses() {
        [Clause::With { reference, cardinality }] => {
            assert_eq!(reference.name(), "profile");
            assert_eq!(*cardinality, Cardinality::One);
        }
        other => panic!("unexpected clauses {other:?}"),
    }
}

#[test]
fn test_null_predicate_is_rejected() {
    assert!(matches!(
        users().r#where(None::<Predicate>),
        Err(QuarryError::InvalidArgument(_))
    ));
    assert!(matches!(
        users().having(None::<Predicate>),
        Err(QuarryError::InvalidArgument(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queries_compose_concurrently_from_one_base() {
    let base = Arc::new(users().r#where(gt(col("age"), 17)).unwrap());
    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let base = Arc::clone(&base);
            tokio::spawn(async move {
                base.join(format!("t{i}"), JoinKind::Inner)
                    .unwrap()
                    .on(eq(col(&format!("t{i}.user_id")), col("users.id")))
                    .unwrap()
                    .take(i)
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let q = task.await.unwrap();
        let joins: Vec<_> = q.joins().collect();
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].target.name(), format!("t{i}"));
        assert_eq!(q.take_value(), Some(i));
    }
    assert_eq!(base.clauses().len(), 1);
}
