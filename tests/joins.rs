mod common;

use common::{MemoryAdapter, people};
use quarry::error::QuarryError;
use quarry::prelude::*;
use quarry::{ClauseKind, ObjectRef, PendingJoin};

#[test]
fn test_join_then_on_yields_one_join() {
    let cond = eq(col("orders.customer_id"), col("customers.id"));
    let q = Query::new("customers")
        .join("orders", JoinKind::Inner)
        .unwrap()
        .on(cond.clone())
        .unwrap();

    assert_eq!(q.count_of(ClauseKind::Join), 1);
    let join = q.joins().next().unwrap();
    assert_eq!(join.target.name(), "orders");
    assert_eq!(join.kind, JoinKind::Inner);
    assert_eq!(join.condition, cond);
}

#[test]
fn test_on_without_join() {
    let err = Query::new("customers")
        .on(None::<PendingJoin>, eq(col("a"), col("b")))
        .unwrap_err();
    assert!(matches!(err, QuarryError::InvalidComposition(_)));
}

#[test]
fn test_on_without_condition() {
    let err = Query::new("customers")
        .left_join("orders")
        .unwrap()
        .on(None::<Predicate>)
        .unwrap_err();
    assert!(matches!(err, QuarryError::InvalidExpression(_)));
}

#[test]
fn test_join_target_must_resolve() {
    assert!(matches!(
        Query::new("customers").join("", JoinKind::Inner),
        Err(QuarryError::InvalidArgument(_))
    ));
    assert!(matches!(
        Query::new("customers").outer_join(None::<&str>),
        Err(QuarryError::InvalidArgument(_))
    ));
}

#[test]
fn test_pending_join_can_be_completed_later() {
    let (q, pending) = Query::new("customers")
        .outer_join("sales.orders")
        .unwrap()
        .into_parts();
    assert_eq!(pending.kind(), JoinKind::Outer);
    assert_eq!(pending.target().base_name(), "orders");

    let q = q.order_by("id");
    let q = q.on(pending, eq(col("orders.customer_id"), col("customers.id"))).unwrap();
    assert_eq!(q.clauses().len(), 2);
}

#[test]
fn test_named_column_join() {
    let q = Query::new("customers")
        .join("orders", JoinKind::Inner)
        .unwrap()
        .on_columns([("customer_id", col("customers.id")), ("region", col("customers.region"))])
        .unwrap();
    assert_eq!(
        q.joins().next().unwrap().condition.to_string(),
        "(orders.customer_id = customers.id AND orders.region = customers.region)"
    );

    let err = Query::new("customers")
        .join("orders", JoinKind::Inner)
        .unwrap()
        .on_columns(Vec::<(&str, i64)>::new())
        .unwrap_err();
    assert!(matches!(err, QuarryError::InvalidExpression(_)));
}

#[test]
fn test_atomic_join_rejects_unaliased_self_join() {
    let q = Query::new("employees");
    let cond = eq(col("boss.id"), col("employees.manager_id"));

    for target in ["employees", "Employees", "EMPLOYEES"] {
        assert!(matches!(
            q.join_on(target, JoinKind::Inner, cond.clone()),
            Err(QuarryError::InvalidJoin(_))
        ));
    }

    let boss = ObjectRef::parse("employees").unwrap().alias("boss");
    let joined = q.join_on(boss, JoinKind::Outer, cond).unwrap();
    assert_eq!(joined.joins().next().unwrap().target.alias_or_name(), "boss");
}

#[test]
fn test_named_parameter_join_uses_alias() {
    let orders = ObjectRef::parse("orders").unwrap().alias("o");
    let q = Query::new("customers")
        .join_where(orders, JoinKind::Inner, [("customer_id", col("customers.id"))])
        .unwrap();
    assert_eq!(
        q.joins().next().unwrap().condition.to_string(),
        "o.customer_id = customers.id"
    );
}

#[tokio::test]
async fn test_joined_query_reaches_adapter_intact() {
    let db = Executor::new(MemoryAdapter::new(people()));
    let q = Query::new("people")
        .join("depts", JoinKind::Inner)
        .unwrap()
        .on(eq(col("depts.name"), col("people.dept")))
        .unwrap();
    db.execute(&q).await.unwrap();
    assert_eq!(db.adapter().last_query(), Some(q));
}

#[tokio::test]
async fn test_adapter_without_join_support_fails() {
    let db = Executor::new(MemoryAdapter::bare(people()));
    let q = Query::new("people")
        .join_on("depts", JoinKind::Inner, eq(col("depts.name"), col("people.dept")))
        .unwrap();
    let err = db.execute(&q).await.unwrap_err();
    assert!(err.is_backend());
}
