use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    BalanceDirection, CurrencyCode, Engine, EngineError, ExpenseStatus, ItemPatch, LiveRates,
    Money, NewExpense, NewItem, NewReceipt, PaymentStatus, RateError, RateMap, RateOrigin,
    SharePatch, StaticRates,
};
use migration::MigratorTrait;

fn code(raw: &str) -> CurrencyCode {
    CurrencyCode::try_from(raw).unwrap()
}

fn money(raw: &str) -> Money {
    raw.parse().unwrap()
}

fn market() -> RateMap {
    RateMap::from_iter([(code("USD"), dec!(36.25)), (code("JPY"), dec!(0.245))])
}

async fn db_with_users() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bob", "carol", "dave"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![user.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    db
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = db_with_users().await;
    let engine = Engine::builder()
        .database(db.clone())
        .live_rates(Arc::new(StaticRates(market())))
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// A group with alice, bob and carol, and an expense paid by alice.
async fn dinner(engine: &Engine) -> (Uuid, Uuid) {
    let group = engine.new_group("Trip", "alice").await.unwrap();
    engine.add_group_member(group.id, "bob", "alice").await.unwrap();
    engine.add_group_member(group.id, "carol", "alice").await.unwrap();
    let (expense, _) = engine
        .new_expense(
            group.id,
            NewExpense {
                name: "Dinner".to_string(),
                payer: None,
                amount: money("100.00"),
                currency: None,
            },
            "alice",
        )
        .await
        .unwrap();
    (group.id, expense.id)
}

async fn thb_item(engine: &Engine, expense_id: Uuid, amount: &str) -> Uuid {
    engine
        .add_item(
            expense_id,
            NewItem {
                name: "Food".to_string(),
                amount: money(amount),
                currency: None,
            },
            "alice",
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn percent_and_value_shares_settle_after_verified_payment() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;
    let item_id = thb_item(&engine, expense_id, "100.00").await;

    let bob_share = engine
        .allocate_share(expense_id, item_id, "bob", None, Some(dec!(10)), "alice")
        .await
        .unwrap();
    assert_eq!(bob_share.computed_value, money("10.00"));
    let carol_share = engine
        .allocate_share(expense_id, item_id, "carol", Some(money("5.00")), None, "alice")
        .await
        .unwrap();
    assert_eq!(carol_share.computed_value, money("5.00"));

    let payment = engine
        .record_payment(expense_id, money("10.00"), Some("cash"), "bob")
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    let before = engine.settlement(expense_id, "bob", "bob").await.unwrap();
    assert_eq!(before.paid_amount, Money::ZERO);
    assert!(!before.settled);

    engine
        .verify_payment(expense_id, payment.id, "alice")
        .await
        .unwrap();

    let line = engine.settlement(expense_id, "bob", "alice").await.unwrap();
    assert_eq!(line.owed_amount.to_string(), "10.00");
    assert_eq!(line.paid_amount.to_string(), "10.00");
    assert_eq!(line.remaining.to_string(), "0.00");
    assert!(line.settled);
    assert_eq!(line, engine.settlement(expense_id, "bob", "alice").await.unwrap());

    let all = engine.all_settlements(expense_id, "carol").await.unwrap();
    let users: Vec<_> = all.iter().map(|l| l.user_id.as_str()).collect();
    assert_eq!(users, ["bob", "carol"]);
    assert_eq!(all[1].remaining, money("5.00"));
}

#[tokio::test]
async fn expense_status_follows_settlement() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, expense_id) = dinner(&engine).await;
    let item_id = thb_item(&engine, expense_id, "50.00").await;

    engine
        .allocate_share(expense_id, item_id, "bob", Some(money("50.00")), None, "alice")
        .await
        .unwrap();
    let payment = engine
        .record_payment(expense_id, money("60.00"), None, "bob")
        .await
        .unwrap();
    engine
        .verify_payment(expense_id, payment.id, "alice")
        .await
        .unwrap();

    let expenses = engine.list_group_expenses(group_id, "bob").await.unwrap();
    assert_eq!(expenses[0].status, ExpenseStatus::Settled);

    let line = engine.settlement(expense_id, "bob", "bob").await.unwrap();
    assert_eq!(line.remaining, Money::ZERO);

    engine
        .delete_payment(expense_id, payment.id, "bob")
        .await
        .unwrap();
    let expenses = engine.list_group_expenses(group_id, "bob").await.unwrap();
    assert_eq!(expenses[0].status, ExpenseStatus::Open);
}

#[tokio::test]
async fn only_payer_reviews_payments() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;

    let payment = engine
        .record_payment(expense_id, money("3.00"), None, "bob")
        .await
        .unwrap();

    let err = engine
        .verify_payment(expense_id, payment.id, "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let rejected = engine
        .reject_payment(expense_id, payment.id, "alice")
        .await
        .unwrap();
    assert_eq!(rejected.status, PaymentStatus::Rejected);

    assert!(
        engine
            .verify_payment(expense_id, payment.id, "alice")
            .await
            .is_err()
    );

    let payments = engine.list_payments(expense_id, "carol").await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status, PaymentStatus::Rejected);
}

#[tokio::test]
async fn payments_must_be_positive() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;

    let err = engine
        .record_payment(expense_id, Money::ZERO, None, "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn percent_update_keeps_stored_value() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;
    let item_id = thb_item(&engine, expense_id, "200.00").await;

    let share = engine
        .allocate_share(expense_id, item_id, "bob", Some(money("30.00")), None, "alice")
        .await
        .unwrap();

    let updated = engine
        .update_share(
            expense_id,
            item_id,
            share.id,
            SharePatch {
                value: None,
                percent: Some(dec!(12.5)),
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(updated.value, Some(money("30.00")));
    assert_eq!(updated.percent, Some(dec!(12.5)));
    assert_eq!(updated.computed_value, money("25.00"));

    let detail = engine.expense(expense_id, "bob").await.unwrap();
    let stored = &detail.items[0].shares[0];
    assert_eq!(stored.value, Some(money("30.00")));
    assert_eq!(stored.computed_value, money("25.00"));
    assert_eq!(detail.items[0].unallocated, money("175.00"));

    let err = engine
        .update_share(expense_id, item_id, share.id, SharePatch::default(), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidShare(_)));
}

#[tokio::test]
async fn value_update_on_percent_share_is_refused() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;
    let item_id = thb_item(&engine, expense_id, "100.00").await;
    let share = engine
        .allocate_share(expense_id, item_id, "bob", None, Some(dec!(10)), "alice")
        .await
        .unwrap();

    let err = engine
        .update_share(
            expense_id,
            item_id,
            share.id,
            SharePatch {
                value: Some(money("5.00")),
                percent: None,
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidShare(_)));

    let detail = engine.expense(expense_id, "alice").await.unwrap();
    let stored = &detail.items[0].shares[0];
    assert_eq!(stored.value, None);
    assert_eq!(stored.percent, Some(dec!(10)));
    assert_eq!(stored.computed_value, money("10.00"));
    let line = engine.settlement(expense_id, "bob", "alice").await.unwrap();
    assert_eq!(line.owed_amount, money("10.00"));
}

#[tokio::test]
async fn share_inputs_are_validated() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;
    let item_id = thb_item(&engine, expense_id, "100.00").await;

    for (value, percent) in [
        (None, None),
        (Some(money("1.00")), Some(dec!(1))),
        (None, Some(dec!(100.5))),
    ] {
        let err = engine
            .allocate_share(expense_id, item_id, "bob", value, percent, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidShare(_)), "{err}");
    }

    engine
        .allocate_share(expense_id, item_id, "bob", None, Some(dec!(50)), "alice")
        .await
        .unwrap();
    let err = engine
        .allocate_share(expense_id, item_id, "bob", None, Some(dec!(10)), "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("bob".to_string()));

    let err = engine
        .allocate_share(expense_id, item_id, "dave", None, Some(dec!(10)), "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
}

#[tokio::test]
async fn items_total_uses_frozen_rates() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;

    for (name, amount, currency) in [
        ("Museum", "10.00", "USD"),
        ("Snacks", "1000", "JPY"),
        ("Taxi", "50.00", "THB"),
    ] {
        engine
            .add_item(
                expense_id,
                NewItem {
                    name: name.to_string(),
                    amount: money(amount),
                    currency: Some(code(currency)),
                },
                "bob",
            )
            .await
            .unwrap();
    }

    let total = engine.expense_total(expense_id, "carol").await.unwrap();
    assert_eq!(total.to_string(), "657.50");

    let detail = engine.expense(expense_id, "alice").await.unwrap();
    assert_eq!(detail.items_total, total);
    assert_eq!(detail.rates_origin, RateOrigin::Snapshot);
}

struct MovingRates;

#[async_trait]
impl LiveRates for MovingRates {
    async fn fetch_live_rates(&self) -> Result<RateMap, RateError> {
        Ok(RateMap::from_iter([(code("USD"), dec!(99))]))
    }
}

#[tokio::test]
async fn snapshot_is_not_refreshed_after_creation() {
    let db = db_with_users().await;
    let first = Engine::builder()
        .database(db.clone())
        .live_rates(Arc::new(StaticRates(market())))
        .build()
        .await
        .unwrap();
    let (_, expense_id) = dinner(&first).await;
    let snapshot = first
        .expense(expense_id, "alice")
        .await
        .unwrap()
        .expense
        .rate_snapshot;

    let later = Engine::builder()
        .database(db.clone())
        .live_rates(Arc::new(MovingRates))
        .build()
        .await
        .unwrap();
    let item_id = later
        .add_item(
            expense_id,
            NewItem {
                name: "Museum".to_string(),
                amount: money("10.00"),
                currency: Some(code("USD")),
            },
            "alice",
        )
        .await
        .unwrap()
        .id;
    let share = later
        .allocate_share(expense_id, item_id, "bob", None, Some(dec!(100)), "alice")
        .await
        .unwrap();
    assert_eq!(share.computed_value, money("362.50"));

    let detail = later.expense(expense_id, "alice").await.unwrap();
    assert_eq!(detail.expense.rate_snapshot, snapshot);
    assert_eq!(later.live_rates().await.origin, RateOrigin::Live);
}

struct StuckRates;

#[async_trait]
impl LiveRates for StuckRates {
    async fn fetch_live_rates(&self) -> Result<RateMap, RateError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(market())
    }
}

#[tokio::test]
async fn slow_live_source_falls_back_to_base_rates() {
    let db = db_with_users().await;
    let engine = Engine::builder()
        .database(db)
        .live_rates(Arc::new(StuckRates))
        .rate_timeout(Duration::from_millis(20))
        .build()
        .await
        .unwrap();
    let group = engine.new_group("Solo", "alice").await.unwrap();

    let (expense, origin) = engine
        .new_expense(
            group.id,
            NewExpense {
                name: "Hotel".to_string(),
                payer: None,
                amount: money("10.00"),
                currency: Some(code("USD")),
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(origin, RateOrigin::Fallback);
    let snapshot = RateMap::parse_snapshot(expense.rate_snapshot.as_deref().unwrap()).unwrap();
    assert_eq!(snapshot, RateMap::base());
}

/// Live source that reads the database while answering. It only gets the
/// connection when no write transaction holds it.
struct ReadingRates {
    db: DatabaseConnection,
}

#[async_trait]
impl LiveRates for ReadingRates {
    async fn fetch_live_rates(&self) -> Result<RateMap, RateError> {
        self.db
            .query_one(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT COUNT(*) FROM users",
            ))
            .await
            .map_err(|err| RateError::Source(err.to_string()))?;
        Ok(market())
    }
}

#[tokio::test]
async fn missing_snapshot_is_resolved_outside_the_write() {
    let db = db_with_users().await;
    let engine = Engine::builder()
        .database(db.clone())
        .live_rates(Arc::new(ReadingRates { db: db.clone() }))
        .rate_timeout(Duration::from_secs(1))
        .build()
        .await
        .unwrap();
    let (_, expense_id) = dinner(&engine).await;
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE expenses SET rate_snapshot = NULL WHERE id = ?",
        vec![expense_id.to_string().into()],
    ))
    .await
    .unwrap();

    let item_id = engine
        .add_item(
            expense_id,
            NewItem {
                name: "Tickets".to_string(),
                amount: money("10.00"),
                currency: Some(code("USD")),
            },
            "alice",
        )
        .await
        .unwrap()
        .id;
    let share = engine
        .allocate_share(expense_id, item_id, "bob", None, Some(dec!(50)), "alice")
        .await
        .unwrap();
    assert_eq!(share.computed_value, money("181.25"));

    let updated = engine
        .update_share(
            expense_id,
            item_id,
            share.id,
            SharePatch {
                value: None,
                percent: Some(dec!(20)),
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(updated.computed_value, money("72.50"));

    let view = engine
        .update_item(
            expense_id,
            item_id,
            ItemPatch {
                amount: Some(money("20.00")),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(view.shares[0].computed_value, money("145.00"));
}

#[tokio::test]
async fn item_changes_recompute_shares() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;
    let item_id = thb_item(&engine, expense_id, "100.00").await;
    engine
        .allocate_share(expense_id, item_id, "bob", None, Some(dec!(50)), "alice")
        .await
        .unwrap();

    let view = engine
        .update_item(
            expense_id,
            item_id,
            ItemPatch {
                amount: Some(money("10.00")),
                currency: Some(code("USD")),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(view.amount_base, money("362.50"));
    assert_eq!(view.shares[0].computed_value, money("181.25"));

    let line = engine.settlement(expense_id, "bob", "alice").await.unwrap();
    assert_eq!(line.owed_amount, money("181.25"));

    engine.delete_item(expense_id, item_id, "alice").await.unwrap();
    let line = engine.settlement(expense_id, "bob", "alice").await.unwrap();
    assert_eq!(line.owed_amount, Money::ZERO);
}

#[tokio::test]
async fn ids_from_another_expense_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, expense_id) = dinner(&engine).await;
    let item_id = thb_item(&engine, expense_id, "100.00").await;
    let share = engine
        .allocate_share(expense_id, item_id, "bob", None, Some(dec!(10)), "alice")
        .await
        .unwrap();

    let (other, _) = engine
        .new_expense(
            group_id,
            NewExpense {
                name: "Lunch".to_string(),
                payer: Some("bob".to_string()),
                amount: money("20.00"),
                currency: None,
            },
            "alice",
        )
        .await
        .unwrap();
    let other_item = thb_item(&engine, other.id, "20.00").await;

    let err = engine
        .allocate_share(other.id, item_id, "bob", None, Some(dec!(10)), "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("item not exists".to_string()));

    let err = engine
        .update_share(
            other.id,
            other_item,
            share.id,
            SharePatch {
                value: Some(money("1.00")),
                percent: None,
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("share not exists".to_string()));

    let err = engine.expense(expense_id, "dave").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("expense not exists".to_string()));
}

#[tokio::test]
async fn legacy_share_routes_resolve_their_parents() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;
    let item_id = thb_item(&engine, expense_id, "80.00").await;
    let share = engine
        .allocate_share(expense_id, item_id, "bob", None, Some(dec!(25)), "alice")
        .await
        .unwrap();

    let updated = engine
        .update_share_by_id(
            share.id,
            SharePatch {
                value: None,
                percent: Some(dec!(50)),
            },
            "carol",
        )
        .await
        .unwrap();
    assert_eq!(updated.computed_value, money("40.00"));
    assert_eq!(updated.percent, Some(dec!(50)));

    assert!(engine.delete_share_by_id(share.id, "dave").await.is_err());
    engine.delete_share_by_id(share.id, "bob").await.unwrap();
    let err = engine
        .delete_share_by_id(share.id, "bob")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("share not exists".to_string()));
}

#[tokio::test]
async fn second_receipt_conflicts() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;
    let payment = engine
        .record_payment(expense_id, money("7.50"), None, "bob")
        .await
        .unwrap();
    let upload = || NewReceipt {
        file_name: "slip.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        storage_key: "receipts/slip.jpg".to_string(),
    };

    let receipt = engine
        .attach_receipt(expense_id, payment.id, upload(), "bob")
        .await
        .unwrap();
    let stored = engine.receipt(expense_id, payment.id, "alice").await.unwrap();
    assert_eq!(stored.id, receipt.id);
    assert_eq!(stored.storage_key, "receipts/slip.jpg");

    let err = engine
        .attach_receipt(expense_id, payment.id, upload(), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine
        .attach_receipt(expense_id, payment.id, upload(), "carol")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .delete_payment(expense_id, payment.id, "alice")
        .await
        .unwrap();
    let err = engine
        .receipt(expense_id, payment.id, "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("payment not exists".to_string()));
}

#[tokio::test]
async fn balances_hide_settled_lines() {
    let (engine, _db) = engine_with_db().await;
    let (_, expense_id) = dinner(&engine).await;
    let item_id = thb_item(&engine, expense_id, "90.00").await;
    for user in ["alice", "bob", "carol"] {
        engine
            .allocate_share(expense_id, item_id, user, Some(money("30.00")), None, "alice")
            .await
            .unwrap();
    }
    let payment = engine
        .record_payment(expense_id, money("30.00"), None, "carol")
        .await
        .unwrap();
    engine
        .verify_payment(expense_id, payment.id, "alice")
        .await
        .unwrap();

    let alice = engine.balances("alice").await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].direction, BalanceDirection::OwesYou);
    assert_eq!(alice[0].counterparty_user_id, "bob");
    assert_eq!(alice[0].remaining, money("30.00"));
    let summary = engine.summary("alice").await.unwrap();
    assert_eq!(summary.you_are_owed_total, money("30.00"));
    assert_eq!(summary.you_owe_total, Money::ZERO);

    let bob = engine.summary("bob").await.unwrap();
    assert_eq!(bob.you_owe_total, money("30.00"));

    assert!(engine.balances("carol").await.unwrap().is_empty());
    let carol = engine.summary("carol").await.unwrap();
    assert_eq!(carol.you_owe_total.to_string(), "0.00");
    assert_eq!(carol.you_are_owed_total.to_string(), "0.00");

    let rolled = engine.balances_by_counterparty("bob").await.unwrap();
    assert_eq!(rolled.len(), 1);
    assert_eq!(rolled[0].net, money("-30.00"));
}

#[tokio::test]
async fn payment_without_share_leaves_balances_empty() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, expense_id) = dinner(&engine).await;
    engine.add_group_member(group_id, "dave", "alice").await.unwrap();
    let item_id = thb_item(&engine, expense_id, "40.00").await;
    engine
        .allocate_share(expense_id, item_id, "bob", Some(money("40.00")), None, "alice")
        .await
        .unwrap();

    let payment = engine
        .record_payment(expense_id, money("10.00"), None, "dave")
        .await
        .unwrap();
    engine
        .verify_payment(expense_id, payment.id, "alice")
        .await
        .unwrap();

    let line = engine.settlement(expense_id, "dave", "alice").await.unwrap();
    assert_eq!(line.owed_amount, Money::ZERO);
    assert_eq!(line.paid_amount, money("10.00"));
    assert_eq!(line.remaining, Money::ZERO);
    assert!(line.settled);

    assert!(engine.balances("dave").await.unwrap().is_empty());
    let dave = engine.summary("dave").await.unwrap();
    assert_eq!(dave.you_owe_total.to_string(), "0.00");
    assert_eq!(dave.you_are_owed_total.to_string(), "0.00");

    let alice = engine.balances("alice").await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].counterparty_user_id, "bob");
}

#[tokio::test]
async fn group_membership_is_managed_by_members() {
    let (engine, _db) = engine_with_db().await;
    let group = engine.new_group("  Flat  ", "alice").await.unwrap();
    assert_eq!(group.name, "Flat");

    engine.add_group_member(group.id, "bob", "alice").await.unwrap();
    let err = engine
        .add_group_member(group.id, "bob", "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("bob".to_string()));

    let err = engine
        .add_group_member(group.id, "carol", "dave")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("group not exists".to_string()));

    let err = engine
        .add_group_member(group.id, "zed", "bob")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));

    assert_eq!(
        engine.list_group_members(group.id, "bob").await.unwrap(),
        ["alice", "bob"]
    );
    assert!(engine.new_group(" ", "alice").await.is_err());
}
