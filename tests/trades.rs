//! Trade store tests: ownership, updated_at maintenance, column rules, listing.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::json;
use trade_journal::error::{ConstraintKind, StoreError};
use trade_journal::policy::Requester;
use trade_journal::store::{JournalStore, MemoryStore};
use trade_journal::types::subject::AuthSubject;
use trade_journal::types::trade::{AssetClass, Direction, OptionType, TradeFields, TradeFilter};
use uuid::Uuid;

async fn user(store: &MemoryStore) -> Requester {
    let id = Uuid::new_v4();
    let subject = AuthSubject {
        id,
        email: format!("t{}@x.com", &id.simple().to_string()[..12]),
        user_metadata: json!({}),
    };
    store.register_subject(&Requester::Service, &subject).await.unwrap();
    Requester::User(id)
}

fn stock_trade() -> TradeFields {
    let mut fields = TradeFields::new(
        AssetClass::Stocks,
        "AAPL",
        Utc.with_ymd_and_hms(2025, 3, 3, 14, 30, 0).unwrap(),
    );
    fields.direction = Some(Direction::Long);
    fields.entry_price = Some(dec!(187.25));
    fields.shares = Some(dec!(40));
    fields.tags = vec!["earnings".to_string()];
    fields.emotion = Some("calm".to_string());
    fields.rating = Some(4);
    fields
}

fn option_trade() -> TradeFields {
    let mut fields = TradeFields::new(
        AssetClass::Options,
        "SPY",
        Utc.with_ymd_and_hms(2025, 3, 5, 15, 0, 0).unwrap(),
    );
    fields.option_type = Some(OptionType::Put);
    fields.strike = Some(dec!(560));
    fields.expiry = chrono::NaiveDate::from_ymd_opt(2025, 4, 17);
    fields.premium = Some(dec!(4.15));
    fields.contracts = Some(dec!(2));
    fields
}

#[tokio::test]
async fn insert_assigns_sequential_ids_and_owner() {
    let store = MemoryStore::new();
    let alice = user(&store).await;

    let first = store.insert_trade(&alice, stock_trade()).await.unwrap();
    let second = store.insert_trade(&alice, option_trade()).await.unwrap();

    assert_eq!(second.id, first.id + 1);
    assert_eq!(Some(first.user_id), alice.user_id());
    assert_eq!(first.created_at, first.updated_at);
    assert_eq!(first.fields.entry_price, Some(dec!(187.25)));
    assert_eq!(second.fields.option_type, Some(OptionType::Put));
    assert_eq!(second.fields.shares, None);
}

#[tokio::test]
async fn other_users_cannot_touch_a_trade() {
    let store = MemoryStore::new();
    let alice = user(&store).await;
    let mallory = user(&store).await;
    let trade = store.insert_trade(&alice, stock_trade()).await.unwrap();

    assert!(matches!(store.get_trade(&mallory, trade.id).await, Err(StoreError::NotPermitted)));
    assert!(matches!(
        store.update_trade(&mallory, trade.id, option_trade()).await,
        Err(StoreError::NotPermitted)
    ));
    assert!(matches!(store.delete_trade(&mallory, trade.id).await, Err(StoreError::NotPermitted)));
    assert!(store.list_trades(&mallory, &TradeFilter::default()).await.unwrap().is_empty());

    // Untouched for the owner.
    assert_eq!(store.get_trade(&alice, trade.id).await.unwrap(), trade);
}

#[tokio::test]
async fn anonymous_and_service_see_nothing() {
    let store = MemoryStore::new();
    let alice = user(&store).await;
    let trade = store.insert_trade(&alice, stock_trade()).await.unwrap();

    for requester in [Requester::Anonymous, Requester::Service] {
        assert!(matches!(store.get_trade(&requester, trade.id).await, Err(StoreError::NotPermitted)));
        assert!(matches!(
            store.insert_trade(&requester, stock_trade()).await,
            Err(StoreError::NotPermitted)
        ));
        assert!(matches!(
            store.list_trades(&requester, &TradeFilter::default()).await,
            Err(StoreError::NotPermitted)
        ));
    }
}

#[tokio::test]
async fn missing_and_foreign_trades_are_indistinguishable() {
    let store = MemoryStore::new();
    let alice = user(&store).await;
    let bob = user(&store).await;
    let trade = store.insert_trade(&alice, stock_trade()).await.unwrap();

    let foreign = store.delete_trade(&bob, trade.id).await.unwrap_err();
    let missing = store.delete_trade(&bob, trade.id + 1000).await.unwrap_err();
    assert_eq!(foreign.to_string(), missing.to_string());
}

#[tokio::test]
async fn update_always_advances_updated_at() {
    let store = MemoryStore::new();
    let alice = user(&store).await;
    let trade = store.insert_trade(&alice, stock_trade()).await.unwrap();

    let mut fields = trade.fields.clone();
    fields.exit_price = Some(dec!(192.10));
    fields.date_closed = Some(fields.date_opened + Duration::days(2));
    fields.pnl = Some(dec!(194.00));
    let first = store.update_trade(&alice, trade.id, fields.clone()).await.unwrap();
    assert!(first.updated_at > trade.updated_at);
    assert_eq!(first.created_at, trade.created_at);
    assert_eq!(first.fields.pnl, Some(dec!(194.00)));

    // Back-to-back updates with identical content still move forward.
    let second = store.update_trade(&alice, trade.id, fields).await.unwrap();
    assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn rejected_update_leaves_row_unchanged() {
    let store = MemoryStore::new();
    let alice = user(&store).await;
    let trade = store.insert_trade(&alice, stock_trade()).await.unwrap();

    let mut fields = trade.fields.clone();
    fields.rating = Some(9);
    fields.notes = Some("should not land".to_string());
    let err = store.update_trade(&alice, trade.id, fields).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::ConstraintViolation { field: "rating", kind: ConstraintKind::Range }
    ));
    assert_eq!(store.get_trade(&alice, trade.id).await.unwrap(), trade);
}

#[tokio::test]
async fn required_fields_enforced_on_insert() {
    let store = MemoryStore::new();
    let alice = user(&store).await;
    let mut fields = stock_trade();
    fields.instrument = String::new();

    let err = store.insert_trade(&alice, fields).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::ConstraintViolation { field: "instrument", kind: ConstraintKind::Required }
    ));
    assert!(store.list_trades(&alice, &TradeFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn unregistered_user_cannot_insert() {
    let store = MemoryStore::new();
    let stranger = Requester::User(Uuid::new_v4());
    let err = store.insert_trade(&stranger, stock_trade()).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::ConstraintViolation { field: "user_id", kind: ConstraintKind::ForeignKey }
    ));
}

#[tokio::test]
async fn tags_form_a_set() {
    let store = MemoryStore::new();
    let alice = user(&store).await;
    let mut fields = stock_trade();
    fields.tags = vec!["fomo".into(), "gap".into(), "fomo".into()];

    let trade = store.insert_trade(&alice, fields).await.unwrap();
    assert_eq!(trade.fields.tags, vec!["fomo".to_string(), "gap".to_string()]);
}

#[tokio::test]
async fn delete_removes_only_that_trade() {
    let store = MemoryStore::new();
    let alice = user(&store).await;
    let keep = store.insert_trade(&alice, stock_trade()).await.unwrap();
    let gone = store.insert_trade(&alice, option_trade()).await.unwrap();

    store.delete_trade(&alice, gone.id).await.unwrap();

    assert!(matches!(store.get_trade(&alice, gone.id).await, Err(StoreError::NotPermitted)));
    assert!(store.get_trade(&alice, keep.id).await.is_ok());
    assert!(matches!(store.delete_trade(&alice, gone.id).await, Err(StoreError::NotPermitted)));
}

#[tokio::test]
async fn list_is_newest_first_filtered_and_limited() {
    let store = MemoryStore::new();
    let alice = user(&store).await;
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    for day in 0..5 {
        let mut fields = TradeFields::new(AssetClass::Futures, "ES", base + Duration::days(day));
        fields.contracts = Some(dec!(1));
        store.insert_trade(&alice, fields).await.unwrap();
    }
    store.insert_trade(&alice, option_trade()).await.unwrap();

    let all = store.list_trades(&alice, &TradeFilter::default()).await.unwrap();
    assert_eq!(all.len(), 6);
    assert!(all.windows(2).all(|w| w[0].fields.date_opened >= w[1].fields.date_opened));

    let futures = store
        .list_trades(
            &alice,
            &TradeFilter {
                asset_class: Some(AssetClass::Futures),
                limit: Some(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(futures.len(), 2);
    assert!(futures.iter().all(|t| t.fields.asset_class == AssetClass::Futures));
    assert_eq!(futures[0].fields.date_opened, base + Duration::days(4));
}

#[test]
fn list_limit_is_clamped() {
    assert_eq!(TradeFilter::default().effective_limit(), 100);
    let huge = TradeFilter {
        asset_class: None,
        limit: Some(10_000),
    };
    assert_eq!(huge.effective_limit(), 500);
}
