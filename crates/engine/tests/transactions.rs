use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    CartLine, CategoryNew, Clock, Engine, EngineError, MenuItem, MenuItemNew, MenuItemUpdate, Money,
    NewTransactionCmd, PaymentMethod, Role, User, UserNew,
};
use migration::MigratorTrait;

#[derive(Debug)]
struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    fn set(&self, at: DateTime<Utc>) {
        *self.0.lock().unwrap() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap() + chrono::Duration::milliseconds(ms.into())
}

struct Cafe {
    engine: Engine,
    clock: Arc<ManualClock>,
    cashier: User,
    latte: MenuItem,
    croissant: MenuItem,
}

async fn cafe_in(timezone: chrono_tz::Tz) -> Cafe {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let clock = Arc::new(ManualClock(Mutex::new(at(2026, 3, 1, 8, 0, 0, 0))));
    let engine = Engine::builder()
        .database(db)
        .clock(clock.clone())
        .timezone(timezone)
        .build()
        .await
        .unwrap();

    let cashier = engine
        .create_user(UserNew {
            username: "siti".to_string(),
            password: "kopi123".to_string(),
            role: Role::Kasir,
            full_name: "Siti Rahma".to_string(),
        })
        .await
        .unwrap();
    let drinks = engine
        .create_category(CategoryNew {
            name: "Drinks".to_string(),
            description: None,
        })
        .await
        .unwrap();
    let latte = engine
        .create_menu_item(MenuItemNew {
            name: "Latte".to_string(),
            description: None,
            price: Money::new(15_50),
            category_id: drinks.id,
            image_ref: None,
        })
        .await
        .unwrap();
    let croissant = engine
        .create_menu_item(MenuItemNew {
            name: "Croissant".to_string(),
            description: Some("butter".to_string()),
            price: Money::new(25_00),
            category_id: drinks.id,
            image_ref: None,
        })
        .await
        .unwrap();

    Cafe {
        engine,
        clock,
        cashier,
        latte,
        croissant,
    }
}

async fn cafe() -> Cafe {
    cafe_in(chrono_tz::UTC).await
}

/// 2 × latte + 1 × croissant, taxed 10%, paid 70.00.
fn morning_order(cafe: &Cafe) -> NewTransactionCmd {
    NewTransactionCmd::new(
        cafe.cashier.id,
        vec![
            CartLine::new(cafe.latte.id, 2, Money::new(15_50)).notes("oat milk"),
            CartLine::new(cafe.croissant.id, 1, Money::new(25_00)),
        ],
        PaymentMethod::Cash,
        Money::new(70_00),
    )
    .amounts(
        Money::new(56_00),
        Money::new(5_60),
        Money::ZERO,
        Money::new(61_60),
    )
}

/// One latte at `total`, paid exactly.
fn single_latte(cafe: &Cafe, total: Money) -> NewTransactionCmd {
    NewTransactionCmd::new(
        cafe.cashier.id,
        vec![CartLine::new(cafe.latte.id, 1, Money::new(15_50))],
        PaymentMethod::Card,
        total,
    )
    .amounts(total, Money::ZERO, Money::ZERO, total)
}

#[tokio::test]
async fn checkout_computes_change_and_item_totals() {
    let cafe = cafe().await;
    cafe.clock.set(at(2026, 3, 1, 9, 30, 0, 0));

    let header = cafe
        .engine
        .create_transaction(morning_order(&cafe).customer("Budi", None))
        .await
        .unwrap();

    assert_eq!(header.change_amount, Money::new(8_40));
    assert_eq!(header.subtotal, Money::new(56_00));
    assert_eq!(header.tax_amount, Money::new(5_60));
    assert_eq!(header.total_amount, Money::new(61_60));
    assert_eq!(header.transaction_date, at(2026, 3, 1, 9, 30, 0, 0));
    assert_eq!(header.created_at, header.transaction_date);
    assert_eq!(header.customer_name.as_deref(), Some("Budi"));

    let detail = cafe
        .engine
        .transaction_by_id(header.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.transaction, header);
    assert_eq!(detail.cashier_name.as_deref(), Some("Siti Rahma"));

    let totals: Vec<_> = detail.items.iter().map(|i| i.total_price).collect();
    assert_eq!(totals, vec![Money::new(31_00), Money::new(25_00)]);
    assert_eq!(detail.items[0].menu_item_name.as_deref(), Some("Latte"));
    assert_eq!(detail.items[0].notes.as_deref(), Some("oat milk"));
    assert_eq!(detail.items[1].menu_item_name.as_deref(), Some("Croissant"));
    assert!(detail.items.iter().all(|i| i.transaction_id == header.id));
}

#[tokio::test]
async fn underpayment_is_stored_as_negative_change() {
    let cafe = cafe().await;
    let mut cmd = morning_order(&cafe);
    cmd.payment_received = Money::new(60_00);

    let header = cafe.engine.create_transaction(cmd).await.unwrap();
    assert_eq!(header.change_amount, Money::new(-1_60));
}

#[tokio::test]
async fn header_breakdown_is_stored_as_submitted() {
    let cafe = cafe().await;
    // subtotal disagrees with 31.00 + 25.00 and total with subtotal + tax
    let cmd = morning_order(&cafe).amounts(
        Money::new(50_00),
        Money::new(5_60),
        Money::new(1_00),
        Money::new(61_60),
    );

    let header = cafe.engine.create_transaction(cmd).await.unwrap();
    let detail = cafe
        .engine
        .transaction_by_id(header.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.transaction.subtotal, Money::new(50_00));
    assert_eq!(detail.transaction.discount_amount, Money::new(1_00));
    assert_eq!(detail.transaction.total_amount, Money::new(61_60));
    assert_eq!(detail.transaction.change_amount, Money::new(8_40));
    assert_eq!(detail.items[0].total_price, Money::new(31_00));
}

#[tokio::test]
async fn invalid_input_writes_nothing() {
    let cafe = cafe().await;

    let mut empty = morning_order(&cafe);
    empty.items.clear();
    let mut zero_qty = morning_order(&cafe);
    zero_qty.items[0].quantity = 0;
    let mut free_item = morning_order(&cafe);
    free_item.items[1].unit_price = Money::ZERO;
    let mut negative_tax = morning_order(&cafe);
    negative_tax.tax_amount = Money::new(-1);
    let mut negative_discount = morning_order(&cafe);
    negative_discount.discount_amount = Money::new(-1);
    let mut zero_total = morning_order(&cafe);
    zero_total.total_amount = Money::ZERO;
    let mut zero_subtotal = morning_order(&cafe);
    zero_subtotal.subtotal = Money::ZERO;
    let mut nothing_paid = morning_order(&cafe);
    nothing_paid.payment_received = Money::ZERO;

    for cmd in [
        empty,
        zero_qty,
        free_item,
        negative_tax,
        negative_discount,
        zero_total,
        zero_subtotal,
        nothing_paid,
    ] {
        let err = cafe.engine.create_transaction(cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    }

    assert!(cafe.engine.transactions(None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_cashier_is_rejected_by_the_store() {
    let cafe = cafe().await;
    let mut cmd = morning_order(&cafe);
    cmd.cashier_id = Uuid::now_v7();

    let err = cafe.engine.create_transaction(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::Database(_)), "{err:?}");
    assert!(cafe.engine.transactions(None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_menu_item_aborts_the_whole_sale() {
    let cafe = cafe().await;
    let mut cmd = morning_order(&cafe);
    cmd.items.push(CartLine::new(Uuid::now_v7(), 1, Money::new(10_00)));

    let err = cafe.engine.create_transaction(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::Database(_)), "{err:?}");
    // the header insert was rolled back with the items
    assert!(cafe.engine.transactions(None, None).await.unwrap().is_empty());
    assert!(
        cafe.engine
            .transactions_by_cashier(cafe.cashier.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn missing_transaction_is_none() {
    let cafe = cafe().await;
    assert_eq!(
        cafe.engine.transaction_by_id(Uuid::now_v7()).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn unit_price_is_a_snapshot() {
    let cafe = cafe().await;
    let header = cafe
        .engine
        .create_transaction(morning_order(&cafe))
        .await
        .unwrap();

    cafe.engine
        .update_menu_item(
            cafe.latte.id,
            MenuItemUpdate {
                price: Some(Money::new(18_00)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let detail = cafe
        .engine
        .transaction_by_id(header.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.items[0].unit_price, Money::new(15_50));
    assert_eq!(detail.items[0].total_price, Money::new(31_00));
    assert_eq!(
        cafe.engine
            .menu_item_reference_price(cafe.latte.id)
            .await
            .unwrap(),
        Some(Money::new(18_00))
    );
}

#[tokio::test]
async fn listing_is_newest_first_and_paginates() {
    let cafe = cafe().await;
    let mut ids = Vec::new();
    for hour in 9..13 {
        cafe.clock.set(at(2026, 3, 1, hour, 0, 0, 0));
        let header = cafe
            .engine
            .create_transaction(single_latte(&cafe, Money::new(15_50)))
            .await
            .unwrap();
        ids.push(header.id);
    }
    ids.reverse();

    let all: Vec<_> = cafe
        .engine
        .transactions(None, None)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.transaction.id)
        .collect();
    assert_eq!(all, ids);

    let page: Vec<_> = cafe
        .engine
        .transactions(Some(2), Some(1))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.transaction.id)
        .collect();
    assert_eq!(page, ids[1..3].to_vec());

    let first: Vec<_> = cafe
        .engine
        .transactions(Some(1), None)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.transaction.id)
        .collect();
    assert_eq!(first, vec![ids[0]]);

    let rest: Vec<_> = cafe
        .engine
        .transactions(None, Some(3))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.transaction.id)
        .collect();
    assert_eq!(rest, vec![ids[3]]);

    assert!(
        cafe.engine
            .transactions(Some(10), Some(10))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn equal_timestamps_keep_a_stable_order() {
    let cafe = cafe().await;
    cafe.clock.set(at(2026, 3, 1, 10, 0, 0, 0));
    let first = cafe
        .engine
        .create_transaction(single_latte(&cafe, Money::new(15_50)))
        .await
        .unwrap();
    let second = cafe
        .engine
        .create_transaction(single_latte(&cafe, Money::new(15_50)))
        .await
        .unwrap();

    for _ in 0..3 {
        let order: Vec<_> = cafe
            .engine
            .transactions(None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.transaction.id)
            .collect();
        assert_eq!(order, vec![second.id, first.id]);
    }
}

#[tokio::test]
async fn date_range_bounds_are_inclusive() {
    let cafe = cafe().await;
    let mut created = Vec::new();
    for when in [
        at(2026, 3, 1, 7, 59, 59, 999),
        at(2026, 3, 1, 8, 0, 0, 0),
        at(2026, 3, 1, 12, 0, 0, 0),
        at(2026, 3, 1, 18, 0, 0, 0),
        at(2026, 3, 1, 18, 0, 0, 1),
    ] {
        cafe.clock.set(when);
        let header = cafe
            .engine
            .create_transaction(single_latte(&cafe, Money::new(15_50)))
            .await
            .unwrap();
        created.push(header.id);
    }

    let found: Vec<_> = cafe
        .engine
        .transactions_by_date_range(at(2026, 3, 1, 8, 0, 0, 0), at(2026, 3, 1, 18, 0, 0, 0))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.transaction.id)
        .collect();
    assert_eq!(found, vec![created[3], created[2], created[1]]);

    assert!(
        cafe.engine
            .transactions_by_date_range(at(2026, 3, 2, 0, 0, 0, 0), at(2026, 3, 1, 0, 0, 0, 0))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn cashier_listing_only_returns_their_sales() {
    let cafe = cafe().await;
    let other = cafe
        .engine
        .create_user(UserNew {
            username: "andi".to_string(),
            password: "teh456".to_string(),
            role: Role::Kasir,
            full_name: "Andi".to_string(),
        })
        .await
        .unwrap();

    cafe.clock.set(at(2026, 3, 1, 9, 0, 0, 0));
    let mine_early = cafe
        .engine
        .create_transaction(single_latte(&cafe, Money::new(15_50)))
        .await
        .unwrap();
    let mut theirs = single_latte(&cafe, Money::new(15_50));
    theirs.cashier_id = other.id;
    cafe.engine.create_transaction(theirs).await.unwrap();
    cafe.clock.set(at(2026, 3, 1, 10, 0, 0, 0));
    let mine_late = cafe
        .engine
        .create_transaction(single_latte(&cafe, Money::new(15_50)))
        .await
        .unwrap();

    let mine = cafe
        .engine
        .transactions_by_cashier(cafe.cashier.id)
        .await
        .unwrap();
    let ids: Vec<_> = mine.iter().map(|d| d.transaction.id).collect();
    assert_eq!(ids, vec![mine_late.id, mine_early.id]);
    assert!(mine.iter().all(|d| d.cashier_name.as_deref() == Some("Siti Rahma")));

    assert!(
        cafe.engine
            .transactions_by_cashier(Uuid::now_v7())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn large_listings_carry_every_item() {
    let cafe = cafe().await;
    let sales = 1_200;
    for n in 0..sales {
        cafe.clock.set(at(2026, 3, 1, 8, 0, 0, 0) + chrono::Duration::seconds(n));
        cafe.engine
            .create_transaction(single_latte(&cafe, Money::new(15_50)))
            .await
            .unwrap();
    }

    let all = cafe.engine.transactions(None, None).await.unwrap();
    let ranged = cafe
        .engine
        .transactions_by_date_range(at(2026, 3, 1, 0, 0, 0, 0), at(2026, 3, 1, 23, 59, 59, 999))
        .await
        .unwrap();
    let by_cashier = cafe
        .engine
        .transactions_by_cashier(cafe.cashier.id)
        .await
        .unwrap();

    for listing in [&all, &ranged, &by_cashier] {
        assert_eq!(listing.len(), sales as usize);
        assert!(listing.iter().all(|d| d.items.len() == 1
            && d.items[0].transaction_id == d.transaction.id
            && d.items[0].menu_item_name.as_deref() == Some("Latte")));
    }
    assert_eq!(all[0].transaction.transaction_date, at(2026, 3, 1, 8, 19, 59, 0));
}

#[tokio::test]
async fn daily_report_aggregates_the_day() {
    let cafe = cafe().await;
    let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

    cafe.clock.set(at(2026, 3, 1, 9, 0, 0, 0));
    let breakfast = morning_order(&cafe).amounts(
        Money::new(56_00),
        Money::ZERO,
        Money::ZERO,
        Money::new(56_00),
    );
    cafe.engine.create_transaction(breakfast).await.unwrap();
    cafe.clock.set(at(2026, 3, 1, 15, 0, 0, 0));
    cafe.engine
        .create_transaction(single_latte(&cafe, Money::new(15_50)))
        .await
        .unwrap();
    // next day, outside the window
    cafe.clock.set(at(2026, 3, 2, 9, 0, 0, 0));
    cafe.engine
        .create_transaction(single_latte(&cafe, Money::new(15_50)))
        .await
        .unwrap();

    let report = cafe.engine.daily_sales_report(day).await.unwrap();
    assert_eq!(report.date, day);
    assert_eq!(report.total_sales, Money::new(71_50));
    assert_eq!(report.total_transactions, 2);
    assert_eq!(report.average_transaction, Money::new(35_75));

    assert_eq!(report.top_selling_items.len(), 2);
    let latte = &report.top_selling_items[0];
    assert_eq!(latte.menu_item_id, cafe.latte.id);
    assert_eq!(latte.name, "Latte");
    assert_eq!(latte.quantity_sold, 3);
    assert_eq!(latte.revenue, Money::new(46_50));
    let croissant = &report.top_selling_items[1];
    assert_eq!(croissant.name, "Croissant");
    assert_eq!(croissant.quantity_sold, 1);
    assert_eq!(croissant.revenue, Money::new(25_00));
}

#[tokio::test]
async fn daily_report_window_covers_the_last_millisecond() {
    let cafe = cafe().await;

    cafe.clock.set(at(2026, 3, 1, 0, 0, 0, 0));
    cafe.engine
        .create_transaction(single_latte(&cafe, Money::new(10_00)))
        .await
        .unwrap();
    cafe.clock.set(at(2026, 3, 1, 23, 59, 59, 999));
    cafe.engine
        .create_transaction(single_latte(&cafe, Money::new(20_00)))
        .await
        .unwrap();
    cafe.clock.set(at(2026, 3, 2, 0, 0, 0, 0));
    cafe.engine
        .create_transaction(single_latte(&cafe, Money::new(40_00)))
        .await
        .unwrap();

    let report = cafe
        .engine
        .daily_sales_report(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        .await
        .unwrap();
    assert_eq!(report.total_sales, Money::new(30_00));
    assert_eq!(report.total_transactions, 2);
    assert_eq!(report.average_transaction, Money::new(15_00));
}

#[tokio::test]
async fn empty_day_reports_zeros() {
    let cafe = cafe().await;
    cafe.engine
        .create_transaction(morning_order(&cafe))
        .await
        .unwrap();

    let report = cafe
        .engine
        .daily_sales_report(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap())
        .await
        .unwrap();
    assert_eq!(report.total_sales, Money::ZERO);
    assert_eq!(report.total_transactions, 0);
    assert_eq!(report.average_transaction, Money::ZERO);
    assert!(report.top_selling_items.is_empty());
}

#[tokio::test]
async fn daily_report_follows_business_timezone() {
    let cafe = cafe_in(chrono_tz::Asia::Jakarta).await;

    // 01:00 on March 2nd in Jakarta
    cafe.clock.set(at(2026, 3, 1, 18, 0, 0, 0));
    cafe.engine
        .create_transaction(single_latte(&cafe, Money::new(15_50)))
        .await
        .unwrap();

    let first = cafe
        .engine
        .daily_sales_report(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        .await
        .unwrap();
    assert_eq!(first.total_transactions, 0);

    let second = cafe
        .engine
        .daily_sales_report(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(second.total_transactions, 1);
    assert_eq!(second.total_sales, Money::new(15_50));
}

#[tokio::test]
async fn daily_report_covers_a_day_starting_in_a_dst_gap() {
    // Santiago jumps from 00:00 to 01:00 local on 2026-09-06.
    let cafe = cafe_in(chrono_tz::America::Santiago).await;

    // 23:59 on September 5th in Santiago
    cafe.clock.set(at(2026, 9, 6, 3, 59, 0, 0));
    cafe.engine
        .create_transaction(single_latte(&cafe, Money::new(15_50)))
        .await
        .unwrap();
    // 01:00, the first instant of September 6th
    cafe.clock.set(at(2026, 9, 6, 4, 0, 0, 0));
    cafe.engine
        .create_transaction(single_latte(&cafe, Money::new(20_00)))
        .await
        .unwrap();
    cafe.clock.set(at(2026, 9, 6, 15, 0, 0, 0));
    cafe.engine
        .create_transaction(single_latte(&cafe, Money::new(30_00)))
        .await
        .unwrap();

    let report = cafe
        .engine
        .daily_sales_report(NaiveDate::from_ymd_opt(2026, 9, 6).unwrap())
        .await
        .unwrap();
    assert_eq!(report.total_transactions, 2);
    assert_eq!(report.total_sales, Money::new(50_00));

    let before = cafe
        .engine
        .daily_sales_report(NaiveDate::from_ymd_opt(2026, 9, 5).unwrap())
        .await
        .unwrap();
    assert_eq!(before.total_transactions, 1);
}
