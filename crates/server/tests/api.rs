use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use engine::{
    BootstrapOutcome, CategoryNew, Clock, DefaultAdmin, Engine, MenuItem, MenuItemNew, Money,
    Role, User, UserNew,
};
use migration::MigratorTrait;
use server::{ServerState, router};

#[derive(Debug)]
struct Fixed(DateTime<Utc>);

impl Clock for Fixed {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

const ADMIN: (&str, &str) = ("admin", "admin123");
const KASIR: (&str, &str) = ("siti", "kopi123");

struct Shop {
    app: Router,
    admin: User,
    kasir: User,
    latte: MenuItem,
    croissant: MenuItem,
}

async fn shop() -> Shop {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
    let engine = Engine::builder()
        .database(db)
        .clock(Arc::new(Fixed(at)))
        .build()
        .await
        .unwrap();

    let BootstrapOutcome::Created(admin) = engine
        .ensure_default_admin(DefaultAdmin::default())
        .await
        .unwrap()
    else {
        panic!("fresh database already had an admin");
    };
    let kasir = engine
        .create_user(UserNew {
            username: KASIR.0.to_string(),
            password: KASIR.1.to_string(),
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
            description: None,
            price: Money::new(25_00),
            category_id: drinks.id,
            image_ref: None,
        })
        .await
        .unwrap();

    Shop {
        app: router(ServerState {
            engine: Arc::new(engine),
        }),
        admin,
        kasir,
        latte,
        croissant,
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    credentials: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((username, password)) = credentials {
        let token = STANDARD.encode(format!("{username}:{password}"));
        builder = builder.header(header::AUTHORIZATION, format!("Basic {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn morning_order(shop: &Shop, cashier_id: Uuid) -> Value {
    json!({
        "customer_name": "Budi",
        "customer_phone": null,
        "items": [
            { "menu_item_id": shop.latte.id, "quantity": 2, "unit_price_minor": 1550, "notes": "oat milk" },
            { "menu_item_id": shop.croissant.id, "quantity": 1, "unit_price_minor": 2500, "notes": null }
        ],
        "subtotal_minor": 5600,
        "tax_amount_minor": 560,
        "discount_amount_minor": 0,
        "total_amount_minor": 6160,
        "payment_method": "CASH",
        "payment_received_minor": 7000,
        "notes": null,
        "cashier_id": cashier_id
    })
}

#[tokio::test]
async fn login_returns_role_capabilities() {
    let shop = shop().await;

    let (status, body) = send(
        &shop.app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": KASIR.0, "password": KASIR.1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "KASIR");
    assert_eq!(body["capabilities"], json!(["checkout"]));

    let (status, body) = send(
        &shop.app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": ADMIN.0, "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn protected_routes_require_credentials() {
    let shop = shop().await;

    let (status, _) = send(&shop.app, Method::GET, "/categories", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &shop.app,
        Method::GET,
        "/categories",
        Some((KASIR.0, "nope")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&shop.app, Method::GET, "/categories", Some(KASIR), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Drinks");
}

#[tokio::test]
async fn checkout_computes_change_and_reads_back() {
    let shop = shop().await;

    let (status, created) = send(
        &shop.app,
        Method::POST,
        "/transactions",
        Some(KASIR),
        Some(morning_order(&shop, shop.kasir.id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["change_amount_minor"], 840);
    assert_eq!(created["total_amount_minor"], 6160);
    assert_eq!(created["transaction_date"], "2026-03-01T09:30:00Z");

    let uri = format!("/transactions/{}", created["id"].as_str().unwrap());
    let (status, detail) = send(&shop.app, Method::GET, &uri, Some(KASIR), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["cashier_name"], "Siti Rahma");
    assert_eq!(detail["items"].as_array().unwrap().len(), 2);
    assert_eq!(detail["items"][0]["menu_item_name"], "Latte");
    assert_eq!(detail["items"][0]["total_price_minor"], 3100);

    let (status, _) = send(
        &shop.app,
        Method::GET,
        &format!("/transactions/{}", Uuid::new_v4()),
        Some(KASIR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn kasir_records_only_as_themselves() {
    let shop = shop().await;

    let (status, _) = send(
        &shop.app,
        Method::POST,
        "/transactions",
        Some(KASIR),
        Some(morning_order(&shop, shop.admin.id)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &shop.app,
        Method::POST,
        "/transactions",
        Some(ADMIN),
        Some(morning_order(&shop, shop.kasir.id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn invalid_checkout_is_unprocessable() {
    let shop = shop().await;
    let mut order = morning_order(&shop, shop.kasir.id);
    order["items"][0]["quantity"] = json!(0);

    let (status, body) = send(
        &shop.app,
        Method::POST,
        "/transactions",
        Some(KASIR),
        Some(order),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("quantity"));

    let (_, listed) = send(&shop.app, Method::GET, "/transactions", Some(ADMIN), None).await;
    assert_eq!(listed["transactions"], json!([]));
}

#[tokio::test]
async fn reports_need_view_reports() {
    let shop = shop().await;
    send(
        &shop.app,
        Method::POST,
        "/transactions",
        Some(KASIR),
        Some(morning_order(&shop, shop.kasir.id)),
    )
    .await;

    let (status, _) = send(
        &shop.app,
        Method::GET,
        "/reports/daily?date=2026-03-01",
        Some(KASIR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, report) = send(
        &shop.app,
        Method::GET,
        "/reports/daily?date=2026-03-01",
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_sales_minor"], 6160);
    assert_eq!(report["total_transactions"], 1);
    assert_eq!(report["average_transaction_minor"], 6160);
    assert_eq!(report["top_selling_items"][0]["name"], "Latte");
    assert_eq!(report["top_selling_items"][0]["quantity_sold"], 2);
    assert_eq!(report["top_selling_items"][0]["revenue_minor"], 3100);

    let (status, listed) = send(
        &shop.app,
        Method::GET,
        "/transactions/range?start=2026-03-01T00:00:00Z&end=2026-03-01T23:59:59.999Z",
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["transactions"].as_array().unwrap().len(), 1);

    let (status, listed) = send(
        &shop.app,
        Method::GET,
        &format!("/transactions/cashier/{}", shop.admin.id),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["transactions"], json!([]));
}

#[tokio::test]
async fn catalog_is_managed_by_admin() {
    let shop = shop().await;
    let payload = json!({ "name": "Pastry", "description": "baked daily" });

    let (status, _) = send(
        &shop.app,
        Method::POST,
        "/categories",
        Some(KASIR),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, category) = send(
        &shop.app,
        Method::POST,
        "/categories",
        Some(ADMIN),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["status"], "ACTIVE");

    let category_uri = format!("/categories/{}", category["id"].as_str().unwrap());
    let (status, removed) = send(&shop.app, Method::DELETE, &category_uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["status"], "INACTIVE");

    let (status, _) = send(
        &shop.app,
        Method::POST,
        "/menu-items",
        Some(ADMIN),
        Some(json!({
            "name": "Muffin",
            "description": null,
            "price_minor": 1800,
            "category_id": category["id"],
            "image_ref": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, item) = send(
        &shop.app,
        Method::PATCH,
        &format!("/menu-items/{}", shop.latte.id),
        Some(ADMIN),
        Some(json!({ "price_minor": 1700 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["price_minor"], 1700);
}

#[tokio::test]
async fn users_are_managed_by_admin() {
    let shop = shop().await;
    let payload = json!({
        "username": "andi",
        "password": "latte",
        "role": "KASIR",
        "full_name": "Andi"
    });

    let (status, created) = send(
        &shop.app,
        Method::POST,
        "/users",
        Some(ADMIN),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "KASIR");
    assert!(created.get("password").is_none());

    let (status, _) = send(&shop.app, Method::POST, "/users", Some(ADMIN), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&shop.app, Method::GET, "/users", Some(KASIR), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &shop.app,
        Method::DELETE,
        &format!("/users/{}", shop.admin.id),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &shop.app,
        Method::DELETE,
        &format!("/users/{}", created["id"].as_str().unwrap()),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &shop.app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "andi", "password": "latte" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn kasir_reads_only_their_own_sales() {
    let shop = shop().await;
    let (status, _) = send(
        &shop.app,
        Method::POST,
        "/users",
        Some(ADMIN),
        Some(json!({
            "username": "andi",
            "password": "latte",
            "role": "KASIR",
            "full_name": "Andi"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, created) = send(
        &shop.app,
        Method::POST,
        "/transactions",
        Some(KASIR),
        Some(morning_order(&shop, shop.kasir.id)),
    )
    .await;
    let uri = format!("/transactions/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&shop.app, Method::GET, &uri, Some(("andi", "latte")), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&shop.app, Method::GET, &uri, Some(KASIR), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&shop.app, Method::GET, &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_cannot_change_their_own_role() {
    let shop = shop().await;
    let own = format!("/users/{}", shop.admin.id);

    let (status, _) = send(
        &shop.app,
        Method::PATCH,
        &own,
        Some(ADMIN),
        Some(json!({ "role": "KASIR" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &shop.app,
        Method::PATCH,
        &own,
        Some(ADMIN),
        Some(json!({ "full_name": "Head Barista", "role": "ADMIN" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "ADMIN");
    assert_eq!(body["full_name"], "Head Barista");

    let (status, body) = send(
        &shop.app,
        Method::PATCH,
        &format!("/users/{}", shop.kasir.id),
        Some(ADMIN),
        Some(json!({ "role": "ADMIN" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "ADMIN");
}
