#![allow(dead_code)]

use mesa_server::auth::JwtService;
use mesa_server::config::Config;
use mesa_server::db::{DbService, catalog, dining_tables};
use mesa_server::error::ServiceError;
use mesa_server::live::{EventPublisher, LiveHub, NoopPublisher, RecordingPublisher};
use mesa_server::orders::{CreateOrder, CreateOrderItem};
use mesa_server::state::AppState;
use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, Dish, DishModifier, Role, TableStatus};
use std::sync::Arc;

pub const TENANT_A: &str = "tenant-a";
pub const TENANT_B: &str = "tenant-b";

pub const TABLE_ID: i64 = 100;
pub const INACTIVE_TABLE_ID: i64 = 101;
/// Same table id space, other tenant
pub const TABLE_B_ID: i64 = 200;

pub const DISH_RICE: i64 = 1_000;
pub const DISH_SOUP: i64 = 1_001;
pub const DISH_SOLD_OUT: i64 = 1_002;
pub const DISH_B: i64 = 2_000;

pub const MOD_EGG: i64 = 5_000;
pub const MOD_SOUP_SPICY: i64 = 5_001;

pub const WAITER_ID: i64 = 42;
pub const ADMIN_ID: i64 = 7;

pub struct TestApp {
    pub state: AppState,
    pub events: Arc<RecordingPublisher>,
}

// ========================================================================
// Setup
// ========================================================================

/// In-memory store with a seeded catalog and a recording publisher
pub async fn setup() -> TestApp {
    mesa_server::utils::init_logger("warn");
    let config = Config::for_tests();
    let db = DbService::in_memory().await.expect("in-memory db");
    seed(&db).await;

    let events = Arc::new(RecordingPublisher::new());
    let publisher: Arc<dyn EventPublisher> = events.clone();
    let state = AppState::with_publisher(
        &config,
        db.pool,
        LiveHub::new(config.live_channel_capacity),
        publisher,
    );
    TestApp { state, events }
}

/// In-memory store wired to a real hub, for fan-out tests
pub async fn setup_live() -> AppState {
    mesa_server::utils::init_logger("warn");
    let config = Config::for_tests();
    let db = DbService::in_memory().await.expect("in-memory db");
    seed(&db).await;
    AppState::with_pool(&config, db.pool)
}

/// File-backed pool with several connections, events discarded.
/// The returned directory must outlive the state.
pub async fn setup_file() -> (AppState, tempfile::TempDir) {
    mesa_server::utils::init_logger("warn");
    let config = Config::for_tests();
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite:{}", dir.path().join("mesa.db").display());
    let db = DbService::new(&url).await.expect("file db");
    seed(&db).await;

    let state = AppState::with_publisher(
        &config,
        db.pool,
        LiveHub::new(config.live_channel_capacity),
        Arc::new(NoopPublisher),
    );
    (state, dir)
}

async fn seed(db: &DbService) {
    let pool = &db.pool;

    for (id, tenant, status) in [
        (TABLE_ID, TENANT_A, TableStatus::Available),
        (INACTIVE_TABLE_ID, TENANT_A, TableStatus::Inactive),
        (TABLE_B_ID, TENANT_B, TableStatus::Available),
    ] {
        dining_tables::insert_table(
            pool,
            &DiningTable {
                id,
                tenant_id: tenant.into(),
                name: format!("T{id}"),
                status,
            },
        )
        .await
        .expect("seed table");
    }

    for (id, tenant, name, price, is_available) in [
        (DISH_RICE, TENANT_A, "Fried Rice", 50_000, true),
        (DISH_SOUP, TENANT_A, "Tom Yum", 30_000, true),
        (DISH_SOLD_OUT, TENANT_A, "Lobster", 900_000, false),
        (DISH_B, TENANT_B, "Pho", 45_000, true),
    ] {
        catalog::insert_dish(
            pool,
            &Dish {
                id,
                tenant_id: tenant.into(),
                name: name.into(),
                price,
                is_available,
            },
        )
        .await
        .expect("seed dish");
    }

    for (id, dish_id, name, delta) in [
        (MOD_EGG, DISH_RICE, "Extra egg", 5_000),
        (MOD_SOUP_SPICY, DISH_SOUP, "Extra spicy", 0),
    ] {
        catalog::insert_modifier(
            pool,
            &DishModifier {
                id,
                tenant_id: TENANT_A.into(),
                dish_id,
                name: name.into(),
                price_delta: delta,
            },
        )
        .await
        .expect("seed modifier");
    }
}

// ========================================================================
// Builders
// ========================================================================

pub fn dish(dish_id: i64, quantity: i32) -> CreateOrderItem {
    CreateOrderItem {
        dish_id,
        quantity,
        description: None,
        modifier_ids: vec![],
    }
}

pub fn new_order(table_id: i64, dishes: Vec<CreateOrderItem>) -> CreateOrder {
    CreateOrder {
        table_id,
        customer_id: None,
        waiter_id: None,
        status: None,
        dishes,
    }
}

/// Error code a failed engine call surfaces to clients
pub fn code_of(err: ServiceError) -> ErrorCode {
    AppError::from(err).code
}

pub fn token(jwt: &JwtService, user_id: i64, tenant_id: &str, role: Role) -> String {
    jwt.generate_token(user_id, tenant_id, role)
        .expect("token generation")
}
