use bookstore::config::{SchedulerConfig, SecurityConfig};
use bookstore::db::Store;
use bookstore::scheduler::Scheduler;
use bookstore::services::{AccountPolicy, AccountService, Argon2Hasher, SeaOrmAccountService};
use std::sync::Arc;

async fn account_service() -> Arc<dyn AccountService> {
    let db_path = std::env::temp_dir().join(format!(
        "bookstore-scheduler-test-{}.db",
        uuid::Uuid::new_v4()
    ));
    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("Failed to open test database");

    let hasher = Argon2Hasher::from_config(&SecurityConfig {
        argon2_memory_cost_kib: 8,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..Default::default()
    })
    .expect("Invalid test hasher params");

    Arc::new(SeaOrmAccountService::new(
        store,
        Arc::new(hasher),
        AccountPolicy::default(),
    ))
}

#[tokio::test]
async fn test_start_fails_on_malformed_cron() {
    let scheduler = Scheduler::new(
        account_service().await,
        SchedulerConfig {
            enabled: true,
            cleanup_cron: Some("0 0 25 * * *".to_string()),
            cleanup_interval_hours: 24,
        },
    );

    let err = scheduler.start().await.unwrap_err();
    assert!(err.to_string().contains("cron"), "{err:#}");
    assert!(!scheduler.is_running().await);
}

#[tokio::test]
async fn test_interval_mode_starts_in_background_and_stops() {
    let scheduler = Scheduler::new(
        account_service().await,
        SchedulerConfig {
            enabled: true,
            cleanup_cron: None,
            cleanup_interval_hours: 24,
        },
    );

    scheduler.start().await.unwrap();
    assert!(scheduler.is_running().await);

    scheduler.stop().await;
    assert!(!scheduler.is_running().await);
}

#[tokio::test]
async fn test_disabled_scheduler_still_runs_once() {
    let scheduler = Scheduler::new(
        account_service().await,
        SchedulerConfig {
            enabled: false,
            ..Default::default()
        },
    );

    scheduler.start().await.unwrap();
    assert!(!scheduler.is_running().await);
    assert_eq!(scheduler.run_once().await.unwrap(), 0);
}
