use sea_orm::{Database, DatabaseConnection};

use engine::{BudgetSettings, Engine, EngineError, MoneyCents, SessionContext, parse_budget};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

#[tokio::test]
async fn missing_settings_load_as_defaults() {
    let (engine, _db) = engine_with_db().await;
    let alice: SessionContext = engine
        .register_user("alice@example.com", "password")
        .await
        .unwrap()
        .into();

    assert_eq!(
        engine.load_budget_settings(&alice).await,
        BudgetSettings::default()
    );
    assert_eq!(
        engine
            .load_budget_settings(&SessionContext::Anonymous)
            .await,
        BudgetSettings::default()
    );
}

#[tokio::test]
async fn save_then_overwrite_settings() {
    let (engine, _db) = engine_with_db().await;
    let alice: SessionContext = engine
        .register_user("alice@example.com", "password")
        .await
        .unwrap()
        .into();

    let saved = engine
        .save_budget_settings(&alice, parse_budget("500").unwrap(), true)
        .await
        .unwrap();
    assert!(saved.last_updated.is_some());

    let loaded = engine.load_budget_settings(&alice).await;
    assert_eq!(loaded.budget, MoneyCents::new(50_000));
    assert!(loaded.notify_on_exceed);
    assert!(loaded.has_budget());

    engine
        .save_budget_settings(&alice, parse_budget("").unwrap(), false)
        .await
        .unwrap();
    let loaded = engine.load_budget_settings(&alice).await;
    assert_eq!(loaded.budget, MoneyCents::ZERO);
    assert!(!loaded.notify_on_exceed);
    assert!(!loaded.has_budget());
}

#[tokio::test]
async fn saving_requires_a_session() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .save_budget_settings(&SessionContext::Anonymous, MoneyCents::new(100), true)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Unauthenticated);
    assert_eq!(err.to_string(), "User not authenticated");
}

#[tokio::test]
async fn negative_budget_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice: SessionContext = engine
        .register_user("alice@example.com", "password")
        .await
        .unwrap()
        .into();

    let err = engine
        .save_budget_settings(&alice, MoneyCents::new(-1), false)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn settings_are_per_user() {
    let (engine, _db) = engine_with_db().await;
    let alice: SessionContext = engine
        .register_user("alice@example.com", "password")
        .await
        .unwrap()
        .into();
    let bob: SessionContext = engine
        .register_user("bob@example.com", "password")
        .await
        .unwrap()
        .into();

    engine
        .save_budget_settings(&alice, MoneyCents::new(10_000), true)
        .await
        .unwrap();
    assert_eq!(
        engine.load_budget_settings(&bob).await,
        BudgetSettings::default()
    );
}
