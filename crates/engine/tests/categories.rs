use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};

use engine::{Engine, EngineError, SessionContext};
use migration::MigratorTrait;
use uuid::Uuid;

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

async fn signed_in(engine: &Engine, email: &str) -> SessionContext {
    engine
        .register_user(email, "password")
        .await
        .unwrap()
        .into()
}

#[tokio::test]
async fn add_and_list_categories_sorted_by_name() {
    let (engine, _db) = engine_with_db().await;
    let alice = signed_in(&engine, "alice@example.com").await;

    engine
        .add_category(&alice, "Groceries", Some("food and drinks"), None)
        .await
        .unwrap();
    let bills = engine
        .add_category(&alice, "  Bills ", None, Some("https://img.example/bills.png"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bills.name, "Bills");

    let categories = engine.list_categories(&alice).await.unwrap();
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Bills", "Groceries"]);
    assert_eq!(
        categories[1].description.as_deref(),
        Some("food and drinks")
    );
    assert_eq!(
        categories[0].image_url.as_deref(),
        Some("https://img.example/bills.png")
    );
}

#[tokio::test]
async fn blank_category_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = signed_in(&engine, "alice@example.com").await;

    let err = engine
        .add_category(&alice, "   ", None, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidName("category name must not be empty".to_string())
    );
    assert!(engine.list_categories(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_calls_are_silent_no_ops() {
    let (engine, _db) = engine_with_db().await;
    let anonymous = SessionContext::Anonymous;

    let created = engine
        .add_category(&anonymous, "Travel", None, None)
        .await
        .unwrap();
    assert!(created.is_none());
    assert!(engine.list_categories(&anonymous).await.unwrap().is_empty());
    engine
        .delete_category(&anonymous, Uuid::new_v4())
        .await
        .unwrap();
}

#[tokio::test]
async fn categories_are_private_to_their_owner() {
    let (engine, _db) = engine_with_db().await;
    let alice = signed_in(&engine, "alice@example.com").await;
    let bob = signed_in(&engine, "bob@example.com").await;

    let travel = engine
        .add_category(&alice, "Travel", None, None)
        .await
        .unwrap()
        .unwrap();

    assert!(engine.list_categories(&bob).await.unwrap().is_empty());
    assert!(engine.category(&bob, travel.id).await.unwrap().is_none());

    let err = engine
        .update_category(&bob, travel.id, "Stolen", None, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("category not exists".to_string()));

    engine.delete_category(&bob, travel.id).await.unwrap();
    assert_eq!(engine.list_categories(&alice).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_overwrites_every_field() {
    let (engine, _db) = engine_with_db().await;
    let alice = signed_in(&engine, "alice@example.com").await;

    let category = engine
        .add_category(&alice, "Food", Some("everything edible"), Some("food.png"))
        .await
        .unwrap()
        .unwrap();

    let updated = engine
        .update_category(&alice, category.id, "Restaurants", None, Some("dinner.png"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, category.id);

    let stored = engine
        .category(&alice, category.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, updated);
    assert_eq!(stored.name, "Restaurants");
    assert!(stored.description.is_none());
    assert_eq!(stored.image_url.as_deref(), Some("dinner.png"));
}

#[tokio::test]
async fn update_of_unknown_category_fails() {
    let (engine, _db) = engine_with_db().await;
    let alice = signed_in(&engine, "alice@example.com").await;

    let err = engine
        .update_category(&alice, Uuid::new_v4(), "Ghost", None, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("category not exists".to_string()));
}

#[tokio::test]
async fn delete_removes_category_and_tolerates_unknown_ids() {
    let (engine, _db) = engine_with_db().await;
    let alice = signed_in(&engine, "alice@example.com").await;

    let category = engine
        .add_category(&alice, "Gifts", None, None)
        .await
        .unwrap()
        .unwrap();

    engine.delete_category(&alice, category.id).await.unwrap();
    assert!(engine.list_categories(&alice).await.unwrap().is_empty());

    engine.delete_category(&alice, category.id).await.unwrap();
}

#[tokio::test]
async fn list_skips_rows_without_a_name() {
    let (engine, db) = engine_with_db().await;
    let alice = signed_in(&engine, "alice@example.com").await;
    let user_id = alice.session().unwrap().user_id.to_string();

    engine.add_category(&alice, "Groceries", None, None).await.unwrap();
    for (id, name) in [(Uuid::new_v4().to_string(), ""), (Uuid::new_v4().to_string(), "   ")] {
        db.execute(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "INSERT INTO categories (id, user_id, name) VALUES (?, ?, ?)",
            [id.into(), user_id.clone().into(), name.into()],
        ))
        .await
        .unwrap();
    }

    let categories = engine.list_categories(&alice).await.unwrap();
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Groceries"]);
}
