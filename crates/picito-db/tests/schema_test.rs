//! Migration runner tests against in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn fresh_database_reaches_latest_version() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    assert_eq!(picito_db::current_version(&db).await.unwrap(), 0);
    picito_db::run_migrations(&db).await.unwrap();
    assert_eq!(
        picito_db::current_version(&db).await.unwrap(),
        picito_db::latest_version()
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    picito_db::run_migrations(&db).await.unwrap();
    picito_db::run_migrations(&db).await.unwrap();

    assert_eq!(
        picito_db::current_version(&db).await.unwrap(),
        picito_db::latest_version()
    );
}
