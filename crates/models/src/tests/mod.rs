use sea_orm::DatabaseConnection;
use migration::MigratorTrait;


/// CRUD operations tests for users and profiles
pub mod crud_tests;


/// Fresh in-memory database with the schema applied.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = crate::db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
