use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Partial indexes are written as SQL; the statement is valid on both Postgres and SQLite.
const UNIQ_ACTIVE_NAME: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_users_active_name ON users (name) WHERE deleted_at IS NULL";
const UNIQ_ACTIVE_PROFILE: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_profiles_active_user ON profiles (user_id) WHERE deleted_at IS NULL";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared(UNIQ_ACTIVE_NAME).await?;
        conn.execute_unprepared(UNIQ_ACTIVE_PROFILE).await?;

        // Users: age filter
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_age")
                    .table(Users::Table)
                    .col(Users::Age)
                    .to_owned(),
            )
            .await?;

        // Profiles: lookup by owner
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_profiles_user")
                    .table(Profiles::Table)
                    .col(Profiles::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_profiles_user").table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_users_age").table(Users::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_profiles_active_user").table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_users_active_name").table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Age }

#[derive(DeriveIden)]
enum Profiles { Table, UserId }
