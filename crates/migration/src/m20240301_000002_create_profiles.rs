//! Create `profiles` table with FK to `users`.
//!
//! The service removes profiles explicitly inside the user delete transaction.
//! `ON DELETE CASCADE` only keeps the user-first statement order legal under
//! the hard-delete strategy without deferred constraints.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(pk_auto(Profiles::Id))
                    .col(integer(Profiles::UserId))
                    .col(text_null(Profiles::Bio))
                    .col(string_len_null(Profiles::ProfilePictureUrl, 2048))
                    .col(timestamp_with_time_zone(Profiles::CreatedAt))
                    .col(timestamp_with_time_zone(Profiles::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Profiles::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Profiles::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Profiles { Table, Id, UserId, Bio, ProfilePictureUrl, CreatedAt, UpdatedAt, DeletedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
