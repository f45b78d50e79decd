use sea_orm::{entity::prelude::*, sea_query::Expr, ConnectionTrait, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::profile;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Profile,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Profile => Entity::has_one(profile::Entity).into() }
    }
}

impl Related<profile::Entity> for Entity {
    fn to() -> RelationDef { Relation::Profile.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    if name.len() > 255 { return Err(ModelError::Validation("name longer than 255 bytes".into())); }
    Ok(())
}

pub fn validate_age(age: i32) -> Result<(), ModelError> {
    if age < 0 { return Err(ModelError::Validation("age must be >= 0".into())); }
    Ok(())
}

/// Insert a user row; the store assigns the id.
pub async fn insert<C: ConnectionTrait>(conn: &C, name: &str, age: i32) -> Result<Model, ModelError> {
    validate_name(name)?;
    validate_age(age)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = ActiveModel {
        name: Set(name.to_string()),
        age: Set(age),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    Ok(am.insert(conn).await?)
}

pub async fn find_active<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, ModelError> {
    let found = Entity::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(conn)
        .await?;
    Ok(found)
}

/// Overwrite name and age of an active user. Returns rows affected.
pub async fn update_active<C: ConnectionTrait>(conn: &C, id: i32, name: &str, age: i32) -> Result<u64, ModelError> {
    validate_name(name)?;
    validate_age(age)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::Name, Expr::value(name.to_string()))
        .col_expr(Column::Age, Expr::value(age))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .filter(Column::DeletedAt.is_null())
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

/// Tombstone an active user. Returns rows affected.
pub async fn soft_delete<C: ConnectionTrait>(conn: &C, id: i32) -> Result<u64, ModelError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::DeletedAt, Expr::value(Some(now)))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .filter(Column::DeletedAt.is_null())
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

/// Remove an active user row. Returns rows affected.
pub async fn hard_delete<C: ConnectionTrait>(conn: &C, id: i32) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::DeletedAt.is_null())
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}
