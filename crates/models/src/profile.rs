use sea_orm::{entity::prelude::*, sea_query::Expr, ConnectionTrait, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Picture URLs must be absolute http(s) URLs.
pub fn validate_picture_url(raw: &str) -> Result<(), ModelError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| ModelError::Validation(format!("invalid profile_picture_url: {e}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(()),
        _ => Err(ModelError::Validation("profile_picture_url must be an http(s) URL".into())),
    }
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    bio: Option<String>,
    profile_picture_url: Option<String>,
) -> Result<Model, ModelError> {
    if let Some(u) = profile_picture_url.as_deref() { validate_picture_url(u)?; }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = ActiveModel {
        user_id: Set(user_id),
        bio: Set(bio),
        profile_picture_url: Set(profile_picture_url),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    Ok(am.insert(conn).await?)
}

pub async fn find_active_by_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::DeletedAt.is_null())
        .one(conn)
        .await?;
    Ok(found)
}

/// Active profiles owned by any of `user_ids`, in one query.
pub async fn find_active_for_users<C: ConnectionTrait>(conn: &C, user_ids: &[i32]) -> Result<Vec<Model>, ModelError> {
    if user_ids.is_empty() { return Ok(Vec::new()); }
    let rows = Entity::find()
        .filter(Column::UserId.is_in(user_ids.iter().copied()))
        .filter(Column::DeletedAt.is_null())
        .all(conn)
        .await?;
    Ok(rows)
}

/// Set the supplied fields on the user's active profile; `None` leaves a field untouched.
/// Returns rows affected.
pub async fn update_active_by_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    bio: Option<&str>,
    profile_picture_url: Option<&str>,
) -> Result<u64, ModelError> {
    if let Some(u) = profile_picture_url { validate_picture_url(u)?; }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut upd = Entity::update_many().col_expr(Column::UpdatedAt, Expr::value(now));
    if let Some(b) = bio { upd = upd.col_expr(Column::Bio, Expr::value(b.to_string())); }
    if let Some(u) = profile_picture_url { upd = upd.col_expr(Column::ProfilePictureUrl, Expr::value(u.to_string())); }
    let res = upd
        .filter(Column::UserId.eq(user_id))
        .filter(Column::DeletedAt.is_null())
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

pub async fn soft_delete_by_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64, ModelError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::DeletedAt, Expr::value(Some(now)))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::DeletedAt.is_null())
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

pub async fn hard_delete_by_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}
