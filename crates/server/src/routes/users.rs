use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use service::users::domain::{NewUser, ProfileUpdate, UserPage, UserUpdate, UserWithProfile};
use service::users::query::ListParams;

use crate::{errors::JsonApiError, routes::AppState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Inclusive lower age bound; `<= 0` is ignored
    pub min_age: Option<i32>,
    /// Inclusive upper age bound; `<= 0` is ignored
    pub max_age: Option<i32>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// `name_asc`, `name_desc`; anything else sorts by id
    pub sort: Option<String>,
}

impl From<ListQuery> for ListParams {
    fn from(q: ListQuery) -> Self {
        ListParams { min_age: q.min_age, max_age: q.max_age, page: q.page, page_size: q.page_size, sort: q.sort }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateUserInput {
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub profile: Option<ProfileUpdate>,
}

#[utoipa::path(
    get, path = "/users", tag = "users",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of active users", body = crate::openapi::UserPageDoc),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Result<Json<UserPage>, JsonApiError> {
    let page = state.users.list(q.into()).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post, path = "/users", tag = "users",
    request_body = crate::openapi::NewUserDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::UserDoc),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Name already in use")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<UserWithProfile>), JsonApiError> {
    let created = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post, path = "/users/batch", tag = "users",
    request_body = [crate::openapi::NewUserDoc],
    responses(
        (status = 201, description = "All created", body = [crate::openapi::UserDoc]),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Name already in use; nothing was created")
    )
)]
pub async fn create_batch(
    State(state): State<AppState>,
    Json(inputs): Json<Vec<NewUser>>,
) -> Result<(StatusCode, Json<Vec<UserWithProfile>>), JsonApiError> {
    let created = state.users.create_many(inputs).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::UserDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<UserWithProfile>, JsonApiError> {
    Ok(Json(state.users.get(id).await?))
}

#[utoipa::path(
    put, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = crate::openapi::UpdateUserDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Name already in use")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<UserWithProfile>, JsonApiError> {
    let changes = UserUpdate { name: input.name, age: input.age };
    let updated = state.users.update(id, changes, input.profile).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
