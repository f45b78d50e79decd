use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ProfileInputDoc {
    pub bio: Option<String>,
    /// Absolute http(s) URL
    pub profile_picture_url: Option<String>,
}

#[derive(ToSchema)]
pub struct NewUserDoc {
    pub name: String,
    pub age: i32,
    pub profile: Option<ProfileInputDoc>,
}

#[derive(ToSchema)]
pub struct UpdateUserDoc {
    pub name: String,
    pub age: i32,
    /// Only the supplied fields are changed
    pub profile: Option<ProfileInputDoc>,
}

#[derive(ToSchema)]
pub struct ProfileDoc {
    pub id: i32,
    pub user_id: i32,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: i32,
    pub name: String,
    pub age: i32,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
    pub profile: Option<ProfileDoc>,
}

#[derive(ToSchema)]
pub struct UserPageDoc {
    pub users: Vec<UserDoc>,
    pub total_items: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub code: Option<u16>,
    pub detail: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::list,
        crate::routes::users::create,
        crate::routes::users::create_batch,
        crate::routes::users::get,
        crate::routes::users::update,
        crate::routes::users::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ProfileInputDoc,
            NewUserDoc,
            UpdateUserDoc,
            ProfileDoc,
            UserDoc,
            UserPageDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "users")
    )
)]
pub struct ApiDoc;
