use std::collections::HashMap;

use configs::UsersConfig;
use models::{profile, user};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait};
use tracing::{debug, info, instrument};

use super::domain::{NewUser, ProfileUpdate, UserPage, UserUpdate, UserWithProfile};
use super::errors::UserError;
use super::query::{ListParams, UserQuery};
use super::transaction::{remove_profile, remove_user, TransactionCoordinator};
use crate::pagination::total_pages;

/// Create/list/update/delete over the User + Profile pair.
///
/// Holds the pool handle it was built with; nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct UserService {
    db: DatabaseConnection,
    tx: TransactionCoordinator,
    cfg: UsersConfig,
}

async fn insert_with_profile<C: ConnectionTrait>(conn: &C, input: NewUser) -> Result<UserWithProfile, UserError> {
    let u = user::insert(conn, &input.name, input.age).await?;
    let p = match input.profile.map(|p| p.normalized()) {
        Some(p) => Some(profile::insert(conn, u.id, p.bio, p.profile_picture_url).await?),
        None => None,
    };
    Ok(UserWithProfile::from_models(u, p))
}

async fn load<C: ConnectionTrait>(conn: &C, id: i32) -> Result<UserWithProfile, UserError> {
    let u = user::find_active(conn, id).await?.ok_or_else(|| UserError::not_found(id))?;
    let p = profile::find_active_by_user(conn, id).await?;
    Ok(UserWithProfile::from_models(u, p))
}

impl UserService {
    pub fn new(db: DatabaseConnection, cfg: UsersConfig) -> Self {
        let tx = TransactionCoordinator::new(db.clone(), cfg.delete_strategy);
        Self { db, tx, cfg }
    }

    /// Insert a user and, when given, its profile in one transaction.
    #[instrument(skip(self, input), fields(name = %input.name, age = input.age))]
    pub async fn create(&self, input: NewUser) -> Result<UserWithProfile, UserError> {
        input.validate()?;
        let created = self
            .tx
            .run("create_user", move |txn| Box::pin(async move { insert_with_profile(txn, input).await }))
            .await?;
        info!(user_id = created.id, with_profile = created.profile.is_some(), "user_created");
        Ok(created)
    }

    /// Insert several users atomically; one bad entry aborts the whole batch.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn create_many(&self, inputs: Vec<NewUser>) -> Result<Vec<UserWithProfile>, UserError> {
        if inputs.is_empty() {
            return Err(UserError::Validation("batch is empty".into()));
        }
        for (i, input) in inputs.iter().enumerate() {
            input.validate().map_err(|e| match e {
                UserError::Validation(msg) => UserError::Validation(format!("entry {i}: {msg}")),
                other => other,
            })?;
        }
        let created = self
            .tx
            .run("create_users", move |txn| {
                Box::pin(async move {
                    let mut out = Vec::with_capacity(inputs.len());
                    for input in inputs {
                        out.push(insert_with_profile(txn, input).await?);
                    }
                    Ok(out)
                })
            })
            .await?;
        info!(count = created.len(), "users_created");
        Ok(created)
    }

    /// Active user with its active profile.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<UserWithProfile, UserError> {
        load(&self.db, id).await
    }

    /// Count, then fetch one page, then attach profiles.
    ///
    /// The count and the fetch are separate statements outside a transaction;
    /// a write landing between them can make `total_pages` describe a slightly
    /// different population than `users`.
    #[instrument(skip(self, params), fields(min_age = ?params.min_age, max_age = ?params.max_age, sort = ?params.sort))]
    pub async fn list(&self, params: ListParams) -> Result<UserPage, UserError> {
        let query = UserQuery::from_params(&params, &self.cfg);
        let backend = self.db.get_database_backend();

        let total: i64 = match self.db.query_one(query.count_statement(backend)).await? {
            Some(row) => row.try_get("", "count")?,
            None => 0,
        };
        let total_items = u64::try_from(total).unwrap_or(0);

        let rows = user::Entity::find()
            .from_raw_sql(query.page_statement(backend))
            .all(&self.db)
            .await?;
        let ids: Vec<i32> = rows.iter().map(|u| u.id).collect();
        let mut profiles: HashMap<i32, profile::Model> = profile::find_active_for_users(&self.db, &ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        let users = rows
            .into_iter()
            .map(|u| {
                let p = profiles.remove(&u.id);
                UserWithProfile::from_models(u, p)
            })
            .collect::<Vec<_>>();
        debug!(returned = users.len(), total_items, page = query.window.page, "users_listed");

        Ok(UserPage {
            users,
            total_items,
            page: query.window.page,
            page_size: query.window.per_page,
            total_pages: total_pages(total_items, query.window.per_page),
        })
    }

    /// Update name/age, then the supplied profile fields, in one transaction.
    ///
    /// A missing user aborts before the profile statement runs. A missing
    /// profile does not: the user change still commits.
    #[instrument(skip(self, changes, profile_changes), fields(user_id = id, name = %changes.name))]
    pub async fn update(
        &self,
        id: i32,
        changes: UserUpdate,
        profile_changes: Option<ProfileUpdate>,
    ) -> Result<UserWithProfile, UserError> {
        changes.validate()?;
        let profile_changes = profile_changes.map(ProfileUpdate::normalized).filter(|p| !p.is_empty());
        if let Some(p) = &profile_changes { p.validate()?; }

        let updated = self
            .tx
            .run("update_user", move |txn| {
                Box::pin(async move {
                    if user::update_active(txn, id, &changes.name, changes.age).await? == 0 {
                        return Err(UserError::not_found(id));
                    }
                    if let Some(p) = profile_changes {
                        let touched = profile::update_active_by_user(
                            txn,
                            id,
                            p.bio.as_deref(),
                            p.profile_picture_url.as_deref(),
                        )
                        .await?;
                        if touched == 0 {
                            debug!(user_id = id, "profile missing on update; user change kept");
                        }
                    }
                    load(txn, id).await
                })
            })
            .await?;
        info!(user_id = id, "user_updated");
        Ok(updated)
    }

    /// Remove the user, then its profile, in one transaction.
    ///
    /// Under the hard strategy `profiles.user_id` cascades on delete, so the
    /// store has already dropped the profile when the explicit profile delete
    /// runs; that statement is a guard and normally affects no rows. Under the
    /// soft strategy it is what tombstones the profile.
    #[instrument(skip(self), fields(strategy = ?self.tx.strategy()))]
    pub async fn delete(&self, id: i32) -> Result<(), UserError> {
        let strategy = self.tx.strategy();
        self.tx
            .run("delete_user", move |txn| {
                Box::pin(async move {
                    if remove_user(txn, strategy, id).await? == 0 {
                        return Err(UserError::not_found(id));
                    }
                    let profiles = remove_profile(txn, strategy, id).await?;
                    if profiles == 0 {
                        debug!(user_id = id, "no profile to remove");
                    }
                    Ok(())
                })
            })
            .await?;
        info!(user_id = id, "user_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use crate::users::domain::NewProfile;
    use configs::DeleteStrategy;
    use sea_orm::PaginatorTrait;

    async fn service(strategy: DeleteStrategy) -> Result<(UserService, DatabaseConnection), anyhow::Error> {
        let db = get_db().await?;
        let cfg = UsersConfig { delete_strategy: strategy, ..UsersConfig::default() };
        Ok((UserService::new(db.clone(), cfg), db))
    }

    fn new_user(name: &str, age: i32) -> NewUser {
        NewUser { name: name.into(), age, profile: None }
    }

    fn with_profile(name: &str, age: i32, bio: &str) -> NewUser {
        NewUser {
            name: name.into(),
            age,
            profile: Some(NewProfile {
                bio: Some(bio.into()),
                profile_picture_url: Some(format!("https://img.example.com/{name}.png")),
            }),
        }
    }

    fn names(page: &UserPage) -> Vec<&str> {
        page.users.iter().map(|u| u.name.as_str()).collect()
    }

    #[tokio::test]
    async fn create_returns_user_and_profile() -> Result<(), anyhow::Error> {
        let (svc, _db) = service(DeleteStrategy::Soft).await?;
        let created = svc.create(with_profile("Ada", 36, "Mathematician")).await?;
        assert_eq!(created.name, "Ada");
        let p = created.profile.as_ref().expect("profile");
        assert_eq!(p.user_id, created.id);
        assert_eq!(p.bio.as_deref(), Some("Mathematician"));

        let fetched = svc.get(created.id).await?;
        assert_eq!(fetched.profile, created.profile);

        let bare = svc.create(new_user("Grace", 45)).await?;
        assert!(bare.profile.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() -> Result<(), anyhow::Error> {
        let (svc, db) = service(DeleteStrategy::Soft).await?;
        assert!(matches!(svc.create(new_user("  ", 20)).await, Err(UserError::Validation(_))));
        assert!(matches!(svc.create(new_user("Neg", -1)).await, Err(UserError::Validation(_))));
        let mut bad_url = with_profile("Url", 20, "x");
        bad_url.profile.as_mut().unwrap().profile_picture_url = Some("ftp://nope".into());
        assert!(matches!(svc.create(bad_url).await, Err(UserError::Validation(_))));
        assert_eq!(user::Entity::find().count(&db).await?, 0);
        assert_eq!(profile::Entity::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_name_conflicts_without_partial_rows() -> Result<(), anyhow::Error> {
        let (svc, db) = service(DeleteStrategy::Soft).await?;
        svc.create(with_profile("Ada", 36, "first")).await?;
        let res = svc.create(with_profile("Ada", 40, "second")).await;
        assert!(matches!(res, Err(UserError::Conflict(_))));
        assert_eq!(user::Entity::find().count(&db).await?, 1);
        assert_eq!(profile::Entity::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_many_is_all_or_nothing() -> Result<(), anyhow::Error> {
        let (svc, db) = service(DeleteStrategy::Soft).await?;
        let created = svc.create_many(vec![new_user("A", 1), with_profile("B", 2, "b")]).await?;
        assert_eq!(created.len(), 2);
        assert!(created[1].profile.is_some());

        let res = svc.create_many(vec![new_user("C", 3), new_user("A", 4)]).await;
        assert!(matches!(res, Err(UserError::Conflict(_))));
        assert_eq!(user::Entity::find().count(&db).await?, 2);

        assert!(matches!(svc.create_many(vec![]).await, Err(UserError::Validation(_))));
        let res = svc.create_many(vec![new_user("D", 5), new_user("", 6)]).await;
        assert!(matches!(res, Err(UserError::Validation(ref m)) if m.contains("entry 1")));
        assert_eq!(user::Entity::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_sorts_and_pages() -> Result<(), anyhow::Error> {
        let (svc, _db) = service(DeleteStrategy::Soft).await?;
        for (name, age) in [("Eve", 17), ("Bob", 22), ("Dan", 30), ("Amy", 25), ("Cal", 41)] {
            svc.create(with_profile(name, age, "bio")).await?;
        }

        let page = svc
            .list(ListParams {
                min_age: Some(18),
                max_age: Some(40),
                sort: Some("name_asc".into()),
                ..Default::default()
            })
            .await?;
        assert_eq!(names(&page), vec!["Amy", "Bob", "Dan"]);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 1);
        assert!(page.users.iter().all(|u| u.profile.is_some()));

        let page = svc
            .list(ListParams { page: Some(2), page_size: Some(2), sort: Some("name_desc".into()), ..Default::default() })
            .await?;
        assert_eq!(names(&page), vec!["Cal", "Bob"]);
        assert_eq!((page.page, page.page_size, page.total_items, page.total_pages), (2, 2, 5, 3));

        let page = svc.list(ListParams { page: Some(9), page_size: Some(2), ..Default::default() }).await?;
        assert!(page.users.is_empty());
        assert_eq!(page.total_items, 5);
        Ok(())
    }

    #[tokio::test]
    async fn list_coerces_bad_window_and_unknown_sort() -> Result<(), anyhow::Error> {
        let (svc, _db) = service(DeleteStrategy::Soft).await?;
        for name in ["b", "a", "c"] {
            svc.create(new_user(name, 30)).await?;
        }
        let page = svc
            .list(ListParams { page: Some(0), page_size: Some(-5), sort: Some("age_desc".into()), ..Default::default() })
            .await?;
        assert_eq!((page.page, page.page_size), (1, 10));
        // insertion (id) order
        assert_eq!(names(&page), vec!["b", "a", "c"]);

        let page = svc.list(ListParams { page_size: Some(10_000), ..Default::default() }).await?;
        assert_eq!(page.page_size, 100);
        Ok(())
    }

    #[tokio::test]
    async fn list_of_empty_store() -> Result<(), anyhow::Error> {
        let (svc, _db) = service(DeleteStrategy::Soft).await?;
        let page = svc.list(ListParams::default()).await?;
        assert!(page.users.is_empty());
        assert_eq!((page.total_items, page.total_pages), (0, 0));
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_fields_and_patches_profile() -> Result<(), anyhow::Error> {
        let (svc, _db) = service(DeleteStrategy::Soft).await?;
        let created = svc.create(with_profile("Ada", 36, "old bio")).await?;
        let old_url = created.profile.as_ref().and_then(|p| p.profile_picture_url.clone());

        let updated = svc
            .update(
                created.id,
                UserUpdate { name: "Ada L.".into(), age: 37 },
                Some(ProfileUpdate { bio: Some("new bio".into()), profile_picture_url: None }),
            )
            .await?;
        assert_eq!((updated.name.as_str(), updated.age), ("Ada L.", 37));
        let p = updated.profile.expect("profile");
        assert_eq!(p.bio.as_deref(), Some("new bio"));
        assert_eq!(p.profile_picture_url, old_url);
        assert!(updated.updated_at >= created.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_user_changes_nothing() -> Result<(), anyhow::Error> {
        let (svc, _db) = service(DeleteStrategy::Soft).await?;
        let created = svc.create(with_profile("Ada", 36, "kept")).await?;
        let res = svc
            .update(
                created.id + 100,
                UserUpdate { name: "Ghost".into(), age: 1 },
                Some(ProfileUpdate { bio: Some("overwritten".into()), profile_picture_url: None }),
            )
            .await;
        assert!(matches!(res, Err(UserError::NotFound(_))));
        let p = svc.get(created.id).await?.profile.expect("profile");
        assert_eq!(p.bio.as_deref(), Some("kept"));
        Ok(())
    }

    #[tokio::test]
    async fn update_without_profile_row_keeps_user_change() -> Result<(), anyhow::Error> {
        let (svc, _db) = service(DeleteStrategy::Soft).await?;
        let created = svc.create(new_user("Bare", 20)).await?;
        let updated = svc
            .update(
                created.id,
                UserUpdate { name: "Bare".into(), age: 21 },
                Some(ProfileUpdate { bio: Some("ignored".into()), profile_picture_url: None }),
            )
            .await?;
        assert_eq!(updated.age, 21);
        assert!(updated.profile.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn update_conflict_rolls_back() -> Result<(), anyhow::Error> {
        let (svc, _db) = service(DeleteStrategy::Soft).await?;
        svc.create(new_user("Taken", 30)).await?;
        let other = svc.create(with_profile("Other", 30, "before")).await?;
        let res = svc
            .update(
                other.id,
                UserUpdate { name: "Taken".into(), age: 31 },
                Some(ProfileUpdate { bio: Some("after".into()), profile_picture_url: None }),
            )
            .await;
        assert!(matches!(res, Err(UserError::Conflict(_))));
        let still = svc.get(other.id).await?;
        assert_eq!((still.name.as_str(), still.age), ("Other", 30));
        assert_eq!(still.profile.and_then(|p| p.bio).as_deref(), Some("before"));
        Ok(())
    }

    #[tokio::test]
    async fn soft_delete_hides_user_and_frees_name() -> Result<(), anyhow::Error> {
        let (svc, db) = service(DeleteStrategy::Soft).await?;
        let created = svc.create(with_profile("Ada", 36, "bio")).await?;
        svc.delete(created.id).await?;

        assert!(matches!(svc.get(created.id).await, Err(UserError::NotFound(_))));
        assert_eq!(svc.list(ListParams::default()).await?.total_items, 0);
        assert!(matches!(svc.delete(created.id).await, Err(UserError::NotFound(_))));
        let res = svc.update(created.id, UserUpdate { name: "Ada".into(), age: 1 }, None).await;
        assert!(matches!(res, Err(UserError::NotFound(_))));

        // rows remain, tombstoned
        assert_eq!(user::Entity::find().count(&db).await?, 1);
        assert_eq!(profile::Entity::find().count(&db).await?, 1);

        let again = svc.create(with_profile("Ada", 37, "again")).await?;
        assert_ne!(again.id, created.id);
        Ok(())
    }

    #[tokio::test]
    async fn hard_delete_removes_rows() -> Result<(), anyhow::Error> {
        let (svc, db) = service(DeleteStrategy::Hard).await?;
        let keep = svc.create(with_profile("Keep", 50, "stays")).await?;
        let gone = svc.create(with_profile("Gone", 51, "goes")).await?;
        svc.delete(gone.id).await?;

        assert_eq!(user::Entity::find().count(&db).await?, 1);
        assert_eq!(profile::Entity::find().count(&db).await?, 1);
        assert!(svc.get(keep.id).await?.profile.is_some());
        assert!(matches!(svc.delete(gone.id).await, Err(UserError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_without_profile_succeeds() -> Result<(), anyhow::Error> {
        for strategy in [DeleteStrategy::Soft, DeleteStrategy::Hard] {
            let (svc, _db) = service(strategy).await?;
            let created = svc.create(new_user("Solo", 10)).await?;
            svc.delete(created.id).await?;
            assert!(matches!(svc.get(created.id).await, Err(UserError::NotFound(_))));
        }
        Ok(())
    }
}
