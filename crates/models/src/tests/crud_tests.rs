use crate::{profile, user};
use crate::errors::ModelError;
use sea_orm::EntityTrait;
use anyhow::Result;

use super::setup_test_db;

/// Test user CRUD operations
#[tokio::test]
async fn test_user_crud() -> Result<()> {
    let db = setup_test_db().await?;

    let created = user::insert(&db, "Ada", 36).await?;
    assert!(created.id > 0);
    assert_eq!(created.name, "Ada");
    assert!(created.deleted_at.is_none());

    let found = user::find_active(&db, created.id).await?.expect("active user");
    assert_eq!(found, created);

    let affected = user::update_active(&db, created.id, "Ada L.", 37).await?;
    assert_eq!(affected, 1);
    let found = user::find_active(&db, created.id).await?.expect("active user");
    assert_eq!(found.name, "Ada L.");
    assert_eq!(found.age, 37);

    assert_eq!(user::soft_delete(&db, created.id).await?, 1);
    assert!(user::find_active(&db, created.id).await?.is_none());
    // tombstone is still present in the table
    let raw = user::Entity::find_by_id(created.id).one(&db).await?.expect("tombstoned row");
    assert!(raw.deleted_at.is_some());

    // tombstoned rows are invisible to further writes
    assert_eq!(user::soft_delete(&db, created.id).await?, 0);
    assert_eq!(user::update_active(&db, created.id, "Ghost", 1).await?, 0);
    assert_eq!(user::hard_delete(&db, created.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_user_hard_delete_removes_row() -> Result<()> {
    let db = setup_test_db().await?;
    let created = user::insert(&db, "Grace", 45).await?;
    assert_eq!(user::hard_delete(&db, created.id).await?, 1);
    assert!(user::Entity::find_by_id(created.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_user_name_unique_among_active_rows() -> Result<()> {
    let db = setup_test_db().await?;
    let first = user::insert(&db, "Linus", 30).await?;

    let dup = user::insert(&db, "Linus", 31).await;
    match dup {
        Err(e) => assert!(e.is_unique_violation(), "expected unique violation, got {e}"),
        Ok(_) => panic!("duplicate name must be rejected"),
    }

    // the name becomes available once the holder is tombstoned
    user::soft_delete(&db, first.id).await?;
    let reused = user::insert(&db, "Linus", 32).await?;
    assert_ne!(reused.id, first.id);
    Ok(())
}

#[tokio::test]
async fn test_user_insert_validates_before_touching_store() -> Result<()> {
    let db = setup_test_db().await?;
    assert!(matches!(user::insert(&db, " ", 3).await, Err(ModelError::Validation(_))));
    assert!(matches!(user::insert(&db, "Neg", -1).await, Err(ModelError::Validation(_))));
    assert!(user::Entity::find().all(&db).await?.is_empty());
    Ok(())
}

/// Test profile CRUD operations
#[tokio::test]
async fn test_profile_crud() -> Result<()> {
    let db = setup_test_db().await?;
    let owner = user::insert(&db, "Barbara", 50).await?;

    let p = profile::insert(&db, owner.id, Some("Engineer".into()), Some("https://example.com/b.png".into())).await?;
    assert_eq!(p.user_id, owner.id);

    let found = profile::find_active_by_user(&db, owner.id).await?.expect("profile");
    assert_eq!(found.bio.as_deref(), Some("Engineer"));

    // only the supplied field changes
    assert_eq!(profile::update_active_by_user(&db, owner.id, Some("Architect"), None).await?, 1);
    let found = profile::find_active_by_user(&db, owner.id).await?.expect("profile");
    assert_eq!(found.bio.as_deref(), Some("Architect"));
    assert_eq!(found.profile_picture_url.as_deref(), Some("https://example.com/b.png"));

    assert_eq!(profile::soft_delete_by_user(&db, owner.id).await?, 1);
    assert!(profile::find_active_by_user(&db, owner.id).await?.is_none());
    assert_eq!(profile::update_active_by_user(&db, owner.id, Some("x"), None).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_profile_rejects_bad_url() -> Result<()> {
    let db = setup_test_db().await?;
    let owner = user::insert(&db, "Ken", 70).await?;
    let res = profile::insert(&db, owner.id, None, Some("not-a-url".into())).await;
    assert!(matches!(res, Err(ModelError::Validation(_))));
    assert!(profile::find_active_by_user(&db, owner.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_one_active_profile_per_user() -> Result<()> {
    let db = setup_test_db().await?;
    let owner = user::insert(&db, "Dennis", 70).await?;
    profile::insert(&db, owner.id, Some("first".into()), None).await?;
    let second = profile::insert(&db, owner.id, Some("second".into()), None).await;
    assert!(matches!(second, Err(ref e) if e.is_unique_violation()));
    Ok(())
}

#[tokio::test]
async fn test_find_active_for_users_batches() -> Result<()> {
    let db = setup_test_db().await?;
    let a = user::insert(&db, "A", 1).await?;
    let b = user::insert(&db, "B", 2).await?;
    let c = user::insert(&db, "C", 3).await?;
    profile::insert(&db, a.id, Some("a".into()), None).await?;
    profile::insert(&db, c.id, Some("c".into()), None).await?;
    profile::soft_delete_by_user(&db, c.id).await?;

    let found = profile::find_active_for_users(&db, &[a.id, b.id, c.id]).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].user_id, a.id);

    assert!(profile::find_active_for_users(&db, &[]).await?.is_empty());
    Ok(())
}
