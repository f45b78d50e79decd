use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use models::{profile, user};

use super::errors::UserError;

/// Profile fields accepted on create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

/// Create input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub profile: Option<NewProfile>,
}

/// Replacement values for the mutable user fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: String,
    pub age: i32,
}

/// Profile fields to change; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

/// Profile as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i32,
    pub user_id: i32,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}

/// User joined with its active profile, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithProfile {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub profile: Option<Profile>,
}

/// One page of a filtered, sorted listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPage {
    pub users: Vec<UserWithProfile>,
    pub total_items: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

fn blank_to_none(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn check_user_fields(name: &str, age: i32) -> Result<(), UserError> {
    user::validate_name(name)?;
    user::validate_age(age)?;
    Ok(())
}

fn check_picture(url: Option<&str>) -> Result<(), UserError> {
    if let Some(u) = url { profile::validate_picture_url(u)?; }
    Ok(())
}

impl NewProfile {
    /// Blank picture URLs count as absent.
    pub fn normalized(self) -> Self {
        Self { bio: self.bio, profile_picture_url: blank_to_none(self.profile_picture_url) }
    }
}

impl NewUser {
    pub fn validate(&self) -> Result<(), UserError> {
        check_user_fields(&self.name, self.age)?;
        if let Some(p) = &self.profile {
            check_picture(blank_to_none(p.profile_picture_url.clone()).as_deref())?;
        }
        Ok(())
    }
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), UserError> {
        check_user_fields(&self.name, self.age)
    }
}

impl ProfileUpdate {
    pub fn normalized(self) -> Self {
        Self { bio: self.bio, profile_picture_url: blank_to_none(self.profile_picture_url) }
    }

    pub fn is_empty(&self) -> bool {
        self.bio.is_none() && self.profile_picture_url.is_none()
    }

    pub fn validate(&self) -> Result<(), UserError> {
        check_picture(self.profile_picture_url.as_deref())
    }
}

impl From<profile::Model> for Profile {
    fn from(p: profile::Model) -> Self {
        Self { id: p.id, user_id: p.user_id, bio: p.bio, profile_picture_url: p.profile_picture_url }
    }
}

impl UserWithProfile {
    pub fn from_models(u: user::Model, p: Option<profile::Model>) -> Self {
        Self {
            id: u.id,
            name: u.name,
            age: u.age,
            created_at: u.created_at,
            updated_at: u.updated_at,
            profile: p.map(Profile::from),
        }
    }
}
