//! Service layer for the user resource.
//! - `users`: create/list/update/delete of a user and its profile, each write in one transaction.
//! - `pagination`: clamping of caller page input into offsets.
//!
//! Entities and row-level helpers live in the `models` crate.

pub mod pagination;
pub mod users;
#[cfg(test)]
pub mod test_support;

pub use users::{UserError, UserService};
