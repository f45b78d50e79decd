//! SeaORM entities for the user directory plus the connection provider.
//!
//! Every query helper here filters on `deleted_at IS NULL`; tombstoned rows
//! are never visible through this crate.

pub mod errors;
pub mod db;
pub mod user;
pub mod profile;

#[cfg(test)]
mod tests;
