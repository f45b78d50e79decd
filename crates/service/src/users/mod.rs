//! Users module: the User + Profile pair managed as one resource.
//!
//! - `query` renders filter/sort/page plans into parameterized statements.
//! - `transaction` wraps multi-statement writes and owns the delete strategy.
//! - `service` exposes create/list/update/delete on top of both.

pub mod domain;
pub mod errors;
pub mod query;
pub mod transaction;
pub mod service;

pub use errors::UserError;
pub use service::UserService;
