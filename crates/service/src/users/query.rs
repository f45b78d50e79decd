//! Query plans for listing users.
//!
//! A `UserQuery` is built from caller input and rendered into two statements:
//! a count over the filtered population and a sorted, paged fetch. Both carry
//! caller values as bound parameters only. Rendering goes through `sea_query`
//! and works for any `DbBackend`; nothing here touches a connection.

use std::str::FromStr;

use configs::UsersConfig;
use models::user;
use sea_orm::sea_query::{Alias, Asterisk, Condition, Expr, Func, Order, Query, SelectStatement};
use sea_orm::{DbBackend, Iterable, Statement};
use serde::{Deserialize, Serialize};

use crate::pagination::{PageWindow, Pagination};

/// Ordering of a listing. Ties on name are broken by id so pages never overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    IdAsc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    /// Unknown or missing keys fall back to id order.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name_asc" => Ok(SortOrder::NameAsc),
            "name_desc" => Ok(SortOrder::NameDesc),
            "id" | "id_asc" => Ok(SortOrder::IdAsc),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Raw listing input, as a request layer would hand it over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub min_age: Option<i32>,
    #[serde(default)]
    pub max_age: Option<i32>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// Normalized plan; every field is already clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub sort: SortOrder,
    pub window: PageWindow,
}

// zero and negative bounds impose no constraint
fn bound(v: Option<i32>) -> Option<i32> {
    v.filter(|a| *a > 0)
}

impl UserQuery {
    pub fn from_params(params: &ListParams, cfg: &UsersConfig) -> Self {
        let window = Pagination { page: params.page, per_page: params.page_size }
            .normalize(cfg.default_page_size, cfg.max_page_size);
        Self {
            min_age: bound(params.min_age),
            max_age: bound(params.max_age),
            sort: SortOrder::parse_lenient(params.sort.as_deref()),
            window,
        }
    }

    /// Active rows, ANDed with whichever age bounds are set.
    pub fn condition(&self) -> Condition {
        Condition::all()
            .add(Expr::col((user::Entity, user::Column::DeletedAt)).is_null())
            .add_option(self.min_age.map(|a| Expr::col((user::Entity, user::Column::Age)).gte(a)))
            .add_option(self.max_age.map(|a| Expr::col((user::Entity, user::Column::Age)).lte(a)))
    }

    /// `SELECT COUNT(*) AS count` over the filtered population.
    pub fn count_query(&self) -> SelectStatement {
        Query::select()
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
            .from(user::Entity)
            .cond_where(self.condition())
            .to_owned()
    }

    /// Filtered, ordered, paged user rows.
    pub fn page_query(&self) -> SelectStatement {
        let mut q = Query::select();
        q.columns(user::Column::iter().map(|c| (user::Entity, c)))
            .from(user::Entity)
            .cond_where(self.condition());
        match self.sort {
            SortOrder::NameAsc => { q.order_by((user::Entity, user::Column::Name), Order::Asc); }
            SortOrder::NameDesc => { q.order_by((user::Entity, user::Column::Name), Order::Desc); }
            SortOrder::IdAsc => {}
        }
        q.order_by((user::Entity, user::Column::Id), Order::Asc)
            .limit(self.window.limit())
            .offset(self.window.offset());
        q
    }

    pub fn count_statement(&self, backend: DbBackend) -> Statement {
        backend.build(&self.count_query())
    }

    pub fn page_statement(&self, backend: DbBackend) -> Statement {
        backend.build(&self.page_query())
    }
}
