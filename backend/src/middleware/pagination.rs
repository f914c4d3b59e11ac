use std::collections::HashMap;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;
/// Highest page whose offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

const RESERVED_PARAMS: [&str; 4] = ["page", "limit", "sortBy", "order"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Paging, sorting and filtering parameters of a list endpoint.
///
/// Everything that is not `page`, `limit`, `sortBy` or `order` is kept as a
/// filter; each service decides which filter keys and sort columns it knows.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub sort_by: Option<String>,
    pub order: SortOrder,
    pub filters: HashMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: None,
            order: SortOrder::Asc,
            filters: HashMap::new(),
        }
    }
}

impl ListQuery {
    pub fn from_params(mut params: HashMap<String, String>) -> Self {
        let page = params
            .get("page")
            .and_then(|p| p.parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE)
            .clamp(1, MAX_PAGE);

        let limit = params
            .get("limit")
            .and_then(|l| l.parse::<i64>().ok())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);

        let sort_by = params.get("sortBy").filter(|s| !s.is_empty()).cloned();

        let order = match params.get("order").map(|o| o.to_lowercase()).as_deref() {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };

        for key in RESERVED_PARAMS {
            params.remove(key);
        }
        params.retain(|_, value| !value.is_empty());

        Self {
            page,
            limit,
            sort_by,
            order,
            filters: params,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Map `sortBy` onto a whitelisted column, falling back to `default`.
    pub fn sort_column(&self, allowed: &[(&str, &'static str)], default: &'static str) -> &'static str {
        self.sort_by
            .as_deref()
            .and_then(|requested| {
                allowed
                    .iter()
                    .find(|(name, _)| *name == requested)
                    .map(|(_, column)| *column)
            })
            .unwrap_or(default)
    }
}

impl FromRequest for ListQuery {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = web::Query::<HashMap<String, String>>::from_query(req.query_string())
            .map(|params| ListQuery::from_params(params.into_inner()))
            .map_err(|_| AppError::validation("Invalid query string"));

        ready(result)
    }
}
