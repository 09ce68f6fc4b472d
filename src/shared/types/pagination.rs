//! Pagination / sort / search normalization shared by every list endpoint.
//!
//! Raw query-string values are untrusted: anything missing or malformed
//! falls back to a default and `limit` is always clamped to the configured
//! ceiling. Normalization never fails.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Default page size when the client does not send a usable `limit`.
pub const DEFAULT_LIMIT: u64 = 20;

/// Hard ceiling for `limit`, applied regardless of client input.
pub const MAX_LIMIT: u64 = 100;

/// Server-side page size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl PaginationLimits {
    /// Builds limits from configuration, keeping them self-consistent
    /// (`max_limit >= 1`, `1 <= default_limit <= max_limit`).
    pub fn new(default_limit: u64, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }
}

/// Raw pagination query parameters.
///
/// Every field is kept as text so that a malformed value (`page=abc`)
/// degrades to a default instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number (1-based). Default: 1
    pub page: Option<String>,
    /// Page size (1–100). Default: 20
    pub limit: Option<String>,
    /// Sort field name
    pub sort: Option<String>,
    /// `asc` or `desc` (default)
    pub order: Option<String>,
    /// Free-text search
    pub search: Option<String>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl From<SortOrder> for sea_orm::Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        }
    }
}

/// Normalized pagination descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPagination {
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
    /// Raw sort name as sent by the client (or the default). Resolve it with
    /// [`ParsedPagination::sort_column`] before it reaches a query.
    pub sort: String,
    pub order: SortOrder,
    pub search: Option<String>,
}

impl ParsedPagination {
    /// Maps the raw `sort` name through an allow-list, falling back to
    /// `fallback` for anything not listed.
    pub fn sort_column<C: Copy>(&self, allowed: &[(&str, C)], fallback: C) -> C {
        allowed
            .iter()
            .find(|(name, _)| *name == self.sort)
            .map(|(_, column)| *column)
            .unwrap_or(fallback)
    }

    pub fn meta(&self, total: u64) -> PaginationMeta {
        PaginationMeta::new(total, self.page, self.limit)
    }
}

/// Lenient integer coercion: numeric text is accepted and truncated,
/// everything else is `None`.
fn coerce_int(raw: Option<&str>) -> Option<i64> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(v) = value.parse::<i64>() {
        return Some(v);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

/// Normalizes raw pagination input. Never fails.
pub fn parse_pagination(
    query: &PaginationQuery,
    default_sort: &str,
    limits: &PaginationLimits,
) -> ParsedPagination {
    let page = coerce_int(query.page.as_deref()).unwrap_or(1).max(1) as u64;

    let limit = match coerce_int(query.limit.as_deref()) {
        Some(v) if v != 0 => v,
        _ => limits.default_limit as i64,
    };
    let limit = limit.clamp(1, limits.max_limit.max(1) as i64) as u64;

    // Storage binds offsets as signed 64-bit integers.
    let page = page.min(i64::MAX as u64 / limit + 1);
    let offset = (page - 1) * limit;

    let sort = query
        .sort
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default_sort)
        .to_string();

    let order = match query.order.as_deref() {
        Some(o) if o.trim().eq_ignore_ascii_case("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    };

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    ParsedPagination {
        page,
        limit,
        offset,
        sort,
        order,
        search,
    }
}

/// Page metadata returned next to list payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// A page of items plus its metadata, as produced by the service layer.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, meta: PaginationMeta) -> Self {
        Self { items, meta }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> PaginationQuery {
        let mut q = PaginationQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "page" => q.page = v,
                "limit" => q.limit = v,
                "sort" => q.sort = v,
                "order" => q.order = v,
                "search" => q.search = v,
                _ => unreachable!(),
            }
        }
        q
    }

    fn parse(pairs: &[(&str, &str)]) -> ParsedPagination {
        parse_pagination(&query(pairs), "created_at", &PaginationLimits::default())
    }

    #[test]
    fn empty_query_uses_defaults() {
        let p = parse(&[]);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
        assert_eq!(p.sort, "created_at");
        assert_eq!(p.order, SortOrder::Desc);
        assert_eq!(p.search, None);
    }

    #[test]
    fn limit_is_clamped_to_ceiling() {
        assert_eq!(parse(&[("limit", "99999")]).limit, 100);
        assert_eq!(parse(&[("limit", "-5")]).limit, 1);
        assert_eq!(parse(&[("limit", "0")]).limit, 20);
        assert_eq!(parse(&[("limit", "abc")]).limit, 20);
        assert_eq!(parse(&[("limit", "35")]).limit, 35);
    }

    #[test]
    fn limit_stays_in_bounds_for_any_input() {
        let inputs = ["", " ", "1", "100", "101", "1e9", "-1e9", "NaN", "Infinity", "7.9", "x1"];
        for raw in inputs {
            let p = parse(&[("limit", raw)]);
            assert!((1..=100).contains(&p.limit), "limit={raw:?} gave {}", p.limit);
        }
    }

    #[test]
    fn invalid_page_normalizes_to_one() {
        assert_eq!(parse(&[("page", "0")]).page, 1);
        assert_eq!(parse(&[("page", "-3")]).page, 1);
        assert_eq!(parse(&[("page", "two")]).page, 1);
        assert_eq!(parse(&[("page", "")]).page, 1);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let p = parse(&[("page", "3"), ("limit", "25")]);
        assert_eq!(p.offset, 50);
        let p = parse(&[("page", "2.8"), ("limit", "10")]);
        assert_eq!(p.page, 2);
        assert_eq!(p.offset, 10);
    }

    #[test]
    fn huge_page_keeps_offset_bindable() {
        for raw in ["1e30", "99999999999999999999", "9223372036854775807"] {
            let p = parse(&[("page", raw), ("limit", "20")]);
            assert!(p.offset <= i64::MAX as u64, "page={raw:?} gave offset {}", p.offset);
            assert_eq!(p.offset, (p.page - 1) * p.limit);
        }
        let p = parse(&[("page", "1e30"), ("limit", "1")]);
        assert_eq!(p.offset, i64::MAX as u64);
    }

    #[test]
    fn order_is_case_insensitive_asc_else_desc() {
        assert_eq!(parse(&[("order", "asc")]).order, SortOrder::Asc);
        assert_eq!(parse(&[("order", "AsC")]).order, SortOrder::Asc);
        assert_eq!(parse(&[("order", "desc")]).order, SortOrder::Desc);
        assert_eq!(parse(&[("order", "sideways")]).order, SortOrder::Desc);
    }

    #[test]
    fn search_is_trimmed_and_blank_is_absent() {
        assert_eq!(parse(&[("search", "")]).search, None);
        assert_eq!(parse(&[("search", "   ")]).search, None);
        assert_eq!(parse(&[("search", " Salem ")]).search.as_deref(), Some("Salem"));
    }

    #[test]
    fn sort_keeps_raw_value_but_resolves_through_allow_list() {
        let p = parse(&[("sort", "last_name; DROP TABLE players")]);
        assert_eq!(p.sort, "last_name; DROP TABLE players");

        let allowed = [("lastName", 1u8), ("createdAt", 2u8)];
        assert_eq!(p.sort_column(&allowed, 2), 2);
        assert_eq!(parse(&[("sort", "lastName")]).sort_column(&allowed, 2), 1);
    }

    #[test]
    fn configured_limits_are_respected() {
        let limits = PaginationLimits::new(10, 50);
        let p = parse_pagination(&query(&[]), "name", &limits);
        assert_eq!(p.limit, 10);
        let p = parse_pagination(&query(&[("limit", "75")]), "name", &limits);
        assert_eq!(p.limit, 50);
    }

    #[test]
    fn meta_total_pages_rounds_up() {
        assert_eq!(PaginationMeta::new(0, 1, 20).total_pages, 0);
        assert_eq!(PaginationMeta::new(20, 1, 20).total_pages, 1);
        assert_eq!(PaginationMeta::new(21, 1, 20).total_pages, 2);
    }

    #[test]
    fn meta_serializes_camel_case() {
        let json = serde_json::to_value(PaginationMeta::new(45, 2, 20)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"page": 2, "limit": 20, "total": 45, "totalPages": 3})
        );
    }
}
