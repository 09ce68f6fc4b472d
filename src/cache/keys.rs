//! Cache key construction.
//!
//! Keys always start with a logical prefix followed by `:` so that
//! `invalidate_prefix("players")` (pattern `players:*`) reaches every
//! variant of a resource and nothing else.

/// Logical prefixes, one per cached resource family.
pub struct CachePrefix;

impl CachePrefix {
    pub const DASHBOARD: &'static str = "dash";
    pub const PLAYERS: &'static str = "players";
    pub const PLAYER: &'static str = "player";
    pub const CLUBS: &'static str = "clubs";
    pub const CLUB: &'static str = "club";
}

/// Drops empty values, sorts by key (then value) and joins as `k=v&k=v`.
/// Keys and values are percent-encoded first, so a decoded `&` or `=`
/// inside a value can never forge another pair.
fn sorted_query<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(String, String)> = params
        .into_iter()
        .filter(|(_, v)| !v.as_ref().is_empty())
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Deterministic key for a prefix plus a parameter set, independent of the
/// order the parameters were supplied in.
///
/// `build_cache_key("players", [("limit", "20"), ("page", "1")])`
/// yields `players:limit=20&page=1`; no usable parameters yields
/// `players:all`.
pub fn build_cache_key<I, K, V>(prefix: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let query = sorted_query(params);
    if query.is_empty() {
        format!("{prefix}:all")
    } else {
        format!("{prefix}:{query}")
    }
}

/// Key for a cached HTTP response:
/// `{prefix}[:u{user}]:{path}:{sorted query | "default"}`.
pub fn route_cache_key<I, K, V>(prefix: &str, user: Option<&str>, path: &str, query: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let query = sorted_query(query);
    let query = if query.is_empty() { "default" } else { query.as_str() };
    match user {
        Some(user) => format!("{prefix}:u{user}:{path}:{query}"),
        None => format!("{prefix}:{path}:{query}"),
    }
}

/// `SCAN` pattern matching every key under `prefix`.
pub fn prefix_pattern(prefix: &str) -> String {
    format!("{prefix}:*")
}
