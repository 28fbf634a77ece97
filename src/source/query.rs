//! Page query parameters.
//!
//! `q` carries an inline route, `id` names a remote route set. Values are
//! decoded the way `URLSearchParams` decodes them, so `%7C` and `+` work.

/// Parsed query parameters that drive route resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub q: Option<String>,
    pub id: Option<String>,
}

impl QueryParams {
    /// Parses a query string, with or without the leading `?`.
    ///
    /// Empty values count as absent. The first occurrence of a key wins.
    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut params = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "q" if params.q.is_none() => params.q = Some(value.into_owned()),
                "id" if params.id.is_none() => params.id = Some(value.into_owned()),
                _ => {}
            }
        }

        params
    }
}

/// Reads the query string of the current page.
#[cfg(target_arch = "wasm32")]
pub fn parse_from_url() -> QueryParams {
    let Some(search) = web_sys::window().and_then(|w| w.location().search().ok()) else {
        return QueryParams::default();
    };
    QueryParams::parse(&search)
}

/// Reads the query string from the first command-line argument.
#[cfg(not(target_arch = "wasm32"))]
pub fn parse_from_url() -> QueryParams {
    std::env::args()
        .nth(1)
        .map(|arg| QueryParams::parse(&arg))
        .unwrap_or_default()
}
