//! wc-admin style query strings.
//!
//! Admin pages live at `admin.php?page=wc-admin&path=/customize-store/intro&...`. The router
//! only looks at the `path` parameter; everything else (`category`, `term`, ...) is free-form.

use std::collections::BTreeMap;
use url::Url;

use super::NavigationError;

pub const PAGE_PARAM: &str = "page";
pub const PATH_PARAM: &str = "path";
pub const ADMIN_PAGE: &str = "wc-admin";

/// Parsed view of the current location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: BTreeMap<String, String>,
}

impl Query {
    pub fn parse(url: &Url) -> Self {
        let params = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { params }
    }

    /// Build a query for a wc-admin path with no other parameters
    pub fn for_path(path: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert(PAGE_PARAM.to_string(), ADMIN_PAGE.to_string());
        params.insert(PATH_PARAM.to_string(), path.to_string());
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// The `path` parameter, empty when absent
    pub fn path(&self) -> &str {
        self.params.get(PATH_PARAM).map(String::as_str).unwrap_or("")
    }

    /// Path fragments the way the router splits them: `[0]` is always empty for a rooted path
    pub fn path_fragments(&self) -> Vec<&str> {
        self.path().split('/').collect()
    }

    pub fn path_segment(&self, index: usize) -> Option<&str> {
        self.path().split('/').nth(index)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Replace the path, keeping `page` and adding `extra` params; other params are dropped
    pub fn with_path(&self, extra: &[(&str, &str)], path: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert(
            PAGE_PARAM.to_string(),
            self.get(PAGE_PARAM).unwrap_or(ADMIN_PAGE).to_string(),
        );
        for (key, value) in extra {
            params.insert(key.to_string(), value.to_string());
        }
        params.insert(PATH_PARAM.to_string(), path.to_string());
        Self { params }
    }

    /// Keep everything and overwrite the given params
    pub fn with_params(&self, updates: &[(&str, &str)]) -> Self {
        let mut params = self.params.clone();
        for (key, value) in updates {
            params.insert(key.to_string(), value.to_string());
        }
        Self { params }
    }

    /// Render onto `base`, replacing any existing query string
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_query(None);
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        url
    }
}

/// Parse an admin URL, accepting a bare wc-admin path as shorthand
pub fn parse_admin_url(base: &Url, input: &str) -> Result<Url, NavigationError> {
    if input.starts_with('/') {
        return Ok(Query::for_path(input).to_url(base));
    }
    Url::parse(input).map_err(|source| NavigationError::InvalidUrl {
        input: input.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://shop.test/wp-admin/admin.php").unwrap()
    }

    #[test]
    fn test_parse_reads_path_and_params() {
        let url = Url::parse(
            "https://shop.test/wp-admin/admin.php?page=wc-admin&path=%2Fcustomize-store%2Fintro&category=_all",
        )
        .unwrap();
        let query = Query::parse(&url);

        assert_eq!(query.path(), "/customize-store/intro");
        assert_eq!(query.path_fragments(), vec!["", "customize-store", "intro"]);
        assert_eq!(query.path_segment(2), Some("intro"));
        assert_eq!(query.get("category"), Some("_all"));
    }

    #[test]
    fn test_empty_params_read_as_absent() {
        let url = Url::parse("https://shop.test/wp-admin/admin.php?page=wc-admin&category=").unwrap();
        assert_eq!(Query::parse(&url).get("category"), None);
    }

    #[test]
    fn test_with_path_keeps_page_only() {
        let query = Query::for_path("/customize-store/intro").with_params(&[("term", "shipping")]);
        let moved = query.with_path(&[], "/customize-store/assembler-hub");

        assert_eq!(moved.get(PAGE_PARAM), Some(ADMIN_PAGE));
        assert_eq!(moved.path(), "/customize-store/assembler-hub");
        assert_eq!(moved.get("term"), None);
    }

    #[test]
    fn test_bare_path_is_expanded_against_base() {
        let url = parse_admin_url(&base(), "/customize-store/design-with-ai").unwrap();
        assert_eq!(Query::parse(&url).path(), "/customize-store/design-with-ai");
        assert_eq!(url.path(), "/wp-admin/admin.php");
    }
}
