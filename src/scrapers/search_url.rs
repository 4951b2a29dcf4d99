//! Search URL construction.

use crate::config::SiteConfig;

/// Placeholder substituted by [`page_url`].
pub const PAGE_PLACEHOLDER: &str = "{}";

/// Build the search URL for `query` with a trailing page-number placeholder.
///
/// Spaces become `+` (the search engine's word separator). Braces in the
/// query are percent-encoded so the result always carries exactly one
/// placeholder.
pub fn build_page_template(site: &SiteConfig, query: &str) -> String {
    let terms = query
        .replace('{', "%7B")
        .replace('}', "%7D")
        .replace(' ', "+");

    let mut url = site
        .search_template
        .replace("{origin}", &site.origin)
        .replacen(PAGE_PLACEHOLDER, &terms, 1);
    url.push_str("&page=");
    url.push_str(PAGE_PLACEHOLDER);
    url
}

/// Fill the page placeholder of a template from [`build_page_template`].
pub fn page_url(template: &str, page: u32) -> String {
    template.replacen(PAGE_PLACEHOLDER, &page.to_string(), 1)
}

/// Resolve a path to a full URL, handling both absolute and relative paths.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}{}", base_url, path)
    }
}
