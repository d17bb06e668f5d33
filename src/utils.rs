/// Shared string helpers for the lake quality service
///
/// Placeholder replaced with the lake id in snippet URL templates.
pub const LAKE_ID_PLACEHOLDER: &str = "{id}";

/// Build the snippet URL for a lake from a template containing `{id}`.
///
/// # Examples
///
/// ```
/// use lake_quality_service::utils::snippet_url;
///
/// assert_eq!(
///     snippet_url("https://example.org/lua/{id}-de-content.snippet", "bgwl0085"),
///     "https://example.org/lua/bgwl0085-de-content.snippet"
/// );
/// ```
pub fn snippet_url(template: &str, lake_id: &str) -> String {
    template.replace(LAKE_ID_PLACEHOLDER, lake_id)
}

/// Remove every whitespace character, including non-breaking spaces that
/// the portal puts into table cells.
///
/// ```
/// use lake_quality_service::utils::remove_whitespace;
///
/// assert_eq!(remove_whitespace(" 1 200,\u{a0}300 "), "1200,300");
/// ```
pub fn remove_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Split a comma separated list, trimming entries and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
