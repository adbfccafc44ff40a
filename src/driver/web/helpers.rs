use base64::{engine::general_purpose, Engine as _};
use log::warn;

/// Returns true if the element is rendered with a non-zero size.
pub const IS_VISIBLE_JS: &str = r#"function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return style.visibility !== "hidden"
        && style.display !== "none"
        && rect.width > 0
        && rect.height > 0;
}"#;

/// Returns true if the element accepts input.
pub const IS_ENABLED_JS: &str = r#"function() {
    return !this.disabled && this.getAttribute("aria-disabled") !== "true";
}"#;

/// Focus the element and select its contents, so typing replaces them.
pub const CLEAR_AND_FOCUS_JS: &str = r#"function() {
    this.focus();
    if (typeof this.select === "function") {
        this.select();
    }
}"#;

/// Whether the path of `url` ends with `path`, ignoring any query string or fragment.
pub fn path_matches(url: &str, path: &str) -> bool {
    url.split(['?', '#'])
        .next()
        .map_or(false, |without_query| without_query.ends_with(path))
}

/// Convert a response body as delivered by the DevTools protocol into text.
pub fn decode_body(body: String, base64_encoded: bool) -> String {
    if !base64_encoded {
        return body;
    }
    match general_purpose::STANDARD.decode(&body) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("Response body isn't valid base64 ({}), using it as is", e);
            body
        }
    }
}
