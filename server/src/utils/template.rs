use crate::error::{ApiError, ApiResult};
use std::io::ErrorKind;
use std::path::Path;

/// Placeholder replaced with the authenticated username.
pub const USERNAME_PLACEHOLDER: &str = "{{ usuario }}";

/// Reads the welcome page from disk. Read on every request so the file can be
/// edited without restarting the server.
pub async fn load_template(path: &Path) -> ApiResult<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            tracing::error!(path = %path.display(), "welcome template not found");
            ApiError::TemplateMissing
        }
        _ => ApiError::Internal(format!("reading {}: {}", path.display(), e)),
    })
}

/// Substitutes the (HTML-escaped) username into every placeholder.
pub fn render_welcome(template: &str, username: &str) -> String {
    template.replace(USERNAME_PLACEHOLDER, &escape_html(username))
}

/// Escapes the five characters that matter inside HTML text and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
