use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Where rendered pages go: the per-user cache dir, or the system temp dir
/// when the platform doesn't have one.
pub fn artifact_dir() -> PathBuf {
    ProjectDirs::from("ar", "ifts29", "tareas")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
}

/// Adds a small "active session" box right after `<body>`. Pages without a
/// `<body>` tag are returned unchanged.
pub fn inject_session_banner(html: &str, username: &str) -> String {
    let banner = format!(
        r#"<body>
    <div style="background: #e7f3ff; padding: 10px; margin: 10px 0; border-radius: 5px; border-left: 4px solid #2196F3;">
        <strong>Sesión activa:</strong> {}<br>
        <small>Archivo generado por el cliente de consola</small>
    </div>"#,
        escape_html(username)
    );
    html.replacen("<body>", &banner, 1)
}

/// Writes the page to `dir` and returns the path. One file per process, so two
/// clients on the same machine don't clobber each other.
pub fn write_page(dir: &Path, html: &str, username: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Could not create {}", dir.display()))?;
    let path = dir.join(format!("tareas_sistema_{}.html", std::process::id()));
    fs::write(&path, inject_session_banner(html, username))
        .with_context(|| format!("Could not write {}", path.display()))?;
    Ok(path)
}

/// Same five characters the server escapes in its welcome page.
fn escape_html(input: &str) -> String {
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
