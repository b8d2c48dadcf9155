use super::with_store;
use crate::{AppState, Result};
use axum::extract::State;
use axum::http::header::LAST_MODIFIED;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;
use tracing::debug;

const MARKDOWN_IT: &str = "https://cdn.jsdelivr.net/npm/markdown-it@14/dist/markdown-it.min.js";

/// GET /index.html
///
/// Renders the current document as markdown in the browser. The raw text is
/// embedded escaped and converted client-side.
pub async fn get_view(State(state): State<Arc<AppState>>) -> Result<Response> {
    let (version, body) = with_store(&state, |store| store.view()).await?;
    debug!("Rendering view of version {}", version);

    let text = String::from_utf8_lossy(&body);
    let page = render_page(&state.store.location().key, &text);

    Ok(([(LAST_MODIFIED, version.to_header())], Html(page)).into_response())
}

fn render_page(title: &str, markdown: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="{script}"></script>
</head>
<body>
<textarea id="source" hidden>{source}</textarea>
<main id="content"></main>
<script>
document.getElementById("content").innerHTML =
  window.markdownit().render(document.getElementById("source").value);
</script>
</body>
</html>
"#,
        title = escape_html(title),
        script = MARKDOWN_IT,
        source = escape_html(markdown),
    )
}

/// Escape the characters that are significant inside HTML text and attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
