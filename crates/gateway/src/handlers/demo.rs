//! Demo endpoints kept for the site's smoke checks

use axum::{
    extract::{Path, RawQuery},
    response::Html,
};

/// Greeting page
pub async fn home(Path(name): Path<String>) -> Html<String> {
    Html(format!("<h1>Hello {} </br> </h1>", escape_html(&name)))
}

/// Echo the raw query string back
pub async fn echo_query(RawQuery(query): RawQuery) -> String {
    query.unwrap_or_default()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
