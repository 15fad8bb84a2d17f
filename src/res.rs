use axum::{debug_handler, http::{header, StatusCode}, response::{Html, IntoResponse, Response}};
use pulldown_cmark::{CowStr, Event, Parser, Tag};
use tower_sessions::Session;

use crate::{db::User, session, AppResult};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

#[debug_handler]
pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_res!(str, "/style.css"),
    )
}

/// Replaces every `{key}` in `template` in a single pass, so substituted text is never rescanned.
/// Unknown placeholders are left as they are.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let key_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let value = after[key_len..]
            .starts_with('}')
            .then(|| vars.iter().find(|(k, _)| *k == &after[..key_len]))
            .flatten();

        match value {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[key_len + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn escape(text: &str) -> String {
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

/// Markdown to HTML; raw HTML in the source comes out as text.
pub fn markdown(source: &str) -> String {
    fn neutered(url: CowStr<'_>) -> CowStr<'_> {
        let lowered = url.trim_start().to_ascii_lowercase();
        if ["javascript:", "vbscript:", "data:"].iter().any(|s| lowered.starts_with(s)) {
            CowStr::Borrowed("#")
        } else {
            url
        }
    }

    let parser = Parser::new(source).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutered(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutered(dest_url),
            title,
            id,
        }),
        _ => event,
    });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

/// Coarse "3 hours ago" rendering of a UNIX timestamp.
pub fn timesince(then: i64, now: i64) -> String {
    const UNITS: [(i64, &str); 6] = [
        (365 * 24 * 60 * 60, "year"),
        (30 * 24 * 60 * 60, "month"),
        (7 * 24 * 60 * 60, "week"),
        (24 * 60 * 60, "day"),
        (60 * 60, "hour"),
        (60, "minute"),
    ];

    let elapsed = (now - then).max(0);
    for (seconds, unit) in UNITS {
        let count = elapsed / seconds;
        if count > 0 {
            let plural = if count == 1 { "" } else { "s" };
            return format!("{count} {unit}{plural} ago");
        }
    }
    "just now".to_owned()
}

/// Wraps `content` in the site layout, consuming any pending flash messages.
pub async fn page(
    session: &Session,
    viewer: Option<&User>,
    title: &str,
    content: &str,
) -> AppResult<Html<String>> {
    let nav = match viewer {
        Some(user) => fill(include_res!(str, "/pages/nav_user.html"), &[
            ("id", &user.id),
            ("username", &escape(&user.username)),
        ]),
        None => include_res!(str, "/pages/nav_anon.html").to_owned(),
    };

    let flashes: String = session::take_flashes(session)
        .await?
        .into_iter()
        .map(|flash| fill(include_res!(str, "/pages/flash.html"), &[
            ("level", flash.level.as_str()),
            ("text", &escape(&flash.text)),
        ]))
        .collect();

    Ok(Html(fill(include_res!(str, "/pages/layout.html"), &[
        ("title", &escape(title)),
        ("nav", &nav),
        ("flash", &flashes),
        ("content", content),
    ])))
}

pub fn sorry(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(fill(include_res!(str, "/pages/sorry.html"), &[("what", &escape(what))])),
    ).into_response()
}
