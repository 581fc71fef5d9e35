//! Markdown to blog-ready HTML.
//!
//! Links are rewritten on parsed link events, so only real links change.
//! Table styling runs on the rendered output; the renderer escapes any
//! literal `<table>` in prose or code, so only real markup is styled.

use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, html};
use regex::{Captures, Regex};

use crate::constants::BLOG_LINK_PREFIX;

pub const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%; border: 1px solid #ddd;";
pub const HEADER_CELL_STYLE: &str =
    "border: 1px solid #ddd; padding: 8px; background-color: #f2f2f2; text-align: left;";
pub const CELL_STYLE: &str = "border: 1px solid #ddd; padding: 8px;";

static TABLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(table|th|td)(\s[^>]*)?>").expect("valid table tag regex"));

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"style\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid style regex")
});

static HREF_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).expect("valid href regex"));

/// Render markdown (with tables) and apply blog link and table styling rules.
pub fn to_rich_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if link_type != LinkType::Email => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(rewrite_href(&dest_url)),
            title,
            id,
        }),
        Event::Html(raw) => Event::Html(CowStr::from(rewrite_raw_hrefs(&raw))),
        Event::InlineHtml(raw) => Event::InlineHtml(CowStr::from(rewrite_raw_hrefs(&raw))),
        other => other,
    });

    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, events);

    style_tables(&rendered)
}

fn is_external(target: &str) -> bool {
    let lower = target.trim_start().to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with('#')
}

/// Relative targets are moved under the blog path
pub fn rewrite_href(target: &str) -> String {
    if is_external(target) || target.starts_with(BLOG_LINK_PREFIX) {
        return target.to_string();
    }
    format!("{}{}", BLOG_LINK_PREFIX, target.trim_start_matches('/'))
}

fn rewrite_raw_hrefs(fragment: &str) -> String {
    HREF_ATTR
        .replace_all(fragment, |caps: &Captures| {
            format!("href=\"{}\"", rewrite_href(&caps[1]))
        })
        .into_owned()
}

fn style_for(tag: &str) -> &'static str {
    match tag {
        "table" => TABLE_STYLE,
        "th" => HEADER_CELL_STYLE,
        _ => CELL_STYLE,
    }
}

/// Inject inline styles into every `<table>`, `<th>` and `<td>`. An existing
/// style attribute (column alignment) is kept after the injected rules.
fn style_tables(html: &str) -> String {
    TABLE_TAG
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[1];
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            let injected = style_for(tag);

            if STYLE_ATTR.is_match(attrs) {
                let merged = STYLE_ATTR.replace(attrs, |style: &Captures| {
                    let existing = style.get(1).or_else(|| style.get(2)).map_or("", |m| m.as_str());
                    format!("style=\"{injected} {}\"", existing.replace('"', "'"))
                });
                format!("<{tag}{merged}>")
            } else {
                format!("<{tag} style=\"{injected}\"{attrs}>")
            }
        })
        .into_owned()
}
