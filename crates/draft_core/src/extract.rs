use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

/// Placeholder used when no title can be derived from content.
pub const UNTITLED: &str = "Untitled article";
/// Platform limit on title length, in codepoints.
pub const MAX_TITLE_CHARS: usize = 64;
/// Digest length before truncation, in codepoints.
pub const MAX_DIGEST_CHARS: usize = 100;
/// Appended to a truncated digest.
pub const ELLIPSIS: char = '…';

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Title from raw Markdown: the first `# ` heading line whose text fits the
/// title limit. Longer headings are skipped, never truncated.
pub fn extract_title(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("# "))
        .map(str::trim)
        .find(|title| !title.is_empty() && fits_title(title))
        .map(ToOwned::to_owned)
}

/// Title from rendered HTML:
/// - text of the first `h1`..`h6` element, nested markup stripped
/// - otherwise the first non-empty rendered line that fits the title limit
/// - otherwise [`UNTITLED`].
pub fn extract_title_from_html(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    let heading_sel = Selector::parse("h1, h2, h3, h4, h5, h6").ok();

    let heading = heading_sel
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .map(|node| node.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());
    if let Some(title) = heading {
        return title;
    }

    html.trim()
        .lines()
        .map(strip_markup)
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty() && fits_title(text))
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Plain-text digest of rendered HTML: tags removed, whitespace collapsed,
/// cut at [`MAX_DIGEST_CHARS`] codepoints with a trailing [`ELLIPSIS`].
///
/// Entities are left encoded so a digest fed back in comes out unchanged.
pub fn generate_digest(html: &str) -> String {
    let text = strip_tags(html);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_DIGEST_CHARS {
        return collapsed;
    }
    let mut digest: String = collapsed.chars().take(MAX_DIGEST_CHARS).collect();
    digest.push(ELLIPSIS);
    digest
}

fn fits_title(text: &str) -> bool {
    text.chars().count() <= MAX_TITLE_CHARS
}

fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect()
}
