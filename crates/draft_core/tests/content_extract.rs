use draft_core::{
    extract_title, extract_title_from_html, generate_digest, ELLIPSIS, MAX_DIGEST_CHARS,
    MAX_TITLE_CHARS, UNTITLED,
};
use pretty_assertions::assert_eq;

#[test]
fn markdown_title_from_first_h1_line() {
    assert_eq!(
        extract_title("# 标题\n\n这是一个**加粗**文本的例子。").as_deref(),
        Some("标题")
    );
}

#[test]
fn markdown_title_ignores_deeper_headings_and_missing_space() {
    assert_eq!(extract_title("## Sub\n#NoSpace\ntext"), None);
    assert_eq!(
        extract_title("## Sub\n   #   Padded title  \n").as_deref(),
        Some("Padded title")
    );
}

#[test]
fn markdown_title_skips_overlong_candidates() {
    let long = "长".repeat(MAX_TITLE_CHARS + 1);
    let exact = "字".repeat(MAX_TITLE_CHARS);
    let markdown = format!("# {long}\n\n# {exact}\n");
    assert_eq!(extract_title(&markdown), Some(exact));
}

#[test]
fn markdown_title_never_exceeds_limit() {
    let inputs = [
        String::new(),
        "# a".to_string(),
        format!("# {}", "x".repeat(200)),
        format!("# {}\n# ok", "é".repeat(65)),
        "#\n# \n#  \n".to_string(),
    ];
    for input in &inputs {
        if let Some(title) = extract_title(input) {
            assert!(title.chars().count() <= MAX_TITLE_CHARS, "{input:?}");
            assert!(!title.is_empty());
        }
    }
}

#[test]
fn html_title_uses_first_heading_of_any_level() {
    let html = "<section><p>intro</p><h3>Third <em>level</em></h3><h1>Later</h1></section>";
    assert_eq!(extract_title_from_html(html), "Third level");
}

#[test]
fn html_title_falls_back_to_first_short_line() {
    let long_line = format!("<p>{}</p>", "y".repeat(70));
    let html = format!("<section>\n{long_line}\n<p>  Short <b>line</b> </p>\n</section>");
    assert_eq!(extract_title_from_html(&html), "Short line");
}

#[test]
fn html_title_placeholder_when_nothing_qualifies() {
    let html = format!("<section>\n<p>{}</p>\n</section>", "z".repeat(80));
    assert_eq!(extract_title_from_html(&html), UNTITLED);
    assert_eq!(extract_title_from_html(""), UNTITLED);
}

#[test]
fn digest_strips_markup_and_collapses_whitespace() {
    let html = "<section>\n  <h1>标题</h1>\n\n<p>这是一个 <strong>加粗</strong>\t文本</p></section>";
    assert_eq!(generate_digest(html), "标题 这是一个 加粗 文本");
}

#[test]
fn digest_truncates_with_ellipsis() {
    let html = format!("<p>{}</p>", "字".repeat(150));
    let digest = generate_digest(&html);
    assert_eq!(digest.chars().count(), MAX_DIGEST_CHARS + 1);
    assert!(digest.ends_with(ELLIPSIS));
    assert!(digest.starts_with(&"字".repeat(MAX_DIGEST_CHARS)));
}

#[test]
fn digest_of_exactly_limit_is_untouched() {
    let text = "a".repeat(MAX_DIGEST_CHARS);
    assert_eq!(generate_digest(&format!("<p>{text}</p>")), text);
}

#[test]
fn digest_is_stable_when_reapplied_to_short_output() {
    let inputs = [
        "<p>one   two</p>",
        "<section><h2>Head</h2><ul><li>a</li><li>b</li></ul></section>",
        "plain text only",
        "<p>&lt;b&gt;bold&lt;/b&gt; text</p>",
        "a &amp; b &lt; c",
        "<<a>b> x < y",
    ];
    for input in inputs {
        let once = generate_digest(input);
        assert!(once.chars().count() <= MAX_DIGEST_CHARS);
        assert_eq!(generate_digest(&once), once);
    }
}

#[test]
fn digest_keeps_escaped_markup_as_text() {
    assert_eq!(
        generate_digest("<p>&lt;b&gt;bold&lt;/b&gt; text</p>"),
        "&lt;b&gt;bold&lt;/b&gt; text"
    );
}
