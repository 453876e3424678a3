//! Tag classification

use crate::BuilderConfig;
use text_engine::{FontFamily, FontSlant, FontWeight, StyleAttr};

const BLOCKING_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "ul", "ol", "li", "dl", "dt", "dd", "table",
    "td", "th", "tr",
];

const FLUSH_ONLY_TAGS: &[&str] = &["br", "img", "input", "select"];

/// Tags that end the current inline container
pub fn is_blocking(tag: &str) -> bool {
    BLOCKING_TAGS.contains(&tag)
}

/// Tags that emit the pending word; a superset of the blocking tags
pub fn is_flushing(tag: &str) -> bool {
    is_blocking(tag) || FLUSH_ONLY_TAGS.contains(&tag)
}

/// Tags whose text content is discarded
pub fn is_ignored(tag: &str) -> bool {
    matches!(tag, "head" | "script" | "style")
}

/// Style attributes a formatting tag applies, in opening order
pub fn style_attrs(tag: &str, config: &BuilderConfig) -> Vec<StyleAttr> {
    let heading = |percent| vec![StyleAttr::Scale(percent), StyleAttr::Weight(FontWeight::SemiBold)];
    match tag {
        "b" | "strong" => vec![StyleAttr::Weight(FontWeight::Bold)],
        "i" | "em" => vec![StyleAttr::Slant(FontSlant::Italic)],
        "code" | "pre" => vec![StyleAttr::Family(FontFamily::Monospace)],
        "sub" => vec![StyleAttr::Rise(-5), StyleAttr::Scale(80)],
        "sup" => vec![StyleAttr::Rise(5), StyleAttr::Scale(80)],
        "h1" => heading(180),
        "h2" => heading(160),
        "h3" => heading(140),
        "h4" => heading(130),
        "h5" => heading(120),
        "h6" => heading(110),
        "a" => vec![
            StyleAttr::Foreground(config.link_color),
            StyleAttr::Underline,
        ],
        _ => Vec::new(),
    }
}

/// Parse a colspan/rowspan value.
///
/// Leading digits are read after optional whitespace; anything else yields
/// 1. The result is clamped to `1..=65534`.
pub fn parse_span(value: Option<&str>) -> u16 {
    let Some(value) = value else {
        return 1;
    };
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return 1;
    }
    let parsed = digits.parse::<u64>().unwrap_or(u64::MAX);
    parsed.clamp(1, 65534) as u16
}

/// Marker text of a list item: "*" for unordered lists, "N." otherwise
pub fn list_marker(counter: u32) -> String {
    if counter == 0 {
        "*".to_string()
    } else {
        format!("{}.", counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(is_blocking("td"));
        assert!(is_flushing("td"));
        assert!(is_flushing("img"));
        assert!(!is_blocking("img"));
        assert!(!is_flushing("a"));
        assert!(is_ignored("script"));
    }

    #[test]
    fn test_parse_span() {
        assert_eq!(parse_span(Some("2")), 2);
        assert_eq!(parse_span(Some(" 3")), 3);
        assert_eq!(parse_span(Some("4px")), 4);
        assert_eq!(parse_span(Some("0")), 1);
        assert_eq!(parse_span(Some("-1")), 1);
        assert_eq!(parse_span(Some("wide")), 1);
        assert_eq!(parse_span(Some("70000")), 65534);
        assert_eq!(parse_span(Some("99999999999999999999999")), 65534);
        assert_eq!(parse_span(None), 1);
    }

    #[test]
    fn test_heading_and_link_styles() {
        let config = BuilderConfig::default();
        assert_eq!(
            style_attrs("h3", &config),
            vec![StyleAttr::Scale(140), StyleAttr::Weight(FontWeight::SemiBold)]
        );
        assert_eq!(
            style_attrs("a", &config),
            vec![StyleAttr::Foreground(config.link_color), StyleAttr::Underline]
        );
        assert!(style_attrs("div", &config).is_empty());
    }

    #[test]
    fn test_list_markers() {
        assert_eq!(list_marker(0), "*");
        assert_eq!(list_marker(3), "3.");
    }
}
