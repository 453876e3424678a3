//! Tag-soup tokenizer for local documents
//!
//! Produces the start/characters/end events the document builder consumes.
//! Nothing is validated: unknown tags pass through, unclosed tags stay
//! open, and a stray `<` is text.

use doc_builder::MarkupEvent;
use std::borrow::Cow;

/// Elements whose content is taken verbatim up to the matching end tag
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Split `input` into markup events
pub fn tokenize(input: &str) -> Vec<MarkupEvent> {
    let mut events = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let Some(open) = rest.find('<') else {
            push_text(&mut events, rest);
            break;
        };
        push_text(&mut events, &rest[..open]);
        rest = &rest[open..];

        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            rest = rest.find('>').map_or("", |end| &rest[end + 1..]);
        } else if let Some(tag) = rest.strip_prefix("</") {
            let end = tag_end(tag);
            let name = tag_name(&tag[..end]);
            if !name.is_empty() {
                events.push(MarkupEvent::End { name });
            }
            rest = tag.get(end + 1..).unwrap_or("");
        } else if rest[1..].starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            let tag = &rest[1..];
            let end = tag_end(tag);
            let (name, attrs) = parse_start_tag(&tag[..end]);
            rest = tag.get(end + 1..).unwrap_or("");

            let raw = RAW_TEXT_ELEMENTS.contains(&name.as_str());
            events.push(MarkupEvent::Start {
                name: name.clone(),
                attrs,
            });
            if raw {
                let close = format!("</{}", name);
                let content_end = rest
                    .to_ascii_lowercase()
                    .find(&close)
                    .unwrap_or(rest.len());
                if content_end > 0 {
                    events.push(MarkupEvent::Characters(rest[..content_end].to_string()));
                }
                rest = &rest[content_end..];
            }
        } else {
            push_text(&mut events, "<");
            rest = &rest[1..];
        }
    }
    events
}

/// Offset of the `>` closing a tag, skipping quoted attribute values
fn tag_end(tag: &str) -> usize {
    let mut quote = None;
    for (offset, ch) in tag.char_indices() {
        match (quote, ch) {
            (None, '>') => return offset,
            (None, '"' | '\'') => quote = Some(ch),
            (Some(open), _) if ch == open => quote = None,
            _ => {}
        }
    }
    tag.len()
}

fn tag_name(tag: &str) -> String {
    tag.trim_start()
        .split(|ch: char| ch.is_whitespace() || ch == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn parse_start_tag(tag: &str) -> (String, Vec<(String, String)>) {
    let name = tag_name(tag);
    let mut attrs = Vec::new();
    let mut rest = tag[name.len()..].trim_end_matches('/');

    loop {
        rest = rest.trim_start_matches(|ch: char| ch.is_whitespace() || ch == '/');
        if rest.is_empty() {
            break;
        }
        let name_end = rest
            .find(|ch: char| ch.is_whitespace() || ch == '=' || ch == '/')
            .unwrap_or(rest.len());
        let key = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();

        let mut value = String::new();
        if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            let (raw, remainder) = match after.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after[1..];
                    match body.find(quote) {
                        Some(close) => (&body[..close], &body[close + 1..]),
                        None => (body, ""),
                    }
                }
                _ => {
                    let end = after.find(char::is_whitespace).unwrap_or(after.len());
                    (&after[..end], &after[end..])
                }
            };
            value = decode_entities(raw).into_owned();
            rest = remainder;
        }
        if !key.is_empty() {
            attrs.push((key, value));
        }
    }
    (name, attrs)
}

fn push_text(events: &mut Vec<MarkupEvent>, text: &str) {
    if !text.is_empty() {
        events.push(MarkupEvent::Characters(decode_entities(text).into_owned()));
    }
}

/// Replace character references; unknown ones are left as written
fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "copy" => Some('\u{00A9}'),
        "mdash" => Some('\u{2014}'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attrs: &[(&str, &str)]) -> MarkupEvent {
        MarkupEvent::start(name, attrs)
    }

    #[test]
    fn test_tags_and_text() {
        let events = tokenize("<P>Hello <b>world</B></p>");
        assert_eq!(
            events,
            vec![
                start("p", &[]),
                MarkupEvent::text("Hello "),
                start("b", &[]),
                MarkupEvent::text("world"),
                MarkupEvent::end("b"),
                MarkupEvent::end("p"),
            ]
        );
    }

    #[test]
    fn test_attribute_forms() {
        let events = tokenize(r#"<input TYPE=checkbox name='a b' checked value="x>y"/>"#);
        assert_eq!(
            events,
            vec![start(
                "input",
                &[("type", "checkbox"), ("name", "a b"), ("checked", ""), ("value", "x>y")]
            )]
        );
    }

    #[test]
    fn test_comments_and_declarations_are_skipped() {
        let events = tokenize("<!DOCTYPE html><!-- <p>hidden</p> -->text<?xml x?>");
        assert_eq!(events, vec![MarkupEvent::text("text")]);
    }

    #[test]
    fn test_entities() {
        let events = tokenize(r#"a &amp; b &lt;&#65;&#x42;&gt; &bogus; &<a href="?x=1&amp;y=2">"#);
        assert_eq!(
            events,
            vec![
                MarkupEvent::text("a & b <AB> &bogus; &"),
                start("a", &[("href", "?x=1&y=2")]),
            ]
        );
    }

    #[test]
    fn test_script_content_is_raw() {
        let events = tokenize("<script>if (a < b) { x = '</p>'; }</SCRIPT>after");
        assert_eq!(
            events,
            vec![
                start("script", &[]),
                MarkupEvent::text("if (a < b) { x = '</p>'; }"),
                MarkupEvent::end("script"),
                MarkupEvent::text("after"),
            ]
        );
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let events = tokenize("1 < 2 <");
        let text: String = events
            .iter()
            .map(|event| match event {
                MarkupEvent::Characters(text) => text.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(text, "1 < 2 <");
        assert!(events.iter().all(|event| matches!(event, MarkupEvent::Characters(_))));
    }

    #[test]
    fn test_unterminated_tag() {
        assert_eq!(tokenize("<p class=x"), vec![start("p", &[("class", "x")])]);
    }
}
