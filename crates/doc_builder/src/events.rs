//! Markup events delivered by a tokenizer

use serde::{Deserialize, Serialize};

/// One event of a streaming tag-soup parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkupEvent {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Characters(String),
    End {
        name: String,
    },
}

impl MarkupEvent {
    pub fn start(name: &str, attrs: &[(&str, &str)]) -> Self {
        MarkupEvent::Start {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub fn text(text: &str) -> Self {
        MarkupEvent::Characters(text.to_string())
    }

    pub fn end(name: &str) -> Self {
        MarkupEvent::End {
            name: name.to_string(),
        }
    }
}

/// Look up an attribute value by case-insensitive name
pub fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_lookup_ignores_case() {
        let MarkupEvent::Start { attrs, .. } = MarkupEvent::start("a", &[("HREF", "x.html")]) else {
            panic!("expected a start event");
        };
        assert_eq!(attr(&attrs, "href"), Some("x.html"));
        assert_eq!(attr(&attrs, "name"), None);
    }
}
