//! Forms and their submission

use crate::{BoxTree, NodeId, Result, TreeError};
use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP method a form submits with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormMethod {
    #[default]
    Get,
    Post,
}

impl FormMethod {
    /// POST when the attribute starts with "post" in any case, GET otherwise
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(value)
                if value.len() >= 4
                    && value.is_char_boundary(4)
                    && value[..4].eq_ignore_ascii_case("post") =>
            {
                FormMethod::Post
            }
            _ => FormMethod::Get,
        }
    }
}

/// Body encoding of a submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormEncoding {
    #[default]
    UrlEncoded,
    Multipart,
    Plain,
}

impl FormEncoding {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.eq_ignore_ascii_case("multipart/form-data") => {
                FormEncoding::Multipart
            }
            Some(value) if value.eq_ignore_ascii_case("text/plain") => FormEncoding::Plain,
            _ => FormEncoding::UrlEncoded,
        }
    }
}

/// A named control registered with a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub control: NodeId,
}

/// A form: where and how its fields are sent
#[derive(Debug, Clone)]
pub struct Form {
    pub method: FormMethod,
    pub encoding: FormEncoding,
    pub action: Url,
    pub fields: Vec<FormField>,
}

/// A request produced by submitting a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub method: FormMethod,
    pub url: Url,
    /// Request body for POST
    pub body: Option<String>,
}

impl FormSubmission {
    pub const CONTENT_TYPE: &'static str = "application/x-www-form-urlencoded";
}

impl Form {
    /// Create a new form with no fields
    pub fn new(method: FormMethod, encoding: FormEncoding, action: Url) -> Self {
        Self {
            method,
            encoding,
            action,
            fields: Vec::new(),
        }
    }

    /// Url-encoded `name=value` pairs from the controls' live values, in field order
    pub fn encoded_pairs(&self, tree: &BoxTree) -> String {
        self.fields
            .iter()
            .filter_map(|field| {
                let value = tree.object(field.control)?.control()?.submitted_value()?;
                Some(format!(
                    "{}={}",
                    urlencoding::encode(&field.name),
                    urlencoding::encode(value)
                ))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Build the request for submitting this form
    pub fn submission(&self, tree: &BoxTree) -> Result<FormSubmission> {
        if self.encoding != FormEncoding::UrlEncoded {
            return Err(TreeError::UnsupportedEncoding(self.encoding));
        }

        let pairs = self.encoded_pairs(tree);
        let mut url = self.action.clone();
        let body = match self.method {
            FormMethod::Get => {
                url.set_query(Some(&pairs));
                None
            }
            FormMethod::Post => Some(pairs),
        };
        Ok(FormSubmission {
            method: self.method,
            url,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_attr() {
        assert_eq!(FormMethod::from_attr(Some("POST")), FormMethod::Post);
        assert_eq!(FormMethod::from_attr(Some("post-ish")), FormMethod::Post);
        assert_eq!(FormMethod::from_attr(Some("get")), FormMethod::Get);
        assert_eq!(FormMethod::from_attr(Some("po")), FormMethod::Get);
        assert_eq!(FormMethod::from_attr(None), FormMethod::Get);
    }

    #[test]
    fn test_encoding_from_attr() {
        assert_eq!(
            FormEncoding::from_attr(Some("multipart/form-data")),
            FormEncoding::Multipart
        );
        assert_eq!(FormEncoding::from_attr(Some("text/plain")), FormEncoding::Plain);
        assert_eq!(FormEncoding::from_attr(Some("bogus")), FormEncoding::UrlEncoded);
        assert_eq!(FormEncoding::from_attr(None), FormEncoding::UrlEncoded);
    }
}
