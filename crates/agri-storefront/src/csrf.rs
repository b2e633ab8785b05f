//! Anti-forgery token lookup.

use std::fmt;

use crate::dom::Document;

/// Header carrying the token on JSON posts.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Form field carrying the token on form posts.
pub const CSRF_FIELD: &str = "csrf_token";

/// The page's CSRF token. Empty when the page carries none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// `<meta name="csrf-token" content>` first, then the first
    /// `<input name="csrf_token">`. An empty source falls through to the
    /// next one.
    pub fn read<D: Document>(doc: &D) -> Self {
        doc.query("meta[name=csrf-token]")
            .and_then(|meta| doc.attr(&meta, "content"))
            .filter(|token| !token.is_empty())
            .or_else(|| {
                doc.query("input[name=\"csrf_token\"]")
                    .map(|input| doc.value(&input))
            })
            .map(Self)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;

    #[test]
    fn test_meta_wins() {
        let doc = MemoryDocument::parse(
            r#"<html><head><meta name="csrf-token" content="from-meta"></head>
               <body><input name="csrf_token" value="from-input"></body></html>"#,
        );
        assert_eq!(CsrfToken::read(&doc).as_str(), "from-meta");
    }

    #[test]
    fn test_empty_meta_falls_back_to_input() {
        let doc = MemoryDocument::parse(
            r#"<html><head><meta name="csrf-token" content=""></head>
               <body><input name="csrf_token" value="from-input"></body></html>"#,
        );
        assert_eq!(CsrfToken::read(&doc).as_str(), "from-input");
    }

    #[test]
    fn test_meta_without_content_falls_back_to_input() {
        let doc = MemoryDocument::parse(
            r#"<html><head><meta name="csrf-token"></head>
               <body><input name="csrf_token" value="from-input"></body></html>"#,
        );
        assert_eq!(CsrfToken::read(&doc).as_str(), "from-input");
    }

    #[test]
    fn test_input_fallback() {
        let doc = MemoryDocument::parse(
            r#"<body><form><input type="hidden" name="csrf_token" value="from-input"></form></body>"#,
        );
        assert_eq!(CsrfToken::read(&doc).as_str(), "from-input");
    }

    #[test]
    fn test_absent_is_empty() {
        let doc = MemoryDocument::parse("<body></body>");
        assert!(CsrfToken::read(&doc).is_empty());
    }
}
