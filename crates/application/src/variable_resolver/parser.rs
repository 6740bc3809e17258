//! Token parser for `{{key}}` syntax
//!
//! Parses strings to extract template tokens with their positions.

use std::ops::Range;

/// A `{{key}}` token found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateToken {
    /// The key, trimmed, without the braces.
    pub name: String,

    /// Byte range of the whole token, braces included.
    pub span: Range<usize>,
}

impl TemplateToken {
    /// Creates a new token.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a string and extracts all template tokens in order.
///
/// Whitespace inside the braces is trimmed. Empty tokens are skipped and an
/// unclosed `{{` ends the scan. When a `{{` opens again before the closing
/// `}}`, the innermost opening wins.
///
/// # Examples
///
/// ```
/// use courier_application::variable_resolver::parser::parse_tokens;
///
/// let tokens = parse_tokens("{{ base }}/users/{{id}}");
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0].name, "base");
/// assert_eq!(tokens[1].span, 17..23);
/// ```
#[must_use]
pub fn parse_tokens(input: &str) -> Vec<TemplateToken> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while let Some(open) = input[cursor..].find("{{") {
        let start = cursor + open;
        let body_start = start + 2;
        let Some(close) = input[body_start..].find("}}") else {
            break;
        };
        let body = &input[body_start..body_start + close];

        if let Some(inner) = body.rfind("{{") {
            cursor = body_start + inner;
            continue;
        }

        let end = body_start + close + 2;
        let name = body.trim();
        if !name.is_empty() {
            tokens.push(TemplateToken::new(name, start..end));
        }
        cursor = end;
    }

    tokens
}

/// Returns true if the input string may contain template tokens.
#[must_use]
pub fn has_tokens(input: &str) -> bool {
    input.contains("{{") && input.contains("}}")
}
