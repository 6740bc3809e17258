//! Template resolution engine
//!
//! Resolves `{{key}}` tokens against the active environment.

use courier_domain::Environment;

use super::parser::{has_tokens, parse_tokens};
use crate::error::{ApplicationError, ApplicationResult};

/// Result of resolving one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The input with every known token substituted.
    pub resolved_url: String,

    /// Unknown keys, each listed once, in first-appearance order.
    pub unresolved: Vec<String>,
}

impl Resolution {
    /// Creates a result for input with no tokens.
    #[must_use]
    pub fn unchanged(input: &str) -> Self {
        Self {
            resolved_url: input.to_string(),
            unresolved: Vec::new(),
        }
    }

    /// Returns true when every token was substituted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Returns the resolved string, or `UnresolvedTemplate` listing the
    /// missing keys.
    ///
    /// # Errors
    ///
    /// Fails when at least one token is unresolved.
    pub fn into_resolved(self) -> ApplicationResult<String> {
        if self.is_complete() {
            Ok(self.resolved_url)
        } else {
            Err(ApplicationError::UnresolvedTemplate {
                keys: self.unresolved,
            })
        }
    }
}

/// Substitutes `{{key}}` tokens with environment values.
///
/// Unknown tokens are left verbatim. With no active environment every token
/// is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResolver;

impl TemplateResolver {
    /// Resolves all tokens in the input string.
    #[must_use]
    pub fn resolve(self, input: &str, environment: Option<&Environment>) -> Resolution {
        if !has_tokens(input) {
            return Resolution::unchanged(input);
        }

        let tokens = parse_tokens(input);
        if tokens.is_empty() {
            return Resolution::unchanged(input);
        }

        let mut unresolved: Vec<String> = Vec::new();
        let mut result = String::with_capacity(input.len());
        let mut last_end = 0;

        for token in &tokens {
            result.push_str(&input[last_end..token.span.start]);

            match environment.and_then(|env| env.lookup(&token.name)) {
                Some(value) => result.push_str(value),
                None => {
                    result.push_str(&input[token.span.clone()]);
                    if !unresolved.contains(&token.name) {
                        unresolved.push(token.name.clone());
                    }
                }
            }

            last_end = token.span.end;
        }

        result.push_str(&input[last_end..]);

        Resolution {
            resolved_url: result,
            unresolved,
        }
    }
}
