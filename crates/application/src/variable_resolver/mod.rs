//! Template resolution module
//!
//! Substitutes `{{key}}` tokens with the values of the active environment.
//!
//! # Usage
//!
//! ```
//! use courier_application::variable_resolver::TemplateResolver;
//! use courier_domain::{Environment, Variable};
//!
//! let mut env = Environment::new("env-1", "Local");
//! env.variables.push(Variable::new("v1", "host", "localhost:3000"));
//!
//! let resolution = TemplateResolver.resolve("http://{{host}}/api/{{version}}", Some(&env));
//! assert_eq!(resolution.resolved_url, "http://localhost:3000/api/{{version}}");
//! assert_eq!(resolution.unresolved, vec!["version".to_string()]);
//! ```

pub mod engine;
pub mod parser;

pub use engine::{Resolution, TemplateResolver};
pub use parser::{TemplateToken, has_tokens, parse_tokens};
