//! Request types
//!
//! Method, key/value rows, body kinds and the canonical descriptor
//! produced by the request builder.

mod body;
mod descriptor;
mod method;
mod row;

pub use body::{BodyType, FALLBACK_FORM_FIELD, RequestPayload, form_fields, form_json};
pub use descriptor::RequestDescriptor;
pub use method::HttpMethod;
pub use row::{KeyValueRow, filled_rows};
