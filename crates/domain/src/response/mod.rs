//! Response types
//!
//! The response view shown after a send, and the normalization applied to
//! the envelope returned by the backend proxy.

mod descriptor;
mod normalize;

pub use descriptor::{NETWORK_ERROR_LABEL, ResponseDescriptor, ResponseStatus};
pub use normalize::{
    HeaderPair, ProxyEnvelope, RawHeaders, normalize_body, normalize_headers, pretty_json,
};
