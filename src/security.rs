//! Security module for filter token sanitization.

mod identifiers;

pub use identifiers::{is_valid_token, sanitize_tokens};
