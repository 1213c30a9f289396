//! Shape-driven decoding, masking and parameter codecs for web handlers.
//!
//! This crate provides the data plumbing a request handler needs:
//! - **Decoding**: JSON documents coerced into typed destinations, with
//!   required fields enforced at every nesting depth
//! - **Masking**: zeroing sensitive parts of a value by type or by field name,
//!   without touching the caller's copy on failure
//! - **Parameter codec**: path and query strings to typed scalars and
//!   sequences, with explicit overflow detection
//!
//! # Core Types
//!
//! - [`Shape`]: runtime description of how a value is structured
//! - [`record!`]: declares a record type with required, optional and skipped fields
//! - [`Decode`], [`Mask`], [`FromParam`], [`ToParam`]: the per-type hooks
//! - [`Dynamic`]: a polymorphic slot the masker can look through
//! - [`Secret<T>`]: wrapper that redacts sensitive values in logs/output
//! - [`Redactor`]: reusable masking rules for logging request bodies
//!
//! # Examples
//!
//! ```
//! use wireshape::{clear_by_name, decode_str, from_string, record, Secret};
//!
//! record! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct Signup {
//!         required email: String,
//!         required password: Secret<String>,
//!         optional invite: Option<String> = "inviteCode",
//!     }
//! }
//!
//! let mut signup = Signup::default();
//! decode_str(
//!     r#"{"email":"ann@example.com","password":"hunter2","inviteCode":"x1"}"#,
//!     &mut signup,
//!     true,
//! )
//! .expect("valid body");
//! assert_eq!(signup.invite.as_deref(), Some("x1"));
//!
//! clear_by_name(&mut signup, "email").expect("masked");
//! assert_eq!(signup.email, "");
//!
//! let mut page = 0_u32;
//! from_string("3", &mut page).expect("valid parameter");
//! assert_eq!(page, 3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decode;
mod error;
pub mod mask;
pub mod param;
mod record;
mod redact;
mod secret;
pub mod shape;

pub use decode::{decode, decode_slice, decode_str, decode_value, Decode};
pub use error::{Error, ErrorKind, Result};
pub use mask::{
    clear_by_name, clear_by_type, clear_by_type_of, masked_by_name, masked_by_type, Dynamic,
    Mask,
};
pub use param::{from_string, to_string, FromParam, ToParam};
pub use redact::Redactor;
pub use secret::Secret;
pub use serde_json::Value;
pub use shape::{FieldDescriptor, RecordShape, ScalarKind, Shape, Shaped};
