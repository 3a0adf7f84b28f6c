//! Base field options
//!
//! The load policy shared by every field: whether a value is required, the
//! default used when it is missing, and whether null is accepted.

use crate::error::{RelationshipError, RelationshipResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message for a required field missing from the payload.
pub const MISSING_REQUIRED: &str = "Missing data for required field.";

/// Message for a null value on a field that does not accept null.
pub const NULL_NOT_ALLOWED: &str = "Field may not be null.";

/// Options common to all fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
	/// Fail loading when the value is missing.
	pub required: bool,
	/// Object key to read when serializing, if different from the field name.
	pub attribute: Option<String>,
	/// Value returned when the key is missing and the field is not required.
	pub default: Option<Value>,
	/// Accept null when loading.
	pub allow_none: bool,
}

impl Default for FieldOptions {
	fn default() -> Self {
		Self {
			required: false,
			attribute: None,
			default: None,
			allow_none: true,
		}
	}
}

impl FieldOptions {
	/// Key used to read the field's value from an object.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_jsonapi::field::FieldOptions;
	///
	/// let options = FieldOptions { attribute: Some("writer".into()), ..Default::default() };
	/// assert_eq!(options.source_key("author"), "writer");
	/// assert_eq!(FieldOptions::default().source_key("author"), "author");
	/// ```
	pub fn source_key<'a>(&'a self, field_name: &'a str) -> &'a str {
		self.attribute.as_deref().unwrap_or(field_name)
	}

	/// Resolve a missing value: an error for required fields, otherwise the
	/// configured default.
	pub fn load_missing(&self) -> RelationshipResult<Option<Value>> {
		if self.required {
			return Err(RelationshipError::validation(MISSING_REQUIRED));
		}
		Ok(self.default.clone())
	}

	/// Reject null unless `allow_none` is set.
	pub fn check_null(&self) -> RelationshipResult<()> {
		if self.allow_none {
			Ok(())
		} else {
			Err(RelationshipError::validation(NULL_NOT_ALLOWED))
		}
	}
}
