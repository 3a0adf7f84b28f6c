//! Error types for JSON:API relationship fields.
//!
//! Errors fall into three groups:
//!
//! - configuration errors: raised while building a field or resolving its
//!   nested schema. These are programming mistakes and are never reported
//!   to API clients.
//! - lookup errors: a URL kwarg names an attribute path that does not exist
//!   on the serialized object. Also a programming mistake.
//! - validation errors: raised while loading a request payload and meant to
//!   be surfaced to the client as field errors.

use thiserror::Error;

/// Result type for relationship operations.
pub type RelationshipResult<T> = Result<T, RelationshipError>;

/// Validation failure for a single relationship field.
///
/// Holds every message collected for the failing value, in the order the
/// checks ran.
///
/// # Examples
///
/// ```
/// use reinhardt_jsonapi::ValidationError;
///
/// let err = ValidationError::new(vec!["Must have an `id` field", "Must have a `type` field"]);
/// assert_eq!(err.messages().len(), 2);
/// assert_eq!(
/// 	err.to_string(),
/// 	"Must have an `id` field; Must have a `type` field"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
	messages: Vec<String>,
}

impl ValidationError {
	/// Creates a validation error from a list of messages.
	pub fn new<I, S>(messages: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			messages: messages.into_iter().map(Into::into).collect(),
		}
	}

	/// Creates a validation error with a single message.
	pub fn message(message: impl Into<String>) -> Self {
		Self {
			messages: vec![message.into()],
		}
	}

	/// Returns the collected messages.
	pub fn messages(&self) -> &[String] {
		&self.messages
	}

	/// Returns `true` if any message equals `message`.
	pub fn contains(&self, message: &str) -> bool {
		self.messages.iter().any(|m| m == message)
	}
}

impl std::fmt::Display for ValidationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.messages.join("; "))
	}
}

impl std::error::Error for ValidationError {}

/// Errors produced by relationship fields.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RelationshipError {
	/// `include_data` was requested without a resource type.
	#[error("include_data=true requires a resource type")]
	MissingResourceType,

	/// The nested schema reference cannot produce a schema.
	#[error("Nested fields must be passed a Schema, not {kind}")]
	InvalidSchemaRef {
		/// Description of the offending reference.
		kind: String,
	},

	/// A schema name was not found in the registry.
	#[error("schema '{name}' is not registered")]
	SchemaNotRegistered {
		/// Name that was looked up.
		name: String,
	},

	/// A URL template is malformed.
	#[error("invalid URL template '{template}': {message}")]
	InvalidTemplate {
		/// Offending template.
		template: String,
		/// What is wrong with it.
		message: String,
	},

	/// A URL template placeholder has no matching kwarg.
	#[error("URL template '{template}' has no value for placeholder '{placeholder}'")]
	UnresolvedPlaceholder {
		/// Template being formatted.
		template: String,
		/// Placeholder name without braces.
		placeholder: String,
	},

	/// A URL kwarg path does not exist on the serialized object.
	#[error("attribute '{path}' not found on object")]
	AttributeLookup {
		/// Dotted attribute path.
		path: String,
	},

	/// The loaded value is invalid.
	#[error("{0}")]
	Validation(ValidationError),

	/// A nested schema failed to encode a value.
	#[error("serde error: {0}")]
	Serde(#[from] serde_json::Error),
}

impl From<ValidationError> for RelationshipError {
	fn from(err: ValidationError) -> Self {
		RelationshipError::Validation(err)
	}
}

impl RelationshipError {
	/// Creates a validation error with a single message.
	pub fn validation(message: impl Into<String>) -> Self {
		RelationshipError::Validation(ValidationError::message(message))
	}

	/// Check if this is a validation error
	pub fn is_validation_error(&self) -> bool {
		matches!(self, RelationshipError::Validation(_))
	}

	/// Check if this is a configuration error
	pub fn is_configuration_error(&self) -> bool {
		matches!(
			self,
			RelationshipError::MissingResourceType
				| RelationshipError::InvalidSchemaRef { .. }
				| RelationshipError::SchemaNotRegistered { .. }
				| RelationshipError::InvalidTemplate { .. }
				| RelationshipError::UnresolvedPlaceholder { .. }
		)
	}

	/// Check if this is an attribute lookup error
	pub fn is_lookup_error(&self) -> bool {
		matches!(self, RelationshipError::AttributeLookup { .. })
	}

	/// Try to convert to ValidationError if this is a validation error
	pub fn as_validation_error(&self) -> Option<&ValidationError> {
		match self {
			RelationshipError::Validation(e) => Some(e),
			_ => None,
		}
	}

	/// Returns the validation messages, or an empty slice for other errors.
	pub fn messages(&self) -> &[String] {
		match self {
			RelationshipError::Validation(e) => e.messages(),
			_ => &[],
		}
	}
}
