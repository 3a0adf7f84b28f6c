//! Declarative relationship configuration
//!
//! Lets a relationship field be declared in settings files instead of code.
//! Every key is optional.
//!
//! ```json
//! {
//!     "type": "comments",
//!     "many": true,
//!     "include_data": true,
//!     "related_url": "/posts/{post_id}/comments/",
//!     "related_url_kwargs": {"post_id": "<id>"},
//!     "schema": "CommentSchema",
//!     "required": false
//! }
//! ```

use crate::field::FieldOptions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Serializable declaration of a [`Relationship`](crate::Relationship).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
	/// Resource type used in linkage.
	#[serde(rename = "type", alias = "resource_type")]
	pub resource_type: Option<String>,
	/// Attribute holding related ids.
	pub id_field: Option<String>,
	/// To-many relationship.
	pub many: bool,
	/// Emit resource linkage.
	pub include_data: bool,
	/// `related` link template.
	pub related_url: String,
	/// Kwargs for `related_url`, `<path>` strings are read off the object.
	pub related_url_kwargs: Map<String, Value>,
	/// `self` link template.
	pub self_url: String,
	/// Kwargs for `self_url`.
	pub self_url_kwargs: Map<String, Value>,
	/// Registered name of the schema for included resources.
	pub schema: Option<String>,
	/// Base field options.
	#[serde(flatten)]
	pub field: FieldOptions,
}
