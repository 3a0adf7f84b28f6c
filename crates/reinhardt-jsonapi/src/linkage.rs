//! Resource linkage
//!
//! See: <https://jsonapi.org/format/#document-resource-object-linkage>

use crate::accessor::get_value_or;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `{"type": ..., "id": ...}` pair identifying a related resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
	/// Resource type tag.
	#[serde(rename = "type")]
	pub resource_type: String,
	/// Stringified identifier, `None` when the source id was null.
	pub id: Option<String>,
}

impl ResourceIdentifier {
	/// Build an identifier for `item`, reading its id from `id_field`.
	///
	/// When `item` has no such attribute the item itself is the id, so both
	/// `{"id": 3}` and a bare `3` yield `"3"`.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_jsonapi::linkage::ResourceIdentifier;
	/// use serde_json::json;
	///
	/// let from_object = ResourceIdentifier::from_item("people", "id", &json!({"id": 3}));
	/// let from_scalar = ResourceIdentifier::from_item("people", "id", &json!(3));
	/// assert_eq!(from_object, from_scalar);
	/// assert_eq!(from_object.id.as_deref(), Some("3"));
	/// ```
	pub fn from_item(resource_type: &str, id_field: &str, item: &Value) -> Self {
		Self {
			resource_type: resource_type.to_string(),
			id: stringify_id(get_value_or(item, id_field, item)),
		}
	}
}

/// Resource linkage for a to-one or to-many relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceLinkage {
	/// To-one linkage.
	One(ResourceIdentifier),
	/// To-many linkage, in input order.
	Many(Vec<ResourceIdentifier>),
}

impl ResourceLinkage {
	/// Number of identifiers in the linkage.
	pub fn len(&self) -> usize {
		match self {
			ResourceLinkage::One(_) => 1,
			ResourceLinkage::Many(items) => items.len(),
		}
	}

	/// Returns `true` for an empty to-many linkage.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Identifiers in order.
	pub fn identifiers(&self) -> Vec<&ResourceIdentifier> {
		match self {
			ResourceLinkage::One(identifier) => vec![identifier],
			ResourceLinkage::Many(items) => items.iter().collect(),
		}
	}
}

/// Stringify an id, keeping null as null.
pub fn stringify_id(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!(1), Some("1"))]
	#[case(json!("abc"), Some("abc"))]
	#[case(json!(1.5), Some("1.5"))]
	#[case(json!(null), None)]
	fn test_stringify_id(#[case] value: Value, #[case] expected: Option<&str>) {
		assert_eq!(stringify_id(&value).as_deref(), expected);
	}

	#[rstest]
	fn test_identifier_uses_custom_id_field() {
		let item = json!({"id": 1, "slug": "rust"});

		let identifier = ResourceIdentifier::from_item("tags", "slug", &item);

		assert_eq!(identifier.id.as_deref(), Some("rust"));
	}

	#[rstest]
	fn test_identifier_null_id_stays_null() {
		let identifier = ResourceIdentifier::from_item("people", "id", &json!({"id": null}));

		assert_eq!(identifier.id, None);
		assert_eq!(
			serde_json::to_value(&identifier).unwrap(),
			json!({"type": "people", "id": null})
		);
	}

	#[rstest]
	fn test_linkage_serializes_untagged() {
		let linkage = ResourceLinkage::Many(vec![
			ResourceIdentifier::from_item("tags", "id", &json!(1)),
			ResourceIdentifier::from_item("tags", "id", &json!(2)),
		]);

		assert_eq!(linkage.len(), 2);
		assert_eq!(
			serde_json::to_value(&linkage).unwrap(),
			json!([{"type": "tags", "id": "1"}, {"type": "tags", "id": "2"}])
		);
	}

	#[rstest]
	fn test_empty_many_linkage() {
		let linkage = ResourceLinkage::Many(Vec::new());

		assert!(linkage.is_empty());
		assert_eq!(serde_json::to_value(&linkage).unwrap(), json!([]));
	}
}
