//! Value access helpers
//!
//! Objects handed to relationship fields are plain `serde_json::Value`s.
//! Keys are looked up on objects, and dotted paths such as `author.id` walk
//! nested objects. A numeric segment indexes into an array.

use serde_json::Value;

/// Signature of a custom value accessor: `(attribute path, object) -> value`.
pub type Accessor<'a> = &'a dyn Fn(&str, &Value) -> Option<Value>;

/// Look up a (possibly dotted) attribute path on `obj`.
///
/// Returns `None` when any segment is missing, which callers treat as the
/// "missing" marker and replace with their own default.
///
/// # Examples
///
/// ```
/// use reinhardt_jsonapi::accessor::get_value;
/// use serde_json::json;
///
/// let post = json!({"id": 1, "author": {"id": 42, "name": "Alice"}});
/// assert_eq!(get_value(&post, "author.id"), Some(&json!(42)));
/// assert_eq!(get_value(&post, "editor.id"), None);
/// ```
pub fn get_value<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
	path.split('.').try_fold(obj, |current, segment| get_key(current, segment))
}

/// Same as [`get_value`], falling back to `default` when the path is missing.
pub fn get_value_or<'a>(obj: &'a Value, path: &str, default: &'a Value) -> &'a Value {
	get_value(obj, path).unwrap_or(default)
}

/// Accessor used when no custom accessor is supplied.
pub fn default_accessor(path: &str, obj: &Value) -> Option<Value> {
	get_value(obj, path).cloned()
}

fn get_key<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
	match obj {
		Value::Object(map) => map.get(key),
		Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
		_ => None,
	}
}

/// Returns `true` if `value` is list-like.
///
/// Only JSON arrays qualify; mappings and scalars are not collections.
pub fn is_collection(value: &Value) -> bool {
	value.is_array()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_get_value_simple_key() {
		let obj = json!({"id": 7});

		assert_eq!(get_value(&obj, "id"), Some(&json!(7)));
	}

	#[rstest]
	fn test_get_value_dotted_path() {
		let obj = json!({"author": {"profile": {"slug": "alice"}}});

		assert_eq!(get_value(&obj, "author.profile.slug"), Some(&json!("alice")));
	}

	#[rstest]
	fn test_get_value_array_index() {
		let obj = json!({"comments": [{"id": 1}, {"id": 2}]});

		assert_eq!(get_value(&obj, "comments.1.id"), Some(&json!(2)));
		assert_eq!(get_value(&obj, "comments.5.id"), None);
	}

	#[rstest]
	#[case(json!(5))]
	#[case(json!("5"))]
	#[case(json!(null))]
	fn test_get_value_on_scalar_is_missing(#[case] obj: Value) {
		assert_eq!(get_value(&obj, "id"), None);
	}

	#[rstest]
	fn test_get_value_keeps_explicit_null() {
		let obj = json!({"author": null});

		assert_eq!(get_value(&obj, "author"), Some(&Value::Null));
	}

	#[rstest]
	fn test_get_value_or_falls_back() {
		let obj = json!({"name": "x"});
		let fallback = json!("fallback");

		assert_eq!(get_value_or(&obj, "id", &fallback), &fallback);
	}

	#[rstest]
	#[case(json!([1, 2]), true)]
	#[case(json!([]), true)]
	#[case(json!({"id": 1}), false)]
	#[case(json!("abc"), false)]
	#[case(json!(null), false)]
	fn test_is_collection(#[case] value: Value, #[case] expected: bool) {
		assert_eq!(is_collection(&value), expected);
	}
}
