//! Schema context shared across a schema graph.
//!
//! A context carries request-scoped state (current user, request, ...) from
//! a parent schema into the nested schemas resolved by its relationship
//! fields.
//!
//! # Thread Safety
//!
//! Cloning a context shares its storage. Each read or write takes the lock
//! on its own, but a sequence of operations (for example merging a parent
//! context into a nested schema while another thread serializes with it) is
//! not atomic. Callers that serialize concurrently with shared schemas must
//! synchronize externally or work on [`SchemaContext::detached`] copies.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

/// Key/value state shared between a schema and its nested schemas.
#[derive(Clone, Default)]
pub struct SchemaContext {
	values: Arc<RwLock<Map<String, Value>>>,
}

impl SchemaContext {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a context holding `values`.
	pub fn from_map(values: Map<String, Value>) -> Self {
		Self {
			values: Arc::new(RwLock::new(values)),
		}
	}

	/// Gets a value.
	pub fn get(&self, key: &str) -> Option<Value> {
		self.values.read().get(key).cloned()
	}

	/// Sets a value.
	pub fn insert(&self, key: impl Into<String>, value: Value) {
		self.values.write().insert(key.into(), value);
	}

	/// Removes a value.
	pub fn remove(&self, key: &str) -> Option<Value> {
		self.values.write().remove(key)
	}

	/// Checks if a key is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.values.read().contains_key(key)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.values.read().len()
	}

	/// Returns `true` if the context has no entries.
	pub fn is_empty(&self) -> bool {
		self.values.read().is_empty()
	}

	/// Merges every entry of `other` into this context, overwriting
	/// existing keys.
	pub fn update(&self, other: &SchemaContext) {
		if self.shares_storage_with(other) {
			return;
		}
		let incoming = other.snapshot();
		let mut values = self.values.write();
		for (key, value) in incoming {
			values.insert(key, value);
		}
	}

	/// Copy of the current entries.
	pub fn snapshot(&self) -> Map<String, Value> {
		self.values.read().clone()
	}

	/// A new context with a copy of the current entries and its own storage.
	pub fn detached(&self) -> Self {
		Self::from_map(self.snapshot())
	}

	/// Returns `true` if both handles point at the same storage.
	pub fn shares_storage_with(&self, other: &SchemaContext) -> bool {
		Arc::ptr_eq(&self.values, &other.values)
	}
}

impl std::fmt::Debug for SchemaContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SchemaContext")
			.field("values", &*self.values.read())
			.finish()
	}
}

impl From<Map<String, Value>> for SchemaContext {
	fn from(values: Map<String, Value>) -> Self {
		Self::from_map(values)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_clone_shares_storage() {
		// Arrange
		let context = SchemaContext::new();
		let alias = context.clone();

		// Act
		alias.insert("user", json!("alice"));

		// Assert
		assert_eq!(context.get("user"), Some(json!("alice")));
		assert!(context.shares_storage_with(&alias));
	}

	#[rstest]
	fn test_detached_copy_is_independent() {
		// Arrange
		let context = SchemaContext::new();
		context.insert("user", json!("alice"));

		// Act
		let copy = context.detached();
		copy.insert("user", json!("bob"));

		// Assert
		assert_eq!(context.get("user"), Some(json!("alice")));
		assert_eq!(copy.get("user"), Some(json!("bob")));
	}

	#[rstest]
	fn test_update_merges_and_overwrites() {
		// Arrange
		let nested = SchemaContext::new();
		nested.insert("locale", json!("en"));
		nested.insert("user", json!("anonymous"));
		let parent = SchemaContext::new();
		parent.insert("user", json!("alice"));

		// Act
		nested.update(&parent);

		// Assert
		assert_eq!(nested.len(), 2);
		assert_eq!(nested.get("user"), Some(json!("alice")));
		assert_eq!(nested.get("locale"), Some(json!("en")));
	}

	#[rstest]
	fn test_update_with_self_is_noop() {
		let context = SchemaContext::new();
		context.insert("k", json!(1));

		context.update(&context.clone());

		assert_eq!(context.len(), 1);
	}

	#[rstest]
	fn test_remove() {
		let context = SchemaContext::new();
		context.insert("k", json!(1));

		assert_eq!(context.remove("k"), Some(json!(1)));
		assert!(context.is_empty());
		assert!(!context.contains_key("k"));
	}
}
