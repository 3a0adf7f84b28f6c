//! Schema registry
//!
//! Maps schema names to factories so relationship fields can refer to a
//! nested schema by name before that schema is defined. Schemas register
//! themselves once, at startup; fields look names up the first time they
//! need the nested schema.

use crate::schema::SchemaFactory;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Directory from schema name to [`SchemaFactory`].
#[derive(Default)]
pub struct SchemaRegistry {
	factories: RwLock<HashMap<String, SchemaFactory>>,
}

static GLOBAL_REGISTRY: Lazy<Arc<SchemaRegistry>> = Lazy::new(|| Arc::new(SchemaRegistry::new()));

impl SchemaRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// The process-wide registry used by fields that were not given one.
	pub fn global() -> Arc<SchemaRegistry> {
		Arc::clone(&GLOBAL_REGISTRY)
	}

	/// Registers `factory` under `name`, returning the factory it replaced.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_jsonapi::registry::SchemaRegistry;
	/// use reinhardt_jsonapi::schema::FnSchema;
	/// use serde_json::json;
	///
	/// let registry = SchemaRegistry::new();
	/// registry.register("AuthorSchema", FnSchema::factory(|a, _| Ok(json!({"type": "people", "id": a["id"]}))));
	/// assert!(registry.contains("AuthorSchema"));
	/// ```
	pub fn register(&self, name: impl Into<String>, factory: SchemaFactory) -> Option<SchemaFactory> {
		let name = name.into();
		let previous = self.factories.write().insert(name.clone(), factory);
		if previous.is_some() {
			tracing::debug!(schema = %name, "replaced registered schema");
		} else {
			tracing::debug!(schema = %name, "registered schema");
		}
		previous
	}

	/// Looks up a factory by name.
	pub fn get(&self, name: &str) -> Option<SchemaFactory> {
		self.factories.read().get(name).cloned()
	}

	/// Checks if a name is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.factories.read().contains_key(name)
	}

	/// Removes a registration.
	pub fn unregister(&self, name: &str) -> Option<SchemaFactory> {
		self.factories.write().remove(name)
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
		names.sort();
		names
	}
}

impl std::fmt::Debug for SchemaRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SchemaRegistry")
			.field("names", &self.names())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::{FnSchema, SchemaOptions};
	use rstest::rstest;
	use serde_json::json;

	fn tag_factory(kind: &'static str) -> SchemaFactory {
		FnSchema::factory(move |tag, _| Ok(json!({"type": kind, "id": tag["id"]})))
	}

	#[rstest]
	fn test_register_and_get() {
		// Arrange
		let registry = SchemaRegistry::new();

		// Act
		let previous = registry.register("TagSchema", tag_factory("tags"));

		// Assert
		assert!(previous.is_none());
		let factory = registry.get("TagSchema").unwrap();
		let schema = factory(SchemaOptions::default());
		assert_eq!(
			schema.dump(&json!({"id": 1})).unwrap(),
			json!({"data": {"type": "tags", "id": 1}})
		);
	}

	#[rstest]
	fn test_register_replaces_existing() {
		// Arrange
		let registry = SchemaRegistry::new();
		registry.register("TagSchema", tag_factory("tags"));

		// Act
		let previous = registry.register("TagSchema", tag_factory("labels"));

		// Assert
		assert!(previous.is_some());
		let schema = registry.get("TagSchema").unwrap()(SchemaOptions::default());
		assert_eq!(schema.dump(&json!({"id": 1})).unwrap()["data"]["type"], json!("labels"));
	}

	#[rstest]
	fn test_unregister_and_names() {
		let registry = SchemaRegistry::new();
		registry.register("b", tag_factory("b"));
		registry.register("a", tag_factory("a"));

		assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
		assert!(registry.unregister("a").is_some());
		assert!(!registry.contains("a"));
		assert!(registry.get("a").is_none());
	}

	#[rstest]
	fn test_global_is_shared() {
		let first = SchemaRegistry::global();
		let second = SchemaRegistry::global();

		assert!(Arc::ptr_eq(&first, &second));
	}
}
