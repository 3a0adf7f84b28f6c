//! Nested schema seam
//!
//! Relationship fields do not know how to render full resource objects.
//! They delegate to a [`Schema`], referenced through [`SchemaRef`] as an
//! existing instance, a factory, or a name looked up in a
//! [`SchemaRegistry`](crate::registry::SchemaRegistry).

use crate::context::SchemaContext;
use crate::error::{RelationshipError, RelationshipResult};
use crate::registry::SchemaRegistry;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A schema able to dump values into JSON:API documents.
///
/// This is also the protocol a parent schema exposes to its relationship
/// fields: its context and its key-ordering flag.
pub trait Schema: Send + Sync {
	/// Dump `value` into a document whose `"data"` member holds the
	/// resource object(s).
	fn dump(&self, value: &Value) -> RelationshipResult<Value>;

	/// Whether this schema dumps collections.
	fn many(&self) -> bool;

	/// Context shared with nested schemas.
	fn context(&self) -> &SchemaContext;

	/// Whether output mappings keep declaration order.
	fn ordered(&self) -> bool;

	/// Update the ordering flag.
	fn set_ordered(&self, ordered: bool);
}

/// Options passed to a [`SchemaFactory`].
#[derive(Debug, Clone, Default)]
pub struct SchemaOptions {
	/// Cardinality of the schema to build.
	pub many: bool,
	/// Context inherited from the parent schema.
	pub context: SchemaContext,
}

/// Constructor for schemas, the counterpart of a schema class.
pub type SchemaFactory = Arc<dyn Fn(SchemaOptions) -> Arc<dyn Schema> + Send + Sync>;

/// Reference to the schema used for included resources.
#[derive(Clone)]
pub enum SchemaRef {
	/// An already constructed schema, reused as-is.
	Instance(Arc<dyn Schema>),
	/// A factory invoked with the field's cardinality and the parent context.
	Factory(SchemaFactory),
	/// A name resolved through a schema registry.
	Name(String),
}

impl SchemaRef {
	/// Short description of the variant, used in errors and logs.
	pub fn kind(&self) -> &'static str {
		match self {
			SchemaRef::Instance(_) => "Instance",
			SchemaRef::Factory(_) => "Factory",
			SchemaRef::Name(_) => "Name",
		}
	}

	/// Resolve to a schema instance.
	///
	/// Instances get `context` merged into their own context. Factories and
	/// registered names are built with `many` and `context`.
	pub fn resolve(
		&self,
		many: bool,
		context: &SchemaContext,
		registry: &SchemaRegistry,
	) -> RelationshipResult<Arc<dyn Schema>> {
		match self {
			SchemaRef::Instance(schema) => {
				schema.context().update(context);
				Ok(Arc::clone(schema))
			}
			SchemaRef::Factory(factory) => Ok(factory(SchemaOptions {
				many,
				context: context.clone(),
			})),
			SchemaRef::Name(name) => {
				let factory = registry
					.get(name)
					.ok_or_else(|| RelationshipError::SchemaNotRegistered { name: name.clone() })?;
				Ok(factory(SchemaOptions {
					many,
					context: context.clone(),
				}))
			}
		}
	}
}

impl std::fmt::Debug for SchemaRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			SchemaRef::Instance(schema) => f
				.debug_struct("Instance")
				.field("many", &schema.many())
				.finish_non_exhaustive(),
			SchemaRef::Factory(_) => f.write_str("Factory(..)"),
			SchemaRef::Name(name) => f.debug_tuple("Name").field(name).finish(),
		}
	}
}

impl From<Arc<dyn Schema>> for SchemaRef {
	fn from(schema: Arc<dyn Schema>) -> Self {
		SchemaRef::Instance(schema)
	}
}

impl From<&str> for SchemaRef {
	fn from(name: &str) -> Self {
		SchemaRef::Name(name.to_string())
	}
}

impl From<String> for SchemaRef {
	fn from(name: String) -> Self {
		SchemaRef::Name(name)
	}
}

type ResourceFn = dyn Fn(&Value, &SchemaContext) -> RelationshipResult<Value> + Send + Sync;

/// A [`Schema`] backed by a closure rendering one resource object.
///
/// `dump` wraps the rendered object(s) in a `{"data": ...}` document.
///
/// # Examples
///
/// ```
/// use reinhardt_jsonapi::schema::{FnSchema, Schema, SchemaOptions};
/// use serde_json::json;
///
/// let schema = FnSchema::new(SchemaOptions::default(), |person, _ctx| {
/// 	Ok(json!({"type": "people", "id": person["id"].to_string()}))
/// });
/// let doc = schema.dump(&json!({"id": 1})).unwrap();
/// assert_eq!(doc, json!({"data": {"type": "people", "id": "1"}}));
/// ```
pub struct FnSchema {
	many: bool,
	context: SchemaContext,
	ordered: AtomicBool,
	render: Arc<ResourceFn>,
}

impl FnSchema {
	/// Creates a schema from options and a resource renderer.
	pub fn new<F>(options: SchemaOptions, render: F) -> Self
	where
		F: Fn(&Value, &SchemaContext) -> RelationshipResult<Value> + Send + Sync + 'static,
	{
		Self::with_renderer(options, Arc::new(render))
	}

	fn with_renderer(options: SchemaOptions, render: Arc<ResourceFn>) -> Self {
		Self {
			many: options.many,
			context: options.context,
			ordered: AtomicBool::new(false),
			render,
		}
	}

	/// A factory producing `FnSchema`s that share one renderer.
	pub fn factory<F>(render: F) -> SchemaFactory
	where
		F: Fn(&Value, &SchemaContext) -> RelationshipResult<Value> + Send + Sync + 'static,
	{
		let render: Arc<ResourceFn> = Arc::new(render);
		Arc::new(move |options: SchemaOptions| {
			Arc::new(FnSchema::with_renderer(options, Arc::clone(&render))) as Arc<dyn Schema>
		})
	}
}

impl Schema for FnSchema {
	fn dump(&self, value: &Value) -> RelationshipResult<Value> {
		let data = match value {
			Value::Null if self.many => Value::Array(Vec::new()),
			Value::Null => Value::Null,
			Value::Array(items) if self.many => items
				.iter()
				.map(|item| (self.render)(item, &self.context))
				.collect::<RelationshipResult<Vec<_>>>()
				.map(Value::Array)?,
			item => (self.render)(item, &self.context)?,
		};
		Ok(json!({ "data": data }))
	}

	fn many(&self) -> bool {
		self.many
	}

	fn context(&self) -> &SchemaContext {
		&self.context
	}

	fn ordered(&self) -> bool {
		self.ordered.load(Ordering::Relaxed)
	}

	fn set_ordered(&self, ordered: bool) {
		self.ordered.store(ordered, Ordering::Relaxed);
	}
}

impl std::fmt::Debug for FnSchema {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FnSchema")
			.field("many", &self.many)
			.field("context", &self.context)
			.field("ordered", &self.ordered())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn people_factory() -> SchemaFactory {
		FnSchema::factory(|person, ctx| {
			Ok(json!({
				"type": "people",
				"id": person["id"].to_string(),
				"meta": {"viewer": ctx.get("viewer")},
			}))
		})
	}

	#[rstest]
	fn test_fn_schema_dump_many(people_factory: SchemaFactory) {
		let schema = people_factory(SchemaOptions {
			many: true,
			..Default::default()
		});

		let doc = schema.dump(&json!([{"id": 1}, {"id": 2}])).unwrap();

		assert_eq!(doc["data"].as_array().map(Vec::len), Some(2));
		assert_eq!(doc["data"][1]["id"], json!("2"));
	}

	#[rstest]
	#[case(true, json!([]))]
	#[case(false, Value::Null)]
	fn test_fn_schema_dump_null(
		people_factory: SchemaFactory,
		#[case] many: bool,
		#[case] expected: Value,
	) {
		let schema = people_factory(SchemaOptions {
			many,
			..Default::default()
		});

		assert_eq!(schema.dump(&Value::Null).unwrap(), json!({ "data": expected }));
	}

	#[rstest]
	fn test_resolve_factory_passes_context(people_factory: SchemaFactory) {
		// Arrange
		let context = SchemaContext::new();
		context.insert("viewer", json!("alice"));
		let registry = SchemaRegistry::new();

		// Act
		let schema = SchemaRef::Factory(people_factory)
			.resolve(false, &context, &registry)
			.unwrap();

		// Assert
		assert!(!schema.many());
		let doc = schema.dump(&json!({"id": 1})).unwrap();
		assert_eq!(doc["data"]["meta"]["viewer"], json!("alice"));
	}

	#[rstest]
	fn test_resolve_instance_merges_context(people_factory: SchemaFactory) {
		// Arrange
		let instance = people_factory(SchemaOptions::default());
		instance.context().insert("locale", json!("en"));
		let parent = SchemaContext::new();
		parent.insert("viewer", json!("bob"));

		// Act
		let resolved = SchemaRef::Instance(Arc::clone(&instance))
			.resolve(true, &parent, &SchemaRegistry::new())
			.unwrap();

		// Assert
		assert!(Arc::ptr_eq(&resolved, &instance));
		assert_eq!(resolved.context().get("viewer"), Some(json!("bob")));
		assert_eq!(resolved.context().get("locale"), Some(json!("en")));
	}

	#[rstest]
	fn test_resolve_unknown_name() {
		let err = SchemaRef::from("Nope")
			.resolve(false, &SchemaContext::new(), &SchemaRegistry::new())
			.err()
			.unwrap();

		assert!(err.is_configuration_error());
		assert!(matches!(err, RelationshipError::SchemaNotRegistered { ref name } if name == "Nope"));
	}

	#[rstest]
	fn test_ordered_flag_round_trip(people_factory: SchemaFactory) {
		let schema = people_factory(SchemaOptions::default());
		assert!(!schema.ordered());

		schema.set_ordered(true);

		assert!(schema.ordered());
	}
}
