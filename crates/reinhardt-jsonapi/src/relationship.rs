//! Relationship field - JSON:API relationship objects
//!
//! A [`Relationship`] renders an object's related resources as a
//! relationship object:
//!
//! ```json
//! {
//!     "links": {"self": "/posts/1/relationships/comments", "related": "/posts/1/comments"},
//!     "data": [{"type": "comments", "id": "5"}]
//! }
//! ```
//!
//! and loads the `data` member of request payloads back into ids.
//!
//! See: <https://jsonapi.org/format/#document-resource-object-relationships>

use crate::accessor::{Accessor, default_accessor, is_collection};
use crate::config::RelationshipConfig;
use crate::error::{RelationshipError, RelationshipResult, ValidationError};
use crate::field::FieldOptions;
use crate::linkage::{ResourceIdentifier, ResourceLinkage};
use crate::registry::SchemaRegistry;
use crate::schema::{Schema, SchemaFactory, SchemaRef};
use crate::url::{LinkTemplate, UrlKwarg};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Weak};

/// Payload is not an object with a `data` member.
pub const MISSING_DATA_KEY: &str = "Must include a `data` key";
/// To-many relationship received a non-list value.
pub const EXPECTED_LIST: &str = "Relationship is list-like";
/// To-one relationship received a list.
pub const UNEXPECTED_LIST: &str = "Relationship is not list-like";
/// Resource identifier without `id`.
pub const MISSING_ID: &str = "Must have an `id` field";
/// Resource identifier without `type`.
pub const MISSING_TYPE: &str = "Must have a `type` field";
/// Resource identifier whose `type` differs from the field's.
pub const INVALID_TYPE: &str = "Invalid `type` specified";

const DEFAULT_ID_FIELD: &str = "id";

/// Ids loaded from a relationship payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelationshipIds {
	/// To-one relationship.
	One(Value),
	/// To-many relationship, in payload order.
	Many(Vec<Value>),
}

impl RelationshipIds {
	/// The id of a to-one relationship.
	pub fn as_one(&self) -> Option<&Value> {
		match self {
			RelationshipIds::One(id) => Some(id),
			RelationshipIds::Many(_) => None,
		}
	}

	/// The ids of a to-many relationship.
	pub fn as_many(&self) -> Option<&[Value]> {
		match self {
			RelationshipIds::One(_) => None,
			RelationshipIds::Many(ids) => Some(ids),
		}
	}

	/// Convert into a plain JSON value.
	pub fn into_value(self) -> Value {
		match self {
			RelationshipIds::One(id) => id,
			RelationshipIds::Many(ids) => Value::Array(ids),
		}
	}
}

/// Field serializing to a JSON:API relationship object.
///
/// # Examples
///
/// ```
/// use reinhardt_jsonapi::Relationship;
/// use serde_json::json;
///
/// let comments = Relationship::builder()
/// 	.related_url("/posts/{post_id}/comments/")
/// 	.related_url_kwarg("post_id", "<id>")
/// 	.many(true)
/// 	.include_data(true)
/// 	.resource_type("comments")
/// 	.build()
/// 	.unwrap();
///
/// let post = json!({"id": 1, "comments": [{"id": 5}, {"id": 6}]});
/// let out = comments.serialize_attribute("comments", &post).unwrap();
///
/// assert_eq!(
/// 	serde_json::Value::Object(out),
/// 	json!({
/// 		"links": {"related": "/posts/1/comments/"},
/// 		"data": [{"type": "comments", "id": "5"}, {"type": "comments", "id": "6"}]
/// 	})
/// );
/// ```
#[derive(Clone)]
pub struct Relationship {
	resource_type: Option<String>,
	id_field: String,
	many: bool,
	include_data: bool,
	related_url: LinkTemplate,
	self_url: LinkTemplate,
	included: Option<SchemaRef>,
	registry: Option<Arc<SchemaRegistry>>,
	options: FieldOptions,
	parent: Option<Weak<dyn Schema>>,
	schema: OnceCell<Arc<dyn Schema>>,
}

impl Relationship {
	/// Start building a relationship field.
	pub fn builder() -> RelationshipBuilder {
		RelationshipBuilder::default()
	}

	/// Build a field from a declarative configuration.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_jsonapi::{Relationship, RelationshipConfig};
	/// use serde_json::json;
	///
	/// let config: RelationshipConfig = serde_json::from_value(json!({
	/// 	"type": "people",
	/// 	"include_data": true,
	/// 	"related_url": "/people/{id}",
	/// 	"related_url_kwargs": {"id": "<author.id>"}
	/// }))
	/// .unwrap();
	/// let author = Relationship::from_config(config).unwrap();
	/// assert_eq!(author.resource_type(), Some("people"));
	/// ```
	pub fn from_config(config: RelationshipConfig) -> RelationshipResult<Self> {
		let mut builder = Self::builder()
			.many(config.many)
			.include_data(config.include_data)
			.related_url(config.related_url)
			.self_url(config.self_url)
			.options(config.field);
		if let Some(resource_type) = config.resource_type {
			builder = builder.resource_type(resource_type);
		}
		if let Some(id_field) = config.id_field {
			builder = builder.id_field(id_field);
		}
		for (name, value) in config.related_url_kwargs {
			builder = builder.related_url_kwarg(name, value);
		}
		for (name, value) in config.self_url_kwargs {
			builder = builder.self_url_kwarg(name, value);
		}
		if let Some(schema) = config.schema {
			builder = builder.schema_name(schema);
		}
		builder.build()
	}

	/// Resource type used in linkage.
	pub fn resource_type(&self) -> Option<&str> {
		self.resource_type.as_deref()
	}

	/// Attribute that holds a related resource's id.
	pub fn id_field(&self) -> &str {
		&self.id_field
	}

	/// Whether this is a to-many relationship.
	pub fn many(&self) -> bool {
		self.many
	}

	/// Whether resource linkage is emitted.
	pub fn include_data(&self) -> bool {
		self.include_data
	}

	/// Template of the `related` link.
	pub fn related_url(&self) -> &LinkTemplate {
		&self.related_url
	}

	/// Template of the `self` link.
	pub fn self_url(&self) -> &LinkTemplate {
		&self.self_url
	}

	/// The nested schema reference, if any.
	pub fn included(&self) -> Option<&SchemaRef> {
		self.included.as_ref()
	}

	/// Base field options.
	pub fn options(&self) -> &FieldOptions {
		&self.options
	}

	/// Document assembly routes fields answering `true` into the
	/// `relationships` member instead of `attributes`.
	pub fn is_relationship(&self) -> bool {
		true
	}

	/// Attach the field to the schema declaring it.
	///
	/// Only a weak reference is kept. Binding drops any cached nested
	/// schema, since it was resolved against the previous parent's context.
	pub fn bind(&mut self, parent: &Arc<dyn Schema>) {
		self.parent = Some(Arc::downgrade(parent));
		self.invalidate_schema();
	}

	/// The declaring schema, if bound and still alive.
	pub fn parent(&self) -> Option<Arc<dyn Schema>> {
		self.parent.as_ref().and_then(Weak::upgrade)
	}

	/// Read this field's value from `obj`, honoring the `attribute` option.
	pub fn get_value(&self, attr: &str, obj: &Value, accessor: Option<Accessor<'_>>) -> Option<Value> {
		let key = self.options.source_key(attr);
		match accessor {
			Some(accessor) => accessor(key, obj),
			None => default_accessor(key, obj),
		}
	}

	/// Resolve the `related` link for `obj`.
	///
	/// `value` is the field's own target value, used by `<>` kwargs.
	pub fn resolve_related_url(
		&self,
		obj: &Value,
		value: Option<&Value>,
	) -> RelationshipResult<Option<String>> {
		self.related_url.resolve(obj, value)
	}

	/// Resolve the `self` link for `obj`.
	pub fn resolve_self_url(
		&self,
		obj: &Value,
		value: Option<&Value>,
	) -> RelationshipResult<Option<String>> {
		self.self_url.resolve(obj, value)
	}

	/// Build resource linkage for a related object or collection.
	///
	/// Fails with a configuration error when no resource type is set.
	pub fn build_resource_linkage(&self, value: &Value) -> RelationshipResult<ResourceLinkage> {
		let resource_type = self
			.resource_type
			.as_deref()
			.ok_or(RelationshipError::MissingResourceType)?;
		let identify = |item: &Value| ResourceIdentifier::from_item(resource_type, &self.id_field, item);

		if !self.many {
			return Ok(ResourceLinkage::One(identify(value)));
		}
		let identifiers = match value {
			Value::Array(items) => items.iter().map(identify).collect(),
			single => vec![identify(single)],
		};
		Ok(ResourceLinkage::Many(identifiers))
	}

	/// Serialize `value` (the field's target, read from `obj` under `attr`)
	/// into a relationship object.
	pub fn serialize(
		&self,
		value: Option<&Value>,
		attr: &str,
		obj: &Value,
	) -> RelationshipResult<Map<String, Value>> {
		tracing::trace!(field = attr, many = self.many, "serializing relationship");
		let value = value.filter(|v| !v.is_null());

		let mut ret = Map::new();
		let self_url = self.resolve_self_url(obj, value)?;
		let related_url = self.resolve_related_url(obj, value)?;
		if self_url.is_some() || related_url.is_some() {
			let mut links = Map::new();
			if let Some(url) = self_url {
				links.insert("self".to_string(), Value::String(url));
			}
			if let Some(url) = related_url {
				links.insert("related".to_string(), Value::String(url));
			}
			ret.insert("links".to_string(), Value::Object(links));
		}

		if self.include_data {
			let data = match value {
				None if self.many => Value::Array(Vec::new()),
				None => Value::Null,
				Some(value) => serde_json::to_value(self.build_resource_linkage(value)?)?,
			};
			ret.insert("data".to_string(), data);
		}
		Ok(ret)
	}

	/// Read the field's value from `obj` and serialize it.
	pub fn serialize_attribute(&self, attr: &str, obj: &Value) -> RelationshipResult<Map<String, Value>> {
		let value = self.get_value(attr, obj, None);
		self.serialize(value.as_ref(), attr, obj)
	}

	/// Load a relationship payload.
	///
	/// `raw` is the value found under the field's key, `None` when the key
	/// is absent. Missing values follow the base field policy. `{"data":
	/// null}` is an explicit empty relationship and loads as `Ok(None)`.
	pub fn deserialize(
		&self,
		raw: Option<&Value>,
		attr: &str,
	) -> RelationshipResult<Option<RelationshipIds>> {
		tracing::trace!(field = attr, "loading relationship");
		let Some(raw) = raw else {
			return self
				.options
				.load_missing()
				.map(|default| default.map(|value| self.ids_from_default(value)));
		};

		let data = raw
			.as_object()
			.and_then(|envelope| envelope.get("data"))
			.ok_or_else(|| RelationshipError::validation(MISSING_DATA_KEY))?;
		if data.is_null() {
			self.options.check_null()?;
			return Ok(None);
		}
		self.deserialize_data(data).map(Some)
	}

	/// Load the unwrapped `data` member, checking cardinality.
	pub fn deserialize_data(&self, data: &Value) -> RelationshipResult<RelationshipIds> {
		if self.many {
			let Value::Array(items) = data else {
				return Err(RelationshipError::validation(EXPECTED_LIST));
			};
			return items
				.iter()
				.map(|item| self.extract_value(item))
				.collect::<RelationshipResult<Vec<_>>>()
				.map(RelationshipIds::Many);
		}

		if is_collection(data) {
			return Err(RelationshipError::validation(UNEXPECTED_LIST));
		}
		self.extract_value(data).map(RelationshipIds::One)
	}

	/// Validate one resource identifier and return its `id` unchanged.
	///
	/// All problems with the identifier are reported together.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_jsonapi::Relationship;
	/// use serde_json::json;
	///
	/// let field = Relationship::builder().resource_type("comments").build().unwrap();
	/// let err = field.extract_value(&json!({})).unwrap_err();
	/// assert_eq!(err.messages(), ["Must have an `id` field", "Must have a `type` field"]);
	/// ```
	pub fn extract_value(&self, item: &Value) -> RelationshipResult<Value> {
		let mut errors = Vec::new();
		let object = item.as_object();

		let id = object.and_then(|o| o.get("id"));
		if id.is_none() {
			errors.push(MISSING_ID);
		}

		match object.and_then(|o| o.get("type")) {
			None => errors.push(MISSING_TYPE),
			Some(resource_type)
				if *resource_type != self.resource_type.as_deref().map_or(Value::Null, Value::from) =>
			{
				errors.push(INVALID_TYPE)
			}
			Some(_) => {}
		}

		match id {
			Some(id) if errors.is_empty() => Ok(id.clone()),
			_ => Err(ValidationError::new(errors).into()),
		}
	}

	/// The nested schema used for included resources.
	///
	/// Resolved on first use and cached until [`invalidate_schema`] or
	/// [`bind`] is called. The ordering flag is copied from the parent
	/// schema on every call.
	///
	/// [`invalidate_schema`]: Relationship::invalidate_schema
	/// [`bind`]: Relationship::bind
	pub fn resolved_schema(&self) -> RelationshipResult<Arc<dyn Schema>> {
		let parent = self.parent();
		let schema = self.schema.get_or_try_init(|| {
			let included = self
				.included
				.as_ref()
				.ok_or_else(|| RelationshipError::InvalidSchemaRef {
					kind: "None".to_string(),
				})?;
			let context = parent
				.as_ref()
				.map(|p| p.context().clone())
				.unwrap_or_default();
			let registry = self.registry.clone().unwrap_or_else(SchemaRegistry::global);
			tracing::debug!(reference = included.kind(), many = self.many, "resolving nested schema");
			included.resolve(self.many, &context, &registry)
		})?;
		schema.set_ordered(parent.as_ref().is_some_and(|p| p.ordered()));
		Ok(Arc::clone(schema))
	}

	/// Drop the cached nested schema, e.g. after the parent context was
	/// replaced.
	pub fn invalidate_schema(&mut self) {
		if self.schema.take().is_some() {
			tracing::debug!("invalidated nested schema cache");
		}
	}

	/// Dump the related value(s) through the nested schema and return the
	/// `data` member of the result.
	pub fn serialize_included(
		&self,
		attr: &str,
		obj: &Value,
		accessor: Option<Accessor<'_>>,
	) -> RelationshipResult<Value> {
		let schema = self.resolved_schema()?;
		let value = self.get_value(attr, obj, accessor).unwrap_or(Value::Null);
		let mut document = schema.dump(&value)?;
		Ok(document
			.as_object_mut()
			.and_then(|doc| doc.remove("data"))
			.unwrap_or(Value::Null))
	}

	fn ids_from_default(&self, value: Value) -> RelationshipIds {
		match value {
			Value::Array(ids) if self.many => RelationshipIds::Many(ids),
			value if self.many => RelationshipIds::Many(vec![value]),
			value => RelationshipIds::One(value),
		}
	}
}

impl std::fmt::Debug for Relationship {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Relationship")
			.field("resource_type", &self.resource_type)
			.field("id_field", &self.id_field)
			.field("many", &self.many)
			.field("include_data", &self.include_data)
			.field("related_url", &self.related_url)
			.field("self_url", &self.self_url)
			.field("included", &self.included)
			.field("options", &self.options)
			.field("bound", &self.parent().is_some())
			.field("schema_cached", &self.schema.get().is_some())
			.finish()
	}
}

/// Builder for [`Relationship`].
#[derive(Default)]
pub struct RelationshipBuilder {
	resource_type: Option<String>,
	id_field: Option<String>,
	many: bool,
	include_data: bool,
	related_url: LinkTemplate,
	self_url: LinkTemplate,
	included: Option<SchemaRef>,
	registry: Option<Arc<SchemaRegistry>>,
	options: FieldOptions,
}

impl RelationshipBuilder {
	/// Set the resource type.
	pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
		self.resource_type = Some(resource_type.into());
		self
	}

	/// Set the attribute holding related ids (default: `"id"`).
	pub fn id_field(mut self, id_field: impl Into<String>) -> Self {
		self.id_field = Some(id_field.into());
		self
	}

	/// Mark the relationship as to-many.
	pub fn many(mut self, many: bool) -> Self {
		self.many = many;
		self
	}

	/// Emit resource linkage. Requires a resource type.
	pub fn include_data(mut self, include_data: bool) -> Self {
		self.include_data = include_data;
		self
	}

	/// Set the `related` link template.
	pub fn related_url(mut self, template: impl Into<String>) -> Self {
		self.related_url.set_template(template);
		self
	}

	/// Add a `related` link kwarg. Strings written as `<path>` are read off
	/// the serialized object.
	pub fn related_url_kwarg(mut self, name: impl Into<String>, value: impl Into<UrlKwarg>) -> Self {
		self.related_url.set_kwarg(name, value);
		self
	}

	/// Set the `self` link template.
	pub fn self_url(mut self, template: impl Into<String>) -> Self {
		self.self_url.set_template(template);
		self
	}

	/// Add a `self` link kwarg.
	pub fn self_url_kwarg(mut self, name: impl Into<String>, value: impl Into<UrlKwarg>) -> Self {
		self.self_url.set_kwarg(name, value);
		self
	}

	/// Set the nested schema reference.
	pub fn schema(mut self, schema: SchemaRef) -> Self {
		self.included = Some(schema);
		self
	}

	/// Use an existing schema instance for included resources.
	pub fn schema_instance(self, schema: Arc<dyn Schema>) -> Self {
		self.schema(SchemaRef::Instance(schema))
	}

	/// Build included resources' schema with `factory`.
	pub fn schema_factory(self, factory: SchemaFactory) -> Self {
		self.schema(SchemaRef::Factory(factory))
	}

	/// Look the nested schema up by name.
	pub fn schema_name(self, name: impl Into<String>) -> Self {
		self.schema(SchemaRef::Name(name.into()))
	}

	/// Resolve schema names against `registry` instead of the global one.
	pub fn registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
		self.registry = Some(registry);
		self
	}

	/// Replace all base field options.
	pub fn options(mut self, options: FieldOptions) -> Self {
		self.options = options;
		self
	}

	/// Fail loading when the field is missing.
	pub fn required(mut self, required: bool) -> Self {
		self.options.required = required;
		self
	}

	/// Read the value from a different object key.
	pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
		self.options.attribute = Some(attribute.into());
		self
	}

	/// Value loaded when the field is missing.
	pub fn default_value(mut self, default: Value) -> Self {
		self.options.default = Some(default);
		self
	}

	/// Accept `{"data": null}` (default: `true`).
	pub fn allow_none(mut self, allow_none: bool) -> Self {
		self.options.allow_none = allow_none;
		self
	}

	/// Finish the field.
	///
	/// Fails if `include_data` is set without a resource type.
	pub fn build(self) -> RelationshipResult<Relationship> {
		let resource_type = self.resource_type.filter(|t| !t.is_empty());
		if self.include_data && resource_type.is_none() {
			return Err(RelationshipError::MissingResourceType);
		}
		Ok(Relationship {
			resource_type,
			id_field: self.id_field.unwrap_or_else(|| DEFAULT_ID_FIELD.to_string()),
			many: self.many,
			include_data: self.include_data,
			related_url: self.related_url,
			self_url: self.self_url,
			included: self.included,
			registry: self.registry,
			options: self.options,
			parent: None,
			schema: OnceCell::new(),
		})
	}
}

impl TryFrom<RelationshipConfig> for Relationship {
	type Error = RelationshipError;

	fn try_from(config: RelationshipConfig) -> Result<Self, Self::Error> {
		Relationship::from_config(config)
	}
}
