//! # reinhardt-jsonapi
//!
//! JSON:API relationship fields for Reinhardt serializers.
//!
//! A [`Relationship`] renders a related object (or collection) either as
//! resource linkage (`{"type", "id"}` pairs), as `self`/`related` links, or
//! both, and loads relationship payloads from requests back into ids.
//!
//! ## Features
//!
//! - **Resource linkage**: to-one and to-many linkage with configurable id attribute
//! - **Links**: URL templates whose kwargs are literals or `<attribute.path>` lookups
//! - **Loading**: payload validation reporting every identifier problem at once
//! - **Included resources**: nested schemas referenced by instance, factory or
//!   registered name, resolved lazily and cached per field
//!
//! Document assembly (`data`/`included`/`errors` envelopes) is left to the
//! surrounding serializer.
//!
//! ## Examples
//!
//! ```rust
//! use reinhardt_jsonapi::Relationship;
//! use serde_json::json;
//!
//! let author = Relationship::builder()
//! 	.resource_type("people")
//! 	.include_data(true)
//! 	.related_url("/people/{author_id}")
//! 	.related_url_kwarg("author_id", "<author.id>")
//! 	.build()
//! 	.unwrap();
//!
//! let post = json!({"id": 1, "author": {"id": 9, "name": "Dan"}});
//! let out = author.serialize_attribute("author", &post).unwrap();
//! assert_eq!(out["data"], json!({"type": "people", "id": "9"}));
//! assert_eq!(out["links"]["related"], json!("/people/9"));
//!
//! let ids = author
//! 	.deserialize(Some(&json!({"data": {"type": "people", "id": "9"}})), "author")
//! 	.unwrap();
//! assert_eq!(ids.unwrap().as_one(), Some(&json!("9")));
//! ```

pub mod accessor;
pub mod config;
pub mod context;
pub mod error;
pub mod field;
pub mod linkage;
pub mod registry;
pub mod relationship;
pub mod schema;
pub mod url;

pub use config::RelationshipConfig;
pub use context::SchemaContext;
pub use error::{RelationshipError, RelationshipResult, ValidationError};
pub use field::FieldOptions;
pub use linkage::{ResourceIdentifier, ResourceLinkage};
pub use registry::SchemaRegistry;
pub use relationship::{Relationship, RelationshipBuilder, RelationshipIds};
pub use schema::{FnSchema, Schema, SchemaFactory, SchemaOptions, SchemaRef};
pub use url::{LinkTemplate, UrlKwarg};
