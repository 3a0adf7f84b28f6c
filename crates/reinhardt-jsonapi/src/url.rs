//! Link templates for relationship `self` and `related` URLs
//!
//! A template such as `/posts/{post_id}/comments/` is paired with kwargs that
//! fill its placeholders. A kwarg written as `<path>` is read off the object
//! being serialized; anything else is used as-is. Kwargs are classified once,
//! when the template is built.

use crate::accessor::get_value;
use crate::error::{RelationshipError, RelationshipResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

static PATH_MARKER: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^\s*<\s*(\S*)\s*>\s*$").expect("path marker pattern is valid"));

/// A single URL kwarg: either a literal or an attribute path on the object.
#[derive(Debug, Clone, PartialEq)]
pub enum UrlKwarg {
	/// Inserted into the URL unchanged.
	Literal(Value),
	/// Dotted attribute path read from the serialized object.
	///
	/// An empty path refers to the field's own target value.
	Path(String),
}

impl UrlKwarg {
	/// Classify a raw kwarg value.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_jsonapi::url::UrlKwarg;
	/// use serde_json::json;
	///
	/// assert_eq!(UrlKwarg::parse(json!("<author.id>")), UrlKwarg::Path("author.id".into()));
	/// assert_eq!(UrlKwarg::parse(json!("v1")), UrlKwarg::Literal(json!("v1")));
	/// assert_eq!(UrlKwarg::parse(json!(3)), UrlKwarg::Literal(json!(3)));
	/// ```
	pub fn parse(raw: Value) -> Self {
		if let Value::String(s) = &raw
			&& let Some(caps) = PATH_MARKER.captures(s)
		{
			return UrlKwarg::Path(caps[1].to_string());
		}
		UrlKwarg::Literal(raw)
	}

	/// Resolve this kwarg against `obj`.
	///
	/// `field_value` is the field's own target value, used for empty paths.
	/// An empty path without a target value is a lookup error.
	pub fn resolve(&self, obj: &Value, field_value: Option<&Value>) -> RelationshipResult<Value> {
		match self {
			UrlKwarg::Literal(value) => Ok(value.clone()),
			UrlKwarg::Path(path) if path.is_empty() => field_value
				.cloned()
				.ok_or_else(|| RelationshipError::AttributeLookup { path: String::new() }),
			UrlKwarg::Path(path) => get_value(obj, path)
				.cloned()
				.ok_or_else(|| RelationshipError::AttributeLookup { path: path.clone() }),
		}
	}
}

impl From<&str> for UrlKwarg {
	fn from(raw: &str) -> Self {
		UrlKwarg::parse(Value::String(raw.to_string()))
	}
}

impl From<String> for UrlKwarg {
	fn from(raw: String) -> Self {
		UrlKwarg::parse(Value::String(raw))
	}
}

impl From<Value> for UrlKwarg {
	fn from(raw: Value) -> Self {
		UrlKwarg::parse(raw)
	}
}

/// A URL template together with the kwargs that fill it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkTemplate {
	template: String,
	kwargs: Vec<(String, UrlKwarg)>,
}

impl LinkTemplate {
	/// Create a template with no kwargs.
	pub fn new(template: impl Into<String>) -> Self {
		Self {
			template: template.into(),
			kwargs: Vec::new(),
		}
	}

	/// Add (or replace) a kwarg.
	pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<UrlKwarg>) -> Self {
		self.set_kwarg(name, value);
		self
	}

	pub(crate) fn set_template(&mut self, template: impl Into<String>) {
		self.template = template.into();
	}

	pub(crate) fn set_kwarg(&mut self, name: impl Into<String>, value: impl Into<UrlKwarg>) {
		let name = name.into();
		let value = value.into();
		match self.kwargs.iter_mut().find(|(n, _)| *n == name) {
			Some(slot) => slot.1 = value,
			None => self.kwargs.push((name, value)),
		}
	}

	/// The raw template string.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Kwargs in declaration order.
	pub fn kwargs(&self) -> &[(String, UrlKwarg)] {
		&self.kwargs
	}

	/// Returns `true` if no template was configured.
	pub fn is_empty(&self) -> bool {
		self.template.is_empty()
	}

	/// Resolve the kwargs against `obj` and format the template.
	///
	/// Returns `Ok(None)` when no template is configured or the formatted URL
	/// is empty.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_jsonapi::url::LinkTemplate;
	/// use serde_json::json;
	///
	/// let link = LinkTemplate::new("/authors/{author_id}").kwarg("author_id", "<author.id>");
	/// let post = json!({"author": {"id": 9}});
	///
	/// assert_eq!(link.resolve(&post, None).unwrap().as_deref(), Some("/authors/9"));
	/// ```
	pub fn resolve(
		&self,
		obj: &Value,
		field_value: Option<&Value>,
	) -> RelationshipResult<Option<String>> {
		if self.template.is_empty() {
			return Ok(None);
		}
		let mut params = HashMap::with_capacity(self.kwargs.len());
		for (name, kwarg) in &self.kwargs {
			params.insert(name.as_str(), kwarg.resolve(obj, field_value)?);
		}
		let url = format_template(&self.template, &params)?;
		Ok((!url.is_empty()).then_some(url))
	}
}

/// Format `{name}` placeholders in `template` from `params`.
///
/// `{{` and `}}` produce literal braces. Anything after `:` or `!` inside a
/// placeholder is ignored.
pub fn format_template(template: &str, params: &HashMap<&str, Value>) -> RelationshipResult<String> {
	let invalid = |message: &str| RelationshipError::InvalidTemplate {
		template: template.to_string(),
		message: message.to_string(),
	};

	let mut out = String::with_capacity(template.len());
	let mut chars = template.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'{' if chars.peek() == Some(&'{') => {
				chars.next();
				out.push('{');
			}
			'{' => {
				let mut field = String::new();
				loop {
					match chars.next() {
						Some('}') => break,
						Some(ch) => field.push(ch),
						None => return Err(invalid("expected '}' before end of string")),
					}
				}
				let name = field
					.split([':', '!'])
					.next()
					.unwrap_or_default()
					.trim();
				let value =
					params
						.get(name)
						.ok_or_else(|| RelationshipError::UnresolvedPlaceholder {
							template: template.to_string(),
							placeholder: name.to_string(),
						})?;
				out.push_str(&render(value));
			}
			'}' if chars.peek() == Some(&'}') => {
				chars.next();
				out.push('}');
			}
			'}' => return Err(invalid("single '}' encountered")),
			other => out.push(other),
		}
	}
	Ok(out)
}

fn render(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}
