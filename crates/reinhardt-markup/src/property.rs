//! Attribute and style properties.
//!
//! A [`Property`] is an immutable name/value pair attached to a node either
//! as an HTML attribute or as an inline style declaration. A node keeps its
//! properties in insertion order; duplicate names are legal and all of them
//! are rendered, while lookups return the first match.

use serde::{Deserialize, Serialize};

use crate::util::html_escape;

/// Whether a property is rendered as an attribute or as a style declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
	/// An HTML attribute (`name="value"`).
	Attribute,
	/// An inline style declaration (`name: value;`).
	Style,
}

/// An immutable name/value pair attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
	kind: PropertyKind,
	name: String,
	value: String,
}

impl Property {
	/// Creates an attribute property.
	pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			kind: PropertyKind::Attribute,
			name: name.into(),
			value: value.into(),
		}
	}

	/// Creates a style property.
	pub fn style(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			kind: PropertyKind::Style,
			name: name.into(),
			value: value.into(),
		}
	}

	/// Returns the property kind.
	pub fn kind(&self) -> PropertyKind {
		self.kind
	}

	/// Returns the property name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the property value.
	pub fn value(&self) -> &str {
		&self.value
	}

	/// Renders the property to its markup form.
	///
	/// Attributes render as `name="value"` with the value HTML-escaped,
	/// styles render as `name: value;`.
	pub fn render(&self) -> String {
		match self.kind {
			PropertyKind::Attribute => format!("{}=\"{}\"", self.name, html_escape(&self.value)),
			PropertyKind::Style => format!("{}: {};", self.name, self.value),
		}
	}
}

/// Compares two property lists as multisets of name/value pairs.
///
/// Order is ignored, multiplicity is not: `[a, a]` differs from `[a]`.
pub fn properties_equal(left: &[Property], right: &[Property]) -> bool {
	if left.len() != right.len() {
		return false;
	}

	let mut left: Vec<(&str, &str)> = left.iter().map(|p| (p.name(), p.value())).collect();
	let mut right: Vec<(&str, &str)> = right.iter().map(|p| (p.name(), p.value())).collect();
	left.sort_unstable();
	right.sort_unstable();
	left == right
}

/// Returns the value of the first property named `name`.
pub fn find_property<'a>(properties: &'a [Property], name: &str) -> Option<&'a str> {
	properties
		.iter()
		.find(|p| p.name() == name)
		.map(Property::value)
}
