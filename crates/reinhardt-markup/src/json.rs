//! JSON projection of a markup tree.
//!
//! The projection is the wire shape sent to a remote renderer. Projecting
//! never mutates the tree; rebuilding a tree from JSON restores identity,
//! content and event declarations, but not handlers, morphers or sinks.

use serde::{Deserialize, Serialize};

use crate::error::{MarkupError, MarkupResult};
use crate::event::{Event, EventFlags};
use crate::markup::{Capabilities, Markup, REMOVED_ATTR, TEXT_TAG};
use crate::property::Property;

/// A `{name, value}` pair on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyJson {
	/// Property name.
	pub name: String,
	/// Property value.
	pub value: String,
}

impl From<&Property> for PropertyJson {
	fn from(property: &Property) -> Self {
		Self {
			name: property.name().to_string(),
			value: property.value().to_string(),
		}
	}
}

/// An event declaration on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventJson {
	/// Event kind.
	pub kind: String,
	/// Selector the event listens on.
	pub selector: String,
	/// Selector of the owning node.
	pub parent_selector: String,
	/// Dispatch flags.
	#[serde(flatten)]
	pub flags: EventFlags,
}

impl From<&Event> for EventJson {
	fn from(event: &Event) -> Self {
		Self {
			kind: event.kind().to_string(),
			selector: event.selector(),
			parent_selector: event.parent_selector(),
			flags: event.flags(),
		}
	}
}

/// A node on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupJson {
	/// Node uid.
	pub uid: String,
	/// Node hash.
	pub hash: String,
	/// Tag name (`text` for text nodes).
	pub tag: String,
	/// Text payload, present on text nodes only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	/// Whether the element has no closing tag.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub auto_closing: bool,
	/// Attributes in insertion order.
	#[serde(default)]
	pub attributes: Vec<PropertyJson>,
	/// Styles in insertion order.
	#[serde(default)]
	pub styles: Vec<PropertyJson>,
	/// Children in order.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<MarkupJson>,
	/// Attached events.
	#[serde(default)]
	pub events: Vec<EventJson>,
}

impl MarkupJson {
	/// Rebuilds a markup tree from its wire form.
	///
	/// # Errors
	///
	/// Returns [`MarkupError::EmptyTag`] for a node without a tag and
	/// [`MarkupError::TextWithChildren`] for a text node with children.
	pub fn into_markup(self) -> MarkupResult<Markup> {
		let tag = self.tag.trim().to_lowercase();
		if tag.is_empty() {
			return Err(MarkupError::EmptyTag { uid: self.uid });
		}

		if tag == TEXT_TAG {
			if !self.children.is_empty() {
				return Err(MarkupError::TextWithChildren {
					uid: self.uid,
					count: self.children.len(),
				});
			}
			let mut node = Markup::text(self.text.unwrap_or_default());
			node.swap_uid(self.uid);
			node.swap_hash(self.hash);
			if self.attributes.iter().any(|a| a.name == REMOVED_ATTR) {
				node.remove();
			}
			return Ok(node);
		}

		let mut node = Markup::bare(tag, self.auto_closing, Capabilities::ALL);
		node.swap_uid(self.uid);
		node.swap_hash(self.hash);

		let mut removed = false;
		for attribute in self.attributes {
			if attribute.name == REMOVED_ATTR {
				removed = true;
				continue;
			}
			node.add_property(Property::attr(attribute.name, attribute.value));
		}
		for style in self.styles {
			node.add_property(Property::style(style.name, style.value));
		}

		let own_selector = node.event_id();
		for event in self.events {
			let mut rebuilt = Event::new(event.kind).with_flags(event.flags);
			if event.selector != own_selector {
				rebuilt = rebuilt.target(event.selector);
			}
			node.attach_event(rebuilt);
		}

		for child in self.children {
			node.add_child(child.into_markup()?);
		}

		if removed {
			node.remove();
		}
		Ok(node)
	}
}

impl Markup {
	/// Projects the subtree to its wire form.
	pub fn to_json(&self) -> MarkupJson {
		MarkupJson {
			uid: self.uid().to_string(),
			hash: self.hash().to_string(),
			tag: self.tag_name().to_string(),
			text: self.is_text().then(|| self.text_content().to_string()),
			auto_closing: self.is_auto_closing(),
			attributes: self.attributes().iter().map(PropertyJson::from).collect(),
			styles: self.styles().iter().map(PropertyJson::from).collect(),
			children: self.children().iter().map(Markup::to_json).collect(),
			events: self.events().iter().map(EventJson::from).collect(),
		}
	}

	/// Serializes the subtree to a JSON string.
	pub fn to_json_string(&self) -> MarkupResult<String> {
		Ok(serde_json::to_string(&self.to_json())?)
	}

	/// Rebuilds a tree from a JSON string.
	pub fn from_json_str(json: &str) -> MarkupResult<Markup> {
		serde_json::from_str::<MarkupJson>(json)?.into_markup()
	}
}
