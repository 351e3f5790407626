//! The markup tree.
//!
//! A [`Markup`] node is either an element or a text unit. It exclusively
//! owns its children, properties, events and morphers, and only references
//! the event sink it forwards to its children.
//!
//! ## Identity
//!
//! Every node carries two tokens:
//!
//! - `uid`: assigned at construction and swapped during reconciliation. It
//!   denotes the physical rendered element and survives across renders of
//!   the same position.
//! - `hash`: regenerated whenever the subtree's output may have changed and
//!   copied from the previous render when it did not, so consumers can skip
//!   patch work by comparing hashes.
//!
//! ## Removal
//!
//! Deletion is two-phase. [`Markup::remove`] only marks a node (and tags it
//! with [`REMOVED_ATTR`]); the node stays in its parent's children until
//! [`Markup::clean`] sweeps it out.
//!
//! ## Example
//!
//! ```
//! use reinhardt_markup::{Event, Markup};
//!
//! let view = Markup::element("div")
//!     .attr("class", "container")
//!     .child(Markup::element("button").on(Event::new("click")).child(Markup::text("Save")));
//!
//! assert_eq!(view.children().len(), 1);
//! assert_eq!(view.attribute("class"), Some("container"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::event::{Event, EventOwner, RemovalProbe};
use crate::identity::{new_hash, new_uid, selector_for};
use crate::manager::{SharedEventSink, same_sink};
use crate::morph::{Morpher, SharedMorpher};
use crate::property::{Property, PropertyKind, find_property};
use crate::util::is_void_element;

/// Attribute stamped on every element to mark the framework as its origin.
pub const MARKER_ATTR: &str = "data-gen";

/// Value of [`MARKER_ATTR`].
pub const MARKER_VALUE: &str = "reinhardt";

/// Sentinel attribute added to soft-removed nodes.
pub const REMOVED_ATTR: &str = "data-node-removed";

/// Tag name reserved for text nodes.
pub const TEXT_TAG: &str = "text";

/// Structural capabilities of a node, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
	/// Whether children may be added.
	pub children: bool,
	/// Whether styles may be added.
	pub styles: bool,
	/// Whether attributes may be added.
	pub attributes: bool,
	/// Whether events may be attached.
	pub events: bool,
}

impl Capabilities {
	/// Everything allowed (elements).
	pub const ALL: Self = Self {
		children: true,
		styles: true,
		attributes: true,
		events: true,
	};

	/// Nothing allowed (text nodes).
	pub const NONE: Self = Self {
		children: false,
		styles: false,
		attributes: false,
		events: false,
	};
}

/// A node of the markup tree.
pub struct Markup {
	pub(crate) uid: String,
	pub(crate) hash: String,
	pub(crate) tag: String,
	pub(crate) auto_closing: bool,
	pub(crate) text: String,
	pub(crate) capabilities: Capabilities,
	pub(crate) children: Vec<Markup>,
	pub(crate) events: Vec<Event>,
	pub(crate) styles: Vec<Property>,
	pub(crate) attributes: Vec<Property>,
	pub(crate) morphers: Vec<SharedMorpher>,
	removed: Arc<AtomicBool>,
	pub(crate) event_manager: Option<SharedEventSink>,
}

impl Markup {
	/// Creates an element node.
	///
	/// The tag is trimmed and lower-cased. The node allows everything and is
	/// stamped with the [`MARKER_ATTR`] attribute.
	pub fn new(tag: impl AsRef<str>, auto_closing: bool) -> Self {
		let mut node = Self::bare(
			tag.as_ref().trim().to_lowercase(),
			auto_closing,
			Capabilities::ALL,
		);
		node.attributes.push(Property::attr(MARKER_ATTR, MARKER_VALUE));
		node
	}

	/// Creates an element node, closing it automatically if the tag is an
	/// HTML void element.
	pub fn element(tag: impl AsRef<str>) -> Self {
		let tag = tag.as_ref().trim().to_lowercase();
		let auto_closing = is_void_element(&tag);
		Self::new(tag, auto_closing)
	}

	/// Creates a text node. Text nodes allow no children, properties or events.
	pub fn text(value: impl Into<String>) -> Self {
		let mut node = Self::bare(TEXT_TAG.to_string(), false, Capabilities::NONE);
		node.text = value.into();
		node
	}

	pub(crate) fn bare(tag: String, auto_closing: bool, capabilities: Capabilities) -> Self {
		Self {
			uid: new_uid(),
			hash: new_hash(),
			tag,
			auto_closing,
			text: String::new(),
			capabilities,
			children: Vec::new(),
			events: Vec::new(),
			styles: Vec::new(),
			attributes: Vec::new(),
			morphers: Vec::new(),
			removed: Arc::new(AtomicBool::new(false)),
			event_manager: None,
		}
	}

	// ------------------------------------------------------------------
	// Accessors
	// ------------------------------------------------------------------

	/// Returns the tag name.
	pub fn tag_name(&self) -> &str {
		&self.tag
	}

	/// Returns `true` for text nodes.
	pub fn is_text(&self) -> bool {
		self.tag == TEXT_TAG
	}

	/// Returns `true` if the element has no closing tag.
	pub fn is_auto_closing(&self) -> bool {
		self.auto_closing
	}

	/// Returns the text payload (empty for elements).
	pub fn text_content(&self) -> &str {
		&self.text
	}

	/// Returns the node's uid.
	pub fn uid(&self) -> &str {
		&self.uid
	}

	/// Returns the node's hash.
	pub fn hash(&self) -> &str {
		&self.hash
	}

	/// Returns the node's capabilities.
	pub fn capabilities(&self) -> Capabilities {
		self.capabilities
	}

	/// Returns the children.
	pub fn children(&self) -> &[Markup] {
		&self.children
	}

	/// Returns the children mutably.
	pub fn children_mut(&mut self) -> &mut [Markup] {
		&mut self.children
	}

	/// Returns the attributes in insertion order.
	pub fn attributes(&self) -> &[Property] {
		&self.attributes
	}

	/// Returns the styles in insertion order.
	pub fn styles(&self) -> &[Property] {
		&self.styles
	}

	/// Returns the attached events.
	pub fn events(&self) -> &[Event] {
		&self.events
	}

	/// Returns the number of attached morphers.
	pub fn morpher_count(&self) -> usize {
		self.morphers.len()
	}

	/// Returns the value of the first attribute named `name`.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		find_property(&self.attributes, name)
	}

	/// Returns the value of the first style named `name`.
	pub fn style_value(&self, name: &str) -> Option<&str> {
		find_property(&self.styles, name)
	}

	/// Returns the bound event sink, if any.
	pub fn event_manager(&self) -> Option<&SharedEventSink> {
		self.event_manager.as_ref()
	}

	/// Returns the selector addressing this node: `tag[uid='<uid>']`.
	pub fn event_id(&self) -> String {
		selector_for(&self.tag, &self.uid)
	}

	// ------------------------------------------------------------------
	// Builders
	// ------------------------------------------------------------------

	/// Adds an attribute.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.add_property(Property::attr(name, value));
		self
	}

	/// Adds a style declaration.
	pub fn style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.add_property(Property::style(name, value));
		self
	}

	/// Adds a child.
	pub fn child(mut self, child: Markup) -> Self {
		self.add_child(child);
		self
	}

	/// Adds multiple children in order.
	pub fn children_from(mut self, children: impl IntoIterator<Item = Markup>) -> Self {
		self.add_children(children);
		self
	}

	/// Attaches an event.
	pub fn on(mut self, event: Event) -> Self {
		self.attach_event(event);
		self
	}

	/// Adds a morpher.
	pub fn morpher(mut self, morpher: impl Morpher + 'static) -> Self {
		self.add_morpher(morpher);
		self
	}

	// ------------------------------------------------------------------
	// Mutation
	// ------------------------------------------------------------------

	/// Appends a child and propagates this node's event sink to it.
	///
	/// Ignored if the node does not allow children.
	pub fn add_child(&mut self, mut child: Markup) {
		if !self.capabilities.children {
			tracing::trace!(tag = %self.tag, "node does not allow children, child dropped");
			return;
		}

		if let Some(sink) = &self.event_manager {
			child.bind_event_manager(Arc::clone(sink));
		}
		self.children.push(child);
	}

	/// Appends children in order.
	pub fn add_children(&mut self, children: impl IntoIterator<Item = Markup>) {
		for child in children {
			self.add_child(child);
		}
	}

	/// Adds an attribute or style, depending on the property kind.
	///
	/// Ignored if the node does not allow that kind of property.
	pub fn add_property(&mut self, property: Property) {
		match property.kind() {
			PropertyKind::Attribute if self.capabilities.attributes => {
				self.attributes.push(property);
			}
			PropertyKind::Style if self.capabilities.styles => {
				self.styles.push(property);
			}
			_ => {
				tracing::trace!(tag = %self.tag, property = property.name(), "property not allowed");
			}
		}
	}

	/// Adds an attribute.
	pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.add_property(Property::attr(name, value));
	}

	/// Adds a style declaration.
	pub fn add_style(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.add_property(Property::style(name, value));
	}

	/// Attaches an event to this node, making the node its owner.
	///
	/// Ignored if the node does not allow events.
	pub fn attach_event(&mut self, mut event: Event) {
		if !self.capabilities.events {
			tracing::trace!(tag = %self.tag, kind = event.kind(), "node does not allow events");
			return;
		}

		event.bind_owner(self.owner());
		self.events.push(event);
	}

	/// Adds a morpher to the end of this node's pipeline.
	pub fn add_morpher(&mut self, morpher: impl Morpher + 'static) {
		self.morphers.push(Arc::new(morpher));
	}

	/// Adds an already shared morpher.
	pub fn add_shared_morpher(&mut self, morpher: SharedMorpher) {
		self.morphers.push(morpher);
	}

	pub(crate) fn owner(&self) -> EventOwner {
		EventOwner {
			tag: self.tag.clone(),
			uid: self.uid.clone(),
			probe: RemovalProbe::new(&self.removed),
		}
	}

	// ------------------------------------------------------------------
	// Identity
	// ------------------------------------------------------------------

	/// Replaces the uid. Attached events follow the new identity.
	pub fn swap_uid(&mut self, uid: impl Into<String>) {
		self.uid = uid.into();
		for event in &mut self.events {
			event.rebind_uid(&self.uid);
		}
	}

	/// Replaces the hash.
	pub fn swap_hash(&mut self, hash: impl Into<String>) {
		self.hash = hash.into();
	}

	/// Regenerates the hash.
	pub fn update_hash(&mut self) {
		self.hash = crate::identity::fresh_hash(&self.hash);
	}

	// ------------------------------------------------------------------
	// Soft removal
	// ------------------------------------------------------------------

	/// Returns `true` if the node is marked removed.
	pub fn is_removed(&self) -> bool {
		self.removed.load(Ordering::Acquire)
	}

	/// Marks the node removed and tags it with [`REMOVED_ATTR`].
	pub fn remove(&mut self) {
		if self.is_removed() {
			return;
		}
		self.attributes.push(Property::attr(REMOVED_ATTR, ""));
		self.removed.store(true, Ordering::Release);
	}

	/// Clears the removal mark and its sentinel attribute.
	pub fn un_remove(&mut self) {
		if !self.is_removed() {
			return;
		}
		self.removed.store(false, Ordering::Release);
		if let Some(index) = self.attributes.iter().position(|a| a.name() == REMOVED_ATTR) {
			self.attributes.remove(index);
		}
	}

	/// Drops every child marked removed, then cleans the survivors.
	pub fn clean(&mut self) {
		self.children.retain(|child| !child.is_removed());
		for child in &mut self.children {
			child.clean();
		}
	}

	/// Resets the node to an empty shell.
	///
	/// Children, events, styles and morphers are dropped and the event sink is
	/// unbound. Attributes, identity and text are kept. Registrations held by
	/// the dropped subtree are ended.
	pub fn empty(&mut self) {
		self.retire_events();
		self.children.clear();
		self.events.clear();
		self.styles.clear();
		self.morphers.clear();
		self.event_manager = None;
	}

	// ------------------------------------------------------------------
	// Events
	// ------------------------------------------------------------------

	/// Binds an event sink to this node.
	///
	/// If the node already has a sink, `sink` is chained to it and `false`
	/// is returned. Otherwise the node adopts `sink`, loads its subtree's
	/// events into it and returns `true`.
	pub fn bind_event_manager(&mut self, sink: SharedEventSink) -> bool {
		if let Some(current) = &self.event_manager {
			if !same_sink(current, &sink) {
				sink.attach_manager(Arc::clone(current));
			}
			return false;
		}

		self.event_manager = Some(sink);
		self.load_events();
		true
	}

	/// Registers this subtree's events with the bound sinks.
	///
	/// Stale registrations are disconnected first. Soft-removed subtrees are
	/// skipped. A registration the sink refuses leaves that event unregistered.
	pub fn load_events(&mut self) {
		if self.is_removed() {
			return;
		}

		let sink = self.event_manager.clone();
		if let Some(sink) = &sink {
			sink.disconnect_removed();

			for event in &mut self.events {
				match sink.new_event_registration(&event.meta()) {
					Some(handle) => event.set_registration(handle),
					None => {
						tracing::debug!(event = %event.id(), "event sink refused registration");
					}
				}
			}
		}

		for child in &mut self.children {
			match &sink {
				Some(sink) => {
					if !child.bind_event_manager(Arc::clone(sink)) {
						child.load_events();
					}
				}
				None => child.load_events(),
			}
		}
	}

	/// Visits every event in the subtree, depth-first, with its owning node.
	pub fn each_event<F>(&self, mut visitor: F)
	where
		F: FnMut(&Event, &Markup),
	{
		self.each_event_inner(&mut visitor);
	}

	fn each_event_inner<F>(&self, visitor: &mut F)
	where
		F: FnMut(&Event, &Markup),
	{
		for event in &self.events {
			visitor(event, self);
		}
		for child in &self.children {
			child.each_event_inner(visitor);
		}
	}

	/// Ends the registration of every event in the subtree, returning how
	/// many were retired.
	pub fn retire_events(&mut self) -> usize {
		let own = self.events.iter_mut().map(Event::retire).filter(|ended| *ended).count();
		own + self
			.children
			.iter_mut()
			.map(Markup::retire_events)
			.sum::<usize>()
	}
}

/// Deep copy with fresh identity.
///
/// The copy gets a new uid and hash but the same tag, text, capabilities
/// and removal state. Properties, children and events are copied element by
/// element; morphers are shared. The copy is not bound to any event sink.
impl Clone for Markup {
	fn clone(&self) -> Self {
		let mut copy = Self::bare(self.tag.clone(), self.auto_closing, self.capabilities);
		copy.text = self.text.clone();
		copy.removed.store(self.is_removed(), Ordering::Release);
		copy.styles = self.styles.clone();
		copy.attributes = self.attributes.clone();
		copy.children = self.children.clone();

		let owner = copy.owner();
		copy.events = self
			.events
			.iter()
			.map(|event| {
				let mut event = event.clone();
				event.bind_owner(owner.clone());
				event
			})
			.collect();

		copy.morphers = self.morphers.clone();
		copy
	}
}

impl std::fmt::Debug for Markup {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Markup")
			.field("tag", &self.tag)
			.field("uid", &self.uid)
			.field("hash", &self.hash)
			.field("text", &self.text)
			.field("removed", &self.is_removed())
			.field("attributes", &self.attributes)
			.field("styles", &self.styles)
			.field("events", &self.events)
			.field("morphers", &self.morphers.len())
			.field("children", &self.children)
			.finish()
	}
}
