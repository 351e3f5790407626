//! Event registrations attached to markup nodes.
//!
//! An [`Event`] is created detached and becomes attached when a node adopts
//! it through [`Markup::attach_event`](crate::Markup::attach_event). From
//! then on the node owns it exclusively. The event keeps a lightweight
//! reference to its owner (tag, uid and a removal probe) instead of a pointer
//! back into the tree, so selectors follow the owner's identity without
//! creating ownership cycles.
//!
//! Identity for cross-render matching is `(selector, kind)`, see [`Event::id`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

use crate::identity::selector_for;
use crate::manager::RegistrationHandle;

/// Handler invoked when a registered event is dispatched.
pub type EventHandler = Arc<dyn Fn(&EventPayload) + Send + Sync + 'static>;

/// Dispatch flags carried by an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFlags {
	/// Whether the default browser action should be prevented.
	pub prevent_default: bool,
	/// Whether propagation should stop at the target.
	pub stop_propagation: bool,
	/// Whether other listeners on the same target should be skipped.
	pub stop_immediate_propagation: bool,
	/// Whether the listener is registered for the capture phase.
	pub use_capture: bool,
}

/// An event occurrence posted back for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
	/// The event kind (e.g. `click`).
	pub kind: String,
	/// The selector of the element the event targets.
	pub selector: String,
	/// Arbitrary event data supplied by the remote runtime.
	#[serde(default)]
	pub data: serde_json::Value,
}

impl EventPayload {
	/// Creates a payload without data.
	pub fn new(kind: impl Into<String>, selector: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			selector: selector.into(),
			data: serde_json::Value::Null,
		}
	}

	/// Sets the payload data.
	pub fn with_data(mut self, data: serde_json::Value) -> Self {
		self.data = data;
		self
	}

	/// Returns the event id this payload addresses.
	pub fn id(&self) -> String {
		format!("{}#{}", self.selector, self.kind)
	}
}

/// A weak view on a node's soft-removal marker.
///
/// The probe reports the node as live only while the node still exists and
/// is not marked removed.
#[derive(Debug, Clone, Default)]
pub struct RemovalProbe(Weak<AtomicBool>);

impl RemovalProbe {
	pub(crate) fn new(flag: &Arc<AtomicBool>) -> Self {
		Self(Arc::downgrade(flag))
	}

	/// Returns `true` while the observed node exists and is not removed.
	pub fn is_live(&self) -> bool {
		self.0
			.upgrade()
			.is_some_and(|removed| !removed.load(Ordering::Acquire))
	}
}

/// The node an attached event belongs to.
#[derive(Debug, Clone)]
pub(crate) struct EventOwner {
	pub(crate) tag: String,
	pub(crate) uid: String,
	pub(crate) probe: RemovalProbe,
}

impl EventOwner {
	fn selector(&self) -> String {
		selector_for(&self.tag, &self.uid)
	}
}

/// Everything an event sink needs to register an event.
#[derive(Clone)]
pub struct EventMeta {
	/// The event kind.
	pub kind: String,
	/// Selector of the element the event listens on.
	pub selector: String,
	/// Selector of the node owning the event.
	pub parent_selector: String,
	/// Dispatch flags.
	pub flags: EventFlags,
	/// Optional handler.
	pub handler: Option<EventHandler>,
	/// Liveness of the owning node.
	pub target: RemovalProbe,
}

impl EventMeta {
	/// Returns the `<selector>#<kind>` id of the registration.
	pub fn id(&self) -> String {
		format!("{}#{}", self.selector, self.kind)
	}
}

impl std::fmt::Debug for EventMeta {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventMeta")
			.field("kind", &self.kind)
			.field("selector", &self.selector)
			.field("parent_selector", &self.parent_selector)
			.field("flags", &self.flags)
			.field("has_handler", &self.handler.is_some())
			.finish()
	}
}

/// An event registration record bound to a node.
pub struct Event {
	kind: String,
	target: Option<String>,
	flags: EventFlags,
	handler: Option<EventHandler>,
	owner: Option<EventOwner>,
	registration: Option<RegistrationHandle>,
}

impl Event {
	/// Creates a detached event of the given kind.
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			target: None,
			flags: EventFlags::default(),
			handler: None,
			owner: None,
			registration: None,
		}
	}

	/// Sets an explicit target selector, which takes precedence over the
	/// owner-derived selector.
	pub fn target(mut self, selector: impl Into<String>) -> Self {
		let selector = selector.into();
		self.target = (!selector.is_empty()).then_some(selector);
		self
	}

	/// Sets the prevent-default flag.
	pub fn prevent_default(mut self, value: bool) -> Self {
		self.flags.prevent_default = value;
		self
	}

	/// Sets the stop-propagation flag.
	pub fn stop_propagation(mut self, value: bool) -> Self {
		self.flags.stop_propagation = value;
		self
	}

	/// Sets the stop-immediate-propagation flag.
	pub fn stop_immediate_propagation(mut self, value: bool) -> Self {
		self.flags.stop_immediate_propagation = value;
		self
	}

	/// Sets the use-capture flag.
	pub fn use_capture(mut self, value: bool) -> Self {
		self.flags.use_capture = value;
		self
	}

	/// Replaces all flags at once.
	pub fn with_flags(mut self, flags: EventFlags) -> Self {
		self.flags = flags;
		self
	}

	/// Sets the handler invoked on dispatch.
	pub fn handler<F>(mut self, handler: F) -> Self
	where
		F: Fn(&EventPayload) + Send + Sync + 'static,
	{
		self.handler = Some(Arc::new(handler));
		self
	}

	/// Returns the event kind.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// Returns the explicit target selector, if any.
	pub fn explicit_target(&self) -> Option<&str> {
		self.target.as_deref()
	}

	/// Returns the dispatch flags.
	pub fn flags(&self) -> EventFlags {
		self.flags
	}

	/// Returns the handler, if any.
	pub fn event_handler(&self) -> Option<&EventHandler> {
		self.handler.as_ref()
	}

	/// Returns `true` once the event has been attached to a node.
	pub fn is_attached(&self) -> bool {
		self.owner.is_some()
	}

	/// Returns the selector of the owning node, or an empty string when detached.
	pub fn parent_selector(&self) -> String {
		self.owner
			.as_ref()
			.map(EventOwner::selector)
			.unwrap_or_default()
	}

	/// Returns the selector this event listens on.
	pub fn selector(&self) -> String {
		match &self.target {
			Some(target) => target.clone(),
			None => self.parent_selector(),
		}
	}

	/// Returns the `<selector>#<kind>` identity of the event.
	pub fn id(&self) -> String {
		format!("{}#{}", self.selector(), self.kind)
	}

	/// Returns the capitalised kind suffixed with `Event` (`click` → `ClickEvent`).
	pub fn event_name(&self) -> String {
		let mut chars = self.kind.chars();
		let mut name = match chars.next() {
			Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
			None => String::new(),
		};
		if !name.ends_with("Event") {
			name.push_str("Event");
		}
		name
	}

	/// Returns the registration metadata handed to an event sink.
	pub fn meta(&self) -> EventMeta {
		EventMeta {
			kind: self.kind.clone(),
			selector: self.selector(),
			parent_selector: self.parent_selector(),
			flags: self.flags,
			handler: self.handler.clone(),
			target: self
				.owner
				.as_ref()
				.map(|owner| owner.probe.clone())
				.unwrap_or_default(),
		}
	}

	/// Returns the live registration handle, if the event is registered.
	pub fn registration(&self) -> Option<&RegistrationHandle> {
		self.registration.as_ref()
	}

	pub(crate) fn bind_owner(&mut self, owner: EventOwner) {
		self.owner = Some(owner);
	}

	pub(crate) fn rebind_uid(&mut self, uid: &str) {
		if let Some(owner) = self.owner.as_mut() {
			owner.uid = uid.to_string();
		}
	}

	pub(crate) fn set_registration(&mut self, handle: RegistrationHandle) {
		if let Some(previous) = self.registration.replace(handle) {
			previous.end();
		}
	}

	/// Ends the current registration, if any.
	pub(crate) fn retire(&mut self) -> bool {
		match self.registration.take() {
			Some(handle) => {
				handle.end();
				true
			}
			None => false,
		}
	}
}

/// Cloning yields a detached copy: no owner and no registration.
/// The handler is shared.
impl Clone for Event {
	fn clone(&self) -> Self {
		Self {
			kind: self.kind.clone(),
			target: self.target.clone(),
			flags: self.flags,
			handler: self.handler.clone(),
			owner: None,
			registration: None,
		}
	}
}

impl std::fmt::Debug for Event {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Event")
			.field("kind", &self.kind)
			.field("target", &self.target)
			.field("flags", &self.flags)
			.field("has_handler", &self.handler.is_some())
			.field("owner", &self.owner.as_ref().map(EventOwner::selector))
			.field("registered", &self.registration.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn owned(event: Event, tag: &str, uid: &str, flag: &Arc<AtomicBool>) -> Event {
		let mut event = event;
		event.bind_owner(EventOwner {
			tag: tag.to_string(),
			uid: uid.to_string(),
			probe: RemovalProbe::new(flag),
		});
		event
	}

	#[rstest]
	fn test_detached_event_has_empty_selectors() {
		let event = Event::new("click");
		assert!(!event.is_attached());
		assert_eq!(event.selector(), "");
		assert_eq!(event.parent_selector(), "");
		assert_eq!(event.id(), "#click");
	}

	#[rstest]
	fn test_owner_derived_selector() {
		let flag = Arc::new(AtomicBool::new(false));
		let event = owned(Event::new("click"), "BUTTON", "u1", &flag);
		assert_eq!(event.selector(), "button[uid='u1']");
		assert_eq!(event.id(), "button[uid='u1']#click");
	}

	#[rstest]
	fn test_explicit_target_takes_precedence() {
		let flag = Arc::new(AtomicBool::new(false));
		let event = owned(Event::new("input").target("#search"), "div", "u2", &flag);
		assert_eq!(event.selector(), "#search");
		assert_eq!(event.parent_selector(), "div[uid='u2']");
		assert_eq!(event.id(), "#search#input");
	}

	#[rstest]
	fn test_rebind_uid_follows_owner() {
		let flag = Arc::new(AtomicBool::new(false));
		let mut event = owned(Event::new("click"), "a", "old", &flag);
		event.rebind_uid("new");
		assert_eq!(event.selector(), "a[uid='new']");
	}

	#[rstest]
	#[case("click", "ClickEvent")]
	#[case("ClickEvent", "ClickEvent")]
	#[case("keydown", "KeydownEvent")]
	#[case("", "Event")]
	fn test_event_name(#[case] kind: &str, #[case] expected: &str) {
		assert_eq!(Event::new(kind).event_name(), expected);
	}

	#[rstest]
	fn test_clone_is_detached_and_shares_handler() {
		let flag = Arc::new(AtomicBool::new(false));
		let event = owned(
			Event::new("click").prevent_default(true).handler(|_| {}),
			"button",
			"u3",
			&flag,
		);
		let cloned = event.clone();
		assert!(!cloned.is_attached());
		assert!(cloned.flags().prevent_default);
		assert!(Arc::ptr_eq(
			event.event_handler().unwrap(),
			cloned.event_handler().unwrap()
		));
	}

	#[rstest]
	fn test_removal_probe_tracks_flag_and_drop() {
		let flag = Arc::new(AtomicBool::new(false));
		let probe = RemovalProbe::new(&flag);
		assert!(probe.is_live());

		flag.store(true, Ordering::Release);
		assert!(!probe.is_live());

		flag.store(false, Ordering::Release);
		assert!(probe.is_live());

		drop(flag);
		assert!(!probe.is_live());
		assert!(!RemovalProbe::default().is_live());
	}

	#[rstest]
	fn test_payload_roundtrip_defaults_data() {
		let payload: EventPayload =
			serde_json::from_str(r#"{"kind":"click","selector":"a[uid='x']"}"#).unwrap();
		assert_eq!(payload.data, serde_json::Value::Null);
		assert_eq!(payload.id(), "a[uid='x']#click");
	}
}
