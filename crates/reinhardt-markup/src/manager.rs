//! Event manager sinks.
//!
//! A node never owns the sink its events are registered with; it holds a
//! shared reference and forwards it to its children through
//! [`Markup::bind_event_manager`](crate::Markup::bind_event_manager).
//! Sinks are shared across a whole subtree, so implementations synchronise
//! internally and take `&self` everywhere.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::event::{EventHandler, EventMeta, EventPayload};

/// Shared reference to an event sink.
pub type SharedEventSink = Arc<dyn EventSink>;

/// The registry contract a markup tree registers its events with.
pub trait EventSink: Send + Sync + std::fmt::Debug {
	/// Drops registrations whose owning node is no longer live.
	fn disconnect_removed(&self);

	/// Creates (or joins) the registration bucket for `meta`'s selector and
	/// kind. Returns `None` when the registration cannot be made; callers
	/// treat that as best-effort and carry on.
	fn new_event_registration(&self, meta: &EventMeta) -> Option<RegistrationHandle>;

	/// Chains `other` behind this sink.
	fn attach_manager(&self, other: SharedEventSink);

	/// Dispatches a payload to matching live registrations, returning how
	/// many handlers fired.
	fn dispatch(&self, _payload: &EventPayload) -> usize {
		0
	}
}

/// Returns `true` if both references point at the same sink.
pub(crate) fn same_sink(left: &SharedEventSink, right: &SharedEventSink) -> bool {
	std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
}

/// Handle to a single registration held by the registered event.
#[derive(Debug, Clone)]
pub struct RegistrationHandle {
	id: String,
	ended: Arc<AtomicBool>,
}

impl RegistrationHandle {
	/// Creates a handle for the registration `id`.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			ended: Arc::new(AtomicBool::new(false)),
		}
	}

	/// Returns the `<selector>#<kind>` id of the registration.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Retires the registration. The owning sink drops it on its next sweep
	/// and never fires it again.
	pub fn end(&self) {
		self.ended.store(true, Ordering::Release);
	}

	/// Returns `true` once [`end`](Self::end) has been called.
	pub fn is_ended(&self) -> bool {
		self.ended.load(Ordering::Acquire)
	}
}

#[derive(Debug)]
struct Registration {
	meta: EventMeta,
	handle: RegistrationHandle,
}

impl Registration {
	fn is_live(&self) -> bool {
		!self.handle.is_ended() && self.meta.target.is_live()
	}
}

// Managers with a sweep or dispatch in progress on the current thread.
thread_local! {
	static VISITING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a manager as visited by the current call chain until dropped.
struct VisitGuard(usize);

impl VisitGuard {
	/// Returns `None` when the manager is already being visited further up
	/// this thread's call chain.
	fn enter(manager: &EventManager) -> Option<Self> {
		let addr = manager as *const EventManager as usize;
		VISITING.with(|visiting| {
			let mut visiting = visiting.borrow_mut();
			if visiting.contains(&addr) {
				return None;
			}
			visiting.push(addr);
			Some(Self(addr))
		})
	}
}

impl Drop for VisitGuard {
	fn drop(&mut self) {
		let _ = VISITING.try_with(|visiting| visiting.borrow_mut().retain(|addr| *addr != self.0));
	}
}

/// In-process event registry.
///
/// Registrations are bucketed by event id (`<selector>#<kind>`). Each one
/// remembers the liveness of the node that registered it, so
/// [`disconnect_removed`](EventSink::disconnect_removed) can drop
/// registrations of removed or discarded nodes. Chained managers receive
/// forwarded sweeps and dispatches. Chained sinks are held weakly, and a
/// chain that loops back onto a manager already visited by the same call is
/// cut at that point. Concurrent callers on other threads are never turned
/// away; they only contend on the registry lock.
#[derive(Debug, Default)]
pub struct EventManager {
	registrations: Mutex<HashMap<String, Vec<Registration>>>,
	attached: Mutex<Vec<Weak<dyn EventSink>>>,
}

impl EventManager {
	/// Creates an empty manager.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty manager behind a shared reference.
	pub fn shared() -> Arc<Self> {
		Arc::new(Self::new())
	}

	/// Returns the total number of registrations, live or not yet swept.
	pub fn len(&self) -> usize {
		self.registrations.lock().values().map(Vec::len).sum()
	}

	/// Returns `true` if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the number of registrations for `id` that would currently fire.
	pub fn live_count(&self, id: &str) -> usize {
		self.registrations
			.lock()
			.get(id)
			.map(|bucket| bucket.iter().filter(|r| r.is_live()).count())
			.unwrap_or(0)
	}

	/// Returns the ids of every bucket currently held.
	pub fn registered_ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.registrations.lock().keys().cloned().collect();
		ids.sort();
		ids
	}

	/// Returns the number of chained sinks that are still alive.
	pub fn attached_count(&self) -> usize {
		self.attached
			.lock()
			.iter()
			.filter(|sink| sink.strong_count() > 0)
			.count()
	}

	fn attached_snapshot(&self) -> Vec<SharedEventSink> {
		self.attached.lock().iter().filter_map(Weak::upgrade).collect()
	}
}

impl EventSink for EventManager {
	fn disconnect_removed(&self) {
		let Some(_guard) = VisitGuard::enter(self) else {
			return;
		};

		let dropped = {
			let mut registrations = self.registrations.lock();
			let before: usize = registrations.values().map(Vec::len).sum();
			registrations.retain(|_, bucket| {
				bucket.retain(Registration::is_live);
				!bucket.is_empty()
			});
			before - registrations.values().map(Vec::len).sum::<usize>()
		};

		if dropped > 0 {
			tracing::trace!(dropped, "disconnected stale event registrations");
		}

		for sink in self.attached_snapshot() {
			sink.disconnect_removed();
		}
	}

	fn new_event_registration(&self, meta: &EventMeta) -> Option<RegistrationHandle> {
		if meta.kind.is_empty() || meta.selector.is_empty() {
			tracing::debug!(
				kind = %meta.kind,
				selector = %meta.selector,
				"refusing event registration without kind or selector"
			);
			return None;
		}

		let id = meta.id();
		let handle = RegistrationHandle::new(id.clone());
		self.registrations
			.lock()
			.entry(id)
			.or_default()
			.push(Registration {
				meta: meta.clone(),
				handle: handle.clone(),
			});
		Some(handle)
	}

	fn attach_manager(&self, other: SharedEventSink) {
		if std::ptr::addr_eq(Arc::as_ptr(&other), self as *const Self) {
			return;
		}

		let mut attached = self.attached.lock();
		attached.retain(|sink| sink.strong_count() > 0);
		if attached
			.iter()
			.any(|sink| std::ptr::addr_eq(sink.as_ptr(), Arc::as_ptr(&other)))
		{
			return;
		}
		tracing::trace!(chained = attached.len() + 1, "chained event manager");
		attached.push(Arc::downgrade(&other));
	}

	fn dispatch(&self, payload: &EventPayload) -> usize {
		let Some(_guard) = VisitGuard::enter(self) else {
			return 0;
		};

		let handlers: Vec<EventHandler> = self
			.registrations
			.lock()
			.get(&payload.id())
			.map(|bucket| {
				bucket
					.iter()
					.filter(|r| r.is_live())
					.filter_map(|r| r.meta.handler.clone())
					.collect()
			})
			.unwrap_or_default();

		let mut fired = handlers.len();
		for handler in handlers {
			handler(payload);
		}

		for sink in self.attached_snapshot() {
			fired += sink.dispatch(payload);
		}
		fired
	}
}
