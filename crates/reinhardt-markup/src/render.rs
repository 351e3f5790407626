//! Producer orchestration.
//!
//! A [`LiveTree`] owns the committed tree of one producer. Each call to
//! [`LiveTree::render`] asks the producer for a new tree, runs its morphers,
//! reconciles it against the committed tree, binds the event sink and
//! commits the result.
//!
//! ```
//! use reinhardt_markup::{LiveTree, Markup};
//!
//! let mut tree = LiveTree::new(|| Markup::element("p").child(Markup::text("hi")));
//! let first = tree.render();
//! let second = tree.render();
//!
//! assert!(first.changed);
//! assert!(!second.changed);
//! assert_eq!(first.hash, second.hash);
//! ```

use std::sync::Arc;

use crate::event::EventPayload;
use crate::identity::new_uid;
use crate::json::MarkupJson;
use crate::manager::SharedEventSink;
use crate::markup::Markup;

/// Anything that can produce a markup tree on demand.
pub trait TreeProducer {
	/// Produces a new tree.
	fn produce(&self) -> Markup;
}

impl<F> TreeProducer for F
where
	F: Fn() -> Markup,
{
	fn produce(&self) -> Markup {
		self()
	}
}

/// A producer that re-emits a fresh copy of a fixed tree.
#[derive(Debug, Clone)]
pub struct StaticTree {
	content: Markup,
}

impl StaticTree {
	/// Creates a producer for `content`.
	pub fn new(content: Markup) -> Self {
		Self { content }
	}
}

impl TreeProducer for StaticTree {
	fn produce(&self) -> Markup {
		self.content.clone()
	}
}

/// Result of a [`LiveTree::render`] pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
	/// Whether the committed output differs from the previous render.
	pub changed: bool,
	/// Hash of the committed root.
	pub hash: String,
}

/// The committed tree of a single producer.
pub struct LiveTree<P> {
	uid: String,
	producer: P,
	sink: Option<SharedEventSink>,
	live: Option<Markup>,
}

impl<P: TreeProducer> LiveTree<P> {
	/// Creates a live tree with a fresh component uid. Nothing is rendered yet.
	pub fn new(producer: P) -> Self {
		Self {
			uid: new_uid(),
			producer,
			sink: None,
			live: None,
		}
	}

	/// Binds every committed tree to `sink`.
	pub fn with_event_manager(mut self, sink: SharedEventSink) -> Self {
		self.sink = Some(sink);
		self
	}

	/// Returns the component uid stamped on every produced root.
	pub fn uid(&self) -> &str {
		&self.uid
	}

	/// Returns the producer.
	pub fn producer(&self) -> &P {
		&self.producer
	}

	/// Returns the committed tree, if any.
	pub fn live(&self) -> Option<&Markup> {
		self.live.as_ref()
	}

	/// Produces, reconciles and commits a new tree.
	///
	/// The first render always reports a change.
	pub fn render(&mut self) -> RenderOutcome {
		let mut next = self.producer.produce().apply_morphers();
		next.swap_uid(self.uid.clone());

		let changed = match self.live.as_mut() {
			Some(previous) => {
				previous.retire_events();
				next.reconcile(previous)
			}
			None => true,
		};

		if let Some(sink) = &self.sink {
			next.bind_event_manager(Arc::clone(sink));
		}

		let outcome = RenderOutcome {
			changed,
			hash: next.hash().to_string(),
		};
		tracing::debug!(
			component = %self.uid,
			changed,
			hash = %outcome.hash,
			"live tree rendered"
		);

		self.live = Some(next);
		outcome
	}

	/// Drops soft-removed nodes from the committed tree and disconnects
	/// their registrations.
	pub fn clean(&mut self) {
		if let Some(live) = self.live.as_mut() {
			live.clean();
		}
		if let Some(sink) = &self.sink {
			sink.disconnect_removed();
		}
	}

	/// Dispatches `payload` through the bound sink, returning how many
	/// handlers fired.
	pub fn dispatch(&self, payload: &EventPayload) -> usize {
		self.sink
			.as_ref()
			.map_or(0, |sink| sink.dispatch(payload))
	}

	/// Writes the committed tree to HTML.
	pub fn html(&self) -> Option<String> {
		self.live.as_ref().map(Markup::html)
	}

	/// Projects the committed tree to JSON.
	pub fn json(&self) -> Option<MarkupJson> {
		self.live.as_ref().map(Markup::to_json)
	}
}

impl<P> std::fmt::Debug for LiveTree<P> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LiveTree")
			.field("uid", &self.uid)
			.field("has_sink", &self.sink.is_some())
			.field("live", &self.live)
			.finish()
	}
}
