//! Positional reconciliation of a new tree against the committed one.
//!
//! Children are matched by their position among siblings, never by key. A
//! pair with equal tags is reconciled recursively; a pair with different
//! tags, or an old child past the end of the new children, is queued for
//! removal: it is marked removed, its event registrations are ended, and it
//! is moved under the new node so a later [`Markup::clean`] can drop it.
//!
//! The new node always inherits the old node's uid. It keeps the old hash
//! only when nothing observable changed, otherwise it receives a fresh hash
//! distinct from the old one. A changed descendant therefore refreshes the
//! hash of every ancestor.

use crate::event::Event;
use crate::identity::fresh_hash;
use crate::markup::Markup;
use crate::property::properties_equal;

impl Markup {
	/// Reconciles `self` (the newly produced node) against `old` (the node
	/// previously committed at the same position).
	///
	/// Returns `true` if the rendered output differs. Nodes with different
	/// tags are reported as changed and left untouched.
	pub fn reconcile(&mut self, old: &mut Markup) -> bool {
		if self.tag != old.tag {
			tracing::trace!(new = %self.tag, old = %old.tag, "tag mismatch, subtree replaced");
			return true;
		}

		old.clean();
		self.swap_uid(old.uid.clone());

		if self.is_text() {
			let changed = self.text != old.text;
			return self.settle(old, changed);
		}

		let attrs_equal = properties_equal(&self.attributes, &old.attributes);
		let styles_equal = properties_equal(&self.styles, &old.styles);

		let children_changed = if self.children.is_empty() {
			let had_children = !old.children.is_empty();
			for child in std::mem::take(&mut old.children) {
				self.queue_for_removal(child);
			}
			had_children
		} else {
			self.reconcile_children(old)
		};

		self.reconcile_events(old);
		self.settle(old, children_changed || !attrs_equal || !styles_equal)
	}

	fn reconcile_children(&mut self, old: &mut Markup) -> bool {
		let mut changed = self.children.len() > old.children.len();
		let mut queued = Vec::new();

		for (index, mut old_child) in std::mem::take(&mut old.children).into_iter().enumerate() {
			match self.children.get_mut(index) {
				Some(new_child) if new_child.tag == old_child.tag => {
					changed |= new_child.reconcile(&mut old_child);
					old.children.push(old_child);
				}
				_ => {
					changed = true;
					queued.push(old_child);
				}
			}
		}

		for child in queued {
			self.queue_for_removal(child);
		}
		changed
	}

	fn queue_for_removal(&mut self, mut child: Markup) {
		child.remove();
		let retired = child.retire_events();
		tracing::debug!(
			parent = %self.event_id(),
			child = %child.event_id(),
			retired,
			"old child queued for removal"
		);
		self.children.push(child);
	}

	fn reconcile_events(&mut self, old: &mut Markup) {
		let retired = old.events.iter_mut().map(Event::retire).filter(|ended| *ended).count();
		if retired > 0 {
			tracing::trace!(node = %self.event_id(), retired, "previous event registrations retired");
		}

		let sink = self
			.event_manager
			.clone()
			.or_else(|| old.event_manager.clone());
		if let Some(sink) = sink {
			sink.disconnect_removed();
		}
	}

	fn settle(&mut self, old: &Markup, changed: bool) -> bool {
		if changed {
			self.hash = fresh_hash(&old.hash);
			tracing::trace!(node = %self.event_id(), hash = %self.hash, "hash refreshed");
		} else {
			self.hash = old.hash.clone();
		}
		changed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::manager::{EventManager, EventSink};
	use crate::markup::REMOVED_ATTR;
	use rstest::rstest;

	fn span(text: &str) -> Markup {
		Markup::element("span").child(Markup::text(text))
	}

	#[rstest]
	fn test_tag_mismatch_leaves_both_untouched() {
		let mut new = Markup::element("div");
		let mut old = Markup::element("p");
		let (new_uid, new_hash) = (new.uid().to_string(), new.hash().to_string());
		let (old_uid, old_hash) = (old.uid().to_string(), old.hash().to_string());

		assert!(new.reconcile(&mut old));
		assert_eq!(new.uid(), new_uid);
		assert_eq!(new.hash(), new_hash);
		assert_eq!(old.uid(), old_uid);
		assert_eq!(old.hash(), old_hash);
	}

	#[rstest]
	#[case("same", "same", false)]
	#[case("before", "after", true)]
	fn test_text_reconcile(#[case] old_text: &str, #[case] new_text: &str, #[case] changed: bool) {
		let mut old = Markup::text(old_text);
		let mut new = Markup::text(new_text);

		assert_eq!(new.reconcile(&mut old), changed);
		assert_eq!(new.uid(), old.uid());
		assert_eq!(new.hash() == old.hash(), !changed);
	}

	#[rstest]
	fn test_identical_leaf_reuses_hash() {
		let mut old = Markup::element("div").attr("id", "a").style("color", "red");
		let mut new = Markup::element("div").style("color", "red").attr("id", "a");

		assert!(!new.reconcile(&mut old));
		assert_eq!(new.hash(), old.hash());
		assert_eq!(new.uid(), old.uid());
	}

	#[rstest]
	#[case(Markup::element("div").attr("id", "b"))]
	#[case(Markup::element("div").attr("id", "a").style("color", "red"))]
	#[case(Markup::element("div").attr("id", "a").attr("id", "a"))]
	fn test_leaf_property_change_refreshes_hash(#[case] mut new: Markup) {
		let mut old = Markup::element("div").attr("id", "a");
		assert!(new.reconcile(&mut old));
		assert_ne!(new.hash(), old.hash());
	}

	#[rstest]
	fn test_changed_descendant_refreshes_ancestors() {
		let mut old = Markup::element("div").child(Markup::element("section").child(span("b")));
		let mut new = Markup::element("div").child(Markup::element("section").child(span("c")));

		assert!(new.reconcile(&mut old));
		assert_ne!(new.hash(), old.hash());
		assert_ne!(new.children()[0].hash(), old.children()[0].hash());
		assert_ne!(
			new.children()[0].children()[0].hash(),
			old.children()[0].children()[0].hash()
		);
	}

	#[rstest]
	fn test_type_mismatch_queues_old_child() {
		let mut old = Markup::element("div").child(Markup::element("p"));
		let old_child_uid = old.children()[0].uid().to_string();
		let mut new = Markup::element("div").child(Markup::element("span"));

		assert!(new.reconcile(&mut old));
		assert!(old.children().is_empty());
		assert_eq!(new.children().len(), 2);
		assert_eq!(new.children()[0].tag_name(), "span");
		assert!(!new.children()[0].is_removed());

		let queued = &new.children()[1];
		assert_eq!(queued.uid(), old_child_uid);
		assert!(queued.is_removed());
		assert_eq!(queued.attribute(REMOVED_ATTR), Some(""));
	}

	#[rstest]
	fn test_extra_old_children_are_queued() {
		let mut old = Markup::element("ul")
			.child(Markup::element("li"))
			.child(Markup::element("li"))
			.child(Markup::element("li"));
		let mut new = Markup::element("ul").child(Markup::element("li"));

		assert!(new.reconcile(&mut old));
		assert_eq!(new.children().len(), 3);
		assert!(!new.children()[0].is_removed());
		assert!(new.children()[1].is_removed());
		assert!(new.children()[2].is_removed());
		assert_eq!(old.children().len(), 1);
	}

	#[rstest]
	fn test_extra_new_children_report_changed() {
		let mut old = Markup::element("ul").child(Markup::element("li"));
		let mut new = Markup::element("ul")
			.child(Markup::element("li"))
			.child(Markup::element("li"));

		assert!(new.reconcile(&mut old));
		assert_eq!(new.children()[0].uid(), old.children()[0].uid());
	}

	#[rstest]
	fn test_old_removed_children_are_cleaned_before_matching() {
		let mut stale = Markup::element("p");
		stale.remove();
		let mut old = Markup::element("div").child(stale).child(Markup::element("span"));
		let span_uid = old.children()[1].uid().to_string();
		let mut new = Markup::element("div").child(Markup::element("span"));

		assert!(!new.reconcile(&mut old));
		assert_eq!(new.children().len(), 1);
		assert_eq!(new.children()[0].uid(), span_uid);
	}

	#[rstest]
	fn test_queued_child_events_are_retired() {
		let manager = EventManager::shared();
		let mut old = Markup::element("div").child(Markup::element("button").on(Event::new("click")));
		old.bind_event_manager(manager.clone());
		let id = old.children()[0].events()[0].id();
		assert_eq!(manager.live_count(&id), 1);

		let mut new = Markup::element("div").child(Markup::element("a"));
		assert!(new.reconcile(&mut old));

		assert_eq!(manager.live_count(&id), 0);
		assert!(manager.is_empty(), "old sink swept on event reconciliation");
	}

	#[rstest]
	fn test_reconcile_events_uses_new_sink_first() {
		let old_sink = EventManager::shared();
		let new_sink = EventManager::shared();
		let mut old = Markup::element("div").on(Event::new("click"));
		old.bind_event_manager(old_sink.clone());
		let mut new = Markup::element("div").on(Event::new("click"));
		new.bind_event_manager(new_sink.clone());

		assert!(!new.reconcile(&mut old));
		assert_eq!(old_sink.len(), 1, "old sink not swept when the new node has one");
		old_sink.disconnect_removed();
		assert!(old_sink.is_empty());
		assert_eq!(new_sink.len(), 1);
	}
}
