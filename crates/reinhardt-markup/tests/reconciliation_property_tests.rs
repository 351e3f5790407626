//! Property-based tests for reconciliation
//!
//! Uses proptest to verify:
//! 1. Reconciling a clone against its original reports no change
//! 2. Clones write identical HTML and do not share mutable state
//! 3. A change deep in the tree refreshes every ancestor hash
//! 4. Tag mismatches never touch identity

use proptest::prelude::*;
use reinhardt_markup::{Markup, Property};

fn tag() -> impl Strategy<Value = &'static str> {
	prop::sample::select(vec!["div", "span", "p", "li", "section"])
}

fn properties() -> impl Strategy<Value = Vec<(String, String)>> {
	prop::collection::vec(("[a-z]{1,4}", "[a-z0-9]{0,4}"), 0..3)
}

fn element(tag: &str, attributes: Vec<(String, String)>, styles: Vec<(String, String)>) -> Markup {
	let mut node = Markup::element(tag);
	for (name, value) in attributes {
		node.add_property(Property::attr(name, value));
	}
	for (name, value) in styles {
		node.add_property(Property::style(name, value));
	}
	node
}

fn tree() -> impl Strategy<Value = Markup> {
	let leaf = prop_oneof![
		"[a-z <&]{0,8}".prop_map(|value: String| Markup::text(value)),
		(tag(), properties(), properties()).prop_map(|(t, a, s)| element(t, a, s)),
	];
	leaf.prop_recursive(4, 32, 4, |inner| {
		(tag(), properties(), properties(), prop::collection::vec(inner, 0..4))
			.prop_map(|(t, a, s, children)| element(t, a, s).children_from(children))
	})
}

fn element_tree() -> impl Strategy<Value = Markup> {
	(tag(), properties(), prop::collection::vec(tree(), 1..4))
		.prop_map(|(t, a, children)| element(t, a, Vec::new()).children_from(children))
}

fn assert_same_identity(new: &Markup, old: &Markup) -> Result<(), TestCaseError> {
	prop_assert_eq!(new.uid(), old.uid());
	prop_assert_eq!(new.hash(), old.hash());
	prop_assert_eq!(new.children().len(), old.children().len());
	for (new_child, old_child) in new.children().iter().zip(old.children()) {
		assert_same_identity(new_child, old_child)?;
	}
	Ok(())
}

/// Returns the index path to the deepest node reachable through first
/// element children.
fn first_element_path(node: &Markup) -> Vec<usize> {
	let mut path = Vec::new();
	let mut current = node;
	while let Some(child) = current.children().first().filter(|c| !c.is_text()) {
		path.push(0);
		current = child;
	}
	path
}

fn node_at<'a>(root: &'a Markup, path: &[usize]) -> &'a Markup {
	path.iter().fold(root, |node, index| &node.children()[*index])
}

fn node_at_mut<'a>(root: &'a mut Markup, path: &[usize]) -> &'a mut Markup {
	path.iter()
		.fold(root, |node, index| &mut node.children_mut()[*index])
}

// ============================================================================
// Idempotence of unchanged input
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn test_clone_reconciles_unchanged(original in tree()) {
		let mut old = original;
		let mut new = old.clone();

		prop_assert!(!new.reconcile(&mut old));
		assert_same_identity(&new, &old)?;
	}
}

// ============================================================================
// Clone fidelity
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn test_clone_writes_identical_html(original in tree()) {
		let copy = original.clone();
		prop_assert_eq!(copy.html(), original.html());
		prop_assert_ne!(copy.uid(), original.uid());
	}

	#[test]
	fn test_clone_mutation_is_isolated(original in element_tree()) {
		let before = original.html();
		let mut copy = original.clone();
		copy.add_property(Property::attr("data-copy", "1"));
		copy.children_mut()[0].add_property(Property::style("color", "red"));
		copy.add_child(Markup::text("extra"));

		prop_assert_eq!(original.html(), before.clone());
		prop_assert_ne!(copy.html(), before);
	}
}

// ============================================================================
// Hash propagation
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn test_deep_change_refreshes_every_ancestor(original in element_tree()) {
		let mut old = original;
		let mut new = old.clone();
		let path = first_element_path(&new);
		node_at_mut(&mut new, &path).add_property(Property::attr("data-changed", "1"));

		prop_assert!(new.reconcile(&mut old));
		for depth in 0..=path.len() {
			let prefix = &path[..depth];
			prop_assert_ne!(node_at(&new, prefix).hash(), node_at(&old, prefix).hash());
			prop_assert_eq!(node_at(&new, prefix).uid(), node_at(&old, prefix).uid());
		}
	}
}

// ============================================================================
// Type mismatch containment
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(32))]

	#[test]
	fn test_tag_mismatch_never_touches_identity(left in tree(), right in tree()) {
		prop_assume!(left.tag_name() != right.tag_name());
		let mut new = left;
		let mut old = right;
		let identity = (
			new.uid().to_string(),
			new.hash().to_string(),
			old.uid().to_string(),
			old.hash().to_string(),
		);

		prop_assert!(new.reconcile(&mut old));
		prop_assert_eq!(
			identity,
			(
				new.uid().to_string(),
				new.hash().to_string(),
				old.uid().to_string(),
				old.hash().to_string(),
			)
		);
	}
}
