//! Morpher pipeline.
//!
//! A morpher rewrites a finished node before it is committed or reconciled.
//! Morphers run bottom-up: every child is morphed before its parent, then the
//! parent's own morphers are folded left to right, each one consuming the
//! output of the previous one.
//!
//! ```
//! use reinhardt_markup::Markup;
//!
//! let node = Markup::element("p")
//!     .morpher(|node: &mut Markup| Some(node.clone().attr("class", "lead")))
//!     .apply_morphers();
//!
//! assert_eq!(node.attribute("class"), Some("lead"));
//! ```

use std::sync::Arc;

use crate::markup::Markup;

/// Shared reference to a morpher. Clones of a node share their morphers.
pub type SharedMorpher = Arc<dyn Morpher>;

/// A post-processing transform applied to a finished node.
///
/// Returning `Some(node)` replaces the input; returning `None` keeps the
/// (possibly mutated in place) input as it is.
pub trait Morpher: Send + Sync {
	/// Transforms `node`.
	fn morph(&self, node: &mut Markup) -> Option<Markup>;
}

impl<F> Morpher for F
where
	F: Fn(&mut Markup) -> Option<Markup> + Send + Sync,
{
	fn morph(&self, node: &mut Markup) -> Option<Markup> {
		self(node)
	}
}

impl Markup {
	/// Applies the morpher pipeline to this subtree and returns the result.
	pub fn apply_morphers(mut self) -> Markup {
		self.children = std::mem::take(&mut self.children)
			.into_iter()
			.map(Markup::apply_morphers)
			.collect();

		if self.morphers.is_empty() {
			return self;
		}

		let pipeline = self.morphers.clone();
		pipeline.iter().fold(self, |mut current, morpher| {
			match morpher.morph(&mut current) {
				Some(next) => next,
				None => current,
			}
		})
	}
}
