//! Element helper constructors.
//!
//! ## Example
//!
//! ```
//! use reinhardt_markup::elems::{button, div, text};
//!
//! let view = div()
//!     .attr("class", "toolbar")
//!     .child(button().child(text("Save")));
//!
//! assert_eq!(view.children()[0].tag_name(), "button");
//! ```

use crate::markup::Markup;

/// Macro for defining element creation functions
macro_rules! define_element {
	($(#[$meta:meta])* $name:ident, $tag:literal) => {
		$(#[$meta])*
		pub fn $name() -> Markup {
			Markup::element($tag)
		}
	};
}

define_element!(
	/// Create a `<div>` element
	div, "div"
);

define_element!(
	/// Create a `<span>` element
	span, "span"
);

define_element!(
	/// Create a `<p>` element
	p, "p"
);

define_element!(
	/// Create an `<a>` element
	a, "a"
);

define_element!(
	/// Create a `<button>` element
	button, "button"
);

define_element!(
	/// Create a `<form>` element
	form, "form"
);

define_element!(
	/// Create a `<label>` element
	label, "label"
);

define_element!(
	/// Create a `<ul>` element
	ul, "ul"
);

define_element!(
	/// Create an `<ol>` element
	ol, "ol"
);

define_element!(
	/// Create an `<li>` element
	li, "li"
);

define_element!(
	/// Create a `<section>` element
	section, "section"
);

define_element!(
	/// Create a `<header>` element
	header, "header"
);

define_element!(
	/// Create a `<footer>` element
	footer, "footer"
);

define_element!(
	/// Create a `<nav>` element
	nav, "nav"
);

define_element!(
	/// Create a `<main>` element
	main, "main"
);

define_element!(
	/// Create an `<h1>` element
	h1, "h1"
);

define_element!(
	/// Create an `<h2>` element
	h2, "h2"
);

define_element!(
	/// Create an `<h3>` element
	h3, "h3"
);

define_element!(
	/// Create a `<table>` element
	table, "table"
);

define_element!(
	/// Create a `<tr>` element
	tr, "tr"
);

define_element!(
	/// Create a `<td>` element
	td, "td"
);

define_element!(
	/// Create a `<textarea>` element
	textarea, "textarea"
);

define_element!(
	/// Create a `<select>` element
	select, "select"
);

define_element!(
	/// Create an `<option>` element
	option, "option"
);

// Void elements

define_element!(
	/// Create an `<img>` element (self-closing)
	img, "img"
);

define_element!(
	/// Create an `<input>` element (self-closing)
	input, "input"
);

define_element!(
	/// Create a `<br>` element (self-closing)
	br, "br"
);

define_element!(
	/// Create an `<hr>` element (self-closing)
	hr, "hr"
);

/// Create a text node
pub fn text(value: impl Into<String>) -> Markup {
	Markup::text(value)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(div(), "div", false)]
	#[case(li(), "li", false)]
	#[case(h1(), "h1", false)]
	#[case(img(), "img", true)]
	#[case(input(), "input", true)]
	#[case(br(), "br", true)]
	fn test_helpers(#[case] node: Markup, #[case] tag: &str, #[case] auto_closing: bool) {
		assert_eq!(node.tag_name(), tag);
		assert_eq!(node.is_auto_closing(), auto_closing);
	}

	#[rstest]
	fn test_text_helper() {
		let node = text("hello");
		assert!(node.is_text());
		assert_eq!(node.text_content(), "hello");
	}
}
