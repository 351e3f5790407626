//! HTML projection of a markup tree.
//!
//! Writing is a pure read of a finished tree. Identity tokens are not part of
//! the HTML unless [`WriterOptions::include_identity`] asks for them, so a
//! node and its clone write identical output by default.

use serde::{Deserialize, Serialize};

use crate::error::MarkupResult;
use crate::markup::Markup;
use crate::util::html_escape;

/// Options for writing HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
	/// Whether styles are emitted as an inline `style` attribute.
	pub inline_styles: bool,
	/// Whether nodes marked removed are left out of the output.
	pub skip_removed: bool,
	/// Whether text content is HTML-escaped.
	pub escape_text: bool,
	/// Whether each element carries its `uid` as an attribute.
	pub include_identity: bool,
}

impl Default for WriterOptions {
	fn default() -> Self {
		Self {
			inline_styles: true,
			skip_removed: false,
			escape_text: true,
			include_identity: false,
		}
	}
}

impl WriterOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads options from a JSON document. Missing fields take their defaults.
	pub fn from_json(json: &str) -> MarkupResult<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Drops inline styles from the output.
	pub fn no_styles(mut self) -> Self {
		self.inline_styles = false;
		self
	}

	/// Leaves soft-removed nodes out of the output.
	pub fn skip_removed(mut self) -> Self {
		self.skip_removed = true;
		self
	}

	/// Writes text content verbatim.
	pub fn raw_text(mut self) -> Self {
		self.escape_text = false;
		self
	}

	/// Emits a `uid` attribute on every element.
	pub fn with_identity(mut self) -> Self {
		self.include_identity = true;
		self
	}
}

/// HTML that has already been escaped and can be embedded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafeHtml(String);

impl SafeHtml {
	/// Returns the HTML as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Consumes the wrapper.
	pub fn into_string(self) -> String {
		self.0
	}
}

impl std::fmt::Display for SafeHtml {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Writes markup trees to HTML.
#[derive(Debug, Clone, Default)]
pub struct MarkupWriter {
	options: WriterOptions,
}

impl MarkupWriter {
	/// Creates a writer with default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a writer with custom options.
	pub fn with_options(options: WriterOptions) -> Self {
		Self { options }
	}

	/// Returns the writer options.
	pub fn options(&self) -> &WriterOptions {
		&self.options
	}

	/// Writes `node` to a new string.
	pub fn write(&self, node: &Markup) -> String {
		let mut output = String::new();
		self.write_into(node, &mut output);
		output
	}

	/// Appends the HTML of `node` to `output`.
	pub fn write_into(&self, node: &Markup, output: &mut String) {
		if self.options.skip_removed && node.is_removed() {
			return;
		}

		if node.is_text() {
			if self.options.escape_text {
				output.push_str(&html_escape(node.text_content()));
			} else {
				output.push_str(node.text_content());
			}
			return;
		}

		output.push('<');
		output.push_str(node.tag_name());

		if self.options.include_identity {
			output.push_str(" uid=\"");
			output.push_str(node.uid());
			output.push('"');
		}

		for attribute in node.attributes() {
			output.push(' ');
			output.push_str(&attribute.render());
		}

		if self.options.inline_styles && !node.styles().is_empty() {
			let declarations: Vec<String> = node.styles().iter().map(|s| s.render()).collect();
			output.push_str(" style=\"");
			output.push_str(&html_escape(&declarations.join(" ")));
			output.push('"');
		}

		if node.is_auto_closing() {
			output.push_str(" />");
			return;
		}

		output.push('>');
		for child in node.children() {
			self.write_into(child, output);
		}
		output.push_str("</");
		output.push_str(node.tag_name());
		output.push('>');
	}
}

impl Markup {
	/// Writes the subtree to HTML with default options.
	pub fn html(&self) -> String {
		MarkupWriter::new().write(self)
	}

	/// Writes the subtree to HTML with the given options.
	pub fn html_with(&self, options: &WriterOptions) -> String {
		MarkupWriter::with_options(options.clone()).write(self)
	}

	/// Writes the subtree to HTML wrapped as [`SafeHtml`].
	pub fn safe_html(&self) -> SafeHtml {
		SafeHtml(self.html())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_element_with_attributes_and_styles() {
		let node = Markup::element("div")
			.attr("id", "main")
			.style("color", "red")
			.style("margin", "0")
			.child(Markup::text("Hello"));

		assert_eq!(
			node.html(),
			"<div data-gen=\"reinhardt\" id=\"main\" style=\"color: red; margin: 0;\">Hello</div>"
		);
	}

	#[rstest]
	fn test_auto_closing_element() {
		let node = Markup::element("img").attr("src", "/a.png");
		assert_eq!(node.html(), "<img data-gen=\"reinhardt\" src=\"/a.png\" />");
	}

	#[rstest]
	#[case(WriterOptions::default(), "&lt;b&gt;")]
	#[case(WriterOptions::new().raw_text(), "<b>")]
	fn test_text_escaping(#[case] options: WriterOptions, #[case] expected: &str) {
		assert_eq!(Markup::text("<b>").html_with(&options), expected);
	}

	#[rstest]
	fn test_removed_nodes_written_unless_skipped() {
		let mut gone = Markup::element("span");
		gone.remove();
		let root = Markup::element("p").child(gone);

		assert_eq!(
			root.html(),
			"<p data-gen=\"reinhardt\"><span data-gen=\"reinhardt\" data-node-removed=\"\"></span></p>"
		);
		assert_eq!(
			root.html_with(&WriterOptions::new().skip_removed()),
			"<p data-gen=\"reinhardt\"></p>"
		);
	}

	#[rstest]
	fn test_styles_can_be_disabled() {
		let node = Markup::element("b").style("color", "red");
		assert_eq!(
			node.html_with(&WriterOptions::new().no_styles()),
			"<b data-gen=\"reinhardt\"></b>"
		);
	}

	#[rstest]
	fn test_identity_attribute() {
		let mut node = Markup::element("i");
		node.swap_uid("abcd1234");
		assert_eq!(
			node.html_with(&WriterOptions::new().with_identity()),
			"<i uid=\"abcd1234\" data-gen=\"reinhardt\"></i>"
		);
	}

	#[rstest]
	fn test_options_from_json_fills_defaults() {
		let options = WriterOptions::from_json(r#"{"skipRemoved": true}"#).unwrap();
		assert_eq!(options, WriterOptions::default());

		let options = WriterOptions::from_json(r#"{"skip_removed": true}"#).unwrap();
		assert!(options.skip_removed);
		assert!(options.inline_styles);
		assert!(options.escape_text);
	}

	#[rstest]
	fn test_options_from_invalid_json() {
		assert!(WriterOptions::from_json("not json").is_err());
	}

	#[rstest]
	fn test_safe_html_display() {
		let html = Markup::element("br").safe_html();
		assert_eq!(html.to_string(), "<br data-gen=\"reinhardt\" />");
		assert_eq!(serde_json::to_string(&html).unwrap(), "\"<br data-gen=\\\"reinhardt\\\" />\"");
	}
}
