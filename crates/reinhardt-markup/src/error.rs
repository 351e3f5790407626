//! Error types for the markup crate.
//!
//! Tree operations themselves never fail: capability violations are silently
//! ignored and reconciliation expresses every outcome through its boolean
//! result. Errors only surface at the JSON boundary.

use thiserror::Error;

/// Errors that can occur while projecting or rebuilding markup.
#[derive(Debug, Error)]
pub enum MarkupError {
	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// A wire node without a tag name.
	#[error("Invalid markup node: empty tag (uid: {uid})")]
	EmptyTag {
		/// Uid carried by the offending node.
		uid: String,
	},

	/// A wire text node that also carries children.
	#[error("Invalid markup node: text node {uid} carries {count} children")]
	TextWithChildren {
		/// Uid carried by the offending node.
		uid: String,
		/// Number of children found on the text node.
		count: usize,
	},
}

/// Result type alias for markup operations.
pub type MarkupResult<T> = Result<T, MarkupError>;
