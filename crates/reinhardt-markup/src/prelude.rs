//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```
//! use reinhardt_markup::prelude::*;
//!
//! let node = div().child(span().child(text("hello")));
//! assert_eq!(node.html(), "<div data-gen=\"reinhardt\"><span data-gen=\"reinhardt\">hello</span></div>");
//! ```

// Error types
pub use crate::error::{MarkupError, MarkupResult};

// Tree types
pub use crate::markup::{Capabilities, Markup};
pub use crate::morph::Morpher;
pub use crate::property::{Property, PropertyKind};

// Event types
pub use crate::event::{Event, EventFlags, EventPayload};
pub use crate::manager::{EventManager, EventSink, SharedEventSink};

// Rendering
pub use crate::render::{LiveTree, RenderOutcome, StaticTree, TreeProducer};
pub use crate::writer::{MarkupWriter, WriterOptions};

// Element helpers
pub use crate::elems::*;
