//! Server-side markup tree with positional reconciliation for the Reinhardt framework.
//!
//! This crate provides the tree a component renders into, and the machinery
//! that keeps re-rendering cheap:
//!
//! - **Markup tree**: element and text nodes with attributes, inline styles,
//!   children, events and morphers, each carrying a stable `uid` and a
//!   volatile `hash`
//! - **Reconciliation**: a positional diff of a new tree against the
//!   previously committed one that reuses identity and hashes wherever the
//!   output did not change
//! - **Events**: DOM-style event declarations registered with a shared
//!   [`EventSink`] that survive reconciliation and are dropped once their
//!   node is removed
//! - **Morphers**: post-processing transforms applied bottom-up before a tree
//!   is committed
//! - **Projections**: HTML and JSON writers for a finished tree
//!
//! # Quick Start
//!
//! ```
//! use reinhardt_markup::prelude::*;
//!
//! let manager = EventManager::shared();
//! let mut tree = LiveTree::new(|| {
//!     div()
//!         .attr("class", "counter")
//!         .child(button().on(Event::new("click")).child(text("+1")))
//! })
//! .with_event_manager(manager.clone());
//!
//! let first = tree.render();
//! let second = tree.render();
//!
//! assert!(first.changed);
//! assert!(!second.changed);
//! assert_eq!(manager.len(), 1);
//! ```
//!
//! # Known limitation
//!
//! Children are matched by position, not by key. Reordering siblings of
//! different types is reported as a change and the displaced old nodes are
//! queued for removal instead of being moved.

pub mod elems;
pub mod error;
pub mod event;
pub mod identity;
pub mod json;
pub mod manager;
pub mod markup;
pub mod morph;
pub mod prelude;
pub mod property;
mod reconcile;
pub mod render;
mod util;
pub mod writer;

pub use error::{MarkupError, MarkupResult};
pub use event::{Event, EventFlags, EventHandler, EventMeta, EventPayload, RemovalProbe};
pub use json::{EventJson, MarkupJson, PropertyJson};
pub use manager::{EventManager, EventSink, RegistrationHandle, SharedEventSink};
pub use markup::{Capabilities, MARKER_ATTR, MARKER_VALUE, Markup, REMOVED_ATTR, TEXT_TAG};
pub use morph::{Morpher, SharedMorpher};
pub use property::{Property, PropertyKind};
pub use render::{LiveTree, RenderOutcome, StaticTree, TreeProducer};
pub use util::{VOID_ELEMENTS, is_void_element};
pub use writer::{MarkupWriter, SafeHtml, WriterOptions};
