//! Core library for column-packing ("masonry") grid layout.
//!
//! - Modes: masonry (shortest column first, or horizontal order), fit-rows, vertical
//! - Stamps: externally placed obstacles raise the columns they overlap
//! - `pack` lays out pre-measured items in one pass; `GridLayout` keeps items,
//!   stamps, filter, sort and events across passes, reading the document through
//!   the [`host`] traits
//! - Results are serde-serializable; JSON helpers live in [`export`].
//!
//! Quick example:
//! ```
//! use gridpack_core::{ContainerBox, GridConfig, ItemBox, pack};
//! # fn main() -> gridpack_core::Result<()> {
//! let cfg = GridConfig::builder().column_width(60.0).build();
//! let items = vec![
//!     ItemBox::new("a", 60.0, 30.0),
//!     ItemBox::new("b", 60.0, 40.0),
//!     ItemBox::new("c", 60.0, 10.0),
//! ];
//! let out = pack(&items, &ContainerBox::new(180.0, 0.0), &cfg, &[])?;
//! assert_eq!(out.columns, 3);
//! assert_eq!(out.height, 40.0);
//! # Ok(()) }
//! ```

pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod export;
pub mod host;
pub mod layout;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod sort;

pub use config::*;
pub use debounce::Debouncer;
pub use error::*;
pub use events::{Emitter, GridEvent, ListenerId};
pub use export::*;
pub use host::{ElementSource, Host, Measure, Scene, SceneElement};
pub use layout::{ArrangeOptions, ArrangeOutcome, GridLayout, Item, TransitionTicket};
pub use model::*;
pub use packer::{LayoutEngine, PassMetrics, build_engine, run_pass};
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `gridpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        GridConfig, GridConfigBuilder, LayoutMode, Measurement, SortAscending,
    };
    pub use crate::events::{GridEvent, names};
    pub use crate::host::{Host, Scene, SceneElement};
    pub use crate::layout::{ArrangeOptions, ArrangeOutcome, GridLayout};
    pub use crate::model::{ContainerBox, ItemBox, LayoutResult, Placement, Rect, Size};
    pub use crate::{GridError, Result, pack, to_json};
}
