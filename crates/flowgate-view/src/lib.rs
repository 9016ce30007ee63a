//! Client-side view logic for flow diagrams.
//!
//! - [`graph`]: derive nodes and links from flow records
//! - [`layout`]: Sankey placement (topology in, geometry out)
//! - [`palette`]: stable categorical colors
//! - [`render`]: SVG drawing, no-data state, node-click dispatch
//! - [`filter_panel`]: distinct-value options and the current selection
//! - [`interaction`]: turning a node click into a new selection

pub mod error;
pub mod filter_panel;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod palette;
pub mod render;

pub use error::ViewError;
pub use filter_panel::FilterPanel;
pub use graph::{DiagramLink, DiagramNode, FlowGraph};
pub use interaction::{confirmation_prompt, node_role, resolve_node_click};
pub use layout::{layout, Layout, LayoutOptions, PositionedLink, PositionedNode};
pub use palette::CategoryPalette;
pub use render::{Diagram, DiagramRenderer, RenderOptions, RenderOutcome, NO_DATA_MESSAGE};
