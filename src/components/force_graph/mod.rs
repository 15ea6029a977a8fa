//! Force-directed canvas for the lead forest.
//!
//! - [`simulation`]: spring/repulsion/centering/collision physics keyed by node id
//! - [`viewport`]: pan/zoom transform and fit-to-view
//! - [`LayoutEngine`]: simulation plus drag, pan, hover and click handling
//! - [`LeadGraphCanvas`]: the Leptos component driving it all per frame
//!
//! ```ignore
//! let (graph, _) = signal(GraphData::default());
//! let (fit, _) = signal(0u32);
//! view! { <LeadGraphCanvas data=graph fit=fit fullscreen=true /> }
//! ```

mod component;
mod render;
/// Zoom-dependent sizes.
pub mod scale;
/// Forest physics.
pub mod simulation;
mod state;
/// Colours.
pub mod theme;
mod types;
/// Pan/zoom transform.
pub mod viewport;

pub use component::LeadGraphCanvas;
pub use state::{HoverInfo, LayoutEngine};
pub use theme::Theme;
pub use types::{GraphData, GraphLink, GraphNode, NodeKind};
