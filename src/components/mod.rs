//! UI components.

/// Forest canvas and layout engine.
pub mod force_graph;
mod search_bar;

pub use search_bar::{SearchBar, SearchRequest};
