pub mod display;
pub mod renderer;

pub use display::{DisplayNode, DisplayTree, InlineNode};
pub use renderer::{heading_size_pt, render, RenderError, RenderResult, Renderer};
