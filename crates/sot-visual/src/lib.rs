//! # sot-visual
//!
//! Visual side of Sketch-of-Thought reasoning.
//!
//! - [`sketch`]: detect whether a trace is an arrow chain, an equation list or prose
//! - [`SketchRenderer`]: rasterize chains, equations and thought trees to base64 PNG
//! - [`OutputGenerator`]: package a reasoning result with a text visualization
//!
//! Every rendering is a [`Rendering`] record: `{type, format, content, ...}` with
//! `format` one of `text`, `image/png;base64` or `latex`.

pub mod error;
pub mod output;
pub mod raster;
pub mod renderer;
pub mod rendering;
pub mod sketch;
pub mod thought;

pub use error::{Result, VisualError};
pub use output::{AgentOutput, OutputGenerator};
pub use raster::{builtin_font, numbered_equations, BitmapRasterizer, Rasterizer};
pub use renderer::SketchRenderer;
pub use rendering::{RenderFormat, RenderKind, Rendering};
pub use sketch::{ChainGraph, SketchType};
pub use thought::{Thought, ThoughtTree};
