//! Sketch Renderer
//!
//! Detects the sketch shape, rasterizes it and base64-encodes the PNG. With an
//! output directory configured every image is also written to disk. Any failure
//! degrades to a text rendering carrying the error.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Result, VisualError};
use crate::raster::{BitmapRasterizer, Rasterizer};
use crate::rendering::{RenderFormat, RenderKind, Rendering};
use crate::sketch::{self, ChainGraph, SketchType};
use crate::thought::{Thought, ThoughtTree};

pub const CHAIN_FILE: &str = "conceptual_chain.png";
pub const EQUATIONS_FILE: &str = "equations.png";
pub const TREE_FILE: &str = "thought_tree.png";

pub struct SketchRenderer {
    rasterizer: Box<dyn Rasterizer>,
    output_dir: Option<PathBuf>,
}

impl Default for SketchRenderer {
    fn default() -> Self {
        Self {
            rasterizer: Box::new(BitmapRasterizer::new()),
            output_dir: None,
        }
    }
}

impl SketchRenderer {
    pub fn new(rasterizer: Box<dyn Rasterizer>) -> Self {
        tracing::info!("SketchRenderer initialized");
        Self {
            rasterizer,
            output_dir: None,
        }
    }

    /// Also write every image under `dir`, creating it if needed
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "Sketch output directory ready");
        self.output_dir = Some(dir);
        Ok(self)
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn detect_sketch_type(&self, text: &str) -> SketchType {
        sketch::detect(text)
    }

    /// Render whatever shape the sketch has
    pub fn render_sketch(&self, text: &str) -> Rendering {
        let kind = self.detect_sketch_type(text);
        tracing::debug!(%kind, "Rendering sketch");
        match kind {
            SketchType::ConceptualChain => self.render_conceptual_chain(text),
            SketchType::Equations => self.render_equations(text),
            SketchType::Text => Rendering::text(text),
        }
    }

    pub fn render_conceptual_chain(&self, text: &str) -> Rendering {
        let graph = ChainGraph::parse(text);
        if graph.is_empty() {
            tracing::warn!("No valid chains found in input text");
            return Rendering::text(text);
        }

        match self.image(|r| r.chain_diagram(&graph), CHAIN_FILE) {
            Ok(content) => Rendering {
                nodes: Some(graph.nodes),
                edges: Some(graph.edges),
                ..Rendering::new(RenderKind::ConceptualChain, RenderFormat::PngBase64, content)
            },
            Err(e) => {
                tracing::error!("Error rendering conceptual chain: {}", e);
                Rendering::degraded(text, e)
            }
        }
    }

    pub fn render_equations(&self, text: &str) -> Rendering {
        let equations = sketch::extract_equations(text);
        if equations.is_empty() {
            return Rendering::text(text);
        }

        match self.image(|r| r.equation_sheet(&equations), EQUATIONS_FILE) {
            Ok(content) => Rendering {
                equations: Some(equations),
                ..Rendering::new(RenderKind::Equations, RenderFormat::PngBase64, content)
            },
            Err(e) => {
                tracing::error!("Error rendering equations: {}", e);
                Rendering::degraded(text, e)
            }
        }
    }

    pub fn render_thought_tree(&self, thoughts: &[Thought]) -> Rendering {
        if thoughts.is_empty() {
            return Rendering::text("No thoughts to visualize");
        }

        let tree = ThoughtTree::build(thoughts);
        match self.image(|r| r.thought_tree(&tree), TREE_FILE) {
            Ok(content) => Rendering {
                nodes: Some(tree.node_ids()),
                edges: Some(tree.edges),
                ..Rendering::new(RenderKind::ThoughtTree, RenderFormat::PngBase64, content)
            },
            Err(e) => {
                tracing::error!("Error rendering thought tree: {}", e);
                let listing = serde_json::to_string(thoughts).unwrap_or_default();
                Rendering::degraded(listing, e)
            }
        }
    }

    /// Rasterize, persist if configured, base64-encode
    fn image<F>(&self, draw: F, file_name: &str) -> Result<String>
    where
        F: FnOnce(&dyn Rasterizer) -> Result<Vec<u8>>,
    {
        let png = draw(self.rasterizer.as_ref())?;

        if let Some(dir) = &self.output_dir {
            let path = dir.join(file_name);
            std::fs::write(&path, &png).map_err(VisualError::from)?;
            tracing::debug!(path = %path.display(), "Wrote sketch image");
        }

        Ok(STANDARD.encode(png))
    }
}
