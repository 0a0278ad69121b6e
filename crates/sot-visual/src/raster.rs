//! Rasterizer
//!
//! Turns parsed sketches into PNG bytes. Text is drawn with DejaVu Sans Mono,
//! bundled into the binary, unless another font is loaded from disk.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::io::Cursor;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_text_mut,
    text_size,
};

use crate::error::{Result, VisualError};
use crate::sketch::ChainGraph;
use crate::thought::ThoughtTree;

/// Backend that draws sketches
pub trait Rasterizer: Send + Sync {
    fn chain_diagram(&self, graph: &ChainGraph) -> Result<Vec<u8>>;

    fn equation_sheet(&self, equations: &[String]) -> Result<Vec<u8>>;

    fn thought_tree(&self, tree: &ThoughtTree) -> Result<Vec<u8>>;
}

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([20, 20, 20]);
const EDGE: Rgb<u8> = Rgb([90, 90, 90]);
const CHAIN_FILL: Rgb<u8> = Rgb([173, 216, 230]);
const TREE_FILL: Rgb<u8> = Rgb([144, 238, 144]);

const NODE_RADIUS: i32 = 36;
const ARROW_WING: f32 = 12.0;
const ARROW_SPREAD: f32 = 0.45;

const CHAIN_SIZE: (u32, u32) = (800, 640);
const TREE_WIDTH: u32 = 1000;
const TREE_LEVEL_HEIGHT: u32 = 120;
/// Deep trees squeeze their rows to stay under this height
const TREE_MAX_HEIGHT: u32 = 4000;
const SHEET_LINE_HEIGHT: u32 = 28;
const MARGIN: u32 = 40;

const TITLE_SCALE: f32 = 22.0;
const LABEL_SCALE: f32 = 14.0;
const EQUATION_SCALE: f32 = 18.0;

const BUILTIN_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// The font compiled into the crate
pub fn builtin_font() -> Result<FontArc> {
    FontArc::try_from_slice(BUILTIN_FONT).map_err(|e| VisualError::Font(e.to_string()))
}

/// `image` + `imageproc` backend
#[derive(Clone)]
pub struct BitmapRasterizer {
    font: Option<FontArc>,
}

impl Default for BitmapRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl BitmapRasterizer {
    /// Rasterizer using the bundled font
    pub fn new() -> Self {
        match builtin_font() {
            Ok(font) => Self::with_font(font),
            Err(e) => {
                tracing::warn!("Bundled font unusable, labels disabled: {}", e);
                Self::without_font()
            }
        }
    }

    /// Shapes only: labels are skipped and equation sheets fail
    pub const fn without_font() -> Self {
        Self { font: None }
    }

    pub const fn with_font(font: FontArc) -> Self {
        Self { font: Some(font) }
    }

    /// Load a TrueType/OpenType font from disk
    pub fn from_font_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| VisualError::Font(e.to_string()))?;
        tracing::info!(path = %path.as_ref().display(), "Loaded sketch font");
        Ok(Self::with_font(font))
    }

    pub const fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn title(&self, img: &mut RgbImage, text: &str) {
        if let Some(font) = &self.font {
            let (w, _) = text_size(PxScale::from(TITLE_SCALE), font, text);
            let x = signed(img.width().saturating_sub(w) / 2);
            draw_text_mut(img, INK, x, 10, PxScale::from(TITLE_SCALE), font, text);
        }
    }

    fn label(&self, img: &mut RgbImage, center: (f32, f32), text: &str) {
        if let Some(font) = &self.font {
            let scale = PxScale::from(LABEL_SCALE);
            let (w, h) = text_size(scale, font, text);
            let x = px(center.0) - signed(w / 2);
            let y = px(center.1) - signed(h / 2);
            draw_text_mut(img, INK, x, y, scale, font, text);
        }
    }

    fn node(&self, img: &mut RgbImage, center: (f32, f32), fill: Rgb<u8>, text: &str) {
        let c = (px(center.0), px(center.1));
        draw_filled_circle_mut(img, c, NODE_RADIUS, fill);
        draw_hollow_circle_mut(img, c, NODE_RADIUS, EDGE);
        self.label(img, center, text);
    }
}

impl Rasterizer for BitmapRasterizer {
    fn chain_diagram(&self, graph: &ChainGraph) -> Result<Vec<u8>> {
        if graph.is_empty() {
            return Err(VisualError::Empty("conceptual chain"));
        }

        let (width, height) = CHAIN_SIZE;
        let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
        self.title(&mut img, "Conceptual Chain Visualization");

        let positions = circular_layout(graph.nodes.len(), width, height);

        for (from, to) in &graph.edges {
            if let (Some(a), Some(b)) = (graph.index_of(from), graph.index_of(to)) {
                draw_arrow(&mut img, positions[a], positions[b]);
            }
        }
        for (name, pos) in graph.nodes.iter().zip(&positions) {
            self.node(&mut img, *pos, CHAIN_FILL, name);
        }

        encode_png(&img)
    }

    fn equation_sheet(&self, equations: &[String]) -> Result<Vec<u8>> {
        if equations.is_empty() {
            return Err(VisualError::Empty("equations"));
        }
        let font = self.font.as_ref().ok_or(VisualError::FontRequired)?;

        let scale = PxScale::from(EQUATION_SCALE);
        let lines: Vec<String> = numbered_equations(equations)
            .iter()
            .map(|line| expand_tabs(line))
            .collect();

        let widest = lines
            .iter()
            .map(|l| text_size(scale, font, l).0)
            .max()
            .unwrap_or(0);
        let width = (widest + 2 * MARGIN).max(400);
        let rows = u32::try_from(lines.len()).unwrap_or(u32::MAX);
        let height = SHEET_LINE_HEIGHT.saturating_mul(rows).saturating_add(2 * MARGIN + 20);

        let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
        self.title(&mut img, "Equation Sketch");

        let mut y = MARGIN + 20;
        for line in &lines {
            draw_text_mut(&mut img, INK, signed(MARGIN), signed(y), scale, font, line);
            y += SHEET_LINE_HEIGHT;
        }

        encode_png(&img)
    }

    fn thought_tree(&self, tree: &ThoughtTree) -> Result<Vec<u8>> {
        if tree.nodes.is_empty() {
            return Err(VisualError::Empty("thought tree"));
        }

        let depths = tree.depths();
        let levels = depths.iter().max().copied().unwrap_or(0) + 1;
        let rows = u32::try_from(levels).unwrap_or(u32::MAX);
        let height = TREE_LEVEL_HEIGHT
            .saturating_mul(rows)
            .saturating_add(2 * MARGIN)
            .min(TREE_MAX_HEIGHT);
        #[allow(clippy::cast_precision_loss)]
        let level_height = (height - 2 * MARGIN) as f32 / rows as f32;
        let mut img = RgbImage::from_pixel(TREE_WIDTH, height, BACKGROUND);
        self.title(&mut img, "Thought Tree Visualization");

        let positions = layered_layout(&depths, levels, TREE_WIDTH, level_height);

        for (parent, child) in &tree.edges {
            if let (Some(p), Some(c)) = (tree.position(parent), tree.position(child)) {
                draw_arrow(&mut img, positions[p], positions[c]);
            }
        }
        for (node, pos) in tree.nodes.iter().zip(&positions) {
            self.node(&mut img, *pos, TREE_FILL, &node.label);
        }

        encode_png(&img)
    }
}

/// Nodes evenly spaced on a circle, first node at twelve o'clock
#[allow(clippy::cast_precision_loss)]
fn circular_layout(count: usize, width: u32, height: u32) -> Vec<(f32, f32)> {
    let cx = width as f32 / 2.0;
    let cy = (height as f32 + MARGIN as f32) / 2.0;
    if count == 1 {
        return vec![(cx, cy)];
    }

    let radius = (width.min(height) as f32 / 2.0) - (NODE_RADIUS as f32) - MARGIN as f32;
    (0..count)
        .map(|i| {
            let angle = TAU * i as f32 / count as f32 - FRAC_PI_2;
            (radius.mul_add(angle.cos(), cx), radius.mul_add(angle.sin(), cy))
        })
        .collect()
}

/// One row per depth, nodes spread evenly across each row
#[allow(clippy::cast_precision_loss)]
fn layered_layout(
    depths: &[usize],
    levels: usize,
    width: u32,
    level_height: f32,
) -> Vec<(f32, f32)> {
    let mut per_level = vec![0usize; levels];
    for d in depths {
        per_level[*d] += 1;
    }

    let mut seen = vec![0usize; levels];
    depths
        .iter()
        .map(|d| {
            let slot = seen[*d];
            seen[*d] += 1;
            let step = width as f32 / (per_level[*d] + 1) as f32;
            let x = step * (slot + 1) as f32;
            let y = level_height.mul_add(*d as f32 + 0.5, MARGIN as f32);
            (x, y)
        })
        .collect()
}

/// Line between two node rims with a head at `to`
#[allow(clippy::cast_precision_loss)]
fn draw_arrow(img: &mut RgbImage, from: (f32, f32), to: (f32, f32)) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = dx.hypot(dy);
    if len <= 2.0 * NODE_RADIUS as f32 {
        return;
    }

    let (ux, uy) = (dx / len, dy / len);
    let r = NODE_RADIUS as f32;
    let start = (ux.mul_add(r, from.0), uy.mul_add(r, from.1));
    let tip = ((-ux).mul_add(r, to.0), (-uy).mul_add(r, to.1));
    draw_line_segment_mut(img, start, tip, EDGE);

    let angle = uy.atan2(ux);
    for side in [ARROW_SPREAD, -ARROW_SPREAD] {
        let a = angle + std::f32::consts::PI + side;
        let wing = (ARROW_WING.mul_add(a.cos(), tip.0), ARROW_WING.mul_add(a.sin(), tip.1));
        draw_line_segment_mut(img, tip, wing, EDGE);
    }
}

/// `(n)\t<eq>` lines, numbered from 1
pub fn numbered_equations(equations: &[String]) -> Vec<String> {
    equations
        .iter()
        .enumerate()
        .map(|(i, eq)| format!("({})\t{eq}", i + 1))
        .collect()
}

/// Glyph rendering has no tab stops; pad to the next multiple of four columns
fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 4);
    for ch in line.chars() {
        if ch == '\t' {
            let pad = 4 - out.chars().count() % 4;
            out.extend(std::iter::repeat_n(' ', pad));
        } else {
            out.push(ch);
        }
    }
    out
}

fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[allow(clippy::cast_possible_truncation)]
fn px(value: f32) -> i32 {
    value.round() as i32
}

fn signed(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thought::Thought;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

    #[test]
    fn test_chain_diagram_without_font() {
        let raster = BitmapRasterizer::without_font();
        let png = raster.chain_diagram(&ChainGraph::parse("A -> B -> C")).unwrap();
        assert!(png.starts_with(PNG_MAGIC));

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), CHAIN_SIZE);
    }

    #[test]
    fn test_equation_sheet_needs_font() {
        let raster = BitmapRasterizer::without_font();
        let err = raster.equation_sheet(&["x = 1".into()]).unwrap_err();
        assert!(matches!(err, VisualError::FontRequired));
    }

    #[test]
    fn test_default_rasterizer_has_bundled_font() {
        let raster = BitmapRasterizer::default();
        assert!(raster.has_font());

        let png = raster.equation_sheet(&["x = 1".into(), "y = x + 1".into()]).unwrap();
        assert!(png.starts_with(PNG_MAGIC));
    }

    #[test]
    fn test_equations_numbered_with_tab() {
        let lines = numbered_equations(&["x = 1".into(), "y = 2".into()]);
        assert_eq!(lines, vec!["(1)\tx = 1", "(2)\ty = 2"]);
        assert_eq!(expand_tabs(&lines[0]), "(1) x = 1");
        assert_eq!(expand_tabs("(10)\tz"), "(10)    z");
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let raster = BitmapRasterizer::new();
        assert!(matches!(
            raster.chain_diagram(&ChainGraph::default()),
            Err(VisualError::Empty(_))
        ));
        assert!(matches!(
            raster.thought_tree(&ThoughtTree::default()),
            Err(VisualError::Empty(_))
        ));
    }

    #[test]
    fn test_thought_tree_height_grows_with_depth() {
        let raster = BitmapRasterizer::without_font();
        let tree = ThoughtTree::build(&[
            Thought::new("r", "root"),
            Thought::new("a", "child").child_of("r"),
            Thought::new("b", "grandchild").child_of("a"),
        ]);

        let png = raster.thought_tree(&tree).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.height(), 3 * TREE_LEVEL_HEIGHT + 2 * MARGIN);
    }

    #[test]
    fn test_deep_thought_tree_height_is_capped() {
        let raster = BitmapRasterizer::without_font();
        let thoughts: Vec<Thought> = (0..800)
            .rev()
            .map(|i: usize| {
                let t = Thought::new(i.to_string(), "step");
                if i == 0 {
                    t
                } else {
                    t.child_of((i - 1).to_string())
                }
            })
            .collect();

        let png = raster.thought_tree(&ThoughtTree::build(&thoughts)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), TREE_WIDTH);
        assert!(decoded.height() <= TREE_MAX_HEIGHT);
    }

    #[test]
    fn test_bad_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        assert!(matches!(
            BitmapRasterizer::from_font_file(&path),
            Err(VisualError::Font(_))
        ));
    }

    #[test]
    fn test_circular_layout_single_node_centered() {
        let pos = circular_layout(1, 800, 640);
        assert_eq!(pos.len(), 1);
        assert!((pos[0].0 - 400.0).abs() < f32::EPSILON);
    }
}
