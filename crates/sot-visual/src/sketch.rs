//! Sketch Detection and Parsing
//!
//! Line-oriented scans over a reasoning trace: arrow chains become a directed
//! graph, `=` lines become an equation list.

use serde::{Deserialize, Serialize};

pub const ARROW: &str = "->";
const COMMENT_MARKER: char = '#';

/// Shape of a reasoning sketch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SketchType {
    ConceptualChain,
    Equations,
    Text,
}

impl SketchType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConceptualChain => "conceptual_chain",
            Self::Equations => "equations",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for SketchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a sketch: two or more arrows anywhere make a chain, otherwise two or
/// more equation lines make an equation sketch.
pub fn detect(text: &str) -> SketchType {
    if text.matches(ARROW).count() >= 2 {
        return SketchType::ConceptualChain;
    }
    if equation_lines(text).count() >= 2 {
        return SketchType::Equations;
    }
    SketchType::Text
}

fn equation_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.contains('=') && !line.starts_with(COMMENT_MARKER))
}

/// Trimmed lines containing `=`, skipping `#` comments
pub fn extract_equations(text: &str) -> Vec<String> {
    equation_lines(text).map(str::to_owned).collect()
}

/// Every line with at least one arrow, split into its trimmed, non-empty hops.
/// Lines that leave fewer than two hops are dropped.
pub fn parse_chains(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .filter(|line| line.contains(ARROW))
        .map(|line| {
            line.split(ARROW)
                .map(str::trim)
                .filter(|hop| !hop.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .filter(|chain| chain.len() > 1)
        .collect()
}

/// Directed graph built from arrow chains
///
/// Nodes and edges keep first-seen order and are de-duplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
}

impl ChainGraph {
    pub fn from_chains(chains: &[Vec<String>]) -> Self {
        let mut graph = Self::default();
        for chain in chains {
            for node in chain {
                graph.add_node(node);
            }
            for pair in chain.windows(2) {
                graph.add_edge(&pair[0], &pair[1]);
            }
        }
        graph
    }

    pub fn parse(text: &str) -> Self {
        Self::from_chains(&parse_chains(text))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, node: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == node)
    }

    fn add_node(&mut self, node: &str) {
        if self.index_of(node).is_none() {
            self.nodes.push(node.to_owned());
        }
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        if !self.edges.iter().any(|(a, b)| a == from && b == to) {
            self.edges.push((from.to_owned(), to.to_owned()));
        }
    }
}
