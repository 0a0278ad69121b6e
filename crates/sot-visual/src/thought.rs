//! Thought Trees

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

const LABEL_LIMIT: usize = 30;
const LABEL_KEEP: usize = 27;

/// One node of a thought tree as supplied by the caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thought {
    /// Defaults to the thought's position in the list
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub parent_id: Option<String>,
}

impl Thought {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            parent_id: None,
        }
    }

    #[must_use]
    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
}

/// Directed parent → child graph
///
/// A parent id that names no thought still becomes a node, labelled with its id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ThoughtTree {
    pub nodes: Vec<TreeNode>,
    pub edges: Vec<(String, String)>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ThoughtTree {
    pub fn build(thoughts: &[Thought]) -> Self {
        let mut tree = Self::default();
        let mut seen_edges = HashSet::new();

        for (index, thought) in thoughts.iter().enumerate() {
            let id = thought.id.clone().unwrap_or_else(|| index.to_string());
            tree.upsert(&id, Some(truncate_label(&thought.text)));

            if let Some(parent) = &thought.parent_id {
                tree.upsert(parent, None);
                if seen_edges.insert((parent.clone(), id.clone())) {
                    tree.edges.push((parent.clone(), id));
                }
            }
        }

        tree
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Depth of every node: breadth-first from the nodes with no parent, so each
    /// node sits at its shortest distance from a root. Nodes only reachable
    /// through a cycle stay at 0.
    pub fn depths(&self) -> Vec<usize> {
        let mut children = vec![Vec::new(); self.nodes.len()];
        let mut has_parent = vec![false; self.nodes.len()];
        for (parent, child) in &self.edges {
            if let (Some(p), Some(c)) = (self.position(parent), self.position(child)) {
                children[p].push(c);
                has_parent[c] = true;
            }
        }

        let mut depth = vec![0usize; self.nodes.len()];
        let mut visited = has_parent.iter().map(|h| !h).collect::<Vec<_>>();
        let mut queue: VecDeque<usize> = (0..self.nodes.len()).filter(|i| visited[*i]).collect();

        while let Some(node) = queue.pop_front() {
            for &child in &children[node] {
                if !visited[child] {
                    visited[child] = true;
                    depth[child] = depth[node] + 1;
                    queue.push_back(child);
                }
            }
        }
        depth
    }

    fn upsert(&mut self, id: &str, label: Option<String>) {
        match self.position(id) {
            Some(i) => {
                if let Some(label) = label {
                    self.nodes[i].label = label;
                }
            }
            None => {
                self.index.insert(id.to_owned(), self.nodes.len());
                self.nodes.push(TreeNode {
                    id: id.to_owned(),
                    label: label.unwrap_or_else(|| id.to_owned()),
                });
            }
        }
    }
}

/// Labels longer than 30 characters keep 27 and gain `...`
pub fn truncate_label(text: &str) -> String {
    if text.chars().count() > LABEL_LIMIT {
        let head: String = text.chars().take(LABEL_KEEP).collect();
        format!("{head}...")
    } else {
        text.to_owned()
    }
}
