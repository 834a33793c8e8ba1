//! In-memory diagram structure: an undirected root graph owning clusters,
//! nodes and edges.
//!
//! Every element is retrieved-or-created by key. Asking for the same key
//! twice hands back the element created the first time, so callers never
//! have to check for existence first. Insertion order is preserved, which
//! keeps layout and SVG output stable between runs.

use indexmap::{IndexMap, IndexSet};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    LeftToRight,
    TopToBottom,
}

/// Defaults applied to nodes that do not override them. Nodes are drawn
/// as filled rectangles.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefaults {
    pub color: String,
    pub fill_color: String,
    pub font_color: String,
    pub pen_width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDefaults {
    pub color: String,
    pub pen_width: f32,
}

/// Root-level style attributes handed to the rendering backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphAttributes {
    pub compound: bool,
    pub orientation: Orientation,
    pub color: String,
    pub fill_color: String,
    pub label: String,
    pub font_name: String,
    pub font_size: f32,
    pub pen_width: f32,
    pub node: NodeDefaults,
    pub edge: EdgeDefaults,
}

impl GraphAttributes {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            compound: true,
            orientation: Orientation::LeftToRight,
            color: theme.graph_color.clone(),
            fill_color: theme.background_color.clone(),
            label: " ".to_string(),
            font_name: theme.font_family.clone(),
            font_size: theme.font_size,
            pen_width: theme.pen_width,
            node: NodeDefaults {
                color: theme.graph_color.clone(),
                fill_color: theme.node_fill_color.clone(),
                font_color: theme.node_text_color.clone(),
                pen_width: theme.pen_width,
            },
            edge: EdgeDefaults {
                color: theme.edge_color.clone(),
                pen_width: theme.pen_width,
            },
        }
    }
}

impl Default for GraphAttributes {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

/// A labelled group of nodes, one per table.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: String,
    pub label: String,
    /// Outline color; `None` inherits the root graph color.
    pub color: Option<String>,
    nodes: IndexSet<String>,
}

impl Cluster {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: String::new(),
            color: None,
            nodes: IndexSet::new(),
        }
    }

    /// Ids of the nodes this cluster owns, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub fill_color: Option<String>,
    /// Cluster that created the node.
    pub cluster: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub name: String,
    pub color: Option<String>,
    pub weight: Option<f32>,
    pub label: Option<String>,
}

/// Endpoints are stored in sorted order: the graph is undirected, so
/// `a -- b` and `b -- a` with the same name are one edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EdgeKey {
    low: String,
    high: String,
    name: String,
}

impl EdgeKey {
    fn new(a: &str, b: &str, name: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.to_string(),
            high: high.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RootGraph {
    pub name: String,
    pub attributes: GraphAttributes,
    clusters: IndexMap<String, Cluster>,
    nodes: IndexMap<String, Node>,
    edges: IndexMap<EdgeKey, Edge>,
}

impl RootGraph {
    pub fn new(name: impl Into<String>, attributes: GraphAttributes) -> Self {
        Self {
            name: name.into(),
            attributes,
            clusters: IndexMap::new(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    pub fn get_or_add_cluster(&mut self, id: &str) -> &mut Cluster {
        self.clusters
            .entry(id.to_string())
            .or_insert_with(|| Cluster::new(id))
    }

    /// Retrieves or creates node `id` inside cluster `cluster_id`.
    ///
    /// Node ids are global: a node that already exists is returned as is,
    /// even when requested through a different cluster, and stays owned by
    /// the cluster that created it. Returns `None` when the cluster does
    /// not exist.
    pub fn get_or_add_node(&mut self, cluster_id: &str, id: &str) -> Option<&mut Node> {
        if !self.nodes.contains_key(id) {
            let cluster = self.clusters.get_mut(cluster_id)?;
            cluster.nodes.insert(id.to_string());
            self.nodes.insert(
                id.to_string(),
                Node {
                    id: id.to_string(),
                    label: String::new(),
                    fill_color: None,
                    cluster: cluster_id.to_string(),
                },
            );
        } else if !self.clusters.contains_key(cluster_id) {
            return None;
        }
        self.nodes.get_mut(id)
    }

    /// Retrieves or creates the edge `from -- to` called `name`. Returns
    /// `None` when either endpoint is not a node of this graph.
    pub fn get_or_add_edge(&mut self, from: &str, to: &str, name: &str) -> Option<&mut Edge> {
        if !self.nodes.contains_key(from) || !self.nodes.contains_key(to) {
            return None;
        }
        let edge = self
            .edges
            .entry(EdgeKey::new(from, to, name))
            .or_insert_with(|| Edge {
                from: from.to_string(),
                to: to.to_string(),
                name: name.to_string(),
                color: None,
                weight: None,
                label: None,
            });
        Some(edge)
    }

    pub fn cluster(&self, id: &str) -> Option<&Cluster> {
        self.clusters.get(id)
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> RootGraph {
        RootGraph::new("test", GraphAttributes::default())
    }

    #[test]
    fn clusters_are_retrieved_not_duplicated() {
        let mut g = graph();
        g.get_or_add_cluster("cluster_account").label = "Account (account)".to_string();
        let again = g.get_or_add_cluster("cluster_account");
        assert_eq!(again.label, "Account (account)");
        assert_eq!(g.cluster_count(), 1);
    }

    #[test]
    fn nodes_keep_their_first_owner() {
        let mut g = graph();
        g.get_or_add_cluster("a");
        g.get_or_add_cluster("b");
        g.get_or_add_node("a", "n").expect("cluster a exists").label = "first".to_string();

        let shared = g.get_or_add_node("b", "n").expect("cluster b exists");
        assert_eq!(shared.cluster, "a");
        assert_eq!(shared.label, "first");
        assert_eq!(g.node_count(), 1);
        assert!(g.cluster("b").expect("b").is_empty());
    }

    #[test]
    fn nodes_need_an_existing_cluster() {
        let mut g = graph();
        assert!(g.get_or_add_node("missing", "n").is_none());
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn undirected_edges_are_deduplicated_by_endpoints_and_name() {
        let mut g = graph();
        g.get_or_add_cluster("c");
        g.get_or_add_node("c", "x");
        g.get_or_add_node("c", "y");

        g.get_or_add_edge("x", "y", "lookup").expect("endpoints exist");
        g.get_or_add_edge("y", "x", "lookup").expect("endpoints exist");
        assert_eq!(g.edge_count(), 1);

        g.get_or_add_edge("x", "y", "other").expect("endpoints exist");
        assert_eq!(g.edge_count(), 2);
        assert!(g.get_or_add_edge("x", "nope", "lookup").is_none());
    }

    #[test]
    fn attributes_follow_theme() {
        let attrs = GraphAttributes::default();
        assert!(attrs.compound);
        assert_eq!(attrs.orientation, Orientation::LeftToRight);
        assert_eq!(attrs.color, "#000090");
        assert_eq!(attrs.node.font_color, "#ffffff");
        assert_eq!(attrs.font_name, "helvetica");
    }
}
