use std::collections::{HashMap, VecDeque};

use crate::fonts::TextMeasure;
use crate::graph::{Orientation, RootGraph};
use crate::theme::Theme;

/// Bounding box for layout elements
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    fn union(&self, other: &BBox) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Cluster box with its title baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBox {
    pub id: String,
    pub bbox: BBox,
    pub title_x: f32,
    pub title_y: f32,
}

/// Laid-out coordinates for every cluster and node of a graph.
#[derive(Debug, Clone, Default)]
pub struct DiagramLayout {
    pub orientation: Orientation,
    pub nodes: HashMap<String, BBox>,
    /// In graph order.
    pub clusters: Vec<ClusterBox>,
    pub bbox: BBox,
}

/// Places clusters in ranks along the orientation axis: a cluster whose
/// lookup columns reference another cluster sits one rank before it.
/// Nodes are stacked inside their cluster in insertion order.
pub struct LayoutEngine<'a, T: TextMeasure> {
    measure: &'a mut T,
    font_size: f32,
    pub node_padding_x: f32,
    pub node_padding_y: f32,
    pub cluster_padding: f32,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub margin: f32,
}

/// A cluster's size plus the node offsets inside it, before placement.
struct ClusterShape {
    width: f32,
    height: f32,
    title_band: f32,
    /// `(node id, y offset within cluster, height)`
    rows: Vec<(String, f32, f32)>,
    inner_width: f32,
}

impl<'a, T: TextMeasure> LayoutEngine<'a, T> {
    pub fn new(measure: &'a mut T, theme: &Theme) -> Self {
        Self {
            measure,
            font_size: theme.font_size,
            node_padding_x: theme.node_padding_x,
            node_padding_y: theme.node_padding_y,
            cluster_padding: theme.cluster_padding,
            node_spacing: theme.node_spacing,
            rank_spacing: theme.rank_spacing,
            margin: 20.0,
        }
    }

    pub fn layout(&mut self, graph: &RootGraph, orientation: Orientation) -> DiagramLayout {
        let cluster_ids: Vec<&str> = graph.clusters().map(|c| c.id.as_str()).collect();
        if cluster_ids.is_empty() {
            return DiagramLayout {
                orientation,
                ..DiagramLayout::default()
            };
        }

        let shapes: HashMap<&str, ClusterShape> = graph
            .clusters()
            .map(|c| (c.id.as_str(), self.shape_cluster(graph, &c.id, &c.label)))
            .collect();

        let ranks = rank_clusters(graph, &cluster_ids);
        let rank_order = order_ranks(graph, &cluster_ids, &ranks);

        let horizontal = orientation == Orientation::LeftToRight;
        // Extent of each rank along the cross axis, and its thickness along the main axis.
        let cross_extent = |rank: &[&str]| -> f32 {
            let sizes = rank.iter().filter_map(|id| shapes.get(id));
            let total: f32 = if horizontal {
                sizes.map(|s| s.height).sum()
            } else {
                sizes.map(|s| s.width).sum()
            };
            total + self.rank_spacing / 2.0 * rank.len().saturating_sub(1) as f32
        };
        let thickness = |rank: &[&str]| -> f32 {
            rank.iter()
                .filter_map(|id| shapes.get(id))
                .map(|s| if horizontal { s.width } else { s.height })
                .fold(0.0, f32::max)
        };

        let max_cross = rank_order
            .iter()
            .map(|r| cross_extent(r))
            .fold(0.0, f32::max);

        let mut clusters: HashMap<&str, ClusterBox> = HashMap::new();
        let mut nodes: HashMap<String, BBox> = HashMap::new();
        let mut main = self.margin;

        for rank in &rank_order {
            let mut cross = self.margin + (max_cross - cross_extent(rank)).max(0.0) / 2.0;

            for id in rank {
                let Some(shape) = shapes.get(id) else {
                    continue;
                };
                let (x, y) = if horizontal { (main, cross) } else { (cross, main) };
                let bbox = BBox::new(x, y, shape.width, shape.height);

                for (node_id, offset, height) in &shape.rows {
                    nodes.insert(
                        node_id.clone(),
                        BBox::new(
                            x + self.cluster_padding,
                            y + offset,
                            shape.inner_width,
                            *height,
                        ),
                    );
                }

                clusters.insert(
                    *id,
                    ClusterBox {
                        id: (*id).to_string(),
                        bbox,
                        title_x: bbox.center_x(),
                        title_y: y + self.cluster_padding + shape.title_band * 0.7,
                    },
                );

                let extent = if horizontal { shape.height } else { shape.width };
                cross += extent + self.rank_spacing / 2.0;
            }

            main += thickness(rank) + self.rank_spacing;
        }

        let ordered: Vec<ClusterBox> = cluster_ids
            .iter()
            .filter_map(|id| clusters.remove(id))
            .collect();
        let bbox = ordered
            .iter()
            .map(|c| c.bbox)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default();

        DiagramLayout {
            orientation,
            nodes,
            clusters: ordered,
            bbox,
        }
    }

    fn shape_cluster(&mut self, graph: &RootGraph, cluster_id: &str, label: &str) -> ClusterShape {
        let line_height = self.font_size * 1.2;
        let title_width = self.measure.measure_text(label, self.font_size, true).0;
        let title_band = line_height + self.node_padding_y;

        let node_ids: Vec<&str> = graph
            .cluster(cluster_id)
            .map(|c| c.node_ids().collect())
            .unwrap_or_default();

        let mut inner_width: f32 = 0.0;
        let mut rows = Vec::with_capacity(node_ids.len());
        let mut offset = self.cluster_padding + title_band;

        for id in node_ids {
            let label = graph.node(id).map(|n| n.label.as_str()).unwrap_or(id);
            let (text_w, text_h) = self.measure.measure_text(label, self.font_size, false);
            let width = (text_w + self.node_padding_x * 2.0).max(56.0);
            let height = (text_h.max(line_height) + self.node_padding_y * 2.0).max(30.0);
            inner_width = inner_width.max(width);
            rows.push((id.to_string(), offset, height));
            offset += height + self.node_spacing;
        }

        if !rows.is_empty() {
            offset -= self.node_spacing;
        }
        inner_width = inner_width.max(title_width).max(56.0);

        ClusterShape {
            width: inner_width + self.cluster_padding * 2.0,
            height: offset + self.cluster_padding,
            title_band,
            rows,
            inner_width,
        }
    }
}

/// Cluster-level adjacency: `(from cluster, to cluster)` for every edge
/// whose endpoints live in different clusters, deduplicated.
fn cluster_links<'g>(graph: &'g RootGraph) -> Vec<(&'g str, &'g str)> {
    let mut links: Vec<(&str, &str)> = Vec::new();
    for edge in graph.edges() {
        let (Some(from), Some(to)) = (graph.node(&edge.from), graph.node(&edge.to)) else {
            continue;
        };
        let link = (from.cluster.as_str(), to.cluster.as_str());
        if link.0 != link.1 && !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

fn rank_clusters<'g>(graph: &'g RootGraph, cluster_ids: &[&'g str]) -> HashMap<&'g str, usize> {
    let links = cluster_links(graph);
    let mut incoming: HashMap<&str, usize> = cluster_ids.iter().map(|id| (*id, 0)).collect();
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in links {
        *incoming.entry(to).or_default() += 1;
        outgoing.entry(from).or_default().push(to);
    }

    let mut ranks: HashMap<&str, usize> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for id in cluster_ids {
        if incoming.get(id).copied().unwrap_or(0) == 0 {
            ranks.insert(*id, 0);
            queue.push_back(*id);
        }
    }

    let spread = |ranks: &mut HashMap<&'g str, usize>, queue: &mut VecDeque<&'g str>| {
        while let Some(id) = queue.pop_front() {
            let rank = ranks.get(id).copied().unwrap_or(0);
            for next in outgoing.get(id).into_iter().flatten() {
                if !ranks.contains_key(next) {
                    ranks.insert(*next, rank + 1);
                    queue.push_back(*next);
                }
            }
        }
    };
    spread(&mut ranks, &mut queue);

    // Clusters only reachable through a cycle start a fresh rank.
    for id in cluster_ids {
        if !ranks.contains_key(id) {
            let rank = ranks.values().copied().max().map_or(0, |r| r + 1);
            ranks.insert(*id, rank);
            queue.push_back(*id);
            spread(&mut ranks, &mut queue);
        }
    }
    ranks
}

/// Groups clusters per rank and reduces crossings with barycenter sweeps.
fn order_ranks<'g>(
    graph: &'g RootGraph,
    cluster_ids: &[&'g str],
    ranks: &HashMap<&'g str, usize>,
) -> Vec<Vec<&'g str>> {
    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let mut rank_nodes: Vec<Vec<&str>> = vec![Vec::new(); max_rank + 1];
    for id in cluster_ids {
        let rank = ranks.get(id).copied().unwrap_or(0);
        rank_nodes[rank].push(*id);
    }

    let order_index: HashMap<&str, usize> = cluster_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();
    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in cluster_links(graph) {
        outgoing.entry(from).or_default().push(to);
        incoming.entry(to).or_default().push(from);
    }

    let by_barycenter = |rank: &mut Vec<&'g str>,
                         neighbors: &HashMap<&'g str, Vec<&'g str>>,
                         positions: &HashMap<&'g str, usize>| {
        rank.sort_by(|a, b| {
            let bc_a = neighbors.get(a).and_then(|n| barycenter(n, positions));
            let bc_b = neighbors.get(b).and_then(|n| barycenter(n, positions));
            let tie = || {
                order_index
                    .get(a)
                    .copied()
                    .unwrap_or(usize::MAX)
                    .cmp(&order_index.get(b).copied().unwrap_or(usize::MAX))
            };
            match (bc_a, bc_b) {
                (Some(x), Some(y)) => x
                    .partial_cmp(&y)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(tie),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => tie(),
            }
        });
    };

    for _ in 0..4 {
        for rank_idx in 1..rank_nodes.len() {
            let prev = positions_of(&rank_nodes[rank_idx - 1]);
            by_barycenter(&mut rank_nodes[rank_idx], &incoming, &prev);
        }
        for rank_idx in (0..rank_nodes.len().saturating_sub(1)).rev() {
            let next = positions_of(&rank_nodes[rank_idx + 1]);
            by_barycenter(&mut rank_nodes[rank_idx], &outgoing, &next);
        }
    }

    rank_nodes.retain(|rank| !rank.is_empty());
    rank_nodes
}

fn positions_of<'g>(rank: &[&'g str]) -> HashMap<&'g str, usize> {
    rank.iter().enumerate().map(|(i, id)| (*id, i)).collect()
}

fn barycenter(neighbors: &[&str], rank_pos: &HashMap<&str, usize>) -> Option<f32> {
    let mut total = 0.0;
    let mut count = 0.0;
    for neighbor in neighbors {
        if let Some(pos) = rank_pos.get(neighbor) {
            total += *pos as f32;
            count += 1.0;
        }
    }

    if count > 0.0 {
        Some(total / count)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::fonts::ApproximateMeasure;
    use crate::model::{ColumnEntity, EntityRelationship, TableEntity};

    fn sample_graph() -> RootGraph {
        let tables = vec![
            TableEntity::new("account", "Account")
                .with_primary_key(ColumnEntity::new("accountid", "accountid")),
            TableEntity::new("contact", "Contact")
                .with_primary_key(ColumnEntity::new("contactid", "contactid"))
                .with_column(ColumnEntity::lookup("account", "parentcustomerid")),
            TableEntity::new("list", "Marketing List")
                .with_primary_key(ColumnEntity::new("listid", "listid")),
        ];
        let relationships = vec![EntityRelationship::many_to_many("contact", "list")];
        GraphBuilder::new()
            .build("doc", &tables, &relationships)
            .expect("build")
            .graph
    }

    #[test]
    fn left_to_right_puts_referenced_clusters_after_referencing_ones() {
        let graph = sample_graph();
        let mut measure = ApproximateMeasure::default();
        let layout = LayoutEngine::new(&mut measure, &Theme::default())
            .layout(&graph, Orientation::LeftToRight);

        let find = |id: &str| {
            layout
                .clusters
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.bbox)
                .expect("cluster laid out")
        };
        let contact = find("cluster_contact");
        let account = find("cluster_account");
        let list = find("cluster_list");

        assert!(account.x > contact.right());
        assert!(list.x > contact.right());
        assert_eq!(account.x, list.x);
        assert_eq!(layout.clusters.len(), 3);
    }

    #[test]
    fn nodes_sit_inside_their_cluster() {
        let graph = sample_graph();
        let mut measure = ApproximateMeasure::default();
        let layout = LayoutEngine::new(&mut measure, &Theme::default())
            .layout(&graph, Orientation::TopToBottom);

        for node in graph.nodes() {
            let pos = layout.nodes.get(&node.id).expect("node laid out");
            let cluster = layout
                .clusters
                .iter()
                .find(|c| c.id == node.cluster)
                .expect("owner laid out");
            assert!(pos.x >= cluster.bbox.x && pos.right() <= cluster.bbox.right());
            assert!(pos.y >= cluster.bbox.y && pos.bottom() <= cluster.bbox.bottom());
        }
        assert!(layout.bbox.width > 0.0 && layout.bbox.height > 0.0);
    }

    #[test]
    fn cyclic_references_still_place_every_cluster() {
        let tables = vec![
            TableEntity::new("a", "A")
                .with_primary_key(ColumnEntity::new("aid", "aid"))
                .with_column(ColumnEntity::lookup("b", "b ref")),
            TableEntity::new("b", "B")
                .with_primary_key(ColumnEntity::new("bid", "bid"))
                .with_column(ColumnEntity::lookup("a", "a ref")),
        ];
        let graph = GraphBuilder::new().build("doc", &tables, &[]).expect("build").graph;
        let mut measure = ApproximateMeasure::default();
        let layout = LayoutEngine::new(&mut measure, &Theme::default())
            .layout(&graph, Orientation::LeftToRight);

        assert_eq!(layout.clusters.len(), 2);
        assert_eq!(layout.nodes.len(), graph.node_count());
    }

    #[test]
    fn empty_graph_has_empty_layout() {
        let graph = RootGraph::new("empty", Default::default());
        let mut measure = ApproximateMeasure::default();
        let layout = LayoutEngine::new(&mut measure, &Theme::default())
            .layout(&graph, Orientation::LeftToRight);
        assert!(layout.clusters.is_empty());
        assert_eq!(layout.bbox, BBox::default());
    }
}
