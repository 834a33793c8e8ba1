//! Turns table and relationship metadata into a [`RootGraph`].
//!
//! A build runs in four steps per table: classify many-to-many
//! participants, create the table's cluster, resolve its lookup columns,
//! then pair it with its many-to-many partner. Gaps in the metadata are
//! reported through [`Diagnostics`] and never abort the build; a
//! [`BuildError`] means the assembly code itself is broken.

pub mod classify;
mod clusters;
pub mod colors;
pub mod diagnostics;
mod resolve;

use std::collections::HashSet;

use crate::error::BuildError;
use crate::graph::{GraphAttributes, RootGraph};
use crate::model::{EntityRelationship, TableEntity};
use crate::sanitize::{SafeName, Sanitize};
use crate::theme::Theme;

use colors::ColorAllocator;
use diagnostics::Diagnostics;

pub use resolve::Cardinality;

/// The assembled graph plus everything skipped along the way.
#[derive(Debug)]
pub struct BuildOutcome {
    pub graph: RootGraph,
    pub diagnostics: Diagnostics,
}

/// Builds relationship graphs. Holds configuration only: every call to
/// [`GraphBuilder::build`] starts from an empty graph and a fresh color
/// allocator, so one builder can serve any number of documents.
#[derive(Debug, Clone)]
pub struct GraphBuilder<S = SafeName> {
    sanitizer: S,
    attributes: GraphAttributes,
    cluster_color: String,
    edge_weight: f32,
}

impl Default for GraphBuilder<SafeName> {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder<SafeName> {
    pub fn new() -> Self {
        let theme = Theme::default();
        Self {
            sanitizer: SafeName,
            attributes: GraphAttributes::from_theme(&theme),
            cluster_color: theme.cluster_color,
            edge_weight: theme.edge_weight,
        }
    }
}

impl<S: Sanitize> GraphBuilder<S> {
    pub fn with_sanitizer<T: Sanitize>(self, sanitizer: T) -> GraphBuilder<T> {
        GraphBuilder {
            sanitizer,
            attributes: self.attributes,
            cluster_color: self.cluster_color,
            edge_weight: self.edge_weight,
        }
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.attributes = GraphAttributes::from_theme(theme);
        self.cluster_color = theme.cluster_color.clone();
        self.edge_weight = theme.edge_weight;
        self
    }

    pub fn build(
        &self,
        document_name: &str,
        tables: &[TableEntity],
        relationships: &[EntityRelationship],
    ) -> Result<BuildOutcome, BuildError> {
        let many_to_many = classify::many_to_many_first_entities(relationships);
        let mut pass = BuildPass {
            sanitizer: &self.sanitizer,
            cluster_color: &self.cluster_color,
            edge_weight: self.edge_weight,
            tables,
            relationships,
            graph: RootGraph::new(
                self.sanitizer.sanitize(document_name),
                self.attributes.clone(),
            ),
            colors: ColorAllocator::new(),
            diagnostics: Diagnostics::default(),
            linked_pairs: HashSet::new(),
        };

        for table in tables
            .iter()
            .filter(|t| clusters::needs_cluster(t, &many_to_many))
        {
            let source_cluster = pass.table_cluster(table);
            pass.link_lookup_columns(table, &source_cluster)?;

            if many_to_many.contains(table.name.as_str()) {
                pass.link_many_to_many(table, &source_cluster)?;
            }
        }

        tracing::info!(
            document = document_name,
            clusters = pass.graph.cluster_count(),
            nodes = pass.graph.node_count(),
            edges = pass.graph.edge_count(),
            skipped = pass.diagnostics.len(),
            "relationship graph assembled"
        );

        Ok(BuildOutcome {
            graph: pass.graph,
            diagnostics: pass.diagnostics,
        })
    }
}

/// State of one build. Dropped once the outcome is handed back.
struct BuildPass<'a, S> {
    sanitizer: &'a S,
    cluster_color: &'a str,
    edge_weight: f32,
    tables: &'a [TableEntity],
    relationships: &'a [EntityRelationship],
    graph: RootGraph,
    colors: ColorAllocator,
    diagnostics: Diagnostics,
    /// Unordered many-to-many pairs already linked.
    linked_pairs: HashSet<(String, String)>,
}
