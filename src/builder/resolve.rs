use crate::error::BuildError;
use crate::model::{ColumnEntity, TableEntity};
use crate::sanitize::Sanitize;

use super::BuildPass;
use super::diagnostics::Diagnostic;

/// Edge label describing how many rows sit on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    pub fn label(self) -> &'static str {
        match self {
            Cardinality::OneToMany => "*|1",
            Cardinality::ManyToMany => "*|*",
        }
    }
}

/// Where a lookup column points.
#[derive(Debug)]
enum LookupTarget<'a> {
    /// A table named like the column.
    Direct(&'a TableEntity),
    /// The referenced table of a relationship declaring the column.
    Declared(&'a TableEntity),
    /// A relationship declares the column, but its table is not loaded.
    MissingReferenced(&'a str),
    Unresolved,
}

/// Arguments of the shared node/edge step. Callers resolve all three
/// entities first; an empty slot here is an internal defect.
struct LinkRequest<'r> {
    target_cluster: &'r str,
    source_cluster: &'r str,
    target: Option<&'r TableEntity>,
    source: Option<&'r TableEntity>,
    column: Option<&'r ColumnEntity>,
    cardinality: Cardinality,
}

impl<'a, S: Sanitize> BuildPass<'a, S> {
    /// Draws one `*|1` edge per resolvable lookup column of `table`.
    pub(super) fn link_lookup_columns(
        &mut self,
        table: &'a TableEntity,
        source_cluster: &str,
    ) -> Result<(), BuildError> {
        for column in table.non_default_lookup_columns() {
            if column.logical_name.trim().is_empty() {
                self.diagnostics.record(Diagnostic::MissingLookupColumn {
                    table: table.name.clone(),
                    display_name: column.display_name.clone(),
                });
                continue;
            }

            let (target_cluster, target) = match self.resolve_lookup_target(column) {
                LookupTarget::Direct(target) => {
                    let cluster = self.cluster_for(&column.logical_name, target);
                    (cluster, target)
                }
                LookupTarget::Declared(target) => {
                    let cluster = self.cluster_for(&target.name, target);
                    (cluster, target)
                }
                LookupTarget::MissingReferenced(referenced) => {
                    self.diagnostics.record(Diagnostic::MissingReferencedTable {
                        table: table.name.clone(),
                        column: column.logical_name.clone(),
                        referenced: referenced.to_string(),
                    });
                    continue;
                }
                LookupTarget::Unresolved => {
                    self.diagnostics.record(Diagnostic::UnresolvedLookup {
                        table: table.name.clone(),
                        column: column.logical_name.clone(),
                        hint: column.lookup_target.clone(),
                    });
                    continue;
                }
            };

            self.link(LinkRequest {
                target_cluster: &target_cluster,
                source_cluster,
                target: Some(target),
                source: Some(table),
                column: Some(column),
                cardinality: Cardinality::OneToMany,
            })?;
        }
        Ok(())
    }

    /// Tier one: a table whose name equals the column's logical name,
    /// ignoring Unicode case. Tier two: the first relationship whose referencing
    /// attribute equals the logical name (ignoring case), followed to its
    /// referenced table by exact name.
    fn resolve_lookup_target(&self, column: &ColumnEntity) -> LookupTarget<'a> {
        let (tables, relationships) = (self.tables, self.relationships);
        let name = column.logical_name.as_str();
        if let Some(table) = tables.iter().find(|t| eq_ignore_case(&t.name, name)) {
            return LookupTarget::Direct(table);
        }

        let Some(relationship) = relationships
            .iter()
            .find(|r| eq_ignore_case(&r.referencing_attribute, name))
        else {
            return LookupTarget::Unresolved;
        };

        match tables
            .iter()
            .find(|t| t.name == relationship.referenced_entity)
        {
            Some(table) => LookupTarget::Declared(table),
            None => LookupTarget::MissingReferenced(&relationship.referenced_entity),
        }
    }

    /// Draws the `*|*` edge between `table` and its many-to-many partner.
    ///
    /// The partner comes from the first relationship naming `table` as
    /// first entity; names compare with exact case. A pair that was already
    /// linked from the other side is not drawn again.
    pub(super) fn link_many_to_many(
        &mut self,
        table: &'a TableEntity,
        source_cluster: &str,
    ) -> Result<(), BuildError> {
        let (tables, relationships) = (self.tables, self.relationships);
        let Some(second_name) = relationships
            .iter()
            .find(|r| r.first_entity == table.name)
            .map(|r| r.second_entity.as_str())
        else {
            self.diagnostics.record(Diagnostic::MissingPairedRelationship {
                table: table.name.clone(),
            });
            return Ok(());
        };

        let Some(second) = tables.iter().find(|t| t.name == second_name) else {
            self.diagnostics.record(Diagnostic::MissingPairedTable {
                table: table.name.clone(),
                second: second_name.to_string(),
            });
            return Ok(());
        };

        let Some(key_column) = table.primary_column() else {
            self.diagnostics.record(Diagnostic::MissingPrimaryKey {
                table: table.name.clone(),
            });
            return Ok(());
        };

        let pair = if table.name <= second.name {
            (table.name.clone(), second.name.clone())
        } else {
            (second.name.clone(), table.name.clone())
        };
        if !self.linked_pairs.insert(pair) {
            tracing::debug!(
                first = %table.name,
                second = %second.name,
                "many-to-many pair already linked from the other side"
            );
            return Ok(());
        }

        let target_cluster = self.cluster_for(&second.name, second);
        self.link(LinkRequest {
            target_cluster: &target_cluster,
            source_cluster,
            target: Some(second),
            source: Some(table),
            column: Some(key_column),
            cardinality: Cardinality::ManyToMany,
        })
    }

    /// Places the target key node, the source column node, and the edge
    /// between them, all in the column's color.
    fn link(&mut self, request: LinkRequest<'_>) -> Result<(), BuildError> {
        let target = request.target.ok_or(BuildError::PreconditionViolated {
            argument: "target table",
        })?;
        let source = request.source.ok_or(BuildError::PreconditionViolated {
            argument: "source table",
        })?;
        let column = request.column.ok_or(BuildError::PreconditionViolated {
            argument: "lookup column",
        })?;

        // A keyless target still gets its edge, anchored on `<table>-`.
        let target_key = match target.primary_key.as_deref() {
            Some(key) => key,
            None => {
                self.diagnostics.record(Diagnostic::MissingTargetKey {
                    table: source.name.clone(),
                    target: target.name.clone(),
                });
                ""
            }
        };

        let color = self.colors.color_for(&column.logical_name);

        let target_node = self.sanitizer.sanitize(&format!("{}-{}", target.name, target_key));
        let target_label = self.sanitizer.sanitize(&format!("{target_key} (Key)"));
        self.place_node(request.target_cluster, &target_node, target_label, color)?;

        let source_node = self
            .sanitizer
            .sanitize(&format!("{}-{}", source.name, column.display_name));
        let source_label = self.sanitizer.sanitize(&column.display_name);
        self.place_node(request.source_cluster, &source_node, source_label, color)?;

        let name = format!(
            "Lookup {} - {} - {}",
            source.localized_name, column.display_name, column.logical_name
        );
        let weight = self.edge_weight;
        let edge = self
            .graph
            .get_or_add_edge(&source_node, &target_node, &name)
            .ok_or_else(|| BuildError::ResultConstruction {
                detail: format!("edge {source_node} -- {target_node}"),
            })?;
        edge.color = Some(color.to_string());
        edge.weight = Some(weight);
        edge.label = Some(request.cardinality.label().to_string());
        Ok(())
    }

    fn place_node(
        &mut self,
        cluster: &str,
        id: &str,
        label: String,
        color: &str,
    ) -> Result<(), BuildError> {
        let node = self.graph.get_or_add_node(cluster, id).ok_or_else(|| {
            BuildError::ResultConstruction {
                detail: format!("node {id} in {cluster}"),
            }
        })?;
        node.label = label;
        node.fill_color = Some(color.to_string());
        Ok(())
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}
