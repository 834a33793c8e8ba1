use std::collections::HashSet;

use crate::model::TableEntity;
use crate::sanitize::Sanitize;

use super::BuildPass;

/// A table gets its own cluster when it has lookup columns to draw or
/// takes part in a many-to-many relationship as first entity.
pub(super) fn needs_cluster(table: &TableEntity, many_to_many: &HashSet<&str>) -> bool {
    table.contains_non_default_lookup_columns() || many_to_many.contains(table.name.as_str())
}

impl<S: Sanitize> BuildPass<'_, S> {
    /// Cluster of a table whose columns are being linked. Returns its id.
    pub(super) fn table_cluster(&mut self, table: &TableEntity) -> String {
        let id = self.cluster_for(&table.name, table);
        self.graph.get_or_add_cluster(&id).color = Some(self.cluster_color.to_string());
        id
    }

    /// Retrieves or creates the cluster keyed by `cluster_<key_name>` and
    /// labels it after `table`. Returns its id.
    pub(super) fn cluster_for(&mut self, key_name: &str, table: &TableEntity) -> String {
        let id = self.sanitizer.sanitize(&format!("cluster_{key_name}"));
        self.graph.get_or_add_cluster(&id).label = table.caption();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::model::{ColumnEntity, EntityRelationship};

    #[test]
    fn qualification_follows_lookups_and_joins() {
        let joined = HashSet::from(["list"]);
        let plain = TableEntity::new("account", "Account");
        let with_lookup = TableEntity::new("contact", "Contact")
            .with_column(ColumnEntity::lookup("account", "parentcustomerid"));
        let join_side = TableEntity::new("list", "Marketing List");

        assert!(!needs_cluster(&plain, &joined));
        assert!(needs_cluster(&with_lookup, &joined));
        assert!(needs_cluster(&join_side, &joined));
    }

    #[test]
    fn repeated_cluster_creation_keeps_label_and_color() {
        // `list` is both a join participant and a lookup target.
        let tables = vec![
            TableEntity::new("list", "Marketing List")
                .with_primary_key(ColumnEntity::new("listid", "listid"))
                .with_column(ColumnEntity::lookup("list", "parentlistid")),
            TableEntity::new("contact", "Contact")
                .with_primary_key(ColumnEntity::new("contactid", "contactid")),
        ];
        let relationships = vec![EntityRelationship::many_to_many("list", "contact")];

        let outcome = GraphBuilder::new()
            .build("doc", &tables, &relationships)
            .expect("build");

        let list_clusters: Vec<_> = outcome
            .graph
            .clusters()
            .filter(|c| c.id == "cluster_list")
            .collect();
        assert_eq!(list_clusters.len(), 1);
        assert_eq!(list_clusters[0].label, "Marketing List (list)");
        assert_eq!(list_clusters[0].color.as_deref(), Some("#7070E0"));
        assert_eq!(outcome.graph.cluster_count(), 2);
    }
}
