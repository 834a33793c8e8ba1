//! Table and relationship metadata consumed by the graph builder.
//!
//! Everything here is loaded once (see [`crate::metadata`]) and treated as
//! read-only while a diagram is assembled.

use serde::{Deserialize, Serialize};

/// One table (entity) of the metadata model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntity {
    /// Logical name, unique within one document.
    pub name: String,
    #[serde(default)]
    pub localized_name: String,
    /// Logical name of the primary key column.
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnEntity>,
}

impl TableEntity {
    pub fn new(name: impl Into<String>, localized_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            localized_name: localized_name.into(),
            primary_key: None,
            columns: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, column: ColumnEntity) -> Self {
        self.primary_key = Some(column.logical_name.clone());
        self.columns.push(column);
        self
    }

    pub fn with_column(mut self, column: ColumnEntity) -> Self {
        self.columns.push(column);
        self
    }

    /// `"{localized} ({name})"`, the caption used for the table's cluster.
    pub fn caption(&self) -> String {
        format!("{} ({})", self.localized_name, self.name)
    }

    pub fn contains_non_default_lookup_columns(&self) -> bool {
        self.columns.iter().any(|c| c.non_default_lookup)
    }

    pub fn non_default_lookup_columns(&self) -> impl Iterator<Item = &ColumnEntity> {
        self.columns.iter().filter(|c| c.non_default_lookup)
    }

    /// The primary key column, if the table declares one and it is present
    /// among the columns.
    pub fn primary_column(&self) -> Option<&ColumnEntity> {
        let key = self.primary_key.as_deref()?;
        self.columns.iter().find(|c| c.logical_name == key)
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntity {
    pub logical_name: String,
    #[serde(default)]
    pub display_name: String,
    /// A foreign-key-like reference that the relationship list does not
    /// already imply.
    #[serde(default)]
    pub non_default_lookup: bool,
    /// Table the column points at, when the source metadata records it.
    /// Informational only; resolution goes through names and relationships.
    #[serde(default)]
    pub lookup_target: Option<String>,
}

impl ColumnEntity {
    pub fn new(logical_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            display_name: display_name.into(),
            non_default_lookup: false,
            lookup_target: None,
        }
    }

    pub fn lookup(logical_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            non_default_lookup: true,
            ..Self::new(logical_name, display_name)
        }
    }

    pub fn targeting(mut self, table: impl Into<String>) -> Self {
        self.lookup_target = Some(table.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    OneToMany,
    ManyToMany,
}

/// A declared relationship between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRelationship {
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub first_entity: String,
    #[serde(default)]
    pub second_entity: String,
    /// Column on the "many" side pointing at the "one" side.
    #[serde(default)]
    pub referencing_attribute: String,
    #[serde(default)]
    pub referenced_entity: String,
}

impl EntityRelationship {
    pub fn one_to_many(
        referencing_entity: impl Into<String>,
        referencing_attribute: impl Into<String>,
        referenced_entity: impl Into<String>,
    ) -> Self {
        let referenced_entity = referenced_entity.into();
        Self {
            relationship_type: RelationshipType::OneToMany,
            first_entity: referenced_entity.clone(),
            second_entity: referencing_entity.into(),
            referencing_attribute: referencing_attribute.into(),
            referenced_entity,
        }
    }

    pub fn many_to_many(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            relationship_type: RelationshipType::ManyToMany,
            first_entity: first.into(),
            second_entity: second.into(),
            referencing_attribute: String::new(),
            referenced_entity: String::new(),
        }
    }

    pub fn is_many_to_many(&self) -> bool {
        self.relationship_type == RelationshipType::ManyToMany
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_column_requires_declared_and_present_key() {
        let table = TableEntity::new("account", "Account")
            .with_primary_key(ColumnEntity::new("accountid", "Account"));
        assert_eq!(
            table.primary_column().map(|c| c.logical_name.as_str()),
            Some("accountid")
        );

        let mut dangling = TableEntity::new("list", "Marketing List");
        dangling.primary_key = Some("listid".to_string());
        assert!(dangling.primary_column().is_none());
        assert!(TableEntity::new("bare", "Bare").primary_column().is_none());
    }

    #[test]
    fn lookup_columns_are_filtered_by_flag() {
        let table = TableEntity::new("contact", "Contact")
            .with_primary_key(ColumnEntity::new("contactid", "Contact"))
            .with_column(ColumnEntity::lookup("account", "parentcustomerid"))
            .with_column(ColumnEntity::new("fullname", "Full Name"));

        assert!(table.contains_non_default_lookup_columns());
        let names: Vec<&str> = table
            .non_default_lookup_columns()
            .map(|c| c.logical_name.as_str())
            .collect();
        assert_eq!(names, vec!["account"]);
        assert_eq!(table.caption(), "Contact (contact)");
    }

    #[test]
    fn relationship_type_uses_pascal_case_on_the_wire() {
        let rel: EntityRelationship = serde_json::from_str(
            r#"{"relationship_type":"ManyToMany","first_entity":"contact","second_entity":"list"}"#,
        )
        .expect("relationship should parse");
        assert!(rel.is_many_to_many());
        assert!(rel.referencing_attribute.is_empty());
    }
}
