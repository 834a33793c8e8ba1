//! Metadata documents: one solution's tables and relationships, read from
//! JSON, YAML or TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::model::{EntityRelationship, TableEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFormat {
    Json,
    Yaml,
    Toml,
}

impl MetadataFormat {
    pub fn from_path(path: &Path) -> Result<Self, MetadataError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(MetadataFormat::Json),
            "yaml" | "yml" => Ok(MetadataFormat::Yaml),
            "toml" => Ok(MetadataFormat::Toml),
            _ => Err(MetadataError::UnsupportedFormat(ext)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Unique name of the solution; becomes the root graph name.
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableEntity>,
    #[serde(default)]
    pub relationships: Vec<EntityRelationship>,
}

impl MetadataDocument {
    pub fn parse(content: &str, format: MetadataFormat) -> Result<Self, MetadataError> {
        let document = match format {
            MetadataFormat::Json => serde_json::from_str(content)?,
            MetadataFormat::Yaml => serde_yaml::from_str(content)?,
            MetadataFormat::Toml => toml::from_str(content)?,
        };
        Ok(document)
    }

    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let format = MetadataFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::parse(&content, format)?;
        tracing::debug!(
            path = %path.display(),
            tables = document.tables.len(),
            relationships = document.relationships.len(),
            "metadata loaded"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationshipType;

    const JSON: &str = r#"{
        "name": "SalesCore",
        "tables": [
            {
                "name": "contact",
                "localized_name": "Contact",
                "primary_key": "contactid",
                "columns": [
                    { "logical_name": "contactid", "display_name": "Contact" },
                    { "logical_name": "account", "display_name": "Company", "non_default_lookup": true }
                ]
            }
        ],
        "relationships": [
            { "relationship_type": "ManyToMany", "first_entity": "contact", "second_entity": "list" }
        ]
    }"#;

    #[test]
    fn json_documents_fill_defaults() {
        let doc = MetadataDocument::parse(JSON, MetadataFormat::Json).expect("json");
        assert_eq!(doc.name, "SalesCore");
        let contact = &doc.tables[0];
        assert_eq!(contact.primary_column().map(|c| c.display_name.as_str()), Some("Contact"));
        assert!(contact.columns[1].non_default_lookup);
        assert!(!contact.columns[0].non_default_lookup);
        assert_eq!(doc.relationships[0].relationship_type, RelationshipType::ManyToMany);
        assert!(doc.relationships[0].referencing_attribute.is_empty());
    }

    #[test]
    fn yaml_and_toml_read_the_same_shape() {
        let yaml = "name: SalesCore\ntables:\n  - name: account\n    localized_name: Account\n";
        let toml = "name = \"SalesCore\"\n[[tables]]\nname = \"account\"\nlocalized_name = \"Account\"\n";

        let from_yaml = MetadataDocument::parse(yaml, MetadataFormat::Yaml).expect("yaml");
        let from_toml = MetadataDocument::parse(toml, MetadataFormat::Toml).expect("toml");
        assert_eq!(from_yaml, from_toml);
        assert!(from_yaml.relationships.is_empty());
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            MetadataFormat::from_path(Path::new("model.YML")).expect("yml"),
            MetadataFormat::Yaml
        );
        assert!(matches!(
            MetadataFormat::from_path(Path::new("model.xml")),
            Err(MetadataError::UnsupportedFormat(ext)) if ext == "xml"
        ));
    }

    #[test]
    fn load_reports_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = MetadataDocument::load(&dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, MetadataError::Io { .. }));
    }
}
