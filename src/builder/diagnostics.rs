//! Recoverable gaps in the input metadata.
//!
//! Nothing here stops a build. Each gap skips one element, is logged, and
//! is kept for the caller to report.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Lookup whose target is not part of the metadata; expected for
    /// partial documents and logged at debug level.
    Notice,
    /// Malformed metadata; logged at warn level.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A column is flagged as a lookup but has no logical name to resolve.
    MissingLookupColumn { table: String, display_name: String },
    /// Neither a table named like the column nor a relationship declaring
    /// it as referencing attribute was found.
    UnresolvedLookup {
        table: String,
        column: String,
        hint: Option<String>,
    },
    /// A relationship names the column but its referenced table is not
    /// part of the document.
    MissingReferencedTable {
        table: String,
        column: String,
        referenced: String,
    },
    /// The table being linked to exposes no primary key column.
    MissingTargetKey { table: String, target: String },
    /// Many-to-many participant without a relationship naming it first.
    MissingPairedRelationship { table: String },
    /// Many-to-many pair whose second table is not part of the document.
    MissingPairedTable { table: String, second: String },
    /// Many-to-many participant without a primary key column.
    MissingPrimaryKey { table: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::MissingLookupColumn { .. }
            | Diagnostic::MissingTargetKey { .. }
            | Diagnostic::MissingPairedRelationship { .. }
            | Diagnostic::MissingPairedTable { .. }
            | Diagnostic::MissingPrimaryKey { .. } => Severity::Warning,
            Diagnostic::UnresolvedLookup { .. } | Diagnostic::MissingReferencedTable { .. } => {
                Severity::Notice
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingLookupColumn {
                table,
                display_name,
            } => write!(
                f,
                "lookup column '{display_name}' on table {table} has no logical name; skipped"
            ),
            Diagnostic::UnresolvedLookup {
                table,
                column,
                hint,
            } => {
                write!(f, "lookup {table}.{column} does not resolve to a known table")?;
                if let Some(hint) = hint {
                    write!(f, " (metadata names '{hint}')")?;
                }
                Ok(())
            }
            Diagnostic::MissingReferencedTable {
                table,
                column,
                referenced,
            } => write!(
                f,
                "lookup {table}.{column} references table {referenced}, which is not in the document"
            ),
            Diagnostic::MissingTargetKey { table, target } => write!(
                f,
                "table {target} referenced from {table} has no primary key column; edge anchored on an unnamed key"
            ),
            Diagnostic::MissingPairedRelationship { table } => write!(
                f,
                "many-to-many table {table} has no relationship naming it as first entity"
            ),
            Diagnostic::MissingPairedTable { table, second } => write!(
                f,
                "many-to-many table {table} pairs with {second}, which is not in the document"
            ),
            Diagnostic::MissingPrimaryKey { table } => write!(
                f,
                "primary key column is missing for many-to-many table {table}; edge skipped"
            ),
        }
    }
}

/// Collects diagnostics in the order they were raised.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!("{diagnostic}"),
            Severity::Notice => tracing::debug!("{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_are_separated_from_notices() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record(Diagnostic::UnresolvedLookup {
            table: "list".to_string(),
            column: "ghostid".to_string(),
            hint: None,
        });
        diagnostics.record(Diagnostic::MissingPrimaryKey {
            table: "contact".to_string(),
        });

        assert_eq!(diagnostics.len(), 2);
        let warnings: Vec<_> = diagnostics.warnings().collect();
        assert_eq!(
            warnings,
            vec![&Diagnostic::MissingPrimaryKey {
                table: "contact".to_string()
            }]
        );
    }

    #[test]
    fn only_unresolvable_lookups_are_notices() {
        let table = || "contact".to_string();
        let severities = [
            (
                Diagnostic::MissingLookupColumn {
                    table: table(),
                    display_name: "Broken".to_string(),
                },
                Severity::Warning,
            ),
            (
                Diagnostic::UnresolvedLookup {
                    table: table(),
                    column: "ghostid".to_string(),
                    hint: None,
                },
                Severity::Notice,
            ),
            (
                Diagnostic::MissingReferencedTable {
                    table: table(),
                    column: "campaignid".to_string(),
                    referenced: "campaign".to_string(),
                },
                Severity::Notice,
            ),
            (
                Diagnostic::MissingTargetKey {
                    table: table(),
                    target: "account".to_string(),
                },
                Severity::Warning,
            ),
            (
                Diagnostic::MissingPairedRelationship { table: table() },
                Severity::Warning,
            ),
            (
                Diagnostic::MissingPairedTable {
                    table: table(),
                    second: "missing".to_string(),
                },
                Severity::Warning,
            ),
            (
                Diagnostic::MissingPrimaryKey { table: table() },
                Severity::Warning,
            ),
        ];

        for (diagnostic, expected) in severities {
            assert_eq!(diagnostic.severity(), expected, "{diagnostic}");
        }
    }

    #[test]
    fn unresolved_lookup_mentions_hint() {
        let d = Diagnostic::UnresolvedLookup {
            table: "contact".to_string(),
            column: "preferredsystemuserid".to_string(),
            hint: Some("systemuser".to_string()),
        };
        assert_eq!(
            d.to_string(),
            "lookup contact.preferredsystemuserid does not resolve to a known table (metadata names 'systemuser')"
        );
    }
}
