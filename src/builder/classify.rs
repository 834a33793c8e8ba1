use std::collections::HashSet;

use crate::model::EntityRelationship;

/// Names of the tables acting as first entity of at least one many-to-many
/// relationship.
///
/// Names are kept verbatim; callers compare them with exact case.
pub fn many_to_many_first_entities(relationships: &[EntityRelationship]) -> HashSet<&str> {
    relationships
        .iter()
        .filter(|r| r.is_many_to_many())
        .map(|r| r.first_entity.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_side_of_many_to_many_is_collected() {
        let relationships = vec![
            EntityRelationship::many_to_many("contact", "list"),
            EntityRelationship::many_to_many("list", "contact"),
            EntityRelationship::one_to_many("contact", "parentcustomerid", "account"),
        ];
        let firsts = many_to_many_first_entities(&relationships);
        assert_eq!(firsts, HashSet::from(["contact", "list"]));
    }

    #[test]
    fn case_is_preserved() {
        let relationships = vec![EntityRelationship::many_to_many("Contact", "list")];
        let firsts = many_to_many_first_entities(&relationships);
        assert!(firsts.contains("Contact"));
        assert!(!firsts.contains("contact"));
    }

    #[test]
    fn empty_input_yields_empty_set() {
        assert!(many_to_many_first_entities(&[]).is_empty());
    }
}
