//!
//! Tag rule model: validates and materializes the declarative rule set from
//! the generic mapping the YAML loader produces. Construction is
//! all-or-nothing; a collection with zero rules or any invalid rule fails as
//! a whole and is never partially applied.

use std::str::FromStr;

use serde_yml::Value;
use thiserror::Error;

use crate::types::{ElementType, InsertPosition, LocationMode, Overwrite, TagKind};

#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("tag configuration is missing or empty")]
    MissingConfig,
    #[error("tag configuration has no `tags` section")]
    MissingTags,
    #[error("`tags` section must be a non-empty sequence")]
    EmptyTags,
    #[error("tag entry {index}: expected a mapping")]
    NotAMapping { index: usize },
    #[error("tag entry {index}: missing `tag` name")]
    MissingTagName { index: usize },
    #[error("tag entry {index}: {reason}")]
    UnknownTag { index: usize, reason: String },
    #[error("tag entry {index}: `@{tag}` requires a value")]
    MissingValue { index: usize, tag: TagKind },
    #[error("tag entry {index}: {reason}")]
    InvalidInsertPosition { index: usize, reason: String },
    #[error("tag entry {index}: {reason}")]
    InvalidOverwrite { index: usize, reason: String },
    #[error("tag entry {index}: {reason}")]
    InvalidLocationMode { index: usize, reason: String },
    #[error("tag entry {index}: COMPLIANT location must not list target elements")]
    TargetsForbidden { index: usize },
    #[error("tag entry {index}: MANUAL location requires target elements")]
    TargetsRequired { index: usize },
    #[error("tag entry {index}: {reason}")]
    InvalidTargetElement { index: usize, reason: String },
}

/// Which declaration kinds a rule legally applies to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Location {
    pub mode: LocationMode,
    pub remove_if_misplaced: bool,
    pub target_elements: Vec<ElementType>,
}

impl Location {
    /// Placement policy: COMPLIANT accepts everything, MANUAL accepts the
    /// listed classifications, NONE accepts nothing.
    pub fn is_properly_placed(&self, classification: ElementType) -> bool {
        match self.mode {
            LocationMode::Compliant => true,
            LocationMode::Manual => self.target_elements.contains(&classification),
            LocationMode::None => false,
        }
    }
}

/// One validated per-tag rule.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRule {
    pub tag: TagKind,
    pub value: String,
    pub description: String,
    pub insert_position: InsertPosition,
    pub overwrite: Overwrite,
    pub location: Location,
}

/// The ordered, validated rule collection. Immutable after construction and
/// safely shared by reference across every block processed in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRuleSet {
    rules: Vec<TagRule>,
}

impl TagRuleSet {
    /// Materialize the rule set from the generic configuration mapping.
    ///
    /// Validation order per rule: tag name recognized, value present unless
    /// the tag kind permits an empty one, insert position recognized,
    /// overwrite recognized, location block internally consistent. The first
    /// failure aborts the whole collection.
    pub fn from_value(root: &Value) -> Result<Self, RuleError> {
        let map = root.as_mapping().ok_or(RuleError::MissingConfig)?;
        if map.is_empty() {
            return Err(RuleError::MissingConfig);
        }
        let tags = root.get("tags").ok_or(RuleError::MissingTags)?;
        let entries = tags.as_sequence().ok_or(RuleError::EmptyTags)?;
        if entries.is_empty() {
            return Err(RuleError::EmptyTags);
        }

        let rules = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_rule(index, entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TagRuleSet { rules })
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn parse_rule(index: usize, entry: &Value) -> Result<TagRule, RuleError> {
    if entry.as_mapping().is_none() {
        return Err(RuleError::NotAMapping { index });
    }

    let name = string_field(entry, "tag")
        .filter(|n| !n.is_empty())
        .ok_or(RuleError::MissingTagName { index })?;
    let tag = TagKind::from_str(&name).map_err(|reason| RuleError::UnknownTag { index, reason })?;

    let value = string_field(entry, "value").unwrap_or_default();
    if value.is_empty() && !tag.allows_empty_value() {
        return Err(RuleError::MissingValue { index, tag });
    }

    let description = string_field(entry, "description").unwrap_or_default();

    let insert_position = match string_field(entry, "insert-position") {
        Some(raw) => InsertPosition::from_str(&raw)
            .map_err(|reason| RuleError::InvalidInsertPosition { index, reason })?,
        None => InsertPosition::default(),
    };

    let overwrite = match string_field(entry, "overwrite") {
        Some(raw) => {
            Overwrite::from_str(&raw).map_err(|reason| RuleError::InvalidOverwrite { index, reason })?
        }
        None => Overwrite::default(),
    };

    let location = match entry.get("location") {
        Some(block) => parse_location(index, block)?,
        None => Location::default(),
    };

    Ok(TagRule {
        tag,
        value,
        description,
        insert_position,
        overwrite,
        location,
    })
}

fn parse_location(index: usize, block: &Value) -> Result<Location, RuleError> {
    let mode = match string_field(block, "mode") {
        Some(raw) => LocationMode::from_str(&raw)
            .map_err(|reason| RuleError::InvalidLocationMode { index, reason })?,
        None => LocationMode::default(),
    };

    let remove_if_misplaced = block
        .get("remove-if-misplaced")
        .or_else(|| block.get("remove_if_misplaced"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut target_elements = Vec::new();
    if let Some(targets) = block
        .get("target-elements")
        .or_else(|| block.get("target_elements"))
    {
        let entries = targets
            .as_sequence()
            .ok_or_else(|| RuleError::InvalidTargetElement {
                index,
                reason: "target elements must be a sequence".to_string(),
            })?;
        for target in entries {
            let raw = target
                .as_str()
                .ok_or_else(|| RuleError::InvalidTargetElement {
                    index,
                    reason: "target elements must be strings".to_string(),
                })?;
            let element = ElementType::from_str(raw)
                .map_err(|reason| RuleError::InvalidTargetElement { index, reason })?;
            target_elements.push(element);
        }
    }

    match mode {
        LocationMode::Compliant if !target_elements.is_empty() => {
            return Err(RuleError::TargetsForbidden { index });
        }
        LocationMode::Manual if target_elements.is_empty() => {
            return Err(RuleError::TargetsRequired { index });
        }
        _ => {}
    }

    Ok(Location {
        mode,
        remove_if_misplaced,
        target_elements,
    })
}

/// Look up a string field, accepting both kebab-case and snake_case keys.
fn string_field(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .or_else(|| entry.get(key.replace('-', "_").as_str()))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_set(yaml: &str) -> Result<TagRuleSet, RuleError> {
        let value: Value = serde_yml::from_str(yaml).unwrap();
        TagRuleSet::from_value(&value)
    }

    #[test]
    fn test_valid_rule_set() {
        let rules = rule_set(
            r#"
tags:
  - tag: since
    value: "1.0.0"
    insert-position: END
    overwrite: NEVER
  - tag: author
    value: platform-team
    description: documentation owner
    insert-position: BEGINNING
    overwrite: ALWAYS
    location:
      mode: MANUAL
      remove-if-misplaced: true
      target-elements: [CLASS, INTERFACE]
"#,
        )
        .unwrap();

        assert_eq!(rules.len(), 2);
        let since = &rules.rules()[0];
        assert_eq!(since.tag, TagKind::Since);
        assert_eq!(since.value, "1.0.0");
        assert_eq!(since.insert_position, InsertPosition::End);
        assert_eq!(since.overwrite, Overwrite::Never);
        assert_eq!(since.location.mode, LocationMode::Compliant);

        let author = &rules.rules()[1];
        assert_eq!(author.description, "documentation owner");
        assert_eq!(author.location.mode, LocationMode::Manual);
        assert!(author.location.remove_if_misplaced);
        assert_eq!(
            author.location.target_elements,
            vec![ElementType::Class, ElementType::Interface]
        );
    }

    #[test]
    fn test_defaults_applied() {
        let rules = rule_set("tags:\n  - tag: since\n    value: \"1.0\"\n").unwrap();
        let rule = &rules.rules()[0];
        assert_eq!(rule.insert_position, InsertPosition::End);
        assert_eq!(rule.overwrite, Overwrite::Never);
        assert_eq!(rule.location, Location::default());
        assert!(rule.description.is_empty());
    }

    #[test]
    fn test_snake_case_keys_accepted() {
        let rules = rule_set(
            "tags:\n  - tag: since\n    value: \"1.0\"\n    insert_position: BEGINNING\n",
        )
        .unwrap();
        assert_eq!(rules.rules()[0].insert_position, InsertPosition::Beginning);
    }

    #[test]
    fn test_missing_or_empty_config_fails() {
        let value: Value = serde_yml::from_str("null").unwrap();
        assert_eq!(TagRuleSet::from_value(&value), Err(RuleError::MissingConfig));
        assert_eq!(rule_set("{}"), Err(RuleError::MissingConfig));
        assert_eq!(rule_set("global: {}"), Err(RuleError::MissingTags));
        assert_eq!(rule_set("tags: []"), Err(RuleError::EmptyTags));
    }

    #[test]
    fn test_unknown_tag_fails_whole_collection() {
        let result = rule_set(
            "tags:\n  - tag: since\n    value: \"1.0\"\n  - tag: changelog\n    value: x\n",
        );
        assert!(matches!(result, Err(RuleError::UnknownTag { index: 1, .. })));
    }

    #[test]
    fn test_missing_value_rejected_unless_tag_allows_empty() {
        let result = rule_set("tags:\n  - tag: since\n");
        assert!(matches!(result, Err(RuleError::MissingValue { index: 0, tag: TagKind::Since })));

        // `@return` may carry only a description.
        let rules = rule_set("tags:\n  - tag: return\n    description: 戻り値\n").unwrap();
        assert_eq!(rules.rules()[0].value, "");
        assert_eq!(rules.rules()[0].description, "戻り値");
    }

    #[test]
    fn test_invalid_policies_rejected() {
        let result = rule_set("tags:\n  - tag: since\n    value: \"1.0\"\n    insert-position: MIDDLE\n");
        assert!(matches!(result, Err(RuleError::InvalidInsertPosition { index: 0, .. })));

        let result = rule_set("tags:\n  - tag: since\n    value: \"1.0\"\n    overwrite: MAYBE\n");
        assert!(matches!(result, Err(RuleError::InvalidOverwrite { index: 0, .. })));

        let result = rule_set(
            "tags:\n  - tag: since\n    value: \"1.0\"\n    location:\n      mode: AUTOMATIC\n",
        );
        assert!(matches!(result, Err(RuleError::InvalidLocationMode { index: 0, .. })));
    }

    #[test]
    fn test_location_mode_pairing_enforced() {
        let result = rule_set(
            "tags:\n  - tag: since\n    value: \"1.0\"\n    location:\n      mode: COMPLIANT\n      target-elements: [CLASS]\n",
        );
        assert_eq!(result, Err(RuleError::TargetsForbidden { index: 0 }));

        let result = rule_set(
            "tags:\n  - tag: since\n    value: \"1.0\"\n    location:\n      mode: MANUAL\n",
        );
        assert_eq!(result, Err(RuleError::TargetsRequired { index: 0 }));

        let result = rule_set(
            "tags:\n  - tag: since\n    value: \"1.0\"\n    location:\n      mode: MANUAL\n      target-elements: [GADGET]\n",
        );
        assert!(matches!(result, Err(RuleError::InvalidTargetElement { index: 0, .. })));
    }

    #[test]
    fn test_is_properly_placed() {
        let compliant = Location::default();
        assert!(compliant.is_properly_placed(ElementType::Class));
        assert!(compliant.is_properly_placed(ElementType::Method));
        assert!(compliant.is_properly_placed(ElementType::None));

        let manual = Location {
            mode: LocationMode::Manual,
            remove_if_misplaced: false,
            target_elements: vec![ElementType::Class],
        };
        assert!(manual.is_properly_placed(ElementType::Class));
        assert!(!manual.is_properly_placed(ElementType::Method));

        let none = Location {
            mode: LocationMode::None,
            remove_if_misplaced: true,
            target_elements: Vec::new(),
        };
        assert!(!none.is_properly_placed(ElementType::Class));
        assert!(!none.is_properly_placed(ElementType::None));
    }
}
