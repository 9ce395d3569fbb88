use std::{collections::BTreeMap, path::PathBuf};

use crate::validation::{ValidationErrorCategory, ValidationIssue, ValidationIssues};

use super::{PortalConfig, PortalEntry, PortalRef};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    /// The config file path
    ///
    pub(crate) config_file_path: Option<PathBuf>,

    /// List of validation issues found
    ///
    pub(crate) issues: ValidationIssues,
}

impl ValidationResult {
    #[must_use]
    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    #[must_use]
    pub fn issues(&self) -> &ValidationIssues {
        &self.issues
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.issues.has_errors()
    }

    #[must_use]
    pub fn with_config_file_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_file_path = path;
        self
    }
}

impl PortalConfig {
    /// Full validation for the `PortalConfig`
    ///
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut issues = Vec::new();

        if self.portals.is_empty() {
            issues.push(ValidationIssue::error(
                ValidationErrorCategory::RequiredField,
                "portals",
                "No portals are configured",
                Some("Run `portal-cli init` to add a portal"),
            ));
        }

        issues.extend(validate_entries(&self.portals));
        issues.extend(validate_unique_ids(&self.portals));
        issues.extend(validate_unique_names(&self.portals));

        if let Some(default_portal) = &self.default_portal {
            issues.extend(validate_default_portal(self, default_portal));
        }

        ValidationResult {
            config_file_path: None,
            issues: issues.into(),
        }
    }
}

fn validate_entries(portals: &[PortalEntry]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (index, entry) in portals.iter().enumerate() {
        if entry.portal_id.is_none() {
            issues.push(ValidationIssue::error(
                ValidationErrorCategory::RequiredField,
                format!("portals[{index}].portalId"),
                format!("The portal at position {index} has no `portalId`"),
                Some("Add the numeric id of the portal. Ex. `portalId: 123456`"),
            ));
        }

        if entry.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            issues.push(ValidationIssue::warning(
                ValidationErrorCategory::RequiredField,
                format!("portals[{index}].name"),
                format!("The portal at position {index} has no `name`"),
                Some("Names let you select a portal with `--portal <name>`"),
            ));
        }

        let missing = entry.missing_credentials();
        if !missing.is_empty() {
            issues.push(ValidationIssue::warning(
                ValidationErrorCategory::Credentials,
                format!("portals[{index}]"),
                format!("{entry} is missing {}", missing.join(", ")),
                Some("Commands against this portal fail until the credentials are filled in"),
            ));
        }
    }

    issues
}

fn validate_unique_ids(portals: &[PortalEntry]) -> Vec<ValidationIssue> {
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for id in portals.iter().filter_map(|p| p.portal_id) {
        *counts.entry(id).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, count)| {
            ValidationIssue::error(
                ValidationErrorCategory::Duplicate,
                "portalId",
                format!("{count} portals share the portalId {id}"),
                Some("Remove the duplicate entries so each portalId appears once"),
            )
        })
        .collect()
}

fn validate_unique_names(portals: &[PortalEntry]) -> Vec<ValidationIssue> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in portals.iter().filter_map(|p| p.name.as_deref()) {
        *counts.entry(name).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, count)| {
            ValidationIssue::error(
                ValidationErrorCategory::Duplicate,
                "name",
                format!("{count} portals share the name '{name}'"),
                Some("Give each portal a unique name"),
            )
        })
        .collect()
}

fn validate_default_portal(config: &PortalConfig, default_portal: &PortalRef) -> Option<ValidationIssue> {
    match config.matching(default_portal).count() {
        1 => None,
        0 => Some(ValidationIssue::error(
            ValidationErrorCategory::DefaultPortal,
            "defaultPortal",
            format!("defaultPortal '{default_portal}' does not match any configured portal"),
            Some("Set `defaultPortal` to the name or portalId of one of the configured portals"),
        )),
        n => Some(ValidationIssue::error(
            ValidationErrorCategory::DefaultPortal,
            "defaultPortal",
            format!("defaultPortal '{default_portal}' matches {n} portals; only one may be the default"),
            Some("Refer to the default portal by a value that only one entry carries"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfigBuilder;

    fn error_messages(result: &ValidationResult) -> Vec<String> {
        result
            .issues()
            .errors()
            .iter()
            .map(|i| i.message().to_string())
            .collect()
    }

    #[test]
    fn test_valid_config() {
        let config = PortalConfigBuilder::default()
            .api_key_portal("prod", 123)
            .api_key_portal("dev", 456)
            .default_portal(PortalRef::Name("prod".to_string()))
            .build();

        let result = config.validate();

        assert!(result.is_valid());
        assert!(result.issues().is_empty());
    }

    #[test]
    fn test_empty_config_is_invalid() {
        let result = PortalConfig::default().validate();

        assert!(!result.is_valid());
        assert_eq!(error_messages(&result), vec!["No portals are configured"]);
    }

    #[test]
    fn test_duplicate_portal_id_names_the_id() {
        let config = PortalConfigBuilder::default()
            .api_key_portal("a", 123)
            .api_key_portal("b", 123)
            .build();

        let result = config.validate();

        assert!(!result.is_valid());
        let messages = error_messages(&result);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("123"));
        assert_eq!(
            result.issues().errors()[0].category(),
            ValidationErrorCategory::Duplicate
        );
    }

    #[test]
    fn test_duplicate_names() {
        let config = PortalConfigBuilder::default()
            .api_key_portal("prod", 1)
            .api_key_portal("prod", 2)
            .build();

        let result = config.validate();

        assert!(!result.is_valid());
        assert!(error_messages(&result)[0].contains("'prod'"));
    }

    #[test]
    fn test_missing_portal_id() {
        let mut entry = PortalEntry::api_key("nameless", 1, "k");
        entry.portal_id = None;
        let config = PortalConfigBuilder::default().portal(entry).build();

        let result = config.validate();

        assert!(!result.is_valid());
        assert_eq!(
            result.issues().errors()[0].field(),
            "portals[0].portalId"
        );
    }

    #[test]
    fn test_default_portal_not_found() {
        let config = PortalConfigBuilder::default()
            .api_key_portal("prod", 1)
            .default_portal(PortalRef::Name("staging".to_string()))
            .build();

        let result = config.validate();

        assert!(!result.is_valid());
        assert!(error_messages(&result)[0].contains("'staging' does not match"));
    }

    #[test]
    fn test_default_portal_matching_two_entries() {
        // One entry is named "2", another has portalId 2.
        let config = PortalConfigBuilder::default()
            .api_key_portal("2", 1)
            .api_key_portal("other", 2)
            .default_portal(PortalRef::Id(2))
            .build();

        let result = config.validate();

        assert!(!result.is_valid());
        assert!(error_messages(&result)[0].contains("matches 2 portals"));
    }

    #[test]
    fn test_unnamed_portal_is_a_warning() {
        let mut entry = PortalEntry::api_key("x", 1, "k");
        entry.name = None;
        let config = PortalConfigBuilder::default().portal(entry).build();

        let result = config.validate();

        assert!(result.is_valid());
        assert!(result.issues().has_warnings());
    }

    #[test]
    fn test_blank_api_key_is_a_credentials_warning() {
        let config = PortalConfigBuilder::default()
            .portal(PortalEntry::api_key("prod", 1, " "))
            .build();

        let result = config.validate();

        assert!(result.is_valid());
        let warnings = result.issues().warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category(), ValidationErrorCategory::Credentials);
        assert!(warnings[0].message().contains("apiKey"));
    }
}
