use core::fmt;

/// A single validation issue (error or warning)
///
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// The category of the issue
    ///
    pub(crate) category: ValidationErrorCategory,

    /// The field or context where the issue was found
    ///
    pub(crate) field: String,

    /// Detailed description of the issue
    ///
    pub(crate) message: String,

    /// Error or warning
    ///
    pub(crate) level: ValidationLevel,

    /// Suggested fix for the issue
    ///
    pub(crate) suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation error
    ///
    pub(crate) fn error(
        category: ValidationErrorCategory,
        field: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<&str>,
    ) -> Self {
        Self {
            category,
            field: field.into(),
            message: message.into(),
            level: ValidationLevel::Error,
            suggestion: suggestion.map(ToString::to_string),
        }
    }

    /// Create a new validation warning
    pub(crate) fn warning(
        category: ValidationErrorCategory,
        field: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<&str>,
    ) -> Self {
        Self {
            category,
            field: field.into(),
            message: message.into(),
            level: ValidationLevel::Warning,
            suggestion: suggestion.map(ToString::to_string),
        }
    }

    #[must_use]
    pub fn category(&self) -> ValidationErrorCategory {
        self.category
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    #[must_use]
    pub fn suggestion(&self) -> Option<&String> {
        self.suggestion.as_ref()
    }
}

/// Every issue found by one validation run
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationIssues(Vec<ValidationIssue>);

impl ValidationIssues {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|i| i.level == ValidationLevel::Error)
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.0.iter().any(|i| i.level == ValidationLevel::Warning)
    }

    #[must_use]
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.0
            .iter()
            .filter(|i| i.level == ValidationLevel::Error)
            .collect()
    }

    #[must_use]
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.0
            .iter()
            .filter(|i| i.level == ValidationLevel::Warning)
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.0.iter()
    }
}

impl From<Vec<ValidationIssue>> for ValidationIssues {
    fn from(issues: Vec<ValidationIssue>) -> Self {
        Self(issues)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationLevel {
    Error,
    Warning,
}

/// Categories of config validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCategory {
    /// Missing required fields
    ///
    RequiredField,

    /// Values that must be unique but are not
    ///
    Duplicate,

    /// Problems with the `defaultPortal` marker
    ///
    DefaultPortal,

    /// Incomplete credentials
    ///
    Credentials,
}

impl fmt::Display for ValidationErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequiredField => f.write_str("required_field"),
            Self::Duplicate => f.write_str("duplicate"),
            Self::DefaultPortal => f.write_str("default_portal"),
            Self::Credentials => f.write_str("credentials"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issues_split_by_level() {
        let issues: ValidationIssues = vec![
            ValidationIssue::error(ValidationErrorCategory::Duplicate, "portalId", "dup", None),
            ValidationIssue::warning(
                ValidationErrorCategory::RequiredField,
                "portals[0].name",
                "no name",
                Some("Add a name"),
            ),
        ]
        .into();

        assert!(issues.has_errors());
        assert!(issues.has_warnings());
        assert_eq!(issues.errors().len(), 1);
        assert_eq!(issues.warnings()[0].suggestion().unwrap(), "Add a name");
    }

    #[test]
    fn test_empty_issues() {
        let issues = ValidationIssues::default();

        assert!(issues.is_empty());
        assert!(!issues.has_errors());
        assert!(!issues.has_warnings());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ValidationErrorCategory::Duplicate.to_string(), "duplicate");
        assert_eq!(
            ValidationErrorCategory::DefaultPortal.to_string(),
            "default_portal"
        );
    }
}
