//! Louisiana statute table

/// Jurisdiction prefixes tried for bare statute numbers, highest priority first
pub const DEFAULT_PREFIXES: [&str; 3] = ["14:", "32:", "40:"];

/// Statute code and description, in display order
pub(super) const STATUTE_TABLE: &[(&str, &str)] = &[
    // DWI
    ("14:98", "DWI - Operating vehicle while intoxicated"),
    ("14:98.1", "DWI - First offense penalties"),
    ("14:98.2", "DWI - Second offense penalties"),
    ("14:98.3", "DWI - Third offense penalties"),
    ("14:98.4", "DWI - Fourth offense penalties"),
    // Violent crimes
    ("14:30", "First degree murder"),
    ("14:30.1", "Second degree murder"),
    ("14:31", "Manslaughter"),
    ("14:34", "Aggravated battery"),
    ("14:34.1", "Second degree battery"),
    // Property crimes
    ("14:67", "Theft"),
    ("14:62", "Simple burglary"),
    ("14:62.2", "Simple burglary of an inhabited dwelling"),
    ("14:65", "Simple robbery"),
    ("14:64", "Armed robbery"),
    // Drug offenses
    ("40:966", "Possession of Schedule I substances"),
    ("40:967", "Possession of Schedule II substances"),
    // Traffic
    ("32:58", "Careless operation of a vehicle"),
    ("32:61", "Speeding"),
    ("32:415", "Driving under suspension"),
];

/// A single statute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatuteEntry {
    /// Qualified code, e.g. `14:98`
    pub code: String,
    pub description: String,
}

impl StatuteEntry {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Errors from statute lookup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("statute {0} not found")]
    NotFound(String),
}
