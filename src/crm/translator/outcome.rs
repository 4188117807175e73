use std::fmt;

/// Status of one reported step of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Failure,
    /// The owner changed but was not sent to the store.
    Skipped,
}

/// Result record returned by the translators and the dispatcher. Callers
/// accumulate these instead of subscribing to events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub sheet: String,
    pub status: OutcomeStatus,
    pub message: String,
}

impl Outcome {
    pub fn success(sheet: &str, message: impl Into<String>) -> Self {
        Self::new(sheet, OutcomeStatus::Success, message)
    }

    pub fn failure(sheet: &str, message: impl Into<String>) -> Self {
        Self::new(sheet, OutcomeStatus::Failure, message)
    }

    pub fn skipped(sheet: &str, message: impl Into<String>) -> Self {
        Self::new(sheet, OutcomeStatus::Skipped, message)
    }

    fn new(sheet: &str, status: OutcomeStatus, message: impl Into<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == OutcomeStatus::Failure
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {:?} - {}", self.sheet, self.status, self.message)
    }
}
