use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} value {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Lifecycle of one pipeline activity (an interview or screening).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ActivityStatus {
    Scheduled,
    Completed,
    Passed,
    Failed,
    NoShow,
}

impl ActivityStatus {
    pub const ALL: [ActivityStatus; 5] = [
        ActivityStatus::Scheduled,
        ActivityStatus::Completed,
        ActivityStatus::Passed,
        ActivityStatus::Failed,
        ActivityStatus::NoShow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Scheduled => "Scheduled",
            ActivityStatus::Completed => "Completed",
            ActivityStatus::Passed => "Passed",
            ActivityStatus::Failed => "Failed",
            ActivityStatus::NoShow => "NoShow",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ActivityStatus::Passed | ActivityStatus::Failed | ActivityStatus::NoShow
        )
    }

    /// Outcomes that end the candidate's pipeline.
    pub fn is_failure(self) -> bool {
        matches!(self, ActivityStatus::Failed | ActivityStatus::NoShow)
    }

    /// Regular forward moves, ignoring the gate.
    pub fn successors(self) -> &'static [ActivityStatus] {
        match self {
            ActivityStatus::Scheduled => &[ActivityStatus::Completed],
            ActivityStatus::Completed => &[ActivityStatus::Passed, ActivityStatus::Failed],
            ActivityStatus::Passed | ActivityStatus::Failed | ActivityStatus::NoShow => &[],
        }
    }

    /// Moves that are only taken on explicit request.
    pub fn branches(self) -> &'static [ActivityStatus] {
        match self {
            ActivityStatus::Scheduled => &[ActivityStatus::NoShow],
            _ => &[],
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ActivityStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "activity status",
                value: value.to_string(),
            })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Online,
    Offline,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Online => "Online",
            ActivityType::Offline => "Offline",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [ActivityType::Online, ActivityType::Offline]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "activity type",
                value: value.to_string(),
            })
    }
}

/// Status of a candidate's application, advanced by activity outcomes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Submitted,
    Interviewing,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Hired,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::Interviewing => "Interviewing",
            ApplicationStatus::Hired => "Hired",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    /// No further pipeline work happens once an application is closed.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "application status",
                value: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_have_no_successors() {
        for status in ActivityStatus::ALL {
            if status.is_terminal() {
                assert!(status.successors().is_empty(), "{status}");
                assert!(status.branches().is_empty(), "{status}");
            }
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("noshow".parse::<ActivityStatus>(), Ok(ActivityStatus::NoShow));
        assert_eq!(" Offline ".parse::<ActivityType>(), Ok(ActivityType::Offline));
        assert_eq!(
            "WITHDRAWN".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Withdrawn)
        );
        let err = "Archived".parse::<ApplicationStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown application status value \"Archived\"");
    }
}
