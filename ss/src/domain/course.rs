//! Course records, the parents of every generated work item

use serde::{Deserialize, Serialize};

/// Enrollment status of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CourseStatus {
    InProgress,
    Done,
    #[default]
    NotStarted,
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "In Progress"),
            Self::Done => write!(f, "Done"),
            Self::NotStarted => write!(f, "Not Started"),
        }
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ip" | "in progress" | "in-progress" => Ok(Self::InProgress),
            "d" | "done" => Ok(Self::Done),
            "ns" | "not started" | "not-started" => Ok(Self::NotStarted),
            _ => Err(format!("Unknown course status: {}. Use: IP, D, or NS", s)),
        }
    }
}

/// A course as recorded in the course database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Upper-cased course name, e.g. "CS 101"
    pub name: String,
    pub status: CourseStatus,
    /// Upper-cased term, e.g. "FALL 2024"
    pub quarter: String,
}

impl Course {
    pub fn new(name: &str, status: CourseStatus, quarter: &str) -> Self {
        Self {
            name: name.trim().to_uppercase(),
            status,
            quarter: quarter.trim().to_uppercase(),
        }
    }

    /// Department is the first word of the course name
    pub fn department(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}
