//! Kinds of scheduled course work

use serde::{Deserialize, Serialize};

/// What a recurring descriptor produces: a class meeting or an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkKind {
    Lecture,
    Discussion,
    Lab,
    Homework,
}

impl WorkKind {
    /// Two-letter code used in descriptor shorthand
    pub fn code(&self) -> &'static str {
        match self {
            Self::Lecture => "le",
            Self::Discussion => "di",
            Self::Lab => "la",
            Self::Homework => "hw",
        }
    }

    /// Human-readable name, also the default title label
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Lecture => "Lecture",
            Self::Discussion => "Discussion",
            Self::Lab => "Lab",
            Self::Homework => "Homework",
        }
    }

    /// Meetings have a start and an end; assignments only a due time
    pub fn is_meeting(&self) -> bool {
        !matches!(self, Self::Homework)
    }
}

impl std::fmt::Display for WorkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for WorkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "le" | "lecture" => Ok(Self::Lecture),
            "di" | "discussion" => Ok(Self::Discussion),
            "la" | "lab" => Ok(Self::Lab),
            "hw" | "homework" => Ok(Self::Homework),
            _ => Err(format!("Unknown work kind: {}. Use: le, di, la, or hw", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("le".parse::<WorkKind>().unwrap(), WorkKind::Lecture);
        assert_eq!("DI".parse::<WorkKind>().unwrap(), WorkKind::Discussion);
        assert_eq!("lab".parse::<WorkKind>().unwrap(), WorkKind::Lab);
        assert_eq!("hw".parse::<WorkKind>().unwrap(), WorkKind::Homework);
        assert!("quiz".parse::<WorkKind>().is_err());
    }

    #[test]
    fn test_kind_code_round_trips() {
        for kind in [WorkKind::Lecture, WorkKind::Discussion, WorkKind::Lab, WorkKind::Homework] {
            assert_eq!(kind.code().parse::<WorkKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_only_homework_is_not_a_meeting() {
        assert!(WorkKind::Lecture.is_meeting());
        assert!(WorkKind::Discussion.is_meeting());
        assert!(WorkKind::Lab.is_meeting());
        assert!(!WorkKind::Homework.is_meeting());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(WorkKind::Lab.to_string(), "Lab");
        assert_eq!(WorkKind::Homework.to_string(), "Homework");
    }
}
