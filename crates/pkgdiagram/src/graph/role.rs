//! Class roles
//!
//! The closed set of class kinds a class target can have. Behaviour that
//! differs per kind is dispatched with exhaustive `match`es here rather than
//! spread over a type hierarchy.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::{Color, DiagramError};

/// Kind of class shown by a class target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassRole {
    #[default]
    Standard,
    Abstract,
    Interface,
    Enum,
    UnitTest,
    /// A class pulled in from a library; read-only in the diagram
    Imported,
}

impl ClassRole {
    pub const ALL: [ClassRole; 6] = [
        ClassRole::Standard,
        ClassRole::Abstract,
        ClassRole::Interface,
        ClassRole::Enum,
        ClassRole::UnitTest,
        ClassRole::Imported,
    ];

    /// Stereotype line drawn above the class name, if any
    pub fn stereotype(&self) -> Option<&'static str> {
        match self {
            ClassRole::Standard | ClassRole::Imported => None,
            ClassRole::Abstract => Some("<<abstract>>"),
            ClassRole::Interface => Some("<<interface>>"),
            ClassRole::Enum => Some("<<enum>>"),
            ClassRole::UnitTest => Some("<<unit test>>"),
        }
    }

    pub fn background(&self) -> Color {
        match self {
            ClassRole::Standard => Color::CLASS_BACKGROUND,
            ClassRole::Abstract => Color::ABSTRACT_BACKGROUND,
            ClassRole::Interface => Color::INTERFACE_BACKGROUND,
            ClassRole::Enum => Color::ENUM_BACKGROUND,
            ClassRole::UnitTest => Color::UNIT_TEST_BACKGROUND,
            ClassRole::Imported => Color::IMPORTED_BACKGROUND,
        }
    }

    /// Value stored in a package file's `.type` key
    pub fn type_name(&self) -> &'static str {
        match self {
            ClassRole::Standard => "ClassTarget",
            ClassRole::Abstract => "AbstractTarget",
            ClassRole::Interface => "InterfaceTarget",
            ClassRole::Enum => "EnumTarget",
            ClassRole::UnitTest => "UnitTestTarget",
            ClassRole::Imported => "ImportedTarget",
        }
    }

    /// Only interfaces may be the destination of an implements arrow
    pub fn is_interface(&self) -> bool {
        matches!(self, ClassRole::Interface)
    }

    /// Imported classes cannot be moved or edited
    pub fn is_editable(&self) -> bool {
        !matches!(self, ClassRole::Imported)
    }
}

impl FromStr for ClassRole {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassRole::ALL
            .iter()
            .copied()
            .find(|role| role.type_name() == s)
            .ok_or_else(|| DiagramError::unknown_target_type(s))
    }
}

impl fmt::Display for ClassRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassRole::Standard => write!(f, "class"),
            ClassRole::Abstract => write!(f, "abstract class"),
            ClassRole::Interface => write!(f, "interface"),
            ClassRole::Enum => write!(f, "enum"),
            ClassRole::UnitTest => write!(f, "unit test"),
            ClassRole::Imported => write!(f, "imported class"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_parse_back() {
        for role in ClassRole::ALL {
            assert_eq!(role.type_name().parse::<ClassRole>().unwrap(), role);
        }
        assert!("Widget".parse::<ClassRole>().is_err());
    }

    #[test]
    fn test_stereotypes() {
        assert_eq!(ClassRole::Standard.stereotype(), None);
        assert_eq!(ClassRole::Interface.stereotype(), Some("<<interface>>"));
        assert_eq!(ClassRole::UnitTest.stereotype(), Some("<<unit test>>"));
    }

    #[test]
    fn test_editable() {
        assert!(ClassRole::Abstract.is_editable());
        assert!(!ClassRole::Imported.is_editable());
    }
}
