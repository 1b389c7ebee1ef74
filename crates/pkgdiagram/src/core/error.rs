//! Core error types for package diagram processing
//!
//! This module defines the error type shared by the persistence, graph and
//! printing layers.

use thiserror::Error;

/// Core error types for package diagram processing
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Property parse error: {message} at line {line}")]
    PropertyParse { message: String, line: usize },

    #[error("Missing property: {key}")]
    MissingProperty { key: String },

    #[error("Invalid number for property {key}: {value:?}")]
    InvalidNumber { key: String, value: String },

    #[error("Unknown dependency type: {value}")]
    UnknownDependencyType { value: String },

    #[error("Unknown target type: {value}")]
    UnknownTargetType { value: String },

    #[error("Dependency endpoint does not resolve to a target: {name}")]
    DanglingEndpoint { name: String },

    #[error("Target already exists: {name}")]
    DuplicateTarget { name: String },

    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },

    #[error("Print error: {message}")]
    Print { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new property parse error
    pub fn property_parse(message: impl Into<String>, line: usize) -> Self {
        Self::PropertyParse {
            message: message.into(),
            line,
        }
    }

    /// Create a new missing property error
    pub fn missing_property(key: impl Into<String>) -> Self {
        Self::MissingProperty { key: key.into() }
    }

    /// Create a new invalid number error
    pub fn invalid_number(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn unknown_dependency_type(value: impl Into<String>) -> Self {
        Self::UnknownDependencyType {
            value: value.into(),
        }
    }

    pub fn unknown_target_type(value: impl Into<String>) -> Self {
        Self::UnknownTargetType {
            value: value.into(),
        }
    }

    pub fn dangling_endpoint(name: impl Into<String>) -> Self {
        Self::DanglingEndpoint { name: name.into() }
    }

    pub fn duplicate_target(name: impl Into<String>) -> Self {
        Self::DuplicateTarget { name: name.into() }
    }

    pub fn unknown_target(name: impl Into<String>) -> Self {
        Self::UnknownTarget { name: name.into() }
    }

    /// Create a new print error
    pub fn print(message: impl Into<String>) -> Self {
        Self::Print {
            message: message.into(),
        }
    }
}

/// Result alias for the library's own error type
pub type DiagramResult<T> = std::result::Result<T, DiagramError>;
