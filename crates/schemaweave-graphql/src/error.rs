//! Error types for schema assembly.
//!
//! Every check in the assembly pipeline fails fast: the first inconsistency
//! found is returned and no partial schema is produced. Errors are
//! deterministic for a given input set.

use thiserror::Error;

/// Errors raised while building definition units or assembling a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaDefinitionError {
    /// The SDL fragment could not be parsed.
    #[error("Invalid SDL: {message}")]
    InvalidSdl {
        /// Parser message.
        message: String,
    },

    /// The SDL fragment contains no declaration.
    #[error("SDL fragment does not declare any type")]
    NoDeclaration,

    /// The SDL fragment contains more than one declaration.
    #[error("SDL fragment declares {count} definitions ({}), expected exactly one", names.join(", "))]
    MultipleDeclarations {
        /// Number of declarations found.
        count: usize,
        /// Names of the declarations found.
        names: Vec<String>,
    },

    /// The SDL fragment declares something a unit cannot hold.
    #[error("Unsupported declaration: {message}")]
    UnsupportedDeclaration {
        /// What was found.
        message: String,
    },

    /// The declared name differs from the expected one.
    #[error("Expected SDL fragment to declare `{expected}`, found `{found}`")]
    NameMismatch {
        /// Expected type name.
        expected: String,
        /// Declared type name.
        found: String,
    },

    /// The declared kind differs from the expected one.
    #[error("`{type_name}` is declared as {found}, expected {expected}")]
    KindMismatch {
        /// Declared type name.
        type_name: String,
        /// Expected kind.
        expected: String,
        /// Declared kind.
        found: String,
    },

    /// A declaration has the wrong number of fields.
    #[error("`{type_name}` must declare exactly {expected} field(s), found {found}")]
    FieldCount {
        /// Declared type name.
        type_name: String,
        /// Expected number of fields.
        expected: usize,
        /// Declared number of fields.
        found: usize,
    },

    /// Bound behavior has no matching field.
    #[error("`{type_name}` has behavior bound to `{field_name}`, but it declares no such field")]
    UnmatchedResolver {
        /// Type the behavior is bound on.
        type_name: String,
        /// Field name the behavior targets.
        field_name: String,
    },

    /// An argument alias names an argument the field does not declare.
    #[error("`{type_name}.{field_name}` has no argument `{argument}`")]
    UnknownArgument {
        /// Type name.
        type_name: String,
        /// Field name.
        field_name: String,
        /// Undeclared argument.
        argument: String,
    },

    /// Behavior was attached to a unit of a kind that cannot carry it.
    #[error("{behavior} cannot be bound on {kind} `{type_name}`")]
    UnsupportedBehavior {
        /// Type name.
        type_name: String,
        /// Declared kind.
        kind: String,
        /// Behavior that was attached.
        behavior: String,
    },

    /// A referenced type is not provided by any requirement.
    #[error("`{unit}` references `{type_name}`, which is not provided by its requirements")]
    MissingDependency {
        /// Unit that references the type.
        unit: String,
        /// Missing type name.
        type_name: String,
    },

    /// A deferred marker matches no unit of the assembly.
    #[error("`{unit}` defers to `{type_name}`, but no unit declares it")]
    UnresolvedDeferredType {
        /// Unit holding the deferred marker.
        unit: String,
        /// Deferred type name.
        type_name: String,
    },

    /// Two units merged into one root declare the same field.
    #[error("Field `{field_name}` is declared more than once on root type `{type_name}`")]
    DuplicateRootField {
        /// Root type name.
        type_name: String,
        /// Duplicated field name.
        field_name: String,
    },

    /// Two non-root units declare the same type.
    #[error("Type `{type_name}` is declared by more than one unit")]
    DuplicateTypeName {
        /// Duplicated type name.
        type_name: String,
    },

    /// The assembly configuration is invalid.
    #[error("Invalid assembly configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// The schema compiler rejected the assembled document.
    #[error("Schema compilation failed: {0}")]
    CompilationError(String),
}

/// Discriminant of [`SchemaDefinitionError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSdl,
    NoDeclaration,
    MultipleDeclarations,
    UnsupportedDeclaration,
    NameMismatch,
    KindMismatch,
    FieldCount,
    UnmatchedResolver,
    UnknownArgument,
    UnsupportedBehavior,
    MissingDependency,
    UnresolvedDeferredType,
    DuplicateRootField,
    DuplicateTypeName,
    InvalidConfig,
    CompilationError,
}

impl SchemaDefinitionError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSdl { .. } => ErrorKind::InvalidSdl,
            Self::NoDeclaration => ErrorKind::NoDeclaration,
            Self::MultipleDeclarations { .. } => ErrorKind::MultipleDeclarations,
            Self::UnsupportedDeclaration { .. } => ErrorKind::UnsupportedDeclaration,
            Self::NameMismatch { .. } => ErrorKind::NameMismatch,
            Self::KindMismatch { .. } => ErrorKind::KindMismatch,
            Self::FieldCount { .. } => ErrorKind::FieldCount,
            Self::UnmatchedResolver { .. } => ErrorKind::UnmatchedResolver,
            Self::UnknownArgument { .. } => ErrorKind::UnknownArgument,
            Self::UnsupportedBehavior { .. } => ErrorKind::UnsupportedBehavior,
            Self::MissingDependency { .. } => ErrorKind::MissingDependency,
            Self::UnresolvedDeferredType { .. } => ErrorKind::UnresolvedDeferredType,
            Self::DuplicateRootField { .. } => ErrorKind::DuplicateRootField,
            Self::DuplicateTypeName { .. } => ErrorKind::DuplicateTypeName,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::CompilationError(_) => ErrorKind::CompilationError,
        }
    }

    /// Returns a stable error code for diagnostics output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidSdl => "INVALID_SDL",
            ErrorKind::NoDeclaration => "NO_DECLARATION",
            ErrorKind::MultipleDeclarations => "MULTIPLE_DECLARATIONS",
            ErrorKind::UnsupportedDeclaration => "UNSUPPORTED_DECLARATION",
            ErrorKind::NameMismatch => "NAME_MISMATCH",
            ErrorKind::KindMismatch => "KIND_MISMATCH",
            ErrorKind::FieldCount => "FIELD_COUNT",
            ErrorKind::UnmatchedResolver => "UNMATCHED_RESOLVER",
            ErrorKind::UnknownArgument => "UNKNOWN_ARGUMENT",
            ErrorKind::UnsupportedBehavior => "UNSUPPORTED_BEHAVIOR",
            ErrorKind::MissingDependency => "MISSING_DEPENDENCY",
            ErrorKind::UnresolvedDeferredType => "UNRESOLVED_DEFERRED_TYPE",
            ErrorKind::DuplicateRootField => "DUPLICATE_ROOT_FIELD",
            ErrorKind::DuplicateTypeName => "DUPLICATE_TYPE_NAME",
            ErrorKind::InvalidConfig => "INVALID_CONFIG",
            ErrorKind::CompilationError => "COMPILATION_ERROR",
        }
    }

    pub(crate) fn missing_dependency(unit: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::MissingDependency {
            unit: unit.into(),
            type_name: type_name.into(),
        }
    }

    pub(crate) fn unmatched_resolver(
        type_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self::UnmatchedResolver {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaDefinitionError::NoDeclaration.error_code(),
            "NO_DECLARATION"
        );
        assert_eq!(
            SchemaDefinitionError::DuplicateRootField {
                type_name: "Query".into(),
                field_name: "user".into(),
            }
            .error_code(),
            "DUPLICATE_ROOT_FIELD"
        );
        assert_eq!(
            SchemaDefinitionError::CompilationError("boom".into()).kind(),
            ErrorKind::CompilationError
        );
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = SchemaDefinitionError::missing_dependency("Query", "User");
        assert_eq!(
            err.to_string(),
            "`Query` references `User`, which is not provided by its requirements"
        );

        let err = SchemaDefinitionError::MultipleDeclarations {
            count: 2,
            names: vec!["User".into(), "Group".into()],
        };
        assert!(err.to_string().contains("User, Group"));
    }
}
