use std::fmt;

/// Broad classification of a [`ModelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelErrorKind {
    /// A category, attribute, or row that does not exist was requested.
    Lookup,
    /// The caller asked for a mutation that would break a model invariant.
    Precondition,
}

/// Errors raised by the container model accessors and mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// No category with this name exists in the container.
    CategoryNotFound(String),
    /// The category exists but has no such attribute.
    AttributeNotFound { category: String, attribute: String },
    /// The row index is past the end of the category.
    RowOutOfRange {
        category: String,
        row: usize,
        rows: usize,
    },
    /// A row was supplied with the wrong number of values.
    ArityMismatch {
        category: String,
        expected: usize,
        found: usize,
    },
    /// The attribute name is already declared in the category.
    DuplicateAttribute { category: String, attribute: String },
    /// The category name is already used in the container.
    DuplicateCategory(String),
    /// A single-value operation was applied to a multi-row category.
    MultipleRows { category: String, rows: usize },
    /// A block, category, or attribute name that cannot be written as CIF.
    InvalidName(String),
}

impl ModelError {
    /// Returns whether this is a lookup failure or a precondition violation.
    pub fn kind(&self) -> ModelErrorKind {
        match self {
            Self::CategoryNotFound(_)
            | Self::AttributeNotFound { .. }
            | Self::RowOutOfRange { .. } => ModelErrorKind::Lookup,
            Self::ArityMismatch { .. }
            | Self::DuplicateAttribute { .. }
            | Self::DuplicateCategory(_)
            | Self::MultipleRows { .. }
            | Self::InvalidName(_) => ModelErrorKind::Precondition,
        }
    }

    /// Shorthand for `kind() == ModelErrorKind::Lookup`.
    pub fn is_lookup(&self) -> bool {
        self.kind() == ModelErrorKind::Lookup
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategoryNotFound(name) => write!(f, "category '{name}' not found"),
            Self::AttributeNotFound {
                category,
                attribute,
            } => {
                write!(f, "attribute '{attribute}' not found in category '{category}'")
            }
            Self::RowOutOfRange {
                category,
                row,
                rows,
            } => {
                write!(
                    f,
                    "row {row} out of range for category '{category}' ({rows} rows)"
                )
            }
            Self::ArityMismatch {
                category,
                expected,
                found,
            } => {
                write!(
                    f,
                    "row arity mismatch in category '{category}': expected {expected} values, found {found}"
                )
            }
            Self::DuplicateAttribute {
                category,
                attribute,
            } => {
                write!(f, "duplicate attribute '{attribute}' in category '{category}'")
            }
            Self::DuplicateCategory(name) => write!(f, "duplicate category '{name}'"),
            Self::MultipleRows { category, rows } => {
                write!(
                    f,
                    "category '{category}' has {rows} rows; single-value access needs at most one"
                )
            }
            Self::InvalidName(name) => {
                write!(
                    f,
                    "invalid name '{name}': must be non-empty and free of CIF token separators"
                )
            }
        }
    }
}

impl std::error::Error for ModelError {}
