use thiserror::Error;

pub type Result<T> = std::result::Result<T, HierarchyError>;

/// Errors raised while turning a key list into an annotated hierarchy
#[derive(Error, Debug)]
pub enum HierarchyError {
    /// Caller handed in a key list that breaks the input contract
    /// (unsorted, duplicated, wrong width, illegal characters)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An invariant of the inferred forest does not hold after re-leveling.
    /// Points at a defect in the inference itself, not at the input.
    #[error("Inconsistent hierarchy: {0}")]
    InconsistentHierarchy(String),

    /// Colour or pipeline configuration out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HierarchyError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::InconsistentHierarchy(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True when the caller is at fault (bad keys or bad configuration)
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidConfig(_) | Self::Parse(_))
    }

    /// True when the inference produced a broken forest
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InconsistentHierarchy(_))
    }
}
