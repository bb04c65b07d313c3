use thiserror::Error;

/// Fatal configuration errors. Everything else in the pipeline degrades
/// gracefully: bad references are skipped with a warning, constraint
/// violations are reported, unroutable edges fall back to a straight
/// segment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unknown placement strategy '{0}'")]
    UnknownStrategy(String),
    /// Relative-position constraints form a reference cycle; there is no
    /// priority order that resolves one, so it is rejected before any
    /// mutation happens.
    #[error("relative-position cycle involving node '{0}'")]
    RelativeCycle(String),
}
