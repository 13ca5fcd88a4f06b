//! Error types for blockdsl

use std::fmt;

use thiserror::Error;

use crate::engine::trace::Trace;

/// What went wrong, independent of where it surfaced
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// A scope node was built without a body
    #[error("block must be provided")]
    Construction,

    /// A name used inside a sandbox is not reachable from the executing scope
    #[error("undefined local variable or method `{name}' for {scope}")]
    UnresolvedCommand { name: String, scope: String },

    /// Direct call of an operation that neither the node nor its parent provides
    #[error("undefined method `{name}' for {scope}")]
    Delegation { name: String, scope: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure raised by a command's own logic, passed through untouched
    #[error(transparent)]
    Application(#[from] anyhow::Error),
}

/// Error returned by every fallible blockdsl operation.
///
/// Carries the [`ErrorKind`] plus the call trace captured where the failure
/// was first raised. The trace is scrubbed of engine frames as the error
/// travels back out through sandboxes and scope nodes.
pub struct BlockError {
    kind: ErrorKind,
    trace: Trace,
}

impl BlockError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            trace: Trace::capture(),
        }
    }

    /// Failure carrying a trace captured elsewhere
    pub fn with_trace(kind: ErrorKind, trace: Trace) -> Self {
        Self { kind, trace }
    }

    pub fn construction() -> Self {
        Self::new(ErrorKind::Construction)
    }

    pub fn unresolved(name: impl Into<String>, scope: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnresolvedCommand {
            name: name.into(),
            scope: scope.into(),
        })
    }

    pub fn delegation(name: impl Into<String>, scope: impl Into<String>) -> Self {
        Self::new(ErrorKind::Delegation {
            name: name.into(),
            scope: scope.into(),
        })
    }

    /// An application failure with a plain message
    pub fn application(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Application(anyhow::Error::msg(message.to_string())))
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse(message.into()))
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(message.into()))
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn is_unresolved_command(&self) -> bool {
        matches!(self.kind, ErrorKind::UnresolvedCommand { .. })
    }

    pub fn is_delegation(&self) -> bool {
        matches!(self.kind, ErrorKind::Delegation { .. })
    }

    pub fn is_construction(&self) -> bool {
        matches!(self.kind, ErrorKind::Construction)
    }

    pub fn is_application(&self) -> bool {
        matches!(self.kind, ErrorKind::Application(_))
    }

    /// Same failure with engine frames removed from its trace
    pub(crate) fn scrubbed(mut self) -> Self {
        self.trace.scrub();
        self
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl fmt::Debug for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockError")
            .field("kind", &self.kind)
            .field("frames", &self.trace.len())
            .finish()
    }
}

impl std::error::Error for BlockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<ErrorKind> for BlockError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<anyhow::Error> for BlockError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(ErrorKind::Application(err))
    }
}

impl From<std::io::Error> for BlockError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, BlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_message() {
        let err = BlockError::construction();
        assert!(err.is_construction());
        assert_eq!(err.to_string(), "block must be provided");
    }

    #[test]
    fn test_unresolved_message_names_command() {
        let err = BlockError::unresolved("show_foo", "#<Bar>");
        assert!(err.is_unresolved_command());
        assert!(!err.is_delegation());
        assert_eq!(
            err.to_string(),
            "undefined local variable or method `show_foo' for #<Bar>"
        );
    }

    #[test]
    fn test_application_keeps_message() {
        let err: BlockError = anyhow::anyhow!("Kaboom").into();
        assert!(err.is_application());
        assert_eq!(err.to_string(), "Kaboom");
    }

    #[test]
    fn test_scrubbed_drops_engine_frames() {
        let raw = Trace::force_capture();
        assert!(raw.has_internal_frames());

        let err = BlockError::with_trace(
            ErrorKind::UnresolvedCommand {
                name: "show_foo".to_string(),
                scope: "#<Bar>".to_string(),
            },
            raw.clone(),
        )
        .scrubbed();

        assert!(err.is_unresolved_command());
        assert!(err.trace().len() < raw.len());
        assert!(!err.trace().has_internal_frames());
    }

    #[test]
    fn test_source_follows_cause_chain() {
        use std::error::Error as _;
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let app = anyhow::Error::new(inner).context("loading vocabulary");
        let err = BlockError::from(app);
        assert_eq!(err.to_string(), "loading vocabulary");
        assert_eq!(err.source().map(|s| s.to_string()), Some("disk gone".to_string()));
    }
}
