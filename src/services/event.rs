//! # Membership events delivered by the watch stream.
//!
//! [`ServiceEvent`] pairs a wire-level event kind with the endpoint it
//! concerns. The kind is transported as a literal string (`ADDED`,
//! `MODIFIED`, `DELETED`); anything else is preserved verbatim in
//! [`ServiceEventKind::Other`] so the watcher can warn with the raw value.

use super::endpoint::ServiceEndpoint;

/// Wire-level classification of a membership change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceEventKind {
    /// A new endpoint appeared in the namespace.
    Added,
    /// An existing endpoint's metadata changed.
    Modified,
    /// An endpoint left the namespace.
    Deleted,
    /// Unrecognized wire value, kept verbatim.
    Other(String),
}

impl ServiceEventKind {
    /// Parses the literal wire string.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "ADDED" => ServiceEventKind::Added,
            "MODIFIED" => ServiceEventKind::Modified,
            "DELETED" => ServiceEventKind::Deleted,
            other => ServiceEventKind::Other(other.to_string()),
        }
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            ServiceEventKind::Added => "ADDED",
            ServiceEventKind::Modified => "MODIFIED",
            ServiceEventKind::Deleted => "DELETED",
            ServiceEventKind::Other(raw) => raw,
        }
    }
}

/// A single membership change, consumed exactly once by the watcher.
#[derive(Clone, Debug)]
pub struct ServiceEvent {
    pub kind: ServiceEventKind,
    pub endpoint: ServiceEndpoint,
}

impl ServiceEvent {
    pub fn added(endpoint: ServiceEndpoint) -> Self {
        Self {
            kind: ServiceEventKind::Added,
            endpoint,
        }
    }

    pub fn modified(endpoint: ServiceEndpoint) -> Self {
        Self {
            kind: ServiceEventKind::Modified,
            endpoint,
        }
    }

    pub fn deleted(endpoint: ServiceEndpoint) -> Self {
        Self {
            kind: ServiceEventKind::Deleted,
            endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        for raw in ["ADDED", "MODIFIED", "DELETED"] {
            assert_eq!(ServiceEventKind::from_wire(raw).as_str(), raw);
        }
    }

    #[test]
    fn unknown_values_are_preserved() {
        let kind = ServiceEventKind::from_wire("BOOKMARK");
        assert_eq!(kind, ServiceEventKind::Other("BOOKMARK".to_string()));
        assert_eq!(kind.as_str(), "BOOKMARK");
    }
}
