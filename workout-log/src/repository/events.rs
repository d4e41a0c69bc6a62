use std::fmt;

use super::snapshot::RepositorySnapshot;

/// Events broadcast from the repository to all subscribers.
#[derive(Debug, Clone)]
pub enum RepositoryEvent {
    /// Full state snapshot after a load transition or a successful mutation.
    StateChanged(RepositorySnapshot),
    /// A mutation was rejected. The cached collection is unchanged.
    MutationFailed {
        operation: MutationKind,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}
