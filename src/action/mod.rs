mod dropdown;
mod engine;
mod mutation;
mod pending;

pub use dropdown::DropdownController;
pub use engine::{ActionSyncEngine, EngineOutcome, SettleDisposition, Settlement};
pub use mutation::Mutation;
pub use pending::{OnConfirm, PendingAction, PendingSet};

/// The discrete optimistic actions the engine knows how to apply and undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Like,
    Follow,
    Remolt,
    UndoRemolt,
    DeleteMolt,
    SubmitMolt,
}

impl ActionKind {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Like => "Failed to like",
            Self::Follow => "Failed to follow",
            Self::Remolt => "Failed to remolt",
            Self::UndoRemolt => "Failed to undo remolt",
            Self::DeleteMolt => "Failed to delete",
            Self::SubmitMolt => "Failed to send molt",
        }
    }

    /// Human-readable name for status lines and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Follow => "follow",
            Self::Remolt => "remolt",
            Self::UndoRemolt => "undo remolt",
            Self::DeleteMolt => "delete",
            Self::SubmitMolt => "molt",
        }
    }

    pub fn wire_value(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Follow => "follow",
            Self::Remolt => "remolt",
            Self::UndoRemolt => "unremolt",
            Self::DeleteMolt => "delete",
            Self::SubmitMolt => "molt",
        }
    }
}
