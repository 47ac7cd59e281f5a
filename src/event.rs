use crate::action::ActionKind;
use crate::gateway::GatewayResult;
use crate::page::TargetId;

/// Describes *why* the visible page changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavReason {
    /// A navbar or in-app link activation.
    Link,
    /// History traversal (back/forward replay).
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    NavigationCompleted {
        url: String,
        title: String,
        reason: NavReason,
    },
    NavigationFellBack {
        url: String,
    },
    ActionConfirmed {
        target: TargetId,
        kind: ActionKind,
    },
    ActionRolledBack {
        target: TargetId,
        kind: ActionKind,
    },
}

#[derive(Debug)]
pub(crate) enum DomainEvent {
    Input(String),
    InputError(String),
    Gateway(GatewayResult),
    RefreshTick,
    Closed,
}
