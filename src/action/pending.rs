use std::collections::HashMap;

use crate::gateway::RequestId;
use crate::page::TargetId;

use super::{ActionKind, Mutation};

/// What the engine does to the page once the server confirms the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnConfirm {
    Nothing,
    /// Remove the element iff it exists only by virtue of being a remolt.
    RemoveIfEphemeralRemolt,
    /// Replace the element with a tombstone message.
    Tombstone(String),
    ClearComposeUploading,
}

/// Correlates one in-flight request with the optimistic delta to invert if
/// it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub request_id: RequestId,
    pub kind: ActionKind,
    pub applied: Mutation,
    pub on_confirm: OnConfirm,
}

/// Per-target in-flight guard: at most one [`PendingAction`] per target at
/// a time. A new optimistic mutation for a target with an outstanding one
/// is rejected, so a fast double-activation cannot race two requests for
/// the same target.
#[derive(Debug, Default)]
pub struct PendingSet {
    by_target: HashMap<TargetId, PendingAction>,
    by_request: HashMap<RequestId, TargetId>,
}

impl PendingSet {
    pub fn is_pending(&self, target: &TargetId) -> bool {
        self.by_target.contains_key(target)
    }

    pub fn owns(&self, id: RequestId) -> bool {
        self.by_request.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }

    /// Registers an action for a target. The caller must have checked
    /// `is_pending` first; a second registration for the same target is an
    /// invariant breach and replaces nothing.
    pub fn insert(&mut self, target: TargetId, action: PendingAction) -> bool {
        if self.by_target.contains_key(&target) {
            return false;
        }
        self.by_request.insert(action.request_id, target.clone());
        self.by_target.insert(target, action);
        true
    }

    pub fn take_by_request(&mut self, id: RequestId) -> Option<(TargetId, PendingAction)> {
        let target = self.by_request.remove(&id)?;
        let action = self.by_target.remove(&target)?;
        Some((target, action))
    }
}

#[cfg(test)]
mod tests {
    use crate::page::TargetId;

    use super::super::{ActionKind, Mutation};
    use super::{OnConfirm, PendingAction, PendingSet};

    fn action(kind: ActionKind, request_id: crate::gateway::RequestId) -> PendingAction {
        PendingAction {
            request_id,
            kind,
            applied: Mutation::Seq(Vec::new()),
            on_confirm: OnConfirm::Nothing,
        }
    }

    #[test]
    fn second_registration_for_a_pending_target_is_rejected() {
        let mut set = PendingSet::default();
        let target = TargetId::new("like-1");
        let (first, second) = (
            crate::gateway::RequestId::test(1),
            crate::gateway::RequestId::test(2),
        );

        assert!(set.insert(target.clone(), action(ActionKind::Like, first)));
        assert!(set.is_pending(&target));
        assert!(!set.insert(target.clone(), action(ActionKind::Like, second)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn take_by_request_clears_both_indexes() {
        let mut set = PendingSet::default();
        let target = TargetId::new("remolt-2");
        let id = crate::gateway::RequestId::test(7);

        set.insert(target.clone(), action(ActionKind::Remolt, id));
        let (taken_target, taken) = set.take_by_request(id).expect("action should be tracked");

        assert_eq!(taken_target, target);
        assert_eq!(taken.kind, ActionKind::Remolt);
        assert!(!set.is_pending(&target));
        assert!(!set.owns(id));
        assert!(set.take_by_request(id).is_none());
    }
}
