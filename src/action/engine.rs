use crate::error::{AppError, AppResult};
use crate::gateway::{RequestGateway, RequestId, WireResponse};
use crate::notify::Notifier;
use crate::page::{PageSurface, TargetId};

use super::mutation::Mutation;
use super::pending::{OnConfirm, PendingAction, PendingSet};
use super::ActionKind;

/// The compose form is one control; it shares the per-target guard.
const COMPOSE_TARGET: &str = "compose";
const EMPTY_MOLT_MESSAGE: &str = "Molt cannot be devoid of text.";
const DELETED_TOMBSTONE: &str = "Molt deleted";

#[derive(Debug, PartialEq, Eq)]
pub enum EngineOutcome {
    /// Optimistic mutation applied, request in flight.
    Submitted(RequestId),
    /// A pending action already exists for this target; nothing happened.
    Busy,
    /// Rejected before any request was issued.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleDisposition {
    Confirmed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub target: TargetId,
    pub kind: ActionKind,
    pub disposition: SettleDisposition,
}

/// Gives each togglable social action immediate visual feedback and a
/// well-defined undo path.
///
/// Within one invocation the optimistic mutation happens-before the request
/// is issued, and the rollback (if any) happens-after the failure is
/// observed. The current binary state is always read from the page surface,
/// never from a shadow variable.
#[derive(Default)]
pub struct ActionSyncEngine {
    pending: PendingSet,
}

impl ActionSyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn owns(&self, id: RequestId) -> bool {
        self.pending.owns(id)
    }

    pub fn toggle_like(
        &mut self,
        target: &TargetId,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
        current_path: &str,
    ) -> AppResult<EngineOutcome> {
        if self.pending.is_pending(target) {
            return Ok(EngineOutcome::Busy);
        }

        let was_liked = surface.toggle_state(target)?;
        let delta = if was_liked { -1 } else { 1 };
        let mut steps = vec![Mutation::Toggle {
            target: target.clone(),
            to: !was_liked,
        }];
        if let Some(counter) = counter_step(surface, target, delta)? {
            steps.push(counter);
        }
        let mutation = Mutation::Seq(steps);

        let user_action = if was_liked { "unlike" } else { "like" };
        let fields = vec![
            ("user_action".to_string(), user_action.to_string()),
            ("molt_id".to_string(), target.as_str().to_string()),
        ];
        self.apply_and_submit(
            target.clone(),
            ActionKind::Like,
            mutation,
            OnConfirm::Nothing,
            fields,
            surface,
            gateway,
            current_path,
        )
    }

    pub fn toggle_follow(
        &mut self,
        target: &TargetId,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
        current_path: &str,
    ) -> AppResult<EngineOutcome> {
        if self.pending.is_pending(target) {
            return Ok(EngineOutcome::Busy);
        }

        let was_following = surface.toggle_state(target)?;
        // The hidden field holds the transition this click performs; the
        // server reads it to know follow from unfollow.
        let intent = surface.follow_intent(target)?;
        let mutation = Mutation::Seq(vec![
            Mutation::Toggle {
                target: target.clone(),
                to: !was_following,
            },
            Mutation::FollowIntentField {
                target: target.clone(),
                from: intent,
                to: intent.flipped(),
            },
        ]);

        let fields = vec![("user_action".to_string(), intent.wire_value().to_string())];
        self.apply_and_submit(
            target.clone(),
            ActionKind::Follow,
            mutation,
            OnConfirm::Nothing,
            fields,
            surface,
            gateway,
            current_path,
        )
    }

    pub fn submit_remolt(
        &mut self,
        target: &TargetId,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
        current_path: &str,
    ) -> AppResult<EngineOutcome> {
        if self.pending.is_pending(target) {
            return Ok(EngineOutcome::Busy);
        }
        if surface.toggle_state(target)? {
            return Err(AppError::invalid_argument("already remolted"));
        }

        let mut steps = vec![Mutation::Toggle {
            target: target.clone(),
            to: true,
        }];
        if let Some(counter) = counter_step(surface, target, 1)? {
            steps.push(counter);
        }
        let fields = vec![
            (
                "user_action".to_string(),
                ActionKind::Remolt.wire_value().to_string(),
            ),
            ("molt_id".to_string(), target.as_str().to_string()),
        ];
        self.apply_and_submit(
            target.clone(),
            ActionKind::Remolt,
            Mutation::Seq(steps),
            OnConfirm::Nothing,
            fields,
            surface,
            gateway,
            current_path,
        )
    }

    /// Un-remolt: the control swap and counter decrement are optimistic;
    /// removing the element itself is not. A node that exists only as a
    /// remolt disappears after server confirmation, because re-inserting a
    /// complex element is riskier than re-toggling a class.
    pub fn undo_remolt(
        &mut self,
        target: &TargetId,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
        current_path: &str,
    ) -> AppResult<EngineOutcome> {
        if self.pending.is_pending(target) {
            return Ok(EngineOutcome::Busy);
        }
        if !surface.toggle_state(target)? {
            return Err(AppError::invalid_argument("not currently remolted"));
        }

        let mut steps = vec![Mutation::Toggle {
            target: target.clone(),
            to: false,
        }];
        if let Some(counter) = counter_step(surface, target, -1)? {
            steps.push(counter);
        }
        let fields = vec![
            (
                "user_action".to_string(),
                ActionKind::UndoRemolt.wire_value().to_string(),
            ),
            ("molt_id".to_string(), target.as_str().to_string()),
        ];
        self.apply_and_submit(
            target.clone(),
            ActionKind::UndoRemolt,
            Mutation::Seq(steps),
            OnConfirm::RemoveIfEphemeralRemolt,
            fields,
            surface,
            gateway,
            current_path,
        )
    }

    /// Deleting a molt performs no optimistic mutation at all: removal is
    /// irreversible locally, so it waits for confirmation.
    pub fn delete_molt(
        &mut self,
        target: &TargetId,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
        current_path: &str,
    ) -> AppResult<EngineOutcome> {
        if self.pending.is_pending(target) {
            return Ok(EngineOutcome::Busy);
        }
        // Existence check up front so an unknown target fails sync.
        surface.toggle_state(target)?;

        let fields = vec![
            (
                "user_action".to_string(),
                ActionKind::DeleteMolt.wire_value().to_string(),
            ),
            ("molt_id".to_string(), target.as_str().to_string()),
        ];
        self.apply_and_submit(
            target.clone(),
            ActionKind::DeleteMolt,
            Mutation::Seq(Vec::new()),
            OnConfirm::Tombstone(DELETED_TOMBSTONE.to_string()),
            fields,
            surface,
            gateway,
            current_path,
        )
    }

    /// Composing a molt: an empty body is a programmer-invariant violation
    /// rejected before any request, surfaced through a blocking alert.
    pub fn submit_molt(
        &mut self,
        content: &str,
        mut extra_fields: Vec<(String, String)>,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
        notifier: &mut dyn Notifier,
        current_path: &str,
    ) -> AppResult<EngineOutcome> {
        let compose = TargetId::new(COMPOSE_TARGET);
        if self.pending.is_pending(&compose) {
            return Ok(EngineOutcome::Busy);
        }
        if content.trim().is_empty() {
            notifier.alert(EMPTY_MOLT_MESSAGE);
            return Ok(EngineOutcome::Rejected);
        }

        let mut fields = vec![("molt_content".to_string(), content.to_string())];
        fields.append(&mut extra_fields);
        self.apply_and_submit(
            compose,
            ActionKind::SubmitMolt,
            Mutation::ComposeUploading { to: true },
            OnConfirm::ClearComposeUploading,
            fields,
            surface,
            gateway,
            current_path,
        )
    }

    /// Finalizes an action whose request completed. Returns `None` for
    /// results this engine did not initiate. On failure the exact recorded
    /// mutation is inverted and an action-specific toast is shown; on
    /// success the optimistic state is final, plus any confirmed removal.
    pub fn settle(
        &mut self,
        id: RequestId,
        result: &AppResult<WireResponse>,
        surface: &mut dyn PageSurface,
        notifier: &mut dyn Notifier,
    ) -> AppResult<Option<Settlement>> {
        let Some((target, action)) = self.pending.take_by_request(id) else {
            return Ok(None);
        };

        let disposition = match result {
            Ok(_) => {
                match action.on_confirm {
                    OnConfirm::Nothing => {}
                    OnConfirm::RemoveIfEphemeralRemolt => {
                        if surface.is_ephemeral_remolt(&target)? {
                            surface.remove_target(&target)?;
                        }
                    }
                    OnConfirm::Tombstone(message) => {
                        surface.replace_with_tombstone(&target, &message)?;
                    }
                    OnConfirm::ClearComposeUploading => {
                        surface.set_compose_uploading(false);
                    }
                }
                SettleDisposition::Confirmed
            }
            Err(_) => {
                action.applied.invert().apply(surface)?;
                notifier.toast(action.kind.failure_message());
                SettleDisposition::RolledBack
            }
        };

        Ok(Some(Settlement {
            target,
            kind: action.kind,
            disposition,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_and_submit(
        &mut self,
        target: TargetId,
        kind: ActionKind,
        mutation: Mutation,
        on_confirm: OnConfirm,
        fields: Vec<(String, String)>,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
        current_path: &str,
    ) -> AppResult<EngineOutcome> {
        mutation.apply(surface)?;

        let request_id = match gateway.submit_form(None, current_path, fields) {
            Ok(id) => id,
            Err(err) => {
                // Nothing went out; undo the optimistic step before
                // surfacing the dispatch failure.
                mutation.invert().apply(surface)?;
                return Err(err);
            }
        };

        self.pending.insert(
            target,
            PendingAction {
                request_id,
                kind,
                applied: mutation,
                on_confirm,
            },
        );
        Ok(EngineOutcome::Submitted(request_id))
    }
}

fn counter_step(
    surface: &dyn PageSurface,
    target: &TargetId,
    delta: i64,
) -> AppResult<Option<Mutation>> {
    if surface.counter(target)?.is_some() {
        return Ok(Some(Mutation::Counter {
            target: target.clone(),
            delta,
        }));
    }
    if let Some(linked) = surface.linked_counter(target)? {
        return Ok(Some(Mutation::Counter {
            target: linked,
            delta,
        }));
    }
    Ok(None)
}
