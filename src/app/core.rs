use serde::Deserialize;

use crate::action::{ActionKind, ActionSyncEngine, DropdownController, EngineOutcome, Settlement};
use crate::action::SettleDisposition;
use crate::command::{ActionId, Command, CommandOutcome};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::event::{AppEvent, NavReason};
use crate::gateway::{GatewayResult, RequestGateway, RequestId};
use crate::nav::{NavFinish, NavigateDisposition, NavigationController, ScrollBackControl};
use crate::notify::Notifier;
use crate::page::{PageSurface, TargetId};

use super::state::AppState;

/// Payload of the periodic `new_molts` resource poll.
#[derive(Debug, Clone, Deserialize)]
struct NewMoltsPayload {
    count: u64,
    #[serde(default)]
    unread_notifications: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CommandDispatchResult {
    pub outcome: CommandOutcome,
    pub emitted_events: Vec<AppEvent>,
}

/// Owns the controllers and routes between them: commands in, gateway
/// results back out to whichever component initiated the request.
pub struct App {
    pub state: AppState,
    pub config: Config,
    nav: NavigationController,
    actions: ActionSyncEngine,
    dropdowns: DropdownController,
    scrollback: ScrollBackControl,
    refresh_in_flight: Option<RequestId>,
}

impl App {
    pub fn new(config: Config) -> AppResult<Self> {
        let nav = NavigationController::new(&config.navigation)?;
        let scrollback = ScrollBackControl::new(config.navigation.scroll_back_threshold);
        Ok(Self {
            state: AppState::default(),
            config,
            nav,
            actions: ActionSyncEngine::new(),
            dropdowns: DropdownController::new(),
            scrollback,
            refresh_in_flight: None,
        })
    }

    pub fn nav(&self) -> &NavigationController {
        &self.nav
    }

    pub fn dispatch_command(
        &mut self,
        command: Command,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
        notifier: &mut dyn Notifier,
    ) -> AppResult<CommandDispatchResult> {
        let action_id = command.action_id();
        let mut emitted_events = Vec::new();

        let outcome = match command {
            Command::Navigate { url, nav_item } => {
                match self
                    .nav
                    .navigate(&url, nav_item.as_ref(), surface, gateway)?
                {
                    NavigateDisposition::Requested(_) => {
                        self.state.set_status(action_id, format!("loading {url}"));
                    }
                    NavigateDisposition::BypassedExcluded => {
                        self.state
                            .set_status(action_id, format!("navigating directly to {url}"));
                    }
                }
                CommandOutcome::Applied
            }
            Command::HistoryBack => {
                match self.nav.history_back(surface) {
                    Some(entry) => {
                        let (url, title) = (entry.url.clone(), entry.title.clone());
                        self.state.current_url = url.clone();
                        self.scrollback.observe(surface.scroll_y());
                        self.state
                            .set_status(action_id, format!("history back -> {url}"));
                        emitted_events.push(AppEvent::NavigationCompleted {
                            url,
                            title,
                            reason: NavReason::History,
                        });
                        CommandOutcome::Applied
                    }
                    None => {
                        self.state.set_status(action_id, "history back is empty");
                        CommandOutcome::Noop
                    }
                }
            }
            Command::HistoryForward => {
                match self.nav.history_forward(surface) {
                    Some(entry) => {
                        let (url, title) = (entry.url.clone(), entry.title.clone());
                        self.state.current_url = url.clone();
                        self.scrollback.observe(surface.scroll_y());
                        self.state
                            .set_status(action_id, format!("history forward -> {url}"));
                        emitted_events.push(AppEvent::NavigationCompleted {
                            url,
                            title,
                            reason: NavReason::History,
                        });
                        CommandOutcome::Applied
                    }
                    None => {
                        self.state.set_status(action_id, "history forward is empty");
                        CommandOutcome::Noop
                    }
                }
            }
            Command::Like { target } => {
                let current_path = self.state.current_path().to_string();
                let outcome = self
                    .actions
                    .toggle_like(&target, surface, gateway, &current_path)?;
                self.note_engine_outcome(action_id, ActionKind::Like, &target, &outcome)
            }
            Command::Follow { target } => {
                let current_path = self.state.current_path().to_string();
                let outcome =
                    self.actions
                        .toggle_follow(&target, surface, gateway, &current_path)?;
                self.note_engine_outcome(action_id, ActionKind::Follow, &target, &outcome)
            }
            Command::Remolt { target } => {
                let current_path = self.state.current_path().to_string();
                let outcome =
                    self.actions
                        .submit_remolt(&target, surface, gateway, &current_path)?;
                self.note_engine_outcome(action_id, ActionKind::Remolt, &target, &outcome)
            }
            Command::UndoRemolt { target } => {
                let current_path = self.state.current_path().to_string();
                let outcome = self
                    .actions
                    .undo_remolt(&target, surface, gateway, &current_path)?;
                self.note_engine_outcome(action_id, ActionKind::UndoRemolt, &target, &outcome)
            }
            Command::DeleteMolt { target } => {
                let current_path = self.state.current_path().to_string();
                let outcome = self
                    .actions
                    .delete_molt(&target, surface, gateway, &current_path)?;
                self.note_engine_outcome(action_id, ActionKind::DeleteMolt, &target, &outcome)
            }
            Command::Molt { content } => {
                let current_path = self.state.current_path().to_string();
                let outcome = self.actions.submit_molt(
                    &content,
                    Vec::new(),
                    surface,
                    gateway,
                    notifier,
                    &current_path,
                )?;
                match outcome {
                    EngineOutcome::Submitted(_) => {
                        self.state.set_status(action_id, "molt submitted");
                        CommandOutcome::Applied
                    }
                    EngineOutcome::Busy => {
                        self.state.set_status(action_id, "a molt is already uploading");
                        CommandOutcome::Noop
                    }
                    EngineOutcome::Rejected => {
                        self.state.set_status(action_id, "molt rejected: empty content");
                        CommandOutcome::Noop
                    }
                }
            }
            Command::ToggleDropdown { target } => {
                self.dropdowns.toggle(&target, surface);
                let message = match self.dropdowns.open_anchor() {
                    Some(anchor) => format!("dropdown open at {anchor}"),
                    None => "dropdown closed".to_string(),
                };
                self.state.set_status(action_id, message);
                CommandOutcome::Applied
            }
            Command::DismissDropdown => {
                self.dropdowns.dismiss(surface);
                self.state.set_status(action_id, "dropdown dismissed");
                CommandOutcome::Applied
            }
            Command::Scroll { y } => {
                surface.set_scroll(y);
                self.scrollback.observe(surface.scroll_y());
                let message = if self.scrollback.is_visible() {
                    format!("scrolled to {y}, back-to-top shown")
                } else {
                    format!("scrolled to {y}")
                };
                self.state.set_status(action_id, message);
                CommandOutcome::Applied
            }
            Command::ScrollTop => {
                if self.scrollback.is_visible() {
                    self.scrollback.activate(surface);
                    self.state.set_status(action_id, "scrolled back to top");
                    CommandOutcome::Applied
                } else {
                    self.state.set_status(action_id, "already at the top");
                    CommandOutcome::Noop
                }
            }
            Command::Refresh => self.poll_new_molts(surface, gateway)?,
            Command::Status => {
                let message = format!(
                    "at {} | history {} | pending actions {} | dropdown {}",
                    self.state.current_url,
                    self.nav.history().len(),
                    self.actions.pending_len(),
                    self.dropdowns
                        .open_anchor()
                        .map(TargetId::to_string)
                        .unwrap_or_else(|| "closed".to_string()),
                );
                self.state.set_status(action_id, message);
                CommandOutcome::Applied
            }
            Command::Quit => {
                self.state.set_status(action_id, "quit requested");
                CommandOutcome::QuitRequested
            }
        };

        Ok(CommandDispatchResult {
            outcome,
            emitted_events,
        })
    }

    /// Routes a completed request back to the component that issued it.
    pub fn handle_gateway_result(
        &mut self,
        result: GatewayResult,
        surface: &mut dyn PageSurface,
        notifier: &mut dyn Notifier,
    ) -> AppResult<Vec<AppEvent>> {
        let mut events = Vec::new();
        log::debug!("request {:?} completed in {:?}", result.id, result.elapsed);

        if self.nav.owns(result.id) {
            match self.nav.finish(result.id, result.result, surface) {
                Some(NavFinish::Completed { url, title }) => {
                    self.state.current_url = url.clone();
                    self.scrollback.observe(surface.scroll_y());
                    self.state
                        .set_status(ActionId::Navigate, format!("loaded {url}"));
                    events.push(AppEvent::NavigationCompleted {
                        url,
                        title,
                        reason: NavReason::Link,
                    });
                }
                Some(NavFinish::FellBack { url }) => {
                    self.state
                        .set_status(ActionId::Navigate, format!("falling back to {url}"));
                    events.push(AppEvent::NavigationFellBack { url });
                }
                None => {}
            }
            return Ok(events);
        }

        if self.actions.owns(result.id) {
            if let Some(settlement) =
                self.actions
                    .settle(result.id, &result.result, surface, notifier)?
            {
                events.push(self.note_settlement(settlement));
            }
            return Ok(events);
        }

        if self.refresh_in_flight == Some(result.id) {
            self.refresh_in_flight = None;
            self.finish_refresh(result, notifier);
            return Ok(events);
        }

        log::warn!("dropping result for unknown request {:?}", result.id);
        Ok(events)
    }

    /// Issues the periodic `new_molts` poll, sentinel timestamp and all.
    /// At most one poll is in flight at a time.
    pub fn poll_new_molts(
        &mut self,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
    ) -> AppResult<CommandOutcome> {
        if self.refresh_in_flight.is_some() {
            self.state
                .set_status(ActionId::Refresh, "refresh already in flight");
            return Ok(CommandOutcome::Noop);
        }

        let last_refresh = surface.last_refresh();
        let id = gateway.fetch_named_resource(
            "new_molts",
            vec![("timestamp".to_string(), "-1".to_string())],
            last_refresh.as_deref(),
        )?;
        self.refresh_in_flight = Some(id);
        self.state
            .set_status(ActionId::Refresh, "checking for new molts");
        Ok(CommandOutcome::Applied)
    }

    fn finish_refresh(&mut self, result: GatewayResult, notifier: &mut dyn Notifier) {
        let payload = result
            .result
            .and_then(|response| {
                serde_json::from_str::<NewMoltsPayload>(&response.body)
                    .map_err(|source| AppError::decode("new molts payload", source))
            });
        match payload {
            Ok(payload) => {
                notifier.set_new_molt_indicator(payload.count);
                if let Some(unread) = payload.unread_notifications {
                    notifier.set_unread_badge(unread);
                }
                self.state
                    .set_status(ActionId::Refresh, format!("{} new molts", payload.count));
            }
            Err(err) => {
                log::warn!("new molt poll failed: {err}");
                self.state.set_status(ActionId::Refresh, "refresh failed");
            }
        }
    }

    fn note_engine_outcome(
        &mut self,
        action_id: ActionId,
        kind: ActionKind,
        target: &TargetId,
        outcome: &EngineOutcome,
    ) -> CommandOutcome {
        match outcome {
            EngineOutcome::Submitted(_) => {
                self.state
                    .set_status(action_id, format!("{} submitted for {target}", kind.label()));
                CommandOutcome::Applied
            }
            EngineOutcome::Busy => {
                self.state
                    .set_status(action_id, format!("an action is already pending for {target}"));
                CommandOutcome::Noop
            }
            EngineOutcome::Rejected => {
                self.state
                    .set_status(action_id, format!("{} rejected", kind.label()));
                CommandOutcome::Noop
            }
        }
    }

    fn note_settlement(&mut self, settlement: Settlement) -> AppEvent {
        let Settlement {
            target,
            kind,
            disposition,
        } = settlement;
        match disposition {
            SettleDisposition::Confirmed => {
                self.state.set_status(
                    kind_action_id(kind),
                    format!("{} confirmed for {target}", kind.label()),
                );
                AppEvent::ActionConfirmed { target, kind }
            }
            SettleDisposition::RolledBack => {
                self.state.set_status(
                    kind_action_id(kind),
                    format!("{} rolled back for {target}", kind.label()),
                );
                AppEvent::ActionRolledBack { target, kind }
            }
        }
    }
}

fn kind_action_id(kind: ActionKind) -> ActionId {
    match kind {
        ActionKind::Like => ActionId::Like,
        ActionKind::Follow => ActionId::Follow,
        ActionKind::Remolt => ActionId::Remolt,
        ActionKind::UndoRemolt => ActionId::UndoRemolt,
        ActionKind::DeleteMolt => ActionId::DeleteMolt,
        ActionKind::SubmitMolt => ActionId::Molt,
    }
}
