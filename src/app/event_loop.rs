use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

use crate::command::{ActionId, CommandOutcome, parse_line};
use crate::error::AppResult;
use crate::event::DomainEvent;
use crate::gateway::RequestGateway;
use crate::notify::Notifier;
use crate::page::PageSurface;

use super::core::App;

/// Interval stand-in for "never" when polling is disabled.
const DISABLED_POLL: Duration = Duration::from_secs(60 * 60 * 24);

impl App {
    /// Drives the client until stdin closes or a quit command arrives.
    ///
    /// One line of input is one command. Input, request completions, and the
    /// refresh timer are funneled through a single select so every state
    /// change happens on this task.
    pub async fn run(
        &mut self,
        surface: &mut dyn PageSurface,
        notifier: &mut dyn Notifier,
        gateway: &mut RequestGateway,
    ) -> AppResult<()> {
        let (event_tx, mut event_rx) = unbounded_channel();
        let input_task = spawn_input_reader(event_tx);

        let poll_interval = match self.config.refresh.poll_interval_ms {
            0 => DISABLED_POLL,
            ms => Duration::from_millis(ms),
        };
        let mut refresh = tokio::time::interval(poll_interval);
        // The immediate first tick would poll before any page is loaded.
        refresh.tick().await;

        loop {
            let event = tokio::select! {
                biased;
                event = event_rx.recv() => match event {
                    Some(event) => event,
                    None => DomainEvent::Closed,
                },
                result = gateway.recv_result() => match result {
                    Some(result) => DomainEvent::Gateway(result),
                    None => DomainEvent::Closed,
                },
                _ = refresh.tick() => DomainEvent::RefreshTick,
            };

            match event {
                DomainEvent::Input(line) => {
                    if self.handle_input_line(&line, surface, gateway, notifier)? {
                        break;
                    }
                }
                DomainEvent::InputError(message) => {
                    self.state.set_status(ActionId::Input, message);
                    println!("{}", self.state.status.message);
                }
                DomainEvent::Gateway(result) => {
                    let events = self.handle_gateway_result(result, surface, notifier)?;
                    for event in &events {
                        log::debug!("app event: {event:?}");
                    }
                    println!("{}", self.state.status.message);
                }
                DomainEvent::RefreshTick => {
                    if self.config.refresh.poll_interval_ms > 0 {
                        self.poll_new_molts(surface, gateway)?;
                    }
                }
                DomainEvent::Closed => break,
            }
        }

        input_task.abort();
        Ok(())
    }

    /// Returns `true` when the command asks to quit.
    pub(super) fn handle_input_line(
        &mut self,
        line: &str,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
        notifier: &mut dyn Notifier,
    ) -> AppResult<bool> {
        let command = match parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(false),
            Err(err) => {
                self.state.set_status(ActionId::Input, err.to_string());
                println!("{}", self.state.status.message);
                return Ok(false);
            }
        };

        let action_id = command.action_id();
        let dispatched = match self.dispatch_command(command, surface, gateway, notifier) {
            Ok(dispatched) => dispatched,
            // Local rejections (unknown target, already-remolted, bad URL)
            // are user input problems, not loop failures.
            Err(err) if !err.is_remote() => {
                notifier.alert(&err.to_string());
                self.state.set_status(action_id, err.to_string());
                println!("{}", self.state.status.message);
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        println!("{}", self.state.status.message);
        Ok(dispatched.outcome == CommandOutcome::QuitRequested)
    }
}

fn spawn_input_reader(event_tx: UnboundedSender<DomainEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let event = match lines.next_line().await {
                Ok(Some(line)) => DomainEvent::Input(line),
                Ok(None) => DomainEvent::Closed,
                Err(err) => DomainEvent::InputError(format!("failed to read input: {err}")),
            };
            let closing = matches!(event, DomainEvent::Closed);
            if event_tx.send(event).is_err() || closing {
                break;
            }
        }
    })
}
