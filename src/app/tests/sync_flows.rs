//! End-to-end flows through command dispatch and result handling, with a
//! scripted transport standing in for the server.

use std::sync::{Arc, Mutex};

use crate::action::ActionKind;
use crate::command::{Command, CommandOutcome, parse_line};
use crate::config::Config;
use crate::error::AppResult;
use crate::event::{AppEvent, NavReason};
use crate::gateway::{RequestGateway, Transport, WireRequest, WireResponse};
use crate::notify::test_support::RecordingNotifier;
use crate::page::{FollowIntent, MemoryPage, NavIcon, NavItemId, PageSurface, TargetId, TargetState};

use super::super::App;

struct ScriptedTransport {
    requests: Mutex<Vec<WireRequest>>,
    respond: Box<dyn Fn(&WireRequest) -> AppResult<WireResponse> + Send + Sync>,
}

impl ScriptedTransport {
    fn new(
        respond: impl Fn(&WireRequest) -> AppResult<WireResponse> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    fn recorded(&self) -> Vec<WireRequest> {
        self.requests.lock().expect("request log should lock").clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &WireRequest) -> AppResult<WireResponse> {
        self.requests
            .lock()
            .expect("request log should lock")
            .push(request.clone());
        (self.respond)(request)
    }
}

struct Harness {
    app: App,
    page: MemoryPage,
    gateway: RequestGateway,
    notifier: RecordingNotifier,
}

impl Harness {
    fn new(transport: Arc<ScriptedTransport>) -> Self {
        Self {
            app: App::new(Config::default()).expect("default config should build"),
            page: MemoryPage::new(),
            gateway: RequestGateway::spawn("http://molt.test", 1, transport)
                .expect("gateway should spawn"),
            notifier: RecordingNotifier::default(),
        }
    }

    fn dispatch(&mut self, line: &str) -> CommandOutcome {
        let command = parse_line(line)
            .expect("command should parse")
            .expect("line should not be blank");
        self.dispatch_command(command)
    }

    fn dispatch_command(&mut self, command: Command) -> CommandOutcome {
        self.app
            .dispatch_command(command, &mut self.page, &mut self.gateway, &mut self.notifier)
            .expect("dispatch should succeed")
            .outcome
    }

    fn handle_line(&mut self, line: &str) -> bool {
        self.app
            .handle_input_line(line, &mut self.page, &mut self.gateway, &mut self.notifier)
            .expect("input handling should survive user errors")
    }

    async fn settle_next(&mut self) -> Vec<AppEvent> {
        let result = self
            .gateway
            .recv_result()
            .await
            .expect("a result should arrive");
        self.app
            .handle_gateway_result(result, &mut self.page, &mut self.notifier)
            .expect("result handling should succeed")
    }
}

fn fragment_body(title: &str, body: &str) -> String {
    serde_json::json!({
        "title": title,
        "heading": title,
        "body": body,
    })
    .to_string()
}

fn ok(body: impl Into<String>) -> AppResult<WireResponse> {
    Ok(WireResponse {
        status: 200,
        body: body.into(),
    })
}

#[tokio::test]
async fn remolt_failure_round_trips_through_commands() {
    let transport = ScriptedTransport::new(|_| {
        Ok(WireResponse {
            status: 500,
            body: String::new(),
        })
    });
    let mut harness = Harness::new(transport);
    let target = TargetId::new("remolt-molt-9");
    harness.page.insert_target(
        target.clone(),
        TargetState {
            counter: Some(5),
            ..TargetState::default()
        },
    );

    assert_eq!(harness.dispatch("remolt remolt-molt-9"), CommandOutcome::Applied);
    assert_eq!(harness.page.counter(&target).expect("target exists"), Some(6));
    assert!(harness.page.toggle_state(&target).expect("target exists"));

    let events = harness.settle_next().await;

    assert_eq!(
        events,
        vec![AppEvent::ActionRolledBack {
            target: target.clone(),
            kind: ActionKind::Remolt,
        }]
    );
    assert_eq!(harness.page.counter(&target).expect("target exists"), Some(5));
    assert!(!harness.page.toggle_state(&target).expect("target exists"));
    assert_eq!(harness.notifier.toasts, vec!["Failed to remolt"]);
    assert_eq!(harness.app.state.status.message, "remolt rolled back for remolt-molt-9");
}

#[tokio::test]
async fn navigation_command_updates_page_navbar_and_address() {
    let transport = ScriptedTransport::new(|request| {
        assert!(request.url.starts_with("http://molt.test/notifications/"));
        ok(fragment_body("Notifications", "<div>3 new</div>"))
    });
    let mut harness = Harness::new(transport);
    harness
        .page
        .insert_nav_item(NavItemId::new("nav-home"), true);
    harness
        .page
        .insert_nav_item(NavItemId::new("nav-notifications"), false);

    assert_eq!(
        harness.dispatch("nav /notifications nav-notifications"),
        CommandOutcome::Applied
    );
    let events = harness.settle_next().await;

    assert_eq!(
        events,
        vec![AppEvent::NavigationCompleted {
            url: "/notifications/".to_string(),
            title: "Notifications | Molt".to_string(),
            reason: NavReason::Link,
        }]
    );
    assert_eq!(harness.app.state.current_url, "/notifications/");
    assert_eq!(harness.page.title(), "Notifications | Molt");
    assert_eq!(
        harness.page.active_nav(),
        Some(NavItemId::new("nav-notifications"))
    );
    assert_eq!(
        harness.page.nav_icon(&NavItemId::new("nav-home")),
        Some(NavIcon::Static)
    );
}

#[tokio::test]
async fn form_actions_post_to_the_current_page_path() {
    let transport = ScriptedTransport::new(|request| match request.method {
        crate::gateway::Method::Get => ok(fragment_body("alice", "<div>profile</div>")),
        crate::gateway::Method::Post => ok("{}"),
    });
    let mut harness = Harness::new(transport.clone());
    harness.page.insert_target(
        TargetId::new("follow-alice"),
        TargetState {
            follow_intent: Some(FollowIntent::Follow),
            ..TargetState::default()
        },
    );

    // Land on a profile page first, then follow from it.
    harness.dispatch("nav /user/alice");
    harness.settle_next().await;
    harness.dispatch("follow follow-alice");
    harness.settle_next().await;

    let recorded = transport.recorded();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[1].url, "http://molt.test/user/alice/");
    assert_eq!(
        recorded[1].params,
        vec![("user_action".to_string(), "follow".to_string())]
    );
}

#[tokio::test]
async fn second_like_while_pending_is_a_noop_with_explanation() {
    let transport = ScriptedTransport::new(|_| ok("{}"));
    let mut harness = Harness::new(transport);
    let target = TargetId::new("like-molt-1");
    harness.page.insert_target(
        target.clone(),
        TargetState {
            counter: Some(3),
            ..TargetState::default()
        },
    );

    assert_eq!(harness.dispatch("like like-molt-1"), CommandOutcome::Applied);
    assert_eq!(harness.dispatch("like like-molt-1"), CommandOutcome::Noop);
    assert_eq!(
        harness.app.state.status.message,
        "an action is already pending for like-molt-1"
    );
    // The counter reflects exactly one optimistic application.
    assert_eq!(harness.page.counter(&target).expect("target exists"), Some(4));

    let events = harness.settle_next().await;
    assert_eq!(
        events,
        vec![AppEvent::ActionConfirmed {
            target,
            kind: ActionKind::Like,
        }]
    );
}

#[tokio::test]
async fn refresh_poll_feeds_badges_and_substitutes_last_refresh() {
    let transport = ScriptedTransport::new(|_| {
        ok(serde_json::json!({ "count": 2, "unread_notifications": 5 }).to_string())
    });
    let mut harness = Harness::new(transport.clone());
    harness.page.set_last_refresh("1724630400");

    assert_eq!(harness.dispatch("refresh"), CommandOutcome::Applied);
    // A second poll while one is in flight is skipped.
    assert_eq!(harness.dispatch("refresh"), CommandOutcome::Noop);

    let events = harness.settle_next().await;
    assert!(events.is_empty());
    assert_eq!(harness.notifier.new_molt_indicator, Some(2));
    assert_eq!(harness.notifier.unread_badge, Some(5));
    assert_eq!(harness.app.state.status.message, "2 new molts");

    let recorded = transport.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].url, "http://molt.test/ajax_request/new_molts");
    assert_eq!(
        recorded[0].params,
        vec![("timestamp".to_string(), "1724630400".to_string())]
    );

    // The guard clears once the result lands.
    assert_eq!(harness.dispatch("refresh"), CommandOutcome::Applied);
}

#[tokio::test]
async fn malformed_refresh_payload_is_reported_not_fatal() {
    let transport = ScriptedTransport::new(|_| ok("<html>oops</html>"));
    let mut harness = Harness::new(transport);

    harness.dispatch("refresh");
    let events = harness.settle_next().await;

    assert!(events.is_empty());
    assert_eq!(harness.notifier.new_molt_indicator, None);
    assert_eq!(harness.app.state.status.message, "refresh failed");
}

#[tokio::test]
async fn history_commands_replay_without_new_requests() {
    let transport = ScriptedTransport::new(|request| {
        let title = if request.url.contains("notifications") {
            "Notifications"
        } else {
            "Home"
        };
        ok(fragment_body(title, &format!("<div>{title}</div>")))
    });
    let mut harness = Harness::new(transport.clone());

    harness.dispatch("nav /");
    harness.settle_next().await;
    harness.dispatch("nav /notifications");
    harness.settle_next().await;
    let requests_before = transport.recorded().len();

    assert_eq!(harness.dispatch("back"), CommandOutcome::Applied);
    assert_eq!(harness.app.state.current_url, "/");
    assert_eq!(harness.page.body(), "<div>Home</div>");

    assert_eq!(harness.dispatch("forward"), CommandOutcome::Applied);
    assert_eq!(harness.app.state.current_url, "/notifications/");
    assert_eq!(harness.page.body(), "<div>Notifications</div>");

    assert_eq!(harness.dispatch("forward"), CommandOutcome::Noop);
    assert_eq!(transport.recorded().len(), requests_before);
}

#[tokio::test]
async fn excluded_route_and_quit_paths() {
    let transport = ScriptedTransport::new(|_| ok("{}"));
    let mut harness = Harness::new(transport.clone());

    assert_eq!(harness.dispatch("nav /logout/"), CommandOutcome::Applied);
    assert_eq!(harness.page.hard_navigations(), ["/logout/"]);
    assert!(transport.recorded().is_empty());

    assert_eq!(harness.dispatch("quit"), CommandOutcome::QuitRequested);
}

#[tokio::test]
async fn scroll_back_control_tracks_position_and_hides_after_navigation() {
    let transport = ScriptedTransport::new(|_| ok(fragment_body("Home", "<p>molts</p>")));
    let mut harness = Harness::new(transport);

    // Below the threshold nothing shows and activation is a no-op.
    assert_eq!(harness.dispatch("scroll 100"), CommandOutcome::Applied);
    assert_eq!(harness.dispatch("top"), CommandOutcome::Noop);
    assert_eq!(harness.page.scroll_y(), 100);

    assert_eq!(harness.dispatch("scroll 900"), CommandOutcome::Applied);
    assert_eq!(
        harness.app.state.status.message,
        "scrolled to 900, back-to-top shown"
    );
    assert_eq!(harness.dispatch("top"), CommandOutcome::Applied);
    assert_eq!(harness.page.scroll_y(), 0);
    assert_eq!(harness.dispatch("top"), CommandOutcome::Noop);

    // A completed navigation resets scroll, so the control hides with it.
    harness.dispatch("scroll 900");
    harness.dispatch("nav /");
    harness.settle_next().await;
    assert_eq!(harness.page.scroll_y(), 0);
    assert_eq!(harness.dispatch("top"), CommandOutcome::Noop);
}

#[tokio::test]
async fn invalid_commands_are_surfaced_without_ending_the_session() {
    let transport = ScriptedTransport::new(|_| ok("{}"));
    let mut harness = Harness::new(transport);
    let liked = TargetId::new("like-molt-1");
    harness.page.insert_target(
        liked.clone(),
        TargetState {
            counter: Some(3),
            ..TargetState::default()
        },
    );
    harness.page.insert_target(
        TargetId::new("remolt-molt-2"),
        TargetState {
            toggled: true,
            ..TargetState::default()
        },
    );

    assert!(!harness.handle_line("like molt-99"));
    assert_eq!(
        harness.notifier.alerts,
        vec!["invalid argument: unknown target: molt-99"]
    );

    assert!(!harness.handle_line("remolt remolt-molt-2"));
    assert_eq!(
        harness.notifier.alerts.last().map(String::as_str),
        Some("invalid argument: already remolted")
    );
    // The already-remolted state is untouched by the rejection.
    assert!(
        harness
            .page
            .toggle_state(&TargetId::new("remolt-molt-2"))
            .expect("target exists")
    );

    // The session keeps accepting commands afterwards.
    assert!(!harness.handle_line("like like-molt-1"));
    assert_eq!(harness.page.counter(&liked).expect("target exists"), Some(4));
    let events = harness.settle_next().await;
    assert_eq!(
        events,
        vec![AppEvent::ActionConfirmed {
            target: liked,
            kind: ActionKind::Like,
        }]
    );

    assert!(harness.handle_line("quit"));
}

#[tokio::test]
async fn status_command_summarizes_the_session() {
    let transport = ScriptedTransport::new(|_| ok("{}"));
    let mut harness = Harness::new(transport);
    harness
        .page
        .insert_target(TargetId::new("molt-menu-1"), TargetState::default());

    harness.dispatch("menu molt-menu-1");
    assert_eq!(harness.dispatch("status"), CommandOutcome::Applied);
    assert_eq!(
        harness.app.state.status.message,
        "at / | history 0 | pending actions 0 | dropdown molt-menu-1"
    );

    harness.dispatch("dismiss");
    harness.dispatch("status");
    assert_eq!(
        harness.app.state.status.message,
        "at / | history 0 | pending actions 0 | dropdown closed"
    );
}
