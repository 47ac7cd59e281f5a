use std::fmt;

use crate::error::AppResult;
use crate::gateway::PageFragment;

/// Identifies one togglable control in the rendered page (a like button, a
/// follow button, a remolt control, a molt element).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one navigation-bar item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavItemId(String);

impl NavItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NavItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which of a nav item's stacked icons is currently revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIcon {
    Static,
    Filled,
    Loading,
}

/// Value of the hidden field a follow form submits so the server knows the
/// intended transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowIntent {
    Follow,
    Unfollow,
}

impl FollowIntent {
    pub fn flipped(self) -> Self {
        match self {
            Self::Follow => Self::Unfollow,
            Self::Unfollow => Self::Follow,
        }
    }

    pub fn wire_value(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// The narrow contract with the server-rendered page.
///
/// The rendered presentation is the single source of truth for display
/// state: callers derive a control's binary state by asking the surface,
/// never from a shadow variable. Keeping the strategy behind this trait is
/// what lets the in-memory store below stand in for a live document.
pub trait PageSurface: Send {
    // Document chrome.
    fn apply_fragment(&mut self, fragment: &PageFragment, title_suffix: &str);
    /// History traversal replays a stored snapshot: title and body only,
    /// the way a popstate restore sees the document.
    fn restore_snapshot(&mut self, title: &str, body: &str);
    fn scroll_to_top(&mut self);
    fn scroll_y(&self) -> u32;
    fn set_scroll(&mut self, y: u32);
    /// Real document navigation with full reload semantics. Tears down all
    /// client state on a live page; the store records it for inspection.
    fn hard_navigate(&mut self, url: &str);
    /// Page-scoped last-refresh marker consumed by parameterized requests.
    fn last_refresh(&self) -> Option<String>;

    // Navigation bar.
    fn set_nav_pending(&mut self, item: &NavItemId, pending: bool);
    /// The item whose pending indicator is currently visible, if any.
    fn pending_nav(&self) -> Option<NavItemId>;
    fn active_nav(&self) -> Option<NavItemId>;
    fn set_nav_active(&mut self, item: &NavItemId, active: bool);
    fn show_nav_icon(&mut self, item: &NavItemId, icon: NavIcon);
    fn nav_icon(&self, item: &NavItemId) -> Option<NavIcon>;

    // Interaction targets.
    fn toggle_state(&self, target: &TargetId) -> AppResult<bool>;
    fn set_toggle_state(&mut self, target: &TargetId, on: bool) -> AppResult<()>;
    fn counter(&self, target: &TargetId) -> AppResult<Option<i64>>;
    fn adjust_counter(&mut self, target: &TargetId, delta: i64) -> AppResult<()>;
    /// Separate counter element updated when the target carries none of its
    /// own (the likes total shown in a modal).
    fn linked_counter(&self, target: &TargetId) -> AppResult<Option<TargetId>>;
    fn follow_intent(&self, target: &TargetId) -> AppResult<FollowIntent>;
    fn set_follow_intent(&mut self, target: &TargetId, intent: FollowIntent) -> AppResult<()>;
    /// True when the element exists only by virtue of being a remolt of
    /// another user's post and disappears with the remolt itself.
    fn is_ephemeral_remolt(&self, target: &TargetId) -> AppResult<bool>;
    fn remove_target(&mut self, target: &TargetId) -> AppResult<()>;
    fn replace_with_tombstone(&mut self, target: &TargetId, message: &str) -> AppResult<()>;
    fn set_compose_uploading(&mut self, uploading: bool);

    // Dropdown overlay plumbing.
    fn open_overlay(&mut self, anchor: &TargetId) -> OverlayHandle;
    fn close_overlay(&mut self, handle: OverlayHandle);
    fn install_dismiss_listener(&mut self) -> ListenerHandle;
    fn remove_dismiss_listener(&mut self, handle: ListenerHandle);
}
