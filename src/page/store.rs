use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::error::{AppError, AppResult};
use crate::gateway::PageFragment;

use super::traits::{
    FollowIntent, ListenerHandle, NavIcon, NavItemId, OverlayHandle, PageSurface, TargetId,
};

#[derive(Debug, Clone, Default)]
pub struct TargetState {
    pub toggled: bool,
    pub counter: Option<i64>,
    pub linked_counter: Option<TargetId>,
    pub follow_intent: Option<FollowIntent>,
    pub ephemeral_remolt: bool,
    pub tombstone: Option<String>,
}

#[derive(Debug, Clone)]
struct NavItemState {
    active: bool,
    pending: bool,
    icon: NavIcon,
}

/// UI-state store keyed by target identifier: the in-memory stand-in for a
/// live document. Every accessor of [`PageSurface`] reads and writes here,
/// so tests can assert the exact visible state a browser would show.
#[derive(Debug, Default)]
pub struct MemoryPage {
    title: String,
    heading: String,
    body: String,
    scroll_y: u32,
    last_refresh: Option<String>,
    compose_uploading: bool,
    targets: BTreeMap<TargetId, TargetState>,
    nav_items: BTreeMap<NavItemId, NavItemState>,
    hard_navigations: Vec<String>,
    overlays: HashSet<OverlayHandle>,
    listeners: HashSet<ListenerHandle>,
    next_handle: u64,
    listeners_installed_total: u64,
    listeners_removed_total: u64,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_target(&mut self, id: TargetId, state: TargetState) {
        self.targets.insert(id, state);
    }

    pub fn insert_nav_item(&mut self, id: NavItemId, active: bool) {
        self.nav_items.insert(
            id,
            NavItemState {
                active,
                pending: false,
                icon: if active {
                    NavIcon::Filled
                } else {
                    NavIcon::Static
                },
            },
        );
    }

    pub fn set_last_refresh(&mut self, marker: impl Into<String>) {
        self.last_refresh = Some(marker.into());
    }

    // Inspection for tests and the smoke client.

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn compose_uploading(&self) -> bool {
        self.compose_uploading
    }

    pub fn hard_navigations(&self) -> &[String] {
        &self.hard_navigations
    }

    pub fn target(&self, id: &TargetId) -> Option<&TargetState> {
        self.targets.get(id)
    }

    pub fn active_nav_count(&self) -> usize {
        self.nav_items.values().filter(|item| item.active).count()
    }

    pub fn open_overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn installed_listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listener_totals(&self) -> (u64, u64) {
        (self.listeners_installed_total, self.listeners_removed_total)
    }

    fn target_state(&self, id: &TargetId) -> AppResult<&TargetState> {
        self.targets
            .get(id)
            .ok_or_else(|| AppError::invalid_argument(format!("unknown target: {id}")))
    }

    fn target_state_mut(&mut self, id: &TargetId) -> AppResult<&mut TargetState> {
        self.targets
            .get_mut(id)
            .ok_or_else(|| AppError::invalid_argument(format!("unknown target: {id}")))
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1);
        handle
    }
}

impl PageSurface for MemoryPage {
    fn apply_fragment(&mut self, fragment: &PageFragment, title_suffix: &str) {
        self.title = format!("{} | {title_suffix}", fragment.title);
        self.heading = fragment.heading.clone();
        self.body = fragment.body.clone();
    }

    fn restore_snapshot(&mut self, title: &str, body: &str) {
        self.title = title.to_string();
        self.body = body.to_string();
    }

    fn scroll_to_top(&mut self) {
        self.scroll_y = 0;
    }

    fn scroll_y(&self) -> u32 {
        self.scroll_y
    }

    fn set_scroll(&mut self, y: u32) {
        self.scroll_y = y;
    }

    fn hard_navigate(&mut self, url: &str) {
        self.hard_navigations.push(url.to_string());
    }

    fn last_refresh(&self) -> Option<String> {
        self.last_refresh.clone()
    }

    fn set_nav_pending(&mut self, item: &NavItemId, pending: bool) {
        if let Some(state) = self.nav_items.get_mut(item) {
            state.pending = pending;
            if pending {
                state.icon = NavIcon::Loading;
            }
        }
    }

    fn pending_nav(&self) -> Option<NavItemId> {
        self.nav_items
            .iter()
            .find(|(_, state)| state.pending)
            .map(|(id, _)| id.clone())
    }

    fn active_nav(&self) -> Option<NavItemId> {
        self.nav_items
            .iter()
            .find(|(_, state)| state.active)
            .map(|(id, _)| id.clone())
    }

    fn set_nav_active(&mut self, item: &NavItemId, active: bool) {
        if let Some(state) = self.nav_items.get_mut(item) {
            state.active = active;
        }
    }

    fn show_nav_icon(&mut self, item: &NavItemId, icon: NavIcon) {
        if let Some(state) = self.nav_items.get_mut(item) {
            state.icon = icon;
        }
    }

    fn nav_icon(&self, item: &NavItemId) -> Option<NavIcon> {
        self.nav_items.get(item).map(|state| state.icon)
    }

    fn toggle_state(&self, target: &TargetId) -> AppResult<bool> {
        Ok(self.target_state(target)?.toggled)
    }

    fn set_toggle_state(&mut self, target: &TargetId, on: bool) -> AppResult<()> {
        self.target_state_mut(target)?.toggled = on;
        Ok(())
    }

    fn counter(&self, target: &TargetId) -> AppResult<Option<i64>> {
        Ok(self.target_state(target)?.counter)
    }

    fn adjust_counter(&mut self, target: &TargetId, delta: i64) -> AppResult<()> {
        let state = self.target_state_mut(target)?;
        let Some(counter) = state.counter.as_mut() else {
            return Err(AppError::invalid_argument(format!(
                "target has no counter: {target}"
            )));
        };
        *counter += delta;
        Ok(())
    }

    fn linked_counter(&self, target: &TargetId) -> AppResult<Option<TargetId>> {
        Ok(self.target_state(target)?.linked_counter.clone())
    }

    fn follow_intent(&self, target: &TargetId) -> AppResult<FollowIntent> {
        self.target_state(target)?.follow_intent.ok_or_else(|| {
            AppError::invalid_argument(format!("target has no follow intent field: {target}"))
        })
    }

    fn set_follow_intent(&mut self, target: &TargetId, intent: FollowIntent) -> AppResult<()> {
        self.target_state_mut(target)?.follow_intent = Some(intent);
        Ok(())
    }

    fn is_ephemeral_remolt(&self, target: &TargetId) -> AppResult<bool> {
        Ok(self.target_state(target)?.ephemeral_remolt)
    }

    fn remove_target(&mut self, target: &TargetId) -> AppResult<()> {
        if self.targets.remove(target).is_none() {
            return Err(AppError::invalid_argument(format!(
                "unknown target: {target}"
            )));
        }
        Ok(())
    }

    fn replace_with_tombstone(&mut self, target: &TargetId, message: &str) -> AppResult<()> {
        self.target_state_mut(target)?.tombstone = Some(message.to_string());
        Ok(())
    }

    fn set_compose_uploading(&mut self, uploading: bool) {
        self.compose_uploading = uploading;
    }

    fn open_overlay(&mut self, _anchor: &TargetId) -> OverlayHandle {
        let handle = OverlayHandle(self.next_handle());
        self.overlays.insert(handle);
        handle
    }

    fn close_overlay(&mut self, handle: OverlayHandle) {
        self.overlays.remove(&handle);
    }

    fn install_dismiss_listener(&mut self) -> ListenerHandle {
        let handle = ListenerHandle(self.next_handle());
        self.listeners.insert(handle);
        self.listeners_installed_total += 1;
        handle
    }

    fn remove_dismiss_listener(&mut self, handle: ListenerHandle) {
        if self.listeners.remove(&handle) {
            self.listeners_removed_total += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_counter(count: i64) -> (MemoryPage, TargetId) {
        let mut page = MemoryPage::new();
        let target = TargetId::new("like-molt-1");
        page.insert_target(
            target.clone(),
            TargetState {
                counter: Some(count),
                ..TargetState::default()
            },
        );
        (page, target)
    }

    #[test]
    fn fragment_projection_sets_chrome_with_suffix() {
        let mut page = MemoryPage::new();
        page.set_scroll(400);
        let fragment = PageFragment {
            title: "Notifications".to_string(),
            heading: "Notifications".to_string(),
            body: "<div>3 new</div>".to_string(),
        };

        page.apply_fragment(&fragment, "Molt");
        page.scroll_to_top();

        assert_eq!(page.title(), "Notifications | Molt");
        assert_eq!(page.heading(), "Notifications");
        assert_eq!(page.body(), "<div>3 new</div>");
        assert_eq!(page.scroll_y(), 0);
    }

    #[test]
    fn counter_adjustment_requires_counter_element() {
        let (mut page, target) = page_with_counter(5);
        page.adjust_counter(&target, 1).expect("counter adjusts");
        assert_eq!(page.counter(&target).expect("target exists"), Some(6));

        let bare = TargetId::new("bare");
        page.insert_target(bare.clone(), TargetState::default());
        assert!(page.adjust_counter(&bare, 1).is_err());
    }

    #[test]
    fn unknown_target_reads_are_errors_not_panics() {
        let page = MemoryPage::new();
        let missing = TargetId::new("nope");
        assert!(page.toggle_state(&missing).is_err());
        assert!(page.counter(&missing).is_err());
    }

    #[test]
    fn listener_totals_track_install_and_remove() {
        let mut page = MemoryPage::new();
        let first = page.install_dismiss_listener();
        let second = page.install_dismiss_listener();
        page.remove_dismiss_listener(first);
        // Removing an already-removed handle must not double count.
        page.remove_dismiss_listener(first);
        page.remove_dismiss_listener(second);

        assert_eq!(page.installed_listener_count(), 0);
        assert_eq!(page.listener_totals(), (2, 2));
    }
}
