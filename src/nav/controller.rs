use std::collections::HashMap;

use regex::Regex;

use crate::config::NavigationConfig;
use crate::error::{AppError, AppResult};
use crate::gateway::{PageFragment, RequestGateway, RequestId, WireResponse};
use crate::page::{NavIcon, NavItemId, PageSurface};

use super::history::{HistoryEntry, HistoryStack};

/// Canonical trailing-slash form, except when the URL carries a query
/// string: history entries must be stable and comparable.
pub fn normalize_url(url: &str) -> String {
    if url.is_empty() {
        return "/".to_string();
    }
    if url.contains('?') || url.ends_with('/') {
        return url.to_string();
    }
    format!("{url}/")
}

#[derive(Debug, PartialEq, Eq)]
pub enum NavigateDisposition {
    /// A fragment request is in flight; the id correlates its completion.
    Requested(RequestId),
    /// The route is excluded from partial navigation; a real document
    /// navigation was performed instead.
    BypassedExcluded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavFinish {
    Completed { url: String, title: String },
    FellBack { url: String },
}

/// Makes in-app navigation feel instantaneous while keeping the visible
/// document, the history stack, and the navigation bar in agreement.
pub struct NavigationController {
    excluded: Vec<Regex>,
    title_suffix: String,
    history: HistoryStack,
    in_flight: HashMap<RequestId, String>,
}

impl NavigationController {
    pub fn new(config: &NavigationConfig) -> AppResult<Self> {
        let mut excluded = Vec::with_capacity(config.excluded_routes.len());
        for pattern in &config.excluded_routes {
            let regex = Regex::new(pattern).map_err(|source| {
                AppError::invalid_argument(format!(
                    "invalid excluded route pattern {pattern:?}: {source}"
                ))
            })?;
            excluded.push(regex);
        }
        Ok(Self {
            excluded,
            title_suffix: config.title_suffix.clone(),
            history: HistoryStack::new(config.history_capacity),
            in_flight: HashMap::new(),
        })
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn owns(&self, id: RequestId) -> bool {
        self.in_flight.contains_key(&id)
    }

    /// Step 1-3 of a navigation: excluded-route bypass, normalization,
    /// fragment request. `nav_item` is the navbar control the gesture came
    /// from, if any; its pending indicator starts showing immediately.
    pub fn navigate(
        &mut self,
        url: &str,
        nav_item: Option<&NavItemId>,
        surface: &mut dyn PageSurface,
        gateway: &mut RequestGateway,
    ) -> AppResult<NavigateDisposition> {
        if self.is_excluded(url) {
            // Full reload semantics required: server-side session state
            // cannot be invalidated through a partial fetch.
            surface.hard_navigate(url);
            return Ok(NavigateDisposition::BypassedExcluded);
        }

        let normalized = normalize_url(url);
        if let Some(item) = nav_item {
            surface.set_nav_pending(item, true);
        }
        let id = gateway.fetch_fragment(&normalized)?;
        self.in_flight.insert(id, normalized);
        Ok(NavigateDisposition::Requested(id))
    }

    /// Finalizes a navigation whose request completed. Returns `None` for
    /// results this controller did not initiate.
    pub fn finish(
        &mut self,
        id: RequestId,
        result: AppResult<WireResponse>,
        surface: &mut dyn PageSurface,
    ) -> Option<NavFinish> {
        let url = self.in_flight.remove(&id)?;

        let fragment = result.and_then(|response| PageFragment::parse(&response.body));
        let fragment = match fragment {
            Ok(fragment) => fragment,
            Err(err) => {
                log::warn!("partial navigation to {url} failed, navigating directly: {err}");
                Self::clear_pending_indicator(surface);
                surface.hard_navigate(&url);
                return Some(NavFinish::FellBack { url });
            }
        };

        let title = format!("{} | {}", fragment.title, self.title_suffix);
        surface.apply_fragment(&fragment, &self.title_suffix);
        surface.scroll_to_top();
        self.history.push(HistoryEntry {
            url: url.clone(),
            title: title.clone(),
            snapshot: fragment.body,
        });
        Self::sync_nav_bar(surface);
        Some(NavFinish::Completed { url, title })
    }

    /// Replays the previous history entry without a network request.
    pub fn history_back(&mut self, surface: &mut dyn PageSurface) -> Option<&HistoryEntry> {
        let entry = self.history.back()?;
        surface.restore_snapshot(&entry.title, &entry.snapshot);
        surface.scroll_to_top();
        Some(entry)
    }

    /// Replays the next history entry without a network request.
    pub fn history_forward(&mut self, surface: &mut dyn PageSurface) -> Option<&HistoryEntry> {
        let entry = self.history.forward()?;
        surface.restore_snapshot(&entry.title, &entry.snapshot);
        surface.scroll_to_top();
        Some(entry)
    }

    fn is_excluded(&self, url: &str) -> bool {
        self.excluded.iter().any(|regex| regex.is_match(url))
    }

    /// Step 5: exactly one nav item is active afterwards. The item whose
    /// pending indicator is visible takes over; the previous item's static
    /// icon is restored unless it is the same control (no flicker).
    fn sync_nav_bar(surface: &mut dyn PageSurface) {
        let previous = surface.active_nav();
        let Some(next) = surface.pending_nav() else {
            // Navigation did not originate from the navbar.
            return;
        };

        if let Some(prev) = &previous {
            surface.set_nav_active(prev, false);
        }
        surface.set_nav_pending(&next, false);
        surface.set_nav_active(&next, true);
        surface.show_nav_icon(&next, NavIcon::Filled);
        if previous.as_ref() != Some(&next)
            && let Some(prev) = &previous
        {
            surface.show_nav_icon(prev, NavIcon::Static);
        }
    }

    fn clear_pending_indicator(surface: &mut dyn PageSurface) {
        if let Some(pending) = surface.pending_nav() {
            surface.set_nav_pending(&pending, false);
            let icon = if surface.active_nav().as_ref() == Some(&pending) {
                NavIcon::Filled
            } else {
                NavIcon::Static
            };
            surface.show_nav_icon(&pending, icon);
        }
    }
}
