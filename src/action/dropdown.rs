use crate::page::{ListenerHandle, OverlayHandle, PageSurface, TargetId};

#[derive(Debug)]
struct OpenDropdown {
    anchor: TargetId,
    overlay: OverlayHandle,
    listener: ListenerHandle,
}

/// Dropdown menus as a strict open/close pair.
///
/// Opening creates a floating overlay anchored to the trigger and installs
/// one document-wide dismissal listener; closing removes both. Every exit
/// path goes through the same close, including a second open elsewhere
/// dismissing the first, so install and remove always balance.
#[derive(Debug, Default)]
pub struct DropdownController {
    open: Option<OpenDropdown>,
}

impl DropdownController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_anchor(&self) -> Option<&TargetId> {
        self.open.as_ref().map(|open| &open.anchor)
    }

    /// Toggle for the given trigger: closes it if it is the open one,
    /// otherwise closes whatever is open and opens this one.
    pub fn toggle(&mut self, anchor: &TargetId, surface: &mut dyn PageSurface) {
        if let Some(open) = &self.open
            && open.anchor == *anchor
        {
            self.close(surface);
            return;
        }

        self.close(surface);
        let overlay = surface.open_overlay(anchor);
        let listener = surface.install_dismiss_listener();
        self.open = Some(OpenDropdown {
            anchor: anchor.clone(),
            overlay,
            listener,
        });
    }

    /// Outside-click path: dismiss whatever is open.
    pub fn dismiss(&mut self, surface: &mut dyn PageSurface) {
        self.close(surface);
    }

    fn close(&mut self, surface: &mut dyn PageSurface) {
        let Some(open) = self.open.take() else {
            return;
        };
        surface.close_overlay(open.overlay);
        surface.remove_dismiss_listener(open.listener);
    }
}
