use crate::page::PageSurface;

/// Back-to-top control: visible once the page has scrolled past a
/// threshold, hidden at the top. The visible flag is instance state, one
/// control per page session.
#[derive(Debug)]
pub struct ScrollBackControl {
    threshold: u32,
    visible: bool,
}

impl ScrollBackControl {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Recomputes visibility from the current scroll position. Returns
    /// `true` when the visible state changed.
    pub fn observe(&mut self, scroll_y: u32) -> bool {
        let visible = scroll_y > self.threshold;
        let changed = visible != self.visible;
        self.visible = visible;
        changed
    }

    /// Scrolls back to the top; the control hides with the scroll.
    pub fn activate(&mut self, surface: &mut dyn PageSurface) {
        surface.scroll_to_top();
        self.observe(surface.scroll_y());
    }
}

#[cfg(test)]
mod tests {
    use crate::page::{MemoryPage, PageSurface};

    use super::ScrollBackControl;

    #[test]
    fn visibility_flips_strictly_past_the_threshold() {
        let mut control = ScrollBackControl::new(400);
        assert!(!control.is_visible());

        assert!(!control.observe(400));
        assert!(!control.is_visible());

        assert!(control.observe(401));
        assert!(control.is_visible());

        // Same side of the threshold reports no change.
        assert!(!control.observe(900));
        assert!(control.observe(0));
        assert!(!control.is_visible());
    }

    #[test]
    fn activation_scrolls_to_top_and_hides_the_control() {
        let mut page = MemoryPage::new();
        page.set_scroll(900);
        let mut control = ScrollBackControl::new(400);
        control.observe(page.scroll_y());
        assert!(control.is_visible());

        control.activate(&mut page);

        assert_eq!(page.scroll_y(), 0);
        assert!(!control.is_visible());
    }
}
