/// Boundary to the toast/badge presenter the server-rendered page ships.
/// The engine only ever reports through this seam; how a toast looks is not
/// this crate's concern.
pub trait Notifier: Send {
    /// Transient, non-blocking notice (failure toasts).
    fn toast(&mut self, message: &str);
    /// Blocking notice for invariant violations caught before any request.
    fn alert(&mut self, message: &str);
    fn set_unread_badge(&mut self, count: u64);
    fn set_new_molt_indicator(&mut self, count: u64);
}

/// Notifier for the headless client: everything goes to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn toast(&mut self, message: &str) {
        log::info!("toast: {message}");
    }

    fn alert(&mut self, message: &str) {
        log::warn!("alert: {message}");
    }

    fn set_unread_badge(&mut self, count: u64) {
        log::info!("unread badge: {count}");
    }

    fn set_new_molt_indicator(&mut self, count: u64) {
        log::info!("new molts available: {count}");
    }
}
