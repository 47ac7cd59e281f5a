mod controller;
mod history;
mod scrollback;

pub use controller::{NavFinish, NavigateDisposition, NavigationController, normalize_url};
pub use history::{HistoryEntry, HistoryStack};
pub use scrollback::ScrollBackControl;
