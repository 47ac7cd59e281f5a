mod core;
mod event_loop;
mod state;
#[cfg(test)]
mod tests;

pub use self::core::{App, CommandDispatchResult};
pub use state::{AppState, StatusState};
