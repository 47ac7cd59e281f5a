use crate::command::ActionId;

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: String,
    pub last_action_id: Option<ActionId>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Address-bar state: the normalized URL of the last completed
    /// navigation. Forms without a declared action post here.
    pub current_url: String,
    pub status: StatusState,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_url: "/".to_string(),
            status: StatusState::default(),
        }
    }
}

impl AppState {
    /// The path portion of the current URL, query stripped.
    pub fn current_path(&self) -> &str {
        self.current_url
            .split_once('?')
            .map(|(path, _)| path)
            .unwrap_or(&self.current_url)
    }

    pub fn set_status(&mut self, action_id: ActionId, message: impl Into<String>) {
        self.status.last_action_id = Some(action_id);
        self.status.message = message.into();
    }
}
