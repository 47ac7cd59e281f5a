use crate::page::{NavItemId, TargetId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Navigate {
        url: String,
        nav_item: Option<NavItemId>,
    },
    HistoryBack,
    HistoryForward,
    Like {
        target: TargetId,
    },
    Follow {
        target: TargetId,
    },
    Remolt {
        target: TargetId,
    },
    UndoRemolt {
        target: TargetId,
    },
    DeleteMolt {
        target: TargetId,
    },
    Molt {
        content: String,
    },
    ToggleDropdown {
        target: TargetId,
    },
    DismissDropdown,
    Scroll {
        y: u32,
    },
    ScrollTop,
    Refresh,
    Status,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionId {
    Navigate,
    HistoryBack,
    HistoryForward,
    Like,
    Follow,
    Remolt,
    UndoRemolt,
    DeleteMolt,
    Molt,
    ToggleDropdown,
    DismissDropdown,
    Scroll,
    ScrollTop,
    Refresh,
    Status,
    Quit,
    Input,
}

impl Command {
    pub fn action_id(&self) -> ActionId {
        match self {
            Self::Navigate { .. } => ActionId::Navigate,
            Self::HistoryBack => ActionId::HistoryBack,
            Self::HistoryForward => ActionId::HistoryForward,
            Self::Like { .. } => ActionId::Like,
            Self::Follow { .. } => ActionId::Follow,
            Self::Remolt { .. } => ActionId::Remolt,
            Self::UndoRemolt { .. } => ActionId::UndoRemolt,
            Self::DeleteMolt { .. } => ActionId::DeleteMolt,
            Self::Molt { .. } => ActionId::Molt,
            Self::ToggleDropdown { .. } => ActionId::ToggleDropdown,
            Self::DismissDropdown => ActionId::DismissDropdown,
            Self::Scroll { .. } => ActionId::Scroll,
            Self::ScrollTop => ActionId::ScrollTop,
            Self::Refresh => ActionId::Refresh,
            Self::Status => ActionId::Status,
            Self::Quit => ActionId::Quit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Noop,
    QuitRequested,
}
