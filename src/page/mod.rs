mod store;
mod traits;

pub use store::{MemoryPage, TargetState};
pub use traits::{
    FollowIntent, ListenerHandle, NavIcon, NavItemId, OverlayHandle, PageSurface, TargetId,
};
