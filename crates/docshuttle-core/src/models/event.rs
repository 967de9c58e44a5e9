use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle event broadcast to all connected real-time clients.
///
/// Events carry no payload: they are a signal to re-fetch the full list, not a
/// diff. The wire names match the contract the frontend listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LifecycleEvent {
    #[serde(rename = "newFileAdded")]
    FileAdded,
    #[serde(rename = "fileDeleted")]
    FileDeleted,
}

impl LifecycleEvent {
    /// Wire name of the event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::FileAdded => "newFileAdded",
            LifecycleEvent::FileDeleted => "fileDeleted",
        }
    }
}
