//! Data models for Recall

mod app_setting;
mod deck;
mod goal;
mod record;
mod sync_status;

pub use app_setting::AppSetting;
pub use deck::{Card, Deck};
pub use goal::Goal;
pub use record::{apply_patch, last_updated, validate_common, RecordId, RecordKind, SyncRecord};
pub use sync_status::SyncStatus;
