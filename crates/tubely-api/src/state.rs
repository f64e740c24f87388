//! Application state shared by every handler.

use std::sync::Arc;
use tubely_core::{Config, StorageSlot};
use tubely_db::VideoStore;
use tubely_processing::{MediaInspector, MediaRemuxer};
use tubely_storage::Storage;

/// Everything a request needs, built once at startup.
///
/// Handlers receive `State<Arc<AppState>>`; nothing in here is mutated after construction.
pub struct AppState {
    pub config: Arc<Config>,
    pub videos: Arc<dyn VideoStore>,
    pub thumbnail_storage: Arc<dyn Storage>,
    pub video_storage: Arc<dyn Storage>,
    pub inspector: Arc<dyn MediaInspector>,
    pub remuxer: Arc<dyn MediaRemuxer>,
}

impl AppState {
    pub fn storage_for(&self, slot: StorageSlot) -> &Arc<dyn Storage> {
        match slot {
            StorageSlot::Thumbnail => &self.thumbnail_storage,
            StorageSlot::Video => &self.video_storage,
        }
    }
}
