//! View counting

use crate::error::StoreError;
use crate::storage::Persisted;
use crate::types::{StatsData, VideoData};
use tracing::{info, warn};

/// Counts one view per Player mount that is allowed to play
#[derive(Clone)]
pub struct ViewReporter {
    stats: Persisted<StatsData>,
}

impl ViewReporter {
    pub fn new(stats: Persisted<StatsData>) -> Self {
        Self { stats }
    }

    /// Increment `totalViews` if `video` permits playback.
    ///
    /// Returns the new total, or `None` when nothing was counted.
    pub fn report_mount(&self, video: &VideoData) -> Result<Option<u64>, StoreError> {
        if !video.playback_permitted() {
            return Ok(None);
        }

        let stats = self.stats.update(|prev| StatsData {
            total_views: prev.total_views.saturating_add(1),
        });

        match stats {
            Ok(stats) => {
                info!(total_views = stats.total_views, "Counted view");
                Ok(Some(stats.total_views))
            }
            Err(e) => {
                warn!(error = %e, "View counted for this session only");
                Err(e)
            }
        }
    }
}
