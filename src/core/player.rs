//! Player surface - availability guard, view counting, playback controller

use crate::core::controller::Controller;
use crate::core::media::MediaElement;
use crate::core::reporter::ViewReporter;
use crate::storage::Store;
use crate::types::{Affordance, Phase, PlaybackState, Route, STATS_DATA_KEY, StatsData, VIDEO_DATA_KEY, VideoData};
use std::sync::Arc;
use tracing::info;

/// What the Player shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Terminal view with a single way out
    Unavailable { admin_link: Route },
    /// The video, with the playback button only while controls are shown
    Video {
        phase: Phase,
        affordance: Option<Affordance>,
    },
}

/// One mount of the Player surface.
///
/// The guard and the view count are evaluated in [`mount`](Self::mount) and
/// never again for this value; re-rendering does not count another view.
#[derive(Debug, Clone)]
pub struct PlayerPage {
    video: VideoData,
    total_views: Option<u64>,
}

impl PlayerPage {
    pub fn mount(store: &Arc<Store>) -> Self {
        let video = store.persisted(VIDEO_DATA_KEY, VideoData::default()).get();
        let reporter = ViewReporter::new(store.persisted(STATS_DATA_KEY, StatsData::default()));

        // A failed count is already logged and must not block playback
        let total_views = reporter.report_mount(&video).ok().flatten();

        info!(
            url = %video.url,
            enabled = video.is_enabled,
            available = video.playback_permitted(),
            "Player mounted"
        );

        Self { video, total_views }
    }

    pub fn video(&self) -> &VideoData {
        &self.video
    }

    pub fn is_available(&self) -> bool {
        self.video.playback_permitted()
    }

    /// Total after this mount's count, when one was recorded
    pub fn total_views(&self) -> Option<u64> {
        self.total_views
    }

    /// Controller for an element already loaded with [`video`](Self::video).
    ///
    /// `None` when playback is not permitted.
    pub fn controller<M: MediaElement>(&self, element: Arc<M>) -> Option<Controller<M>> {
        self.is_available().then(|| Controller::new(element))
    }

    pub fn screen<M: MediaElement>(&self, controller: Option<&Controller<M>>) -> Screen {
        match controller {
            Some(controller) if self.is_available() => Screen::Video {
                phase: controller.phase(),
                affordance: visible_affordance(controller.state(), controller.affordance()),
            },
            _ => Screen::Unavailable {
                admin_link: Route::Admin,
            },
        }
    }
}

fn visible_affordance(state: PlaybackState, affordance: Affordance) -> Option<Affordance> {
    state.show_controls.then_some(affordance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::media::HeadlessElement;

    fn store_with(video: Option<VideoData>) -> Arc<Store> {
        let store = Arc::new(Store::in_memory());
        if let Some(video) = video {
            store.write(VIDEO_DATA_KEY, &video).unwrap();
        }
        store
    }

    fn views(store: &Store) -> u64 {
        store.read(STATS_DATA_KEY, StatsData::default()).total_views
    }

    #[tokio::test]
    async fn test_fresh_store_is_unavailable() {
        let store = store_with(None);
        let page = PlayerPage::mount(&store);

        assert!(!page.is_available());
        assert!(page.controller(Arc::new(HeadlessElement::default())).is_none());
        assert_eq!(
            page.screen::<HeadlessElement>(None),
            Screen::Unavailable {
                admin_link: Route::Admin
            }
        );
        assert_eq!(views(&store), 0);
    }

    #[tokio::test]
    async fn test_disabled_or_empty_never_counts() {
        for video in [
            VideoData {
                url: "https://host/video.mp4".into(),
                is_enabled: false,
            },
            VideoData {
                url: String::new(),
                is_enabled: true,
            },
        ] {
            let store = store_with(Some(video));
            let page = PlayerPage::mount(&store);
            assert!(!page.is_available());
            assert_eq!(page.total_views(), None);
            assert_eq!(views(&store), 0);
        }
    }

    #[tokio::test]
    async fn test_one_count_per_mount_regardless_of_playback() {
        let store = store_with(Some(VideoData {
            url: "https://host/video.mp4".into(),
            is_enabled: true,
        }));

        let page = PlayerPage::mount(&store);
        assert_eq!(page.total_views(), Some(1));

        let mut controller = page.controller(Arc::new(HeadlessElement::default())).unwrap();
        assert_eq!(
            page.screen(Some(&controller)),
            Screen::Video {
                phase: Phase::Idle,
                affordance: Some(Affordance::Play)
            }
        );

        controller.press();
        controller.settle().await;
        assert_eq!(
            page.screen(Some(&controller)),
            Screen::Video {
                phase: Phase::Playing,
                affordance: None
            }
        );
        controller.tap();
        controller.press();
        controller.settle().await;
        assert_eq!(views(&store), 1);

        // Navigating back to the player is a new mount
        let _again = PlayerPage::mount(&store);
        assert_eq!(views(&store), 2);
    }
}
