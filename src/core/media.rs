//! Media element abstraction and the headless element

use crate::core::controller::Event;
use crate::error::MediaError;
use crate::utils::timer::ScheduledTask;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::trace;

/// Something the element reports on its own. These are authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    /// Playback actually started
    Playing,
    /// Playback actually paused
    Paused,
    /// Playback reached the end of the media
    Ended,
}

/// Where an element posts its [`MediaEvent`]s
#[derive(Debug, Clone)]
pub struct MediaEventSink {
    tx: UnboundedSender<Event>,
}

impl MediaEventSink {
    pub(crate) fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    /// Post an event; dropped silently once the controller is gone
    pub fn emit(&self, event: MediaEvent) {
        trace!(?event, "Media event");
        let _ = self.tx.send(Event::Media(event));
    }
}

/// The host's native playback surface
#[async_trait]
pub trait MediaElement: Send + Sync + 'static {
    /// Called once by the controller that owns this element
    fn attach(&self, sink: MediaEventSink);

    /// Begin playback. Resolves when the element accepted or refused.
    async fn play(&self) -> Result<(), MediaError>;

    async fn pause(&self) -> Result<(), MediaError>;

    /// Set the current position to 0
    async fn seek_to_start(&self) -> Result<(), MediaError>;

    /// Whether anything is presented fullscreen right now
    async fn is_fullscreen(&self) -> bool;

    async fn request_fullscreen(&self) -> Result<(), MediaError>;
}

// ============================================
// Headless element
// ============================================

/// Behavior knobs for [`HeadlessElement`]
#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    /// Simulated clip length
    pub duration: Duration,
    /// When set, every `play` is refused with this reason
    pub reject_play: Option<String>,
    /// When false, `request_fullscreen` fails with `NotSupported`
    pub fullscreen_supported: bool,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            reject_play: None,
            fullscreen_supported: true,
        }
    }
}

#[derive(Debug, Default)]
struct Clip {
    position: Duration,
    playing_since: Option<Instant>,
    fullscreen: bool,
    end_timer: ScheduledTask,
}

impl Clip {
    fn current_position(&self) -> Duration {
        match self.playing_since {
            Some(since) => self.position + since.elapsed(),
            None => self.position,
        }
    }
}

#[derive(Debug)]
struct Shared {
    options: HeadlessOptions,
    clip: Mutex<Clip>,
    sink: OnceLock<MediaEventSink>,
}

impl Shared {
    fn clip(&self) -> MutexGuard<'_, Clip> {
        self.clip.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(sink) = self.sink.get() {
            sink.emit(event);
        }
    }
}

/// An element with no decoder behind it: a clock that runs for `duration`.
///
/// Emits events in the same order a browser video element does, including
/// the `Paused` that precedes `Ended`.
#[derive(Debug, Clone)]
pub struct HeadlessElement {
    shared: Arc<Shared>,
}

impl HeadlessElement {
    pub fn new(options: HeadlessOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                options,
                clip: Mutex::new(Clip::default()),
                sink: OnceLock::new(),
            }),
        }
    }

    pub fn position(&self) -> Duration {
        self.shared.clip().current_position()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.clip().playing_since.is_some()
    }

    fn arm_end_timer(&self, clip: &mut Clip) {
        let remaining = self.shared.options.duration.saturating_sub(clip.position);
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);

        clip.end_timer.schedule(remaining, move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            {
                let mut clip = shared.clip();
                clip.position = shared.options.duration;
                clip.playing_since = None;
            }
            shared.emit(MediaEvent::Paused);
            shared.emit(MediaEvent::Ended);
        });
    }
}

impl Default for HeadlessElement {
    fn default() -> Self {
        Self::new(HeadlessOptions::default())
    }
}

#[async_trait]
impl MediaElement for HeadlessElement {
    fn attach(&self, sink: MediaEventSink) {
        let _ = self.shared.sink.set(sink);
    }

    async fn play(&self) -> Result<(), MediaError> {
        if let Some(reason) = &self.shared.options.reject_play {
            return Err(MediaError::Rejected(reason.clone()));
        }

        let started = {
            let mut clip = self.shared.clip();
            if clip.playing_since.is_some() {
                false
            } else {
                // Playing from the end starts over, like a browser does
                if clip.position >= self.shared.options.duration {
                    clip.position = Duration::ZERO;
                }
                clip.playing_since = Some(Instant::now());
                self.arm_end_timer(&mut clip);
                true
            }
        };

        if started {
            self.shared.emit(MediaEvent::Playing);
        }
        Ok(())
    }

    async fn pause(&self) -> Result<(), MediaError> {
        let paused = {
            let mut clip = self.shared.clip();
            match clip.playing_since.take() {
                Some(since) => {
                    clip.position += since.elapsed();
                    clip.end_timer.cancel();
                    true
                }
                None => false,
            }
        };

        if paused {
            self.shared.emit(MediaEvent::Paused);
        }
        Ok(())
    }

    async fn seek_to_start(&self) -> Result<(), MediaError> {
        let mut clip = self.shared.clip();
        clip.position = Duration::ZERO;
        if clip.playing_since.is_some() {
            clip.playing_since = Some(Instant::now());
            self.arm_end_timer(&mut clip);
        }
        Ok(())
    }

    async fn is_fullscreen(&self) -> bool {
        self.shared.clip().fullscreen
    }

    async fn request_fullscreen(&self) -> Result<(), MediaError> {
        if !self.shared.options.fullscreen_supported {
            return Err(MediaError::NotSupported);
        }
        self.shared.clip().fullscreen = true;
        Ok(())
    }
}
