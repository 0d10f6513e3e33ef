//! Playback controller
//!
//! User intents (optimistic) and media element events (authoritative) feed
//! one ordered queue. A pure [`Machine`] reduces each event into new
//! [`PlaybackState`] plus [`Effect`]s, and the [`Controller`] runs those
//! effects against the element, posting completions back onto the queue.

use crate::core::media::{MediaElement, MediaEvent, MediaEventSink};
use crate::error::MediaError;
use crate::types::{Affordance, PlaybackState, Phase};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Something the viewer did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The play / pause / replay button
    PressAffordance,
    /// Anywhere on the video surface
    TapSurface,
}

/// Everything the reducer reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Intent(Intent),
    Media(MediaEvent),
    /// Start playback without a user gesture
    Autoplay,
    /// A play request finished
    PlayResolved {
        request: u64,
        result: Result<(), MediaError>,
    },
}

/// Work for the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Play {
        request: u64,
        /// Seek to 0 before playing
        from_start: bool,
    },
    Pause,
    /// Enter fullscreen unless something already is
    EnterFullscreen,
}

#[derive(Debug, Clone, Copy)]
struct PendingPlay {
    request: u64,
    user_initiated: bool,
    /// A media event arrived after the request was issued
    confirmed: bool,
}

/// The playback state machine, free of any I/O
#[derive(Debug, Default)]
pub struct Machine {
    state: PlaybackState,
    started: bool,
    pending: Option<PendingPlay>,
    next_request: u64,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        if self.state.video_ended {
            Phase::Ended
        } else if self.state.is_playing {
            Phase::Playing
        } else if self.started {
            Phase::Paused
        } else {
            Phase::Idle
        }
    }

    pub fn affordance(&self) -> Affordance {
        if self.state.video_ended {
            Affordance::Replay
        } else if self.state.is_playing {
            Affordance::Pause
        } else {
            Affordance::Play
        }
    }

    /// Whether a play request is still waiting on the element
    pub fn is_play_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply one event, returning the effects to run
    pub fn reduce(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Intent(Intent::PressAffordance) => match self.affordance() {
                Affordance::Replay => vec![self.request_play(true, true)],
                Affordance::Play => vec![self.request_play(false, true)],
                Affordance::Pause => {
                    self.pending = None;
                    self.state.is_playing = false;
                    self.state.show_controls = true;
                    vec![Effect::Pause]
                }
            },
            Event::Intent(Intent::TapSurface) => {
                if self.state.is_playing {
                    self.state.show_controls = !self.state.show_controls;
                }
                Vec::new()
            }
            Event::Autoplay => {
                if self.state.is_playing {
                    return Vec::new();
                }
                let from_start = self.state.video_ended;
                vec![self.request_play(from_start, false)]
            }
            Event::Media(media) => {
                self.apply_media(media);
                Vec::new()
            }
            Event::PlayResolved { request, result } => self.resolve_play(request, result),
        }
    }

    fn request_play(&mut self, from_start: bool, user_initiated: bool) -> Effect {
        self.next_request += 1;
        let request = self.next_request;
        self.pending = Some(PendingPlay {
            request,
            user_initiated,
            confirmed: false,
        });
        Effect::Play { request, from_start }
    }

    fn apply_media(&mut self, media: MediaEvent) {
        if let Some(pending) = self.pending.as_mut() {
            pending.confirmed = true;
        }

        match media {
            MediaEvent::Playing => {
                self.started = true;
                self.state = PlaybackState {
                    is_playing: true,
                    show_controls: false,
                    video_ended: false,
                };
            }
            MediaEvent::Paused => {
                self.state.is_playing = false;
                self.state.show_controls = true;
            }
            MediaEvent::Ended => {
                self.started = true;
                self.state = PlaybackState {
                    is_playing: false,
                    show_controls: true,
                    video_ended: true,
                };
            }
        }
    }

    fn resolve_play(&mut self, request: u64, result: Result<(), MediaError>) -> Vec<Effect> {
        let Some(pending) = self.pending.filter(|p| p.request == request) else {
            debug!(request, "Ignoring superseded play request");
            return Vec::new();
        };
        self.pending = None;

        match result {
            Ok(()) => {
                // The element already said what happened; it wins
                if !pending.confirmed {
                    self.started = true;
                    self.state = PlaybackState {
                        is_playing: true,
                        show_controls: false,
                        video_ended: false,
                    };
                }
                if pending.user_initiated {
                    vec![Effect::EnterFullscreen]
                } else {
                    Vec::new()
                }
            }
            Err(e) => {
                warn!(error = %e, "Video play failed");
                self.state.is_playing = false;
                self.state.show_controls = true;
                Vec::new()
            }
        }
    }
}

/// Cloneable way to post intents from input handlers
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: UnboundedSender<Event>,
}

impl ControllerHandle {
    pub fn press(&self) {
        let _ = self.tx.send(Event::Intent(Intent::PressAffordance));
    }

    pub fn tap(&self) {
        let _ = self.tx.send(Event::Intent(Intent::TapSurface));
    }
}

/// Drives a [`Machine`] against a [`MediaElement`]
pub struct Controller<M: MediaElement> {
    machine: Machine,
    element: Arc<M>,
    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
    effects: JoinSet<()>,
}

impl<M: MediaElement> Controller<M> {
    pub fn new(element: Arc<M>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        element.attach(MediaEventSink::new(tx.clone()));

        Self {
            machine: Machine::new(),
            element,
            tx,
            rx,
            effects: JoinSet::new(),
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle { tx: self.tx.clone() }
    }

    pub fn element(&self) -> &Arc<M> {
        &self.element
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.state()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn affordance(&self) -> Affordance {
        self.machine.affordance()
    }

    /// Reduce `event` now and start its effects
    pub fn dispatch(&mut self, event: Event) {
        debug!(?event, "Dispatch");
        let before = self.machine.phase();
        let effects = self.machine.reduce(event);
        let after = self.machine.phase();
        if before != after {
            info!(from = ?before, to = ?after, "Playback phase changed");
        }

        for effect in effects {
            self.run(effect);
        }
    }

    pub fn press(&mut self) {
        self.dispatch(Event::Intent(Intent::PressAffordance));
    }

    pub fn tap(&mut self) {
        self.dispatch(Event::Intent(Intent::TapSurface));
    }

    pub fn autoplay(&mut self) {
        self.dispatch(Event::Autoplay);
    }

    /// Wait for the next queued event and apply it
    pub async fn next(&mut self) -> PlaybackState {
        loop {
            tokio::select! {
                Some(event) = self.rx.recv() => {
                    self.dispatch(event);
                    return self.machine.state();
                }
                Some(joined) = self.effects.join_next(), if !self.effects.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Media task failed");
                    }
                }
            }
        }
    }

    /// Apply queued events until nothing is queued and no effect is running
    pub async fn settle(&mut self) -> PlaybackState {
        loop {
            while let Ok(event) = self.rx.try_recv() {
                self.dispatch(event);
            }
            match self.effects.join_next().await {
                Some(Err(e)) => warn!(error = %e, "Media task failed"),
                Some(Ok(())) => {}
                None => return self.machine.state(),
            }
        }
    }

    fn run(&mut self, effect: Effect) {
        let element = Arc::clone(&self.element);

        match effect {
            Effect::Play { request, from_start } => {
                let tx = self.tx.clone();
                self.effects.spawn(async move {
                    let result = async {
                        if from_start {
                            element.seek_to_start().await?;
                        }
                        element.play().await
                    }
                    .await;
                    let _ = tx.send(Event::PlayResolved { request, result });
                });
            }
            Effect::Pause => {
                self.effects.spawn(async move {
                    if let Err(e) = element.pause().await {
                        warn!(error = %e, "Video pause failed");
                    }
                });
            }
            Effect::EnterFullscreen => {
                self.effects.spawn(async move {
                    if element.is_fullscreen().await {
                        return;
                    }
                    if let Err(e) = element.request_fullscreen().await {
                        debug!(error = %e, "Error attempting to enable full-screen mode");
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Records calls; never emits media events on its own
    #[derive(Default)]
    struct RecordingElement {
        calls: Mutex<Vec<&'static str>>,
        reject_play: AtomicBool,
        reject_fullscreen: AtomicBool,
        fullscreen: AtomicBool,
    }

    impl RecordingElement {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl MediaElement for RecordingElement {
        fn attach(&self, _sink: MediaEventSink) {}

        async fn play(&self) -> Result<(), MediaError> {
            self.record("play");
            if self.reject_play.load(Ordering::SeqCst) {
                return Err(MediaError::Rejected("NotAllowedError".into()));
            }
            Ok(())
        }

        async fn pause(&self) -> Result<(), MediaError> {
            self.record("pause");
            Ok(())
        }

        async fn seek_to_start(&self) -> Result<(), MediaError> {
            self.record("seek_to_start");
            Ok(())
        }

        async fn is_fullscreen(&self) -> bool {
            self.record("is_fullscreen");
            self.fullscreen.load(Ordering::SeqCst)
        }

        async fn request_fullscreen(&self) -> Result<(), MediaError> {
            self.record("request_fullscreen");
            if self.reject_fullscreen.load(Ordering::SeqCst) {
                return Err(MediaError::NotSupported);
            }
            self.fullscreen.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn controller() -> Controller<RecordingElement> {
        Controller::new(Arc::new(RecordingElement::default()))
    }

    fn hidden_playing() -> PlaybackState {
        PlaybackState {
            is_playing: true,
            show_controls: false,
            video_ended: false,
        }
    }

    #[test]
    fn test_machine_starts_idle() {
        let machine = Machine::new();
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.affordance(), Affordance::Play);
        assert_eq!(machine.state(), PlaybackState::default());
        assert!(machine.state().show_controls);
    }

    #[test]
    fn test_machine_play_waits_for_resolution() {
        let mut machine = Machine::new();
        let effects = machine.reduce(Event::Intent(Intent::PressAffordance));
        assert_eq!(effects, vec![Effect::Play { request: 1, from_start: false }]);
        assert!(machine.is_play_pending());
        assert_eq!(machine.phase(), Phase::Idle);

        let effects = machine.reduce(Event::PlayResolved { request: 1, result: Ok(()) });
        assert_eq!(effects, vec![Effect::EnterFullscreen]);
        assert_eq!(machine.state(), hidden_playing());
        assert!(!machine.is_play_pending());
    }

    #[test]
    fn test_machine_replay_seeks_first() {
        let mut machine = Machine::new();
        machine.reduce(Event::Media(MediaEvent::Playing));
        machine.reduce(Event::Media(MediaEvent::Ended));
        assert_eq!(machine.phase(), Phase::Ended);
        assert_eq!(machine.affordance(), Affordance::Replay);

        let effects = machine.reduce(Event::Intent(Intent::PressAffordance));
        assert_eq!(effects, vec![Effect::Play { request: 1, from_start: true }]);
    }

    #[test]
    fn test_machine_ignores_superseded_resolution() {
        let mut machine = Machine::new();
        machine.reduce(Event::Intent(Intent::PressAffordance));
        machine.reduce(Event::Intent(Intent::PressAffordance));

        let effects = machine.reduce(Event::PlayResolved {
            request: 1,
            result: Err(MediaError::Rejected("aborted".into())),
        });
        assert!(effects.is_empty());
        assert!(machine.is_play_pending());
    }

    #[test]
    fn test_machine_paused_before_start_stays_idle() {
        let mut machine = Machine::new();
        machine.reduce(Event::Media(MediaEvent::Paused));
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.state(), PlaybackState::default());
    }

    #[test]
    fn test_machine_autoplay_is_not_user_initiated() {
        let mut machine = Machine::new();
        let effects = machine.reduce(Event::Autoplay);
        assert_eq!(effects, vec![Effect::Play { request: 1, from_start: false }]);

        let effects = machine.reduce(Event::PlayResolved { request: 1, result: Ok(()) });
        assert!(effects.is_empty());
        assert_eq!(machine.phase(), Phase::Playing);
    }

    #[tokio::test]
    async fn test_play_hides_controls_and_requests_fullscreen() {
        let mut controller = controller();
        controller.press();
        let state = controller.settle().await;

        assert_eq!(state, hidden_playing());
        assert_eq!(controller.phase(), Phase::Playing);
        assert_eq!(controller.affordance(), Affordance::Pause);
        assert_eq!(
            controller.element().calls(),
            vec!["play", "is_fullscreen", "request_fullscreen"]
        );
    }

    #[tokio::test]
    async fn test_fullscreen_skipped_when_already_fullscreen() {
        let mut controller = controller();
        controller.element().fullscreen.store(true, Ordering::SeqCst);
        controller.press();
        controller.settle().await;

        assert_eq!(controller.element().calls(), vec!["play", "is_fullscreen"]);
    }

    #[tokio::test]
    async fn test_fullscreen_rejection_is_harmless() {
        let mut controller = controller();
        controller.element().reject_fullscreen.store(true, Ordering::SeqCst);
        controller.press();
        let state = controller.settle().await;

        assert_eq!(state, hidden_playing());
    }

    #[tokio::test]
    async fn test_pause_shows_controls() {
        let mut controller = controller();
        controller.press();
        controller.settle().await;

        controller.press();
        let state = controller.settle().await;

        assert!(!state.is_playing);
        assert!(state.show_controls);
        assert_eq!(controller.phase(), Phase::Paused);
        assert_eq!(controller.element().calls().last(), Some(&"pause"));
    }

    #[tokio::test]
    async fn test_ended_then_replay_seeks_to_start() {
        let mut controller = controller();
        controller.press();
        controller.settle().await;

        controller.dispatch(Event::Media(MediaEvent::Ended));
        assert_eq!(controller.phase(), Phase::Ended);
        assert!(controller.state().show_controls);
        assert!(!controller.state().is_playing);

        controller.press();
        let state = controller.settle().await;

        let calls = controller.element().calls();
        let tail = &calls[3..];
        assert_eq!(&tail[..2], &["seek_to_start", "play"]);
        assert_eq!(state, hidden_playing());
    }

    #[tokio::test]
    async fn test_tap_toggles_controls_only_while_playing() {
        let mut controller = controller();
        controller.press();
        controller.settle().await;

        controller.tap();
        assert_eq!(
            controller.state(),
            PlaybackState {
                show_controls: true,
                ..hidden_playing()
            }
        );
        controller.tap();
        assert_eq!(controller.state(), hidden_playing());

        controller.press();
        controller.settle().await;
        let paused = controller.state();
        controller.tap();
        assert_eq!(controller.state(), paused);
    }

    #[tokio::test]
    async fn test_tap_while_idle_is_noop() {
        let mut controller = controller();
        controller.tap();
        assert_eq!(controller.state(), PlaybackState::default());
        assert!(controller.element().calls().is_empty());
    }

    #[tokio::test]
    async fn test_tap_while_ended_is_noop() {
        let mut controller = controller();
        controller.press();
        controller.settle().await;
        controller.dispatch(Event::Media(MediaEvent::Ended));

        let ended = controller.state();
        let calls = controller.element().calls();

        controller.tap();
        assert_eq!(controller.settle().await, ended);
        assert_eq!(controller.phase(), Phase::Ended);
        assert_eq!(controller.affordance(), Affordance::Replay);
        assert_eq!(controller.element().calls(), calls);
    }

    #[tokio::test]
    async fn test_rejected_play_keeps_controls_visible() {
        let mut controller = controller();
        controller.element().reject_play.store(true, Ordering::SeqCst);
        controller.press();
        let state = controller.settle().await;

        assert!(!state.is_playing);
        assert!(state.show_controls);
        assert_eq!(controller.affordance(), Affordance::Play);
        assert_eq!(controller.element().calls(), vec!["play"]);

        // No automatic retry; the next press tries again
        controller.element().reject_play.store(false, Ordering::SeqCst);
        controller.press();
        assert_eq!(controller.settle().await, hidden_playing());
    }

    #[tokio::test]
    async fn test_media_event_wins_over_optimistic_resolution() {
        let mut controller = controller();
        controller.press();
        // Reported before the play request resolves
        controller.dispatch(Event::Media(MediaEvent::Paused));
        let state = controller.settle().await;

        assert!(!state.is_playing);
        assert!(state.show_controls);
        assert!(controller.element().calls().contains(&"request_fullscreen"));
    }

    #[tokio::test]
    async fn test_media_playing_event_is_authoritative() {
        let mut controller = controller();
        controller.dispatch(Event::Media(MediaEvent::Playing));
        assert_eq!(controller.state(), hidden_playing());
        assert!(controller.element().calls().is_empty());
    }

    #[tokio::test]
    async fn test_autoplay_skips_fullscreen() {
        let mut controller = controller();
        controller.autoplay();
        let state = controller.settle().await;

        assert_eq!(state, hidden_playing());
        assert_eq!(controller.element().calls(), vec!["play"]);
    }

    #[tokio::test]
    async fn test_handle_posts_through_queue() {
        let mut controller = controller();
        let handle = controller.handle();
        handle.press();

        let state = controller.next().await;
        assert_eq!(state, PlaybackState::default());
        let state = controller.next().await;
        assert_eq!(state, hidden_playing());
    }
}
