use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("invalid stream URL: {0}")]
    InvalidUrl(String),
    #[error("failed to open stream: {0}")]
    Backend(String),
}

/// Notifications from the media backend, the progress ticker and delayed
/// presenter work
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Ready { duration: Duration },
    Finished,
    Failed(String),
    Tick,
    HideControls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Finished,
}

/// A platform media player for one opened stream
pub trait MediaPlayer: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    fn set_muted(&mut self, muted: bool);
    fn position(&self) -> Duration;
    /// None until the media item knows its length
    fn duration(&self) -> Option<Duration>;
}

/// Opens streams. Players report `Ready`, `Finished` and `Failed` on the
/// given sender; they never emit `Tick` or `HideControls`.
pub trait MediaBackend: Send {
    fn open(
        &mut self,
        url: &Url,
        events: mpsc::Sender<PlayerEvent>,
    ) -> Result<Box<dyn MediaPlayer>, PlayerError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub current: Duration,
    /// Position over duration, in [0, 1]
    pub fraction: f32,
}

/// "H:MM:SS" when there are hours, else "MM:SS"
pub fn format_time(time: Duration) -> String {
    let total = time.as_secs();
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;

    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

pub struct MoviePlayerInteractor {
    stream_url: String,
    backend: Box<dyn MediaBackend>,
    player: Option<Box<dyn MediaPlayer>>,
    events: mpsc::Sender<PlayerEvent>,
    progress_interval: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl MoviePlayerInteractor {
    pub fn new(
        stream_url: String,
        backend: Box<dyn MediaBackend>,
        events: mpsc::Sender<PlayerEvent>,
        progress_interval: Duration,
    ) -> Self {
        Self {
            stream_url,
            backend,
            player: None,
            events,
            // tokio intervals panic on a zero period
            progress_interval: progress_interval.max(Duration::from_millis(1)),
            ticker: None,
        }
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn has_player(&self) -> bool {
        self.player.is_some()
    }

    /// Open the stream and start the progress ticker. Must run inside a tokio runtime.
    pub fn setup_player(&mut self) -> Result<(), PlayerError> {
        self.teardown();

        let url = Url::parse(&self.stream_url)
            .map_err(|_| PlayerError::InvalidUrl(self.stream_url.clone()))?;

        info!(url = %url, "opening stream");
        let player = self.backend.open(&url, self.events.clone())?;
        self.player = Some(player);
        self.start_ticker();
        Ok(())
    }

    fn start_ticker(&mut self) {
        let tx = self.events.clone();
        let period = self.progress_interval;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                // a full channel just drops this tick
                if let Err(TrySendError::Closed(_)) = tx.try_send(PlayerEvent::Tick) {
                    break;
                }
            }
        }));
    }

    pub fn play(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.play();
        }
    }

    pub fn pause(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.pause();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        if let Some(player) = self.player.as_mut() {
            player.set_muted(muted);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        if let Some(player) = self.player.as_mut() {
            player.set_volume(volume);
        }
    }

    pub fn volume(&self) -> f32 {
        self.player.as_ref().map(|p| p.volume()).unwrap_or(1.0)
    }

    /// Seek to a fraction of the duration. Ignored while the duration is unknown.
    pub fn seek(&mut self, fraction: f32) {
        if !fraction.is_finite() {
            return;
        }
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let Some(duration) = player.duration() else {
            return;
        };

        player.seek(duration.mul_f32(fraction.clamp(0.0, 1.0)));
    }

    pub fn progress(&self) -> Option<Progress> {
        let player = self.player.as_ref()?;
        let duration = player.duration().filter(|d| !d.is_zero())?;
        let current = player.position();
        let fraction = (current.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32;

        Some(Progress { current, fraction })
    }

    /// Stop the ticker and release the player
    pub fn teardown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if let Some(mut player) = self.player.take() {
            debug!("releasing player");
            player.pause();
        }
    }
}

impl Drop for MoviePlayerInteractor {
    fn drop(&mut self) {
        self.teardown();
    }
}

pub trait MoviePlayerView {
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn update_total_time(&mut self, total: &str);
    fn update_progress(&mut self, current: &str, fraction: f32);
    fn update_play_pause_button(&mut self, is_playing: bool);
    fn show_controls(&mut self);
    fn hide_controls(&mut self);
    fn update_volume_icon(&mut self, is_muted: bool, volume: f32);
    fn set_fullscreen(&mut self, fullscreen: bool);
    fn show_error(&mut self, message: &str);
}

pub trait MoviePlayerRouter {
    fn navigate_back(&mut self);
}

/// Playback screen state machine.
///
/// `Idle -> Loading -> Ready -> {Playing <-> Paused} -> Finished`. Volume,
/// mute and fullscreen are independent of the playback state.
pub struct MoviePlayerPresenter<R> {
    interactor: MoviePlayerInteractor,
    router: R,
    events: mpsc::Sender<PlayerEvent>,
    controls_hide_delay: Duration,
    state: PlaybackState,
    /// Set for the length of a seek gesture: whether to resume when it ends
    resume_after_seek: Option<bool>,
    is_muted: bool,
    is_fullscreen: bool,
    volume: f32,
}

impl<R: MoviePlayerRouter> MoviePlayerPresenter<R> {
    pub fn new(
        interactor: MoviePlayerInteractor,
        router: R,
        events: mpsc::Sender<PlayerEvent>,
        controls_hide_delay: Duration,
    ) -> Self {
        Self {
            interactor,
            router,
            events,
            controls_hide_delay,
            state: PlaybackState::Idle,
            resume_after_seek: None,
            is_muted: false,
            is_fullscreen: false,
            volume: 1.0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn view_did_load(&mut self, view: &mut dyn MoviePlayerView) {
        view.show_loading();
        match self.interactor.setup_player() {
            Ok(()) => {
                self.interactor.set_volume(self.volume);
                self.interactor.set_muted(self.is_muted);
                self.state = PlaybackState::Loading;
            }
            Err(e) => {
                warn!(error = %e, "player setup failed");
                self.state = PlaybackState::Idle;
                view.hide_loading();
                view.show_error(&e.to_string());
            }
        }
    }

    pub fn play_pause_tapped(&mut self, view: &mut dyn MoviePlayerView) {
        match self.state {
            PlaybackState::Playing => {
                self.interactor.pause();
                self.state = PlaybackState::Paused;
                view.update_play_pause_button(false);
                view.show_controls();
            }
            PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Finished => {
                if self.state == PlaybackState::Finished {
                    self.interactor.seek(0.0);
                }
                self.interactor.play();
                self.state = PlaybackState::Playing;
                view.update_play_pause_button(true);
                view.hide_controls();
            }
            PlaybackState::Idle | PlaybackState::Loading => {
                debug!(state = ?self.state, "play ignored until the stream is ready");
            }
        }
    }

    pub fn volume_button_tapped(&mut self, view: &mut dyn MoviePlayerView) {
        self.is_muted = !self.is_muted;
        self.interactor.set_muted(self.is_muted);
        view.update_volume_icon(self.is_muted, self.volume);
    }

    pub fn volume_slider_changed(&mut self, value: f32, view: &mut dyn MoviePlayerView) {
        let value = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            self.volume
        };
        self.volume = value;
        self.interactor.set_volume(value);
        self.is_muted = false;
        self.interactor.set_muted(false);
        view.update_volume_icon(false, value);
    }

    pub fn progress_slider_touch_began(&mut self) {
        let was_playing = self.is_playing();
        self.resume_after_seek = Some(was_playing);
        if was_playing {
            self.interactor.pause();
            self.state = PlaybackState::Paused;
        }
    }

    pub fn progress_slider_changed(&mut self, fraction: f32) {
        self.interactor.seek(fraction);
        // moved away from the end, so the next play starts here
        if self.state == PlaybackState::Finished && fraction.is_finite() {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn progress_slider_touch_ended(&mut self) {
        let resume = self.resume_after_seek.take().unwrap_or(false);
        if resume && self.state == PlaybackState::Paused {
            self.interactor.play();
            self.state = PlaybackState::Playing;
        }
    }

    pub fn player_tapped(&mut self, view: &mut dyn MoviePlayerView) {
        view.show_controls();
        if self.is_playing() {
            let tx = self.events.clone();
            let delay = self.controls_hide_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if tx.send(PlayerEvent::HideControls).await.is_err() {
                    debug!("player screen closed before controls were hidden");
                }
            });
        }
    }

    pub fn fullscreen_tapped(&mut self, view: &mut dyn MoviePlayerView) {
        self.is_fullscreen = !self.is_fullscreen;
        view.set_fullscreen(self.is_fullscreen);
    }

    pub fn back_button_tapped(&mut self) {
        self.interactor.teardown();
        self.state = PlaybackState::Idle;
        self.router.navigate_back();
    }

    pub fn handle(&mut self, event: PlayerEvent, view: &mut dyn MoviePlayerView) {
        match event {
            PlayerEvent::Ready { duration } => {
                if self.state != PlaybackState::Loading {
                    debug!(state = ?self.state, "ready reported outside loading");
                    return;
                }
                info!(duration_secs = duration.as_secs(), "stream ready");
                self.state = PlaybackState::Ready;
                view.hide_loading();
                view.update_total_time(&format_time(duration));
                view.show_controls();
            }
            PlayerEvent::Tick => {
                if let Some(progress) = self.interactor.progress() {
                    view.update_progress(&format_time(progress.current), progress.fraction);
                }
            }
            PlayerEvent::Finished => {
                self.state = PlaybackState::Finished;
                self.resume_after_seek = None;
                view.update_play_pause_button(false);
                view.show_controls();
            }
            PlayerEvent::Failed(message) => {
                warn!(%message, "playback failed");
                self.interactor.teardown();
                self.state = PlaybackState::Idle;
                view.hide_loading();
                view.show_error(&message);
            }
            PlayerEvent::HideControls => {
                if self.is_playing() {
                    view.hide_controls();
                }
            }
        }
    }

    pub fn interactor(&self) -> &MoviePlayerInteractor {
        &self.interactor
    }

    pub fn router(&self) -> &R {
        &self.router
    }
}
