//! Command, event, and snapshot types of the player.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use url::Url;

use crate::engine::{Bounds, ItemId, ItemStatus, VectorOverlay};
use crate::error::PlayerError;
use crate::filters::FilterDescriptor;
use crate::settings::SettingsModel;

/// Host-supplied capability producing an overlay graphic for a given frame.
/// Builders are opaque: two builders never compare equal, so overlay commands
/// are never suppressed as repeats.
#[derive(Clone)]
pub struct OverlayBuilder(Arc<dyn Fn(Bounds) -> VectorOverlay + Send + Sync>);

impl OverlayBuilder {
    pub fn new(build: impl Fn(Bounds) -> VectorOverlay + Send + Sync + 'static) -> Self {
        OverlayBuilder(Arc::new(build))
    }

    pub fn build(&self, bounds: Bounds) -> VectorOverlay {
        (self.0)(bounds)
    }
}

impl fmt::Debug for OverlayBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OverlayBuilder(..)")
    }
}

impl PartialEq for OverlayBuilder {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

/// The imperative playback command set. Stateless: every value is
/// self-contained.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackCommand {
    /// No-op. Hosts issue it to reset their debouncer memory.
    Idle,
    Play,
    Pause,
    Seek { seconds: f64, autoplay_after: bool },
    ToStart,
    ToEnd,
    Mute,
    Unmute,
    SetVolume(f32),
    SetPlaybackSpeed(f32),
    SetSubtitleLanguage(Option<String>),
    EnableLoop,
    DisableLoop,
    AdjustBrightness(f32),
    AdjustContrast(f32),
    ApplyFilter {
        filter: FilterDescriptor,
        clear_existing: bool,
    },
    ClearFilters,
    SelectAudioTrack(String),
    AddVectorOverlay {
        builder: OverlayBuilder,
        clear_existing: bool,
    },
    ClearVectorOverlays,
    StartPip,
    StopPip,
}

/// Messages accepted by the player task over its command channel.
#[derive(Debug)]
pub enum PlayerCommand {
    /// Replace the active settings; no-op when they resolve to the current
    /// playable URL.
    Apply(SettingsModel),
    Control(PlaybackCommand),
    /// The hosting surface changed; overlays are re-laid against it.
    SetBounds(Bounds),
    GetFullState(oneshot::Sender<InternalPlayerState>),
    /// Internal: a spawned engine seek finished.
    SeekFinished {
        generation: u64,
        success: bool,
        seconds: f64,
        autoplay_after: bool,
    },
    Shutdown,
}

/// Events surfaced to the host, batched by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    SeekCompleted { success: bool, seconds: f64 },
    Paused,
    Buffering,
    Playing,
    ItemChanged(Option<ItemId>),
    ItemRemoved,
    VolumeChanged(f32),
    Error(PlayerError),
    BoundsChanged(Bounds),
    PipStarted,
    PipStopped,
    ItemStatusChanged(ItemStatus),
    DurationKnown(f64),
}

/// Event-kind tags used by settings-level filtering. Matching is kind-only;
/// payloads never participate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTag {
    SeekCompleted,
    Paused,
    Buffering,
    Playing,
    ItemChanged,
    ItemRemoved,
    VolumeChanged,
    Error,
    BoundsChanged,
    PipStarted,
    PipStopped,
    ItemStatusChanged,
    DurationKnown,
}

impl PlayerEvent {
    /// The event's kind tag.
    pub fn tag(&self) -> EventTag {
        match self {
            PlayerEvent::SeekCompleted { .. } => EventTag::SeekCompleted,
            PlayerEvent::Paused => EventTag::Paused,
            PlayerEvent::Buffering => EventTag::Buffering,
            PlayerEvent::Playing => EventTag::Playing,
            PlayerEvent::ItemChanged(_) => EventTag::ItemChanged,
            PlayerEvent::ItemRemoved => EventTag::ItemRemoved,
            PlayerEvent::VolumeChanged(_) => EventTag::VolumeChanged,
            PlayerEvent::Error(_) => EventTag::Error,
            PlayerEvent::BoundsChanged(_) => EventTag::BoundsChanged,
            PlayerEvent::PipStarted => EventTag::PipStarted,
            PlayerEvent::PipStopped => EventTag::PipStopped,
            PlayerEvent::ItemStatusChanged(_) => EventTag::ItemStatusChanged,
            PlayerEvent::DurationKnown(_) => EventTag::DurationKnown,
        }
    }
}

/// Snapshot of the player's internal state, answered over a oneshot channel.
#[derive(Debug, Clone)]
pub struct InternalPlayerState {
    pub settings: Option<SettingsModel>,
    pub resolved_url: Option<Url>,
    pub is_playing: bool,
    pub is_looping: bool,
    pub pip_active: bool,
    pub muted: bool,
    pub volume: f32,
    pub rate: f32,
    pub duration: Option<f64>,
    pub generation: u64,
}
