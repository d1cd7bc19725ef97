//! The contract implemented by the external media engine.

use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tokio::sync::mpsc;

use super::models::{
    AssetRef, EngineNotification, EngineProperty, ItemId, QueuedItem, SelectionGroup, TrackKind,
    VectorOverlay,
};
use super::observation::ObservationHandle;
use crate::filters::FilterDescriptor;
use crate::settings::Gravity;

/// Error types for media-engine operations.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    ItemNotFound(String),
    Playback(String),
    Composition(String),
    TrackLoading(String),
    Selection(String),
    PipUnavailable,
    Internal(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ItemNotFound(id) => write!(f, "Item not found: {}", id),
            EngineError::Playback(msg) => write!(f, "Playback error: {}", msg),
            EngineError::Composition(msg) => write!(f, "Composition error: {}", msg),
            EngineError::TrackLoading(msg) => write!(f, "Track loading error: {}", msg),
            EngineError::Selection(msg) => write!(f, "Track selection error: {}", msg),
            EngineError::PipUnavailable => write!(f, "Picture-in-picture unavailable"),
            EngineError::Internal(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl Error for EngineError {}

/// The imperative surface of the external media engine.
///
/// The player is the only caller. All mutating calls originate from its run
/// loop; notifications flow back through the channel senders handed to
/// [`subscribe`](MediaEngineContract::subscribe), which re-marshals them onto
/// that same loop.
#[async_trait]
pub trait MediaEngineContract: Send + Sync {
    // --- Queue ---
    async fn enqueue(&self, item: QueuedItem) -> Result<(), EngineError>;
    async fn clear_queue(&self) -> Result<(), EngineError>;

    // --- Transport ---
    async fn play(&self) -> Result<(), EngineError>;
    async fn pause(&self) -> Result<(), EngineError>;
    async fn set_rate(&self, rate: f32) -> Result<(), EngineError>;
    async fn set_volume(&self, volume: f32) -> Result<(), EngineError>;
    async fn set_muted(&self, muted: bool) -> Result<(), EngineError>;

    /// Seeks the item to `seconds` within `tolerance` (0.0 = frame-accurate)
    /// and resolves with the position actually reached.
    async fn seek(&self, item: ItemId, seconds: f64, tolerance: f64) -> Result<f64, EngineError>;

    // --- Queries ---
    /// Duration of a queued item, once known.
    async fn duration(&self, item: ItemId) -> Option<f64>;
    /// Current playback position in seconds.
    async fn position(&self) -> f64;

    /// Engages or releases the loop coordinator for the given item.
    async fn set_looping(&self, item: ItemId, enabled: bool) -> Result<(), EngineError>;

    /// Replaces the compositing pipeline on the queued item.
    async fn apply_composition(
        &self,
        item: ItemId,
        pipeline: &[FilterDescriptor],
    ) -> Result<(), EngineError>;

    async fn set_gravity(&self, gravity: Gravity) -> Result<(), EngineError>;

    // --- Asset services ---
    async fn load_tracks(&self, asset: &AssetRef) -> Result<Vec<TrackKind>, EngineError>;
    /// Copies the video's video/audio tracks and the subtitle's text track
    /// into one composite asset aligned at time zero.
    async fn compose_with_subtitles(
        &self,
        video: &AssetRef,
        subtitle: &AssetRef,
    ) -> Result<AssetRef, EngineError>;

    // --- Media selection ---
    /// Selects one member of the group by language code; `None` deselects.
    async fn select_track(
        &self,
        group: SelectionGroup,
        language: Option<String>,
    ) -> Result<(), EngineError>;

    // --- Overlays ---
    async fn add_overlay(&self, overlay: VectorOverlay) -> Result<(), EngineError>;
    async fn clear_overlays(&self) -> Result<(), EngineError>;

    // --- Picture-in-picture ---
    fn pip_supported(&self) -> bool;
    async fn start_pip(&self) -> Result<(), EngineError>;
    async fn stop_pip(&self) -> Result<(), EngineError>;

    // --- Property observation ---
    /// Registers a notification channel for one property and returns the
    /// handle that keeps the registration alive.
    fn subscribe(
        &self,
        property: EngineProperty,
        tx: mpsc::Sender<EngineNotification>,
    ) -> ObservationHandle;
    /// Drops a registration. Unknown handles are ignored.
    fn unsubscribe(&self, handle: &ObservationHandle);
}
