use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, trace};

use crate::engine::{
    AssetRef, Bounds, EngineNotification, EngineProperty, ItemId, MediaEngineContract,
    ObservationTable,
};
use crate::filters::FilterStack;
use crate::settings::SettingsModel;
use crate::source::SourceResolver;

mod aggregator;
mod command_handler;
mod dispatch;
mod observers;
mod reconfigure;
mod run_loop;
pub mod state;

// Re-export key types for convenience
pub use aggregator::{EventAggregator, EVENT_BATCH_WINDOW};
pub use dispatch::CommandDebouncer;
pub use state::{
    EventTag, InternalPlayerState, OverlayBuilder, PlaybackCommand, PlayerCommand, PlayerEvent,
};

const PLAYER_LOG_TARGET: &str = "r_playctl::player";

/// Buffer size of the channel engine notifications are re-marshaled through.
const NOTIFICATION_BUFFER_SIZE: usize = 64;

/// A seek that arrived before the item produced a duration. Retried on
/// readiness, dropped when its generation is superseded.
#[derive(Debug, Clone, Copy)]
struct PendingSeek {
    seconds: f64,
    autoplay_after: bool,
    generation: u64,
}

/// The playback-engine adapter: sole owner and writer of playback state.
///
/// Hosts construct it with [`Player::new`], take the returned command sender,
/// subscribe to the event and time streams, and spawn [`Player::run`] as a
/// task. Everything else happens over channels.
pub struct Player {
    // --- Collaborators ---
    engine: Arc<dyn MediaEngineContract>,
    resolver: SourceResolver,

    // --- State ---
    settings: Option<SettingsModel>,
    current_asset: Option<AssetRef>,
    current_item: Option<ItemId>,
    duration: Option<f64>,
    is_playing: bool,
    is_looping: bool,
    pip_active: bool,
    muted: bool,
    volume: f32,
    rate: f32,
    /// Bumped on every accepted reconfigure; continuations from older
    /// generations are no-ops.
    generation: u64,
    pending_seek: Option<PendingSeek>,
    bounds: Bounds,
    overlay_builders: Vec<OverlayBuilder>,
    filters: FilterStack,

    // --- Observation ---
    observations: ObservationTable,
    notification_tx: mpsc::Sender<EngineNotification>,
    notification_rx: mpsc::Receiver<EngineNotification>,

    // --- Communication ---
    command_rx: mpsc::Receiver<PlayerCommand>,
    // Sender for internal messages (like SeekFinished)
    internal_command_tx: mpsc::Sender<PlayerCommand>,
    aggregator: EventAggregator,
    time_tx: broadcast::Sender<f64>,
}

impl Player {
    /// Creates a new Player instance and the command channel sender.
    /// The Player itself should be run in a separate task using `Player::run`.
    pub fn new(
        engine: Arc<dyn MediaEngineContract>,
        resolver: SourceResolver,
        event_capacity: usize,      // Capacity for the broadcast channels
        command_buffer_size: usize, // Capacity for the command mpsc channel
    ) -> (Self, mpsc::Sender<PlayerCommand>) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer_size);
        let (notification_tx, notification_rx) = mpsc::channel(NOTIFICATION_BUFFER_SIZE);
        let (time_tx, _) = broadcast::channel(event_capacity);

        let player = Player {
            engine,
            resolver,
            settings: None,
            current_asset: None,
            current_item: None,
            duration: None,
            is_playing: false,
            is_looping: false,
            pip_active: false,
            muted: false,
            volume: 1.0,
            rate: 1.0,
            generation: 0,
            pending_seek: None,
            bounds: Bounds::default(),
            overlay_builders: Vec::new(),
            filters: FilterStack::new(),
            observations: ObservationTable::new(),
            notification_tx,
            notification_rx,
            command_rx,
            internal_command_tx: command_tx.clone(),
            aggregator: EventAggregator::new(event_capacity),
            time_tx,
        };

        (player, command_tx)
    }

    /// Subscribes to the batched event stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Vec<PlayerEvent>> {
        self.aggregator.subscribe()
    }

    /// Subscribes to the periodic time stream (playback seconds).
    pub fn subscribe_time(&self) -> broadcast::Receiver<f64> {
        self.time_tx.subscribe()
    }

    // --- Private Helper Methods ---

    /// Queues an event on the aggregator; delivery happens at the next flush.
    fn emit(&mut self, event: PlayerEvent) {
        trace!(target: PLAYER_LOG_TARGET, ?event, "Emitting event.");
        self.aggregator.push(event);
    }

    fn publish_time(&self, seconds: f64) {
        if self.time_tx.send(seconds).is_err() {
            trace!(target: PLAYER_LOG_TARGET, "No active listeners for time publish.");
        }
    }

    /// Registers the player-level property observations.
    fn setup_base_observations(&mut self) {
        for property in [
            EngineProperty::Error,
            EngineProperty::TimeControl,
            EngineProperty::CurrentItem,
            EngineProperty::Volume,
        ] {
            let handle = self.engine.subscribe(property, self.notification_tx.clone());
            self.observations.register(handle);
        }
        debug!(target: PLAYER_LOG_TARGET, count = self.observations.len(), "Base observations registered.");
    }

    /// Constructs the full current state object.
    fn full_state(&self) -> InternalPlayerState {
        InternalPlayerState {
            settings: self.settings.clone(),
            resolved_url: self.current_asset.as_ref().map(|asset| asset.url.clone()),
            is_playing: self.is_playing,
            is_looping: self.is_looping,
            pip_active: self.pip_active,
            muted: self.muted,
            volume: self.volume,
            rate: self.rate,
            duration: self.duration,
            generation: self.generation,
        }
    }

    /// Releases everything: observations, pending continuations, overlays,
    /// and the engine queue. Safe from any state and safe to call twice.
    #[instrument(skip(self))]
    async fn teardown(&mut self) {
        info!(target: PLAYER_LOG_TARGET, "Tearing down player state.");
        self.observations.invalidate_all(self.engine.as_ref());
        self.pending_seek = None;
        if self.pip_active {
            if let Err(e) = self.engine.stop_pip().await {
                debug!(target: PLAYER_LOG_TARGET, error = %e, "Stopping picture-in-picture during teardown failed.");
            }
            self.pip_active = false;
        }
        if let Err(e) = self.engine.pause().await {
            debug!(target: PLAYER_LOG_TARGET, error = %e, "Pause during teardown failed.");
        }
        if let Err(e) = self.engine.clear_overlays().await {
            debug!(target: PLAYER_LOG_TARGET, error = %e, "Clearing overlays during teardown failed.");
        }
        if let Err(e) = self.engine.clear_queue().await {
            debug!(target: PLAYER_LOG_TARGET, error = %e, "Clearing queue during teardown failed.");
        }
        self.overlay_builders.clear();
        self.is_playing = false;
        self.is_looping = false;
        self.current_item = None;
        self.current_asset = None;
        self.duration = None;
        // Final drain so nothing buffered is lost.
        self.aggregator.flush();
    }

    // --- Main Run Loop ---

    /// Runs the player's command processing loop. This should be spawned as a Tokio task.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        run_loop::run_player_loop(self).await;
    }
}
