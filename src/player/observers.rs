// src/player/observers.rs
//! Folds engine property notifications into player state and events.

use tracing::{debug, instrument, trace};

use super::command_handler;
use super::state::PlayerEvent;
use super::{Player, PLAYER_LOG_TARGET};
use crate::engine::{EngineNotification, EngineProperty, ItemId, ItemStatus, TimeControlStatus};
use crate::error::PlayerError;

#[instrument(skip(player, notification))]
pub(super) async fn handle_notification(player: &mut Player, notification: EngineNotification) {
    trace!(target: PLAYER_LOG_TARGET, ?notification, "Engine notification received.");
    match notification {
        EngineNotification::EngineFailure(cause) => {
            player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(cause)));
        }
        EngineNotification::TimeControl(status) => {
            // Direct republish; the player never computes these itself.
            player.is_playing = status != TimeControlStatus::Paused;
            player.emit(match status {
                TimeControlStatus::Paused => PlayerEvent::Paused,
                TimeControlStatus::WaitingToPlay => PlayerEvent::Buffering,
                TimeControlStatus::Playing => PlayerEvent::Playing,
            });
        }
        EngineNotification::CurrentItem(Some(item)) => {
            player.emit(PlayerEvent::ItemChanged(Some(item)));
        }
        EngineNotification::CurrentItem(None) => {
            player.emit(PlayerEvent::ItemRemoved);
        }
        EngineNotification::Volume(volume) => {
            player.volume = volume;
            player.emit(PlayerEvent::VolumeChanged(volume));
        }
        EngineNotification::ItemStatus { item, status, cause } => {
            handle_item_status(player, item, status, cause).await;
        }
    }
}

/// One-shot handling of a queued item's status transition. The observation
/// dies with the first terminal status it reports.
async fn handle_item_status(
    player: &mut Player,
    item: ItemId,
    status: ItemStatus,
    cause: Option<String>,
) {
    if player.current_item != Some(item) {
        trace!(target: PLAYER_LOG_TARGET, %item, "Status for a superseded item; ignoring.");
        return;
    }
    match status {
        ItemStatus::Unknown => {
            trace!(target: PLAYER_LOG_TARGET, %item, "Item status still unknown.");
        }
        ItemStatus::ReadyToPlay => {
            player
                .observations
                .invalidate_property(player.engine.as_ref(), EngineProperty::ItemStatus(item));
            player.emit(PlayerEvent::ItemStatusChanged(ItemStatus::ReadyToPlay));
            // Status first, then duration: the order is guaranteed per item.
            if let Some(duration) = player.engine.duration(item).await {
                player.duration = Some(duration);
                player.emit(PlayerEvent::DurationKnown(duration));
            }
            if let Some(pending) = player.pending_seek.take() {
                if pending.generation == player.generation {
                    let target = player
                        .duration
                        .map_or(pending.seconds, |d| command_handler::clamp_seek(pending.seconds, d));
                    debug!(target: PLAYER_LOG_TARGET, seconds = target, "Running deferred seek.");
                    command_handler::start_seek(player, item, target, pending.autoplay_after);
                }
            }
        }
        ItemStatus::Failed => {
            player
                .observations
                .invalidate_property(player.engine.as_ref(), EngineProperty::ItemStatus(item));
            let cause = cause.unwrap_or_else(|| "item failed to load".to_string());
            player.emit(PlayerEvent::Error(PlayerError::FailedToLoad(cause)));
            // A deferred seek can never succeed on a failed item.
            if let Some(pending) = player.pending_seek.take() {
                if pending.generation == player.generation {
                    player.emit(PlayerEvent::SeekCompleted {
                        success: false,
                        seconds: pending.seconds,
                    });
                }
            }
        }
    }
}
