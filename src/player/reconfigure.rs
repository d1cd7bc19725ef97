// src/player/reconfigure.rs
//! Settings application: the reconfigure path.

use tracing::{debug, info, instrument, warn};

use super::state::PlayerEvent;
use super::{Player, PLAYER_LOG_TARGET};
use crate::engine::{EngineProperty, QueuedItem};
use crate::error::PlayerError;
use crate::settings::SettingsModel;
use crate::source;

/// Applies a new settings generation. `force` skips the same-URL no-op check;
/// the seek path uses it to retry a load that never produced an item.
#[instrument(skip(player, settings), fields(source = %settings.name))]
pub(super) async fn apply_settings(player: &mut Player, settings: SettingsModel, force: bool) {
    let resolved = player.resolver.resolve(&settings.name, &settings.ext);

    // Idempotent reconfigure: same playable URL, nothing to do.
    if !force {
        if let (Ok(asset), Some(current)) = (&resolved, &player.current_asset) {
            if asset == current {
                debug!(target: PLAYER_LOG_TARGET, "Settings resolve to the current asset; skipping reconfigure.");
                return;
            }
        }
    }

    stop_current(player).await;
    player.generation = player.generation.wrapping_add(1);
    player.aggregator.set_filter(settings.events.clone());
    if !settings.are_unique() {
        warn!(target: PLAYER_LOG_TARGET, "Duplicate option kinds in settings; first occurrences win.");
        player.emit(PlayerEvent::Error(PlayerError::SettingsNotUnique));
    }
    player.settings = Some(settings.clone());

    let asset = match resolved {
        Ok(asset) => asset,
        Err(e) => {
            warn!(target: PLAYER_LOG_TARGET, error = %e, "Source resolution failed.");
            player.emit(PlayerEvent::Error(PlayerError::SourceNotFound(
                settings.name.clone(),
            )));
            return;
        }
    };

    // Optional subtitle merge; degrades to the bare video silently.
    let asset = match player.resolver.resolve_subtitles(&settings.subtitles) {
        Some(subtitle) => {
            source::merge_with_subtitles(player.engine.as_ref(), asset, &subtitle).await
        }
        None => asset,
    };

    let item = QueuedItem::new(asset.clone());
    let item_id = item.id;

    // Observe the item before inserting it so its terminal status cannot race
    // past the subscription.
    let handle = player
        .engine
        .subscribe(EngineProperty::ItemStatus(item_id), player.notification_tx.clone());
    player.observations.register(handle);

    if let Err(e) = player.engine.enqueue(item).await {
        player
            .observations
            .invalidate_property(player.engine.as_ref(), EngineProperty::ItemStatus(item_id));
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
        return;
    }
    player.current_item = Some(item_id);
    player.current_asset = Some(asset);

    if let Err(e) = player.engine.set_gravity(settings.gravity).await {
        debug!(target: PLAYER_LOG_TARGET, error = %e, "Applying gravity failed.");
    }
    match player.engine.set_muted(settings.muted).await {
        Ok(()) => player.muted = settings.muted,
        Err(e) => debug!(target: PLAYER_LOG_TARGET, error = %e, "Applying mute state failed."),
    }

    if settings.looped {
        match player.engine.set_looping(item_id, true).await {
            Ok(()) => player.is_looping = true,
            Err(e) => debug!(target: PLAYER_LOG_TARGET, error = %e, "Installing loop coordinator failed."),
        }
    }

    if !settings.not_auto_play {
        match player.engine.play().await {
            Ok(()) => player.is_playing = true,
            Err(e) => player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string()))),
        }
    }

    info!(
        target: PLAYER_LOG_TARGET,
        item = %item_id,
        generation = player.generation,
        "Reconfigured playback."
    );
}

/// Stops and clears the superseded generation: pause, unloop, drop filters
/// without reapplying them, drop per-item observation, clear the queue.
#[instrument(skip(player))]
pub(super) async fn stop_current(player: &mut Player) {
    if player.is_playing {
        if let Err(e) = player.engine.pause().await {
            debug!(target: PLAYER_LOG_TARGET, error = %e, "Pause while stopping failed.");
        }
        player.is_playing = false;
    }
    if player.is_looping {
        if let Some(item) = player.current_item {
            if let Err(e) = player.engine.set_looping(item, false).await {
                debug!(target: PLAYER_LOG_TARGET, error = %e, "Releasing loop coordinator failed.");
            }
        }
        player.is_looping = false;
    }
    // The item is being replaced; clear filters without visual reapplication.
    player.filters.clear_all();
    player.observations.invalidate_items(player.engine.as_ref());
    player.pending_seek = None;
    if let Err(e) = player.engine.clear_queue().await {
        debug!(target: PLAYER_LOG_TARGET, error = %e, "Clearing the engine queue failed.");
    }
    player.current_item = None;
    player.current_asset = None;
    player.duration = None;
}
