use tracing::{debug, instrument, trace, warn};

use super::reconfigure;
use super::state::{OverlayBuilder, PlayerCommand, PlayerEvent};
use super::{PendingSeek, Player, PLAYER_LOG_TARGET};
use crate::engine::{Bounds, ItemId, SelectionGroup};
use crate::error::PlayerError;
use crate::filters::FilterDescriptor;

/// Clamps a seek target into `[0, duration]`.
pub(super) fn clamp_seek(seconds: f64, duration: f64) -> f64 {
    if seconds < 0.0 {
        0.0
    } else if seconds >= duration {
        duration
    } else {
        seconds
    }
}

/// `Idle` exists so hosts can reset their debouncer memory; the player treats
/// it as a no-op.
pub(super) async fn handle_idle(_player: &mut Player) {
    trace!(target: PLAYER_LOG_TARGET, "Idle command; nothing to do.");
}

#[instrument(skip(player))]
pub(super) async fn handle_play(player: &mut Player) {
    if let Err(e) = player.engine.play().await {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
        return;
    }
    player.is_playing = true;
}

#[instrument(skip(player))]
pub(super) async fn handle_pause(player: &mut Player) {
    if let Err(e) = player.engine.pause().await {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
        return;
    }
    player.is_playing = false;
}

#[instrument(skip(player), fields(seconds, autoplay_after))]
pub(super) async fn handle_seek(player: &mut Player, seconds: f64, autoplay_after: bool) {
    match (player.current_item, player.duration) {
        (Some(item), Some(duration)) => {
            start_seek(player, item, clamp_seek(seconds, duration), autoplay_after);
        }
        (Some(_), None) => {
            // Not ready yet; retried once the item reports a duration.
            debug!(target: PLAYER_LOG_TARGET, "Deferring seek until the item is ready.");
            player.pending_seek = Some(PendingSeek {
                seconds,
                autoplay_after,
                generation: player.generation,
            });
        }
        (None, _) => {
            // Nothing loaded. Re-apply the held settings and wait for
            // readiness; without settings the seek can only fail.
            let Some(settings) = player.settings.clone() else {
                player.emit(PlayerEvent::SeekCompleted {
                    success: false,
                    seconds,
                });
                return;
            };
            reconfigure::apply_settings(player, settings, true).await;
            if player.current_item.is_some() {
                player.pending_seek = Some(PendingSeek {
                    seconds,
                    autoplay_after,
                    generation: player.generation,
                });
            } else {
                player.emit(PlayerEvent::SeekCompleted {
                    success: false,
                    seconds,
                });
            }
        }
    }
}

/// Issues the engine seek on a task; the completion is re-marshaled into the
/// run loop as `SeekFinished` carrying the generation it belongs to.
pub(super) fn start_seek(player: &mut Player, item: ItemId, seconds: f64, autoplay_after: bool) {
    let engine = player.engine.clone();
    let internal_tx = player.internal_command_tx.clone();
    let generation = player.generation;
    tokio::spawn(async move {
        let (success, position) = match engine.seek(item, seconds, 0.0).await {
            Ok(position) => (true, position),
            Err(e) => {
                debug!(target: PLAYER_LOG_TARGET, error = %e, "Engine seek failed.");
                (false, seconds)
            }
        };
        let finished = PlayerCommand::SeekFinished {
            generation,
            success,
            seconds: position,
            autoplay_after,
        };
        if internal_tx.send(finished).await.is_err() {
            debug!(target: PLAYER_LOG_TARGET, "Player gone before seek completion could be delivered.");
        }
    });
}

#[instrument(skip(player))]
pub(super) async fn handle_seek_finished(
    player: &mut Player,
    generation: u64,
    success: bool,
    seconds: f64,
    autoplay_after: bool,
) {
    if generation != player.generation {
        trace!(target: PLAYER_LOG_TARGET, generation, "Dropping stale seek completion.");
        return;
    }
    player.emit(PlayerEvent::SeekCompleted { success, seconds });
    if autoplay_after {
        handle_play(player).await;
    } else {
        handle_pause(player).await;
    }
}

pub(super) async fn handle_to_start(player: &mut Player) {
    let autoplay_after = player.is_playing;
    handle_seek(player, 0.0, autoplay_after).await;
}

pub(super) async fn handle_to_end(player: &mut Player) {
    let autoplay_after = player.is_playing;
    // Clamping pins this to the duration once it is known.
    handle_seek(player, f64::MAX, autoplay_after).await;
}

#[instrument(skip(player))]
pub(super) async fn handle_mute(player: &mut Player) {
    if let Err(e) = player.engine.set_muted(true).await {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
        return;
    }
    player.muted = true;
}

#[instrument(skip(player))]
pub(super) async fn handle_unmute(player: &mut Player) {
    if let Err(e) = player.engine.set_muted(false).await {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
        return;
    }
    player.muted = false;
}

#[instrument(skip(player))]
pub(super) async fn handle_set_volume(player: &mut Player, volume: f32) {
    let volume = volume.clamp(0.0, 1.0);
    if let Err(e) = player.engine.set_volume(volume).await {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
        return;
    }
    player.volume = volume;
}

#[instrument(skip(player))]
pub(super) async fn handle_set_playback_speed(player: &mut Player, rate: f32) {
    let rate = rate.max(0.0);
    if let Err(e) = player.engine.set_rate(rate).await {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
        return;
    }
    player.rate = rate;
}

#[instrument(skip(player))]
pub(super) async fn handle_set_subtitle_language(player: &mut Player, language: Option<String>) {
    if let Err(e) = player
        .engine
        .select_track(SelectionGroup::Legible, language)
        .await
    {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
    }
}

#[instrument(skip(player))]
pub(super) async fn handle_select_audio_track(player: &mut Player, language: String) {
    if let Err(e) = player
        .engine
        .select_track(SelectionGroup::Audible, Some(language))
        .await
    {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
    }
}

#[instrument(skip(player))]
pub(super) async fn handle_enable_loop(player: &mut Player) {
    if player.is_looping {
        trace!(target: PLAYER_LOG_TARGET, "Already looping; nothing to do.");
        return;
    }
    let Some(item) = player.current_item else {
        warn!(target: PLAYER_LOG_TARGET, "No current item to loop.");
        return;
    };
    if let Err(e) = player.engine.set_looping(item, true).await {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
        return;
    }
    player.is_looping = true;
}

#[instrument(skip(player))]
pub(super) async fn handle_disable_loop(player: &mut Player) {
    if !player.is_looping {
        trace!(target: PLAYER_LOG_TARGET, "Not looping; nothing to do.");
        return;
    }
    if let Some(item) = player.current_item {
        if let Err(e) = player.engine.set_looping(item, false).await {
            player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
            return;
        }
    }
    player.is_looping = false;
}

pub(super) async fn handle_adjust_brightness(player: &mut Player, value: f32) {
    player.filters.set_brightness(value);
    recompose(player).await;
}

pub(super) async fn handle_adjust_contrast(player: &mut Player, value: f32) {
    player.filters.set_contrast(value);
    recompose(player).await;
}

#[instrument(skip(player, filter), fields(filter = %filter.name))]
pub(super) async fn handle_apply_filter(
    player: &mut Player,
    filter: FilterDescriptor,
    clear_existing: bool,
) {
    if clear_existing {
        player.filters.clear_all();
    }
    player.filters.append(filter);
    recompose(player).await;
}

#[instrument(skip(player))]
pub(super) async fn handle_clear_filters(player: &mut Player) {
    player.filters.clear_all();
    recompose(player).await;
}

/// Pushes the materialized pipeline to the queued item. Playback pauses for
/// the swap and resumes only if it was running before.
#[instrument(skip(player))]
pub(super) async fn recompose(player: &mut Player) {
    let Some(item) = player.current_item else {
        trace!(target: PLAYER_LOG_TARGET, "No item; the pipeline applies on the next reconfigure.");
        return;
    };
    let was_playing = player.is_playing;
    if was_playing {
        if let Err(e) = player.engine.pause().await {
            debug!(target: PLAYER_LOG_TARGET, error = %e, "Pause before recomposition failed.");
        }
    }
    if let Err(e) = player
        .engine
        .apply_composition(item, &player.filters.materialize())
        .await
    {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
    }
    if was_playing {
        if let Err(e) = player.engine.play().await {
            debug!(target: PLAYER_LOG_TARGET, error = %e, "Resume after recomposition failed.");
        }
    }
}

#[instrument(skip(player, builder))]
pub(super) async fn handle_add_vector_overlay(
    player: &mut Player,
    builder: OverlayBuilder,
    clear_existing: bool,
) {
    let enabled = player
        .settings
        .as_ref()
        .map_or(false, |s| s.vector_overlay_enabled);
    if !enabled {
        warn!(target: PLAYER_LOG_TARGET, "Vector overlays are disabled by the active settings.");
        return;
    }
    if clear_existing {
        player.overlay_builders.clear();
        if let Err(e) = player.engine.clear_overlays().await {
            debug!(target: PLAYER_LOG_TARGET, error = %e, "Clearing overlays failed.");
        }
    }
    let overlay = builder.build(player.bounds);
    if let Err(e) = player.engine.add_overlay(overlay).await {
        player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string())));
        return;
    }
    player.overlay_builders.push(builder);
}

#[instrument(skip(player))]
pub(super) async fn handle_clear_vector_overlays(player: &mut Player) {
    player.overlay_builders.clear();
    if let Err(e) = player.engine.clear_overlays().await {
        debug!(target: PLAYER_LOG_TARGET, error = %e, "Clearing overlays failed.");
    }
}

/// Re-lays every stored overlay against the new frame, then reports it.
#[instrument(skip(player), fields(width = bounds.width, height = bounds.height))]
pub(super) async fn handle_set_bounds(player: &mut Player, bounds: Bounds) {
    player.bounds = bounds;
    if !player.overlay_builders.is_empty() {
        if let Err(e) = player.engine.clear_overlays().await {
            debug!(target: PLAYER_LOG_TARGET, error = %e, "Clearing overlays for re-layout failed.");
        }
        for builder in &player.overlay_builders {
            if let Err(e) = player.engine.add_overlay(builder.build(bounds)).await {
                debug!(target: PLAYER_LOG_TARGET, error = %e, "Re-placing overlay failed.");
            }
        }
    }
    player.emit(PlayerEvent::BoundsChanged(bounds));
}

#[instrument(skip(player))]
pub(super) async fn handle_start_pip(player: &mut Player) {
    let enabled = player.settings.as_ref().map_or(false, |s| s.pip_enabled);
    if !enabled || !player.engine.pip_supported() {
        player.emit(PlayerEvent::Error(PlayerError::PipNotSupported));
        return;
    }
    if player.pip_active {
        trace!(target: PLAYER_LOG_TARGET, "Picture-in-picture already active.");
        return;
    }
    match player.engine.start_pip().await {
        Ok(()) => {
            player.pip_active = true;
            player.emit(PlayerEvent::PipStarted);
        }
        Err(e) => player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string()))),
    }
}

#[instrument(skip(player))]
pub(super) async fn handle_stop_pip(player: &mut Player) {
    if !player.pip_active {
        trace!(target: PLAYER_LOG_TARGET, "Picture-in-picture not active; nothing to do.");
        return;
    }
    match player.engine.stop_pip().await {
        Ok(()) => {
            player.pip_active = false;
            player.emit(PlayerEvent::PipStopped);
        }
        Err(e) => player.emit(PlayerEvent::Error(PlayerError::RemoteEngine(e.to_string()))),
    }
}
