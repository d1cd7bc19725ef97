// src/player/run_loop.rs
use std::time::Duration as StdDuration;
use tokio::time::interval;
use tracing::{debug, info, trace};

use super::aggregator::EVENT_BATCH_WINDOW;
use super::{command_handler, dispatch, observers, reconfigure};
use super::{Player, PlayerCommand, PLAYER_LOG_TARGET};

/// Runs the player's single-writer processing loop. Every mutation of player
/// state happens here: commands, re-marshaled engine notifications, and the
/// two timers all land on this one task.
pub(super) async fn run_player_loop(player: &mut Player) {
    info!(target: PLAYER_LOG_TARGET, "Player run loop started.");
    player.setup_base_observations();

    let mut flush_interval = interval(EVENT_BATCH_WINDOW);
    let mut time_interval: Option<tokio::time::Interval> = None;
    let mut configured_cadence: Option<StdDuration> = None;

    loop {
        // Rebuild the time publisher whenever settings changed its cadence.
        let desired = player
            .settings
            .as_ref()
            .and_then(|settings| settings.time_publish_interval);
        if desired != configured_cadence {
            debug!(target: PLAYER_LOG_TARGET, ?desired, "Time publish cadence changed.");
            configured_cadence = desired;
            time_interval = desired.map(interval);
        }

        tokio::select! {
            biased; // Commands first, then notifications, then timers.

            // --- Command Processing ---
            Some(command) = player.command_rx.recv() => {
                trace!(target: PLAYER_LOG_TARGET, "Received command: {:?}", command);
                match command {
                    PlayerCommand::Apply(settings) => {
                        reconfigure::apply_settings(player, settings, false).await
                    }
                    PlayerCommand::Control(command) => dispatch::dispatch(player, command).await,
                    PlayerCommand::SetBounds(bounds) => {
                        command_handler::handle_set_bounds(player, bounds).await
                    }
                    PlayerCommand::GetFullState(responder) => {
                        let _ = responder.send(player.full_state()); // Ignore error if receiver dropped
                    }
                    PlayerCommand::SeekFinished { generation, success, seconds, autoplay_after } => {
                        command_handler::handle_seek_finished(
                            player, generation, success, seconds, autoplay_after,
                        )
                        .await
                    }
                    PlayerCommand::Shutdown => {
                        info!(target: PLAYER_LOG_TARGET, "Shutdown command received. Exiting run loop.");
                        break;
                    }
                }
            }

            // --- Engine Notifications ---
            Some(notification) = player.notification_rx.recv() => {
                observers::handle_notification(player, notification).await;
            }

            // --- Batched Event Delivery ---
            _ = flush_interval.tick() => {
                player.aggregator.flush();
            }

            // --- Periodic Time Publishing ---
            _ = async { time_interval.as_mut().unwrap().tick().await },
                if time_interval.is_some() && player.is_playing =>
            {
                let seconds = player.engine.position().await;
                trace!(target: PLAYER_LOG_TARGET, seconds, "Publishing playback time.");
                player.publish_time(seconds);
            }

            else => {
                // All channels closed; nothing can reach the player anymore.
                info!(target: PLAYER_LOG_TARGET, "Command channel closed. Exiting run loop.");
                break;
            }
        }
    }

    info!(target: PLAYER_LOG_TARGET, "Player run loop finished. Performing final cleanup.");
    player.teardown().await;
}
