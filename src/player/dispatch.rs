//! Command mapping and host-side repeat suppression.

use tracing::trace;

use super::command_handler;
use super::state::PlaybackCommand;
use super::{Player, PLAYER_LOG_TARGET};

/// Maps one [`PlaybackCommand`] to its handler. No deduplication happens
/// here: every command that reaches the player executes.
pub(super) async fn dispatch(player: &mut Player, command: PlaybackCommand) {
    match command {
        PlaybackCommand::Idle => command_handler::handle_idle(player).await,
        PlaybackCommand::Play => command_handler::handle_play(player).await,
        PlaybackCommand::Pause => command_handler::handle_pause(player).await,
        PlaybackCommand::Seek {
            seconds,
            autoplay_after,
        } => command_handler::handle_seek(player, seconds, autoplay_after).await,
        PlaybackCommand::ToStart => command_handler::handle_to_start(player).await,
        PlaybackCommand::ToEnd => command_handler::handle_to_end(player).await,
        PlaybackCommand::Mute => command_handler::handle_mute(player).await,
        PlaybackCommand::Unmute => command_handler::handle_unmute(player).await,
        PlaybackCommand::SetVolume(volume) => {
            command_handler::handle_set_volume(player, volume).await
        }
        PlaybackCommand::SetPlaybackSpeed(rate) => {
            command_handler::handle_set_playback_speed(player, rate).await
        }
        PlaybackCommand::SetSubtitleLanguage(language) => {
            command_handler::handle_set_subtitle_language(player, language).await
        }
        PlaybackCommand::EnableLoop => command_handler::handle_enable_loop(player).await,
        PlaybackCommand::DisableLoop => command_handler::handle_disable_loop(player).await,
        PlaybackCommand::AdjustBrightness(value) => {
            command_handler::handle_adjust_brightness(player, value).await
        }
        PlaybackCommand::AdjustContrast(value) => {
            command_handler::handle_adjust_contrast(player, value).await
        }
        PlaybackCommand::ApplyFilter {
            filter,
            clear_existing,
        } => command_handler::handle_apply_filter(player, filter, clear_existing).await,
        PlaybackCommand::ClearFilters => command_handler::handle_clear_filters(player).await,
        PlaybackCommand::SelectAudioTrack(language) => {
            command_handler::handle_select_audio_track(player, language).await
        }
        PlaybackCommand::AddVectorOverlay {
            builder,
            clear_existing,
        } => command_handler::handle_add_vector_overlay(player, builder, clear_existing).await,
        PlaybackCommand::ClearVectorOverlays => {
            command_handler::handle_clear_vector_overlays(player).await
        }
        PlaybackCommand::StartPip => command_handler::handle_start_pip(player).await,
        PlaybackCommand::StopPip => command_handler::handle_stop_pip(player).await,
    }
}

/// Host-held last-command memory. The player never consults this; hosts run
/// their command stream through it to suppress immediately-repeated identical
/// commands. `Idle` resets the memory so the next repeat is accepted as new.
#[derive(Debug, Default)]
pub struct CommandDebouncer {
    last: Option<PlaybackCommand>,
}

impl CommandDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the command when it should be forwarded, `None` when it is an
    /// immediate repeat of the previous one.
    pub fn admit(&mut self, command: PlaybackCommand) -> Option<PlaybackCommand> {
        if matches!(command, PlaybackCommand::Idle) {
            self.last = None;
            return Some(command);
        }
        if self.last.as_ref() == Some(&command) {
            trace!(target: PLAYER_LOG_TARGET, ?command, "Suppressing repeated command.");
            return None;
        }
        self.last = Some(command.clone());
        Some(command)
    }
}
