//! The declarative option list and its kind tags.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Gravity;
use crate::player::state::EventTag;

/// One declarative playback option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Setting {
    SourceName(String),
    FileExtension(String),
    Subtitles(String),
    Loop,
    Mute,
    NotAutoPlay,
    EnablePip,
    EnableVectorOverlay,
    TimePublishInterval(Duration),
    Gravity(Gravity),
    Events(Vec<EventTag>),
}

/// Discriminant of a [`Setting`], used for duplicate detection and for the
/// first-match-wins fetch over the option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    SourceName,
    FileExtension,
    Subtitles,
    Loop,
    Mute,
    NotAutoPlay,
    EnablePip,
    EnableVectorOverlay,
    TimePublishInterval,
    Gravity,
    Events,
}

impl Setting {
    /// The option's kind tag, independent of its payload.
    pub fn kind(&self) -> SettingKind {
        match self {
            Setting::SourceName(_) => SettingKind::SourceName,
            Setting::FileExtension(_) => SettingKind::FileExtension,
            Setting::Subtitles(_) => SettingKind::Subtitles,
            Setting::Loop => SettingKind::Loop,
            Setting::Mute => SettingKind::Mute,
            Setting::NotAutoPlay => SettingKind::NotAutoPlay,
            Setting::EnablePip => SettingKind::EnablePip,
            Setting::EnableVectorOverlay => SettingKind::EnableVectorOverlay,
            Setting::TimePublishInterval(_) => SettingKind::TimePublishInterval,
            Setting::Gravity(_) => SettingKind::Gravity,
            Setting::Events(_) => SettingKind::Events,
        }
    }
}
