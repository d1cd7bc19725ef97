//! Declarative playback settings.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::player::state::EventTag;

mod options;

pub use options::{Setting, SettingKind};

/// How video content is fit into the hosting surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gravity {
    #[default]
    Fit,
    Fill,
    Stretch,
}

fn default_unique() -> bool {
    true
}

/// Immutable playback configuration. Built either from an ordered list of
/// declarative [`Setting`]s or through the field-wise [`new`](Self::new)
/// constructor; handed to the player by value on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsModel {
    /// Logical source name: a URL or a local resource name.
    pub name: String,
    /// Extension used when the name carries none.
    pub ext: String,
    /// Subtitle resource name; empty means no subtitles.
    #[serde(default)]
    pub subtitles: String,
    #[serde(default)]
    pub looped: bool,
    #[serde(default)]
    pub muted: bool,
    /// Suppresses the automatic play after a reconfigure.
    #[serde(default)]
    pub not_auto_play: bool,
    #[serde(default)]
    pub pip_enabled: bool,
    #[serde(default)]
    pub vector_overlay_enabled: bool,
    /// Cadence of the time stream; `None` disables time publishing.
    #[serde(default)]
    pub time_publish_interval: Option<Duration>,
    #[serde(default)]
    pub gravity: Gravity,
    /// Event-kind filter. `None` delivers nothing, an empty set delivers
    /// everything, otherwise only matching kinds are delivered.
    #[serde(default)]
    pub events: Option<Vec<EventTag>>,
    #[serde(default = "default_unique")]
    are_unique: bool,
}

impl Default for SettingsModel {
    fn default() -> Self {
        SettingsModel {
            name: String::new(),
            ext: "mp4".to_string(),
            subtitles: String::new(),
            looped: false,
            muted: false,
            not_auto_play: false,
            pip_enabled: false,
            vector_overlay_enabled: false,
            time_publish_interval: None,
            gravity: Gravity::default(),
            events: None,
            are_unique: true,
        }
    }
}

impl SettingsModel {
    /// Field-wise constructor kept for callers that predate the option list.
    /// Here a `None` events argument means "report everything".
    pub fn new(name: &str, ext: &str, events: Option<Vec<EventTag>>) -> Self {
        SettingsModel {
            name: name.to_string(),
            ext: ext.to_string(),
            events: Some(events.unwrap_or_default()),
            ..Default::default()
        }
    }

    /// Builds the model from an ordered option list. Each option kind may
    /// appear at most once; on a repeat the first occurrence wins and the
    /// uniqueness flag drops. Duplicates never block construction.
    pub fn from_options(options: Vec<Setting>) -> Self {
        let mut model = SettingsModel::default();
        let mut seen: HashSet<SettingKind> = HashSet::new();
        for option in options {
            if !seen.insert(option.kind()) {
                model.are_unique = false;
                continue;
            }
            match option {
                Setting::SourceName(name) => model.name = name,
                Setting::FileExtension(ext) => model.ext = ext,
                Setting::Subtitles(name) => model.subtitles = name,
                Setting::Loop => model.looped = true,
                Setting::Mute => model.muted = true,
                Setting::NotAutoPlay => model.not_auto_play = true,
                Setting::EnablePip => model.pip_enabled = true,
                Setting::EnableVectorOverlay => model.vector_overlay_enabled = true,
                Setting::TimePublishInterval(interval) => {
                    model.time_publish_interval = Some(interval)
                }
                Setting::Gravity(gravity) => model.gravity = gravity,
                Setting::Events(tags) => model.events = Some(tags),
            }
        }
        model
    }

    /// Whether every option kind appeared at most once during construction.
    pub fn are_unique(&self) -> bool {
        self.are_unique
    }
}
