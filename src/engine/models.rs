//! Value types shared across the media-engine boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Identifier of one queued item inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        ItemId(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A resolved, playable asset reference. Two assets are the same playable
/// source iff their URLs are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub url: Url,
}

impl AssetRef {
    pub fn new(url: Url) -> Self {
        AssetRef { url }
    }
}

/// Track kinds the engine reports for a loaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
    Text,
}

/// Load state of a queued item. `Unknown` resolves exactly once into one of
/// the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Unknown,
    ReadyToPlay,
    Failed,
}

/// The engine's transport state, republished verbatim by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeControlStatus {
    Paused,
    WaitingToPlay,
    Playing,
}

/// One playable entry in the engine queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedItem {
    pub id: ItemId,
    pub asset: AssetRef,
}

impl QueuedItem {
    pub fn new(asset: AssetRef) -> Self {
        QueuedItem {
            id: ItemId::new(),
            asset,
        }
    }
}

/// Alternative-track groups the engine can select one member from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionGroup {
    /// Subtitle / caption tracks.
    Legible,
    /// Audio language tracks.
    Audible,
}

/// A rectangle in host-view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Bounds {
            x,
            y,
            width,
            height,
        }
    }
}

/// An overlay graphic produced by a host-supplied builder for a given frame.
/// The player owns placement; the contents stay opaque to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorOverlay {
    pub frame: Bounds,
    pub contents: serde_json::Value,
}

/// Property-change notifications pushed by the engine to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineNotification {
    /// The engine-level error property changed.
    EngineFailure(String),
    /// The engine's time-control status changed.
    TimeControl(TimeControlStatus),
    /// The current item changed; `None` means the item was removed.
    CurrentItem(Option<ItemId>),
    /// The output volume changed.
    Volume(f32),
    /// A queued item's load status changed.
    ItemStatus {
        item: ItemId,
        status: ItemStatus,
        cause: Option<String>,
    },
}

/// Observable engine properties, used as subscription keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineProperty {
    Error,
    TimeControl,
    CurrentItem,
    Volume,
    /// Per-item load status; keyed by the item it belongs to.
    ItemStatus(ItemId),
}
