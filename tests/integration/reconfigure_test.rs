//! Integration tests for the reconfigure path
//!
//! These tests drive the player task end to end against the mock engine:
//! settings in, events out.

use std::sync::Arc;

use r_playctl::engine::{EngineNotification, EngineProperty, ItemStatus};
use r_playctl::error::PlayerError;
use r_playctl::player::{EventTag, PlayerEvent};
use r_playctl::settings::{Setting, SettingsModel};

use crate::test_utils::{
    events_with_tag, media_dir_with, report_all_settings, settings_with, spawn_player, MockEngine,
    ReadyBehavior, MOCK_DURATION,
};

#[tokio::test]
async fn test_reconfigure_emits_ready_duration_playing_and_installs_loop() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    player
        .apply(settings_with("clip", vec![Setting::Loop]))
        .await;

    let events = player.collect_events(3).await;
    let interesting: Vec<_> = events
        .iter()
        .filter(|event| {
            matches!(
                event.tag(),
                EventTag::ItemStatusChanged | EventTag::DurationKnown | EventTag::Playing
            )
        })
        .cloned()
        .collect();
    assert_eq!(
        interesting,
        vec![
            PlayerEvent::ItemStatusChanged(ItemStatus::ReadyToPlay),
            PlayerEvent::DurationKnown(MOCK_DURATION),
            PlayerEvent::Playing,
        ]
    );
    assert!(engine.looping().is_some());

    player.shutdown().await;
}

#[tokio::test]
async fn test_reconfigure_with_same_url_is_idempotent() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.settle().await;
    player.apply(report_all_settings("clip")).await;
    player.settle().await;

    // Exactly one teardown/setup cycle.
    assert_eq!(engine.call_count("enqueue"), 1);
    assert_eq!(engine.call_count("clear_queue"), 1);

    player.shutdown().await;
}

#[tokio::test]
async fn test_unresolved_source_reports_error_and_queues_nothing() {
    let dir = media_dir_with(&[]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("nope.mp4")).await;

    let events = player.collect_events(1).await;
    assert_eq!(
        events_with_tag(&events, EventTag::Error),
        vec![PlayerEvent::Error(PlayerError::SourceNotFound(
            "nope.mp4".to_string()
        ))]
    );
    assert_eq!(engine.queue_len(), 0);
    assert_eq!(engine.call_count("enqueue"), 0);

    player.shutdown().await;
}

#[tokio::test]
async fn test_player_reusable_after_resolution_failure() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("nope.mp4")).await;
    player.settle().await;
    player.apply(report_all_settings("clip")).await;
    player.settle().await;

    assert_eq!(engine.call_count("enqueue"), 1);
    let events = player.collect_events(2).await;
    assert!(!events_with_tag(&events, EventTag::ItemStatusChanged).is_empty());

    player.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_option_kinds_are_advisory() {
    let dir = media_dir_with(&["first.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    let settings = SettingsModel::from_options(vec![
        Setting::SourceName("first".to_string()),
        Setting::SourceName("second".to_string()),
        Setting::FileExtension("mp4".to_string()),
        Setting::Events(Vec::new()),
    ]);
    assert!(!settings.are_unique());
    player.apply(settings).await;

    let events = player.collect_events(2).await;
    assert_eq!(
        events_with_tag(&events, EventTag::Error),
        vec![PlayerEvent::Error(PlayerError::SettingsNotUnique)]
    );
    // Playback still proceeds with the first source name.
    assert_eq!(engine.call_count("enqueue"), 1);
    let queued = engine.queued_items();
    assert!(queued[0].asset.url.path().ends_with("first.mp4"));

    player.shutdown().await;
}

#[tokio::test]
async fn test_item_failure_is_reported_through_events() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new().with_ready_behavior(ReadyBehavior::Fail));
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;

    let events = player.collect_events(1).await;
    assert_eq!(
        events_with_tag(&events, EventTag::Error),
        vec![PlayerEvent::Error(PlayerError::FailedToLoad(
            "mock load failure".to_string()
        ))]
    );

    player.shutdown().await;
}

#[tokio::test]
async fn test_subtitles_merge_into_the_queued_asset() {
    let dir = media_dir_with(&["clip.mp4", "subs.vtt"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    player
        .apply(settings_with(
            "clip",
            vec![Setting::Subtitles("subs".to_string())],
        ))
        .await;
    player.settle().await;

    let queued = engine.queued_items();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].asset.url.fragment(), Some("merged"));

    player.shutdown().await;
}

#[tokio::test]
async fn test_subtitle_without_text_track_degrades_silently() {
    let dir = media_dir_with(&["clip.mp4", "subs.vtt"]);
    let engine = Arc::new(MockEngine::new().with_subtitle_tracks(Vec::new()));
    let player = spawn_player(engine.clone(), dir.path());

    player
        .apply(settings_with(
            "clip",
            vec![Setting::Subtitles("subs".to_string())],
        ))
        .await;
    player.settle().await;

    let queued = engine.queued_items();
    assert_eq!(queued[0].asset.url.fragment(), None);
    assert_eq!(engine.call_count("compose_with_subtitles"), 0);

    player.shutdown().await;
}

#[tokio::test]
async fn test_failed_track_load_degrades_silently() {
    let dir = media_dir_with(&["clip.mp4", "subs.vtt"]);
    let engine = Arc::new(MockEngine::new().with_failing_track_loads());
    let player = spawn_player(engine.clone(), dir.path());

    player
        .apply(settings_with(
            "clip",
            vec![Setting::Subtitles("subs".to_string())],
        ))
        .await;
    player.settle().await;

    let queued = engine.queued_items();
    assert_eq!(queued[0].asset.url.fragment(), None);
    assert_eq!(engine.call_count("compose_with_subtitles"), 0);

    player.shutdown().await;
}

#[tokio::test]
async fn test_failed_composition_degrades_silently() {
    let dir = media_dir_with(&["clip.mp4", "subs.vtt"]);
    let engine = Arc::new(MockEngine::new().with_failing_composition());
    let mut player = spawn_player(engine.clone(), dir.path());

    player
        .apply(settings_with(
            "clip",
            vec![Setting::Subtitles("subs".to_string())],
        ))
        .await;
    player.settle().await;

    let queued = engine.queued_items();
    assert_eq!(queued[0].asset.url.fragment(), None);
    // No error event: the degrade is silent.
    let events = player.collect_events(1).await;
    assert!(events_with_tag(&events, EventTag::Error).is_empty());

    player.shutdown().await;
}

#[tokio::test]
async fn test_superseded_generation_emits_no_events() {
    let dir = media_dir_with(&["one.mp4", "two.mp4"]);
    let engine = Arc::new(MockEngine::new().with_ready_behavior(ReadyBehavior::Silent));
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("one")).await;
    player.settle().await;
    let first_item = engine.queued_items()[0].id;

    player.apply(report_all_settings("two")).await;
    player.settle().await;
    let second_item = engine.queued_items()[0].id;
    assert_ne!(first_item, second_item);

    // The first item's observation was invalidated with its generation; its
    // late readiness goes nowhere.
    engine
        .notify(
            EngineProperty::ItemStatus(first_item),
            EngineNotification::ItemStatus {
                item: first_item,
                status: ItemStatus::ReadyToPlay,
                cause: None,
            },
        )
        .await;
    engine
        .notify(
            EngineProperty::ItemStatus(second_item),
            EngineNotification::ItemStatus {
                item: second_item,
                status: ItemStatus::ReadyToPlay,
                cause: None,
            },
        )
        .await;

    // Playing/Paused republishes from both applies precede the readiness
    // events; collect generously before filtering.
    let events = player.collect_events(5).await;
    let status_events = events_with_tag(&events, EventTag::ItemStatusChanged);
    assert_eq!(
        status_events,
        vec![PlayerEvent::ItemStatusChanged(ItemStatus::ReadyToPlay)]
    );

    player.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_tears_down_observations_and_queue() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.settle().await;
    assert!(engine.subscriber_count() > 0);

    player.shutdown().await;

    assert_eq!(engine.subscriber_count(), 0);
    assert_eq!(engine.queue_len(), 0);
    assert!(!engine.is_playing());
}
