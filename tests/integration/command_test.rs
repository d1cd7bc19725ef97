//! Integration tests for command dispatch
//!
//! Each test drives one command family against the spawned player and checks
//! the engine-visible effect plus the emitted events.

use std::sync::Arc;

use r_playctl::engine::{EngineNotification, EngineProperty, ItemStatus, VectorOverlay};
use r_playctl::error::PlayerError;
use r_playctl::filters::{FilterDescriptor, BRIGHTNESS_FILTER, CONTRAST_FILTER};
use r_playctl::player::{EventTag, OverlayBuilder, PlaybackCommand, PlayerEvent};
use r_playctl::settings::Setting;

use crate::test_utils::{
    events_with_tag, media_dir_with, report_all_settings, settings_with, spawn_player, MockEngine,
    ReadyBehavior, MOCK_DURATION,
};

#[tokio::test]
async fn test_seek_clamps_negative_to_zero() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.settle().await;
    player
        .control(PlaybackCommand::Seek {
            seconds: -5.0,
            autoplay_after: false,
        })
        .await;

    let events = player.collect_events(4).await;
    assert_eq!(
        events_with_tag(&events, EventTag::SeekCompleted),
        vec![PlayerEvent::SeekCompleted {
            success: true,
            seconds: 0.0
        }]
    );
    assert_eq!(engine.call_count("seek:0"), 1);

    player.shutdown().await;
}

#[tokio::test]
async fn test_seek_clamps_overflow_to_duration() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.settle().await;
    player
        .control(PlaybackCommand::Seek {
            seconds: 500.0,
            autoplay_after: true,
        })
        .await;

    let events = player.collect_events(4).await;
    assert_eq!(
        events_with_tag(&events, EventTag::SeekCompleted),
        vec![PlayerEvent::SeekCompleted {
            success: true,
            seconds: MOCK_DURATION
        }]
    );

    player.shutdown().await;
}

#[tokio::test]
async fn test_in_range_seek_is_exact() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.settle().await;
    player
        .control(PlaybackCommand::Seek {
            seconds: 42.5,
            autoplay_after: false,
        })
        .await;

    let events = player.collect_events(4).await;
    assert_eq!(
        events_with_tag(&events, EventTag::SeekCompleted),
        vec![PlayerEvent::SeekCompleted {
            success: true,
            seconds: 42.5
        }]
    );
    assert_eq!(engine.call_count("seek:42.5"), 1);

    player.shutdown().await;
}

#[tokio::test]
async fn test_seek_defers_until_item_ready() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new().with_ready_behavior(ReadyBehavior::Silent));
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.settle().await;
    player
        .control(PlaybackCommand::Seek {
            seconds: 10.0,
            autoplay_after: false,
        })
        .await;
    player.settle().await;
    // Nothing issued yet: the item has no duration.
    assert_eq!(engine.call_count("seek:10"), 0);

    let item = engine.queued_items()[0].id;
    engine
        .notify(
            EngineProperty::ItemStatus(item),
            EngineNotification::ItemStatus {
                item,
                status: ItemStatus::ReadyToPlay,
                cause: None,
            },
        )
        .await;

    let events = player.collect_events(4).await;
    assert_eq!(
        events_with_tag(&events, EventTag::SeekCompleted),
        vec![PlayerEvent::SeekCompleted {
            success: true,
            seconds: 10.0
        }]
    );
    assert_eq!(engine.call_count("seek:10"), 1);

    player.shutdown().await;
}

#[tokio::test]
async fn test_deferred_seek_fails_when_item_never_ready() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new().with_ready_behavior(ReadyBehavior::Silent));
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.settle().await;
    player
        .control(PlaybackCommand::Seek {
            seconds: 10.0,
            autoplay_after: false,
        })
        .await;
    player.settle().await;

    let item = engine.queued_items()[0].id;
    engine
        .notify(
            EngineProperty::ItemStatus(item),
            EngineNotification::ItemStatus {
                item,
                status: ItemStatus::Failed,
                cause: Some("bad media".to_string()),
            },
        )
        .await;

    let events = player.collect_events(3).await;
    assert_eq!(
        events_with_tag(&events, EventTag::SeekCompleted),
        vec![PlayerEvent::SeekCompleted {
            success: false,
            seconds: 10.0
        }]
    );
    assert_eq!(
        events_with_tag(&events, EventTag::Error),
        vec![PlayerEvent::Error(PlayerError::FailedToLoad(
            "bad media".to_string()
        ))]
    );

    player.shutdown().await;
}

#[tokio::test]
async fn test_engine_seek_failure_reports_unsuccessful() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new().with_failing_seeks());
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.settle().await;
    player
        .control(PlaybackCommand::Seek {
            seconds: 10.0,
            autoplay_after: false,
        })
        .await;

    let events = player.collect_events(4).await;
    assert_eq!(
        events_with_tag(&events, EventTag::SeekCompleted),
        vec![PlayerEvent::SeekCompleted {
            success: false,
            seconds: 10.0
        }]
    );

    player.shutdown().await;
}

#[tokio::test]
async fn test_volume_and_speed_are_clamped() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.control(PlaybackCommand::SetVolume(2.5)).await;
    player.control(PlaybackCommand::SetPlaybackSpeed(-3.0)).await;
    player.settle().await;

    assert_eq!(engine.volume(), 1.0);
    assert_eq!(engine.rate(), 0.0);

    // The volume change is republished from the engine notification.
    let events = player.collect_events(3).await;
    assert_eq!(
        events_with_tag(&events, EventTag::VolumeChanged),
        vec![PlayerEvent::VolumeChanged(1.0)]
    );

    player.shutdown().await;
}

#[tokio::test]
async fn test_mute_and_unmute_reach_the_engine() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.control(PlaybackCommand::Mute).await;
    player.settle().await;
    assert!(engine.muted());

    player.control(PlaybackCommand::Unmute).await;
    player.settle().await;
    assert!(!engine.muted());

    player.shutdown().await;
}

#[tokio::test]
async fn test_loop_and_unloop_are_idempotent() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.control(PlaybackCommand::EnableLoop).await;
    player.control(PlaybackCommand::EnableLoop).await;
    player.settle().await;
    assert_eq!(engine.call_count("set_looping:true"), 1);
    assert!(engine.looping().is_some());

    player.control(PlaybackCommand::DisableLoop).await;
    player.control(PlaybackCommand::DisableLoop).await;
    player.settle().await;
    assert_eq!(engine.call_count("set_looping:false"), 1);
    assert!(engine.looping().is_none());

    player.shutdown().await;
}

#[tokio::test]
async fn test_filters_materialize_with_adjustments_last() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player
        .control(PlaybackCommand::ApplyFilter {
            filter: FilterDescriptor::new("sepia"),
            clear_existing: false,
        })
        .await;
    player.control(PlaybackCommand::AdjustBrightness(5.0)).await;
    player.settle().await;

    let compositions = engine.compositions();
    let (_, pipeline) = compositions.last().unwrap();
    assert_eq!(pipeline[0].name, "sepia");
    assert_eq!(pipeline[1].name, BRIGHTNESS_FILTER);
    assert_eq!(pipeline[2].name, CONTRAST_FILTER);
    // Brightness was clamped into range before materializing.
    assert_eq!(pipeline[1].parameters["value"], 1.0);

    player.shutdown().await;
}

#[tokio::test]
async fn test_recompose_pauses_and_resumes_playback() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    // Autoplay is on, so the player is running when the filter lands.
    player.apply(report_all_settings("clip")).await;
    player.settle().await;
    let pauses_before = engine.call_count("pause");
    let plays_before = engine.call_count("play");

    player
        .control(PlaybackCommand::ApplyFilter {
            filter: FilterDescriptor::new("sepia"),
            clear_existing: false,
        })
        .await;
    player.settle().await;

    assert_eq!(engine.call_count("pause"), pauses_before + 1);
    assert_eq!(engine.call_count("play"), plays_before + 1);
    assert!(engine.is_playing());

    player.shutdown().await;
}

#[tokio::test]
async fn test_clear_filters_keeps_adjustments() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player.control(PlaybackCommand::AdjustContrast(2.0)).await;
    player
        .control(PlaybackCommand::ApplyFilter {
            filter: FilterDescriptor::new("sepia"),
            clear_existing: false,
        })
        .await;
    player.control(PlaybackCommand::ClearFilters).await;
    player.settle().await;

    let compositions = engine.compositions();
    let (_, pipeline) = compositions.last().unwrap();
    assert_eq!(pipeline.len(), 2);
    assert_eq!(pipeline[1].name, CONTRAST_FILTER);
    assert_eq!(pipeline[1].parameters["value"], 2.0);

    player.shutdown().await;
}

#[tokio::test]
async fn test_track_selection_reaches_the_engine() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player
        .control(PlaybackCommand::SetSubtitleLanguage(Some("en".to_string())))
        .await;
    player
        .control(PlaybackCommand::SelectAudioTrack("fr".to_string()))
        .await;
    player.control(PlaybackCommand::SetSubtitleLanguage(None)).await;
    player.settle().await;

    use r_playctl::engine::SelectionGroup;
    assert_eq!(
        engine.selections(),
        vec![
            (SelectionGroup::Legible, Some("en".to_string())),
            (SelectionGroup::Audible, Some("fr".to_string())),
            (SelectionGroup::Legible, None),
        ]
    );

    player.shutdown().await;
}

#[tokio::test]
async fn test_pip_requires_support_and_settings() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new().with_pip_supported(false));
    let mut player = spawn_player(engine.clone(), dir.path());

    player
        .apply(settings_with("clip", vec![Setting::EnablePip]))
        .await;
    player.control(PlaybackCommand::StartPip).await;

    let events = player.collect_events(3).await;
    assert_eq!(
        events_with_tag(&events, EventTag::Error),
        vec![PlayerEvent::Error(PlayerError::PipNotSupported)]
    );
    assert_eq!(engine.call_count("start_pip"), 0);

    player.shutdown().await;
}

#[tokio::test]
async fn test_pip_lifecycle_emits_events_once() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    player
        .apply(settings_with("clip", vec![Setting::EnablePip]))
        .await;
    player.control(PlaybackCommand::StartPip).await;
    player.control(PlaybackCommand::StartPip).await;
    player.control(PlaybackCommand::StopPip).await;
    player.control(PlaybackCommand::StopPip).await;
    player.settle().await;

    assert_eq!(engine.call_count("start_pip"), 1);
    assert_eq!(engine.call_count("stop_pip"), 1);

    let events = player.collect_events(4).await;
    assert_eq!(
        events_with_tag(&events, EventTag::PipStarted),
        vec![PlayerEvent::PipStarted]
    );
    assert_eq!(
        events_with_tag(&events, EventTag::PipStopped),
        vec![PlayerEvent::PipStopped]
    );

    player.shutdown().await;
}

#[tokio::test]
async fn test_overlays_require_the_settings_flag() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let player = spawn_player(engine.clone(), dir.path());

    player.apply(report_all_settings("clip")).await;
    player
        .control(PlaybackCommand::AddVectorOverlay {
            builder: OverlayBuilder::new(|frame| VectorOverlay {
                frame,
                contents: serde_json::json!({ "shape": "badge" }),
            }),
            clear_existing: false,
        })
        .await;
    player.settle().await;

    assert!(engine.overlays().is_empty());

    player.shutdown().await;
}

#[tokio::test]
async fn test_bounds_change_relays_overlays_and_reports() {
    let dir = media_dir_with(&["clip.mp4"]);
    let engine = Arc::new(MockEngine::new());
    let mut player = spawn_player(engine.clone(), dir.path());

    player
        .apply(settings_with("clip", vec![Setting::EnableVectorOverlay]))
        .await;
    player
        .control(PlaybackCommand::AddVectorOverlay {
            builder: OverlayBuilder::new(|frame| VectorOverlay {
                frame,
                contents: serde_json::json!({ "shape": "badge" }),
            }),
            clear_existing: false,
        })
        .await;
    player.settle().await;
    assert_eq!(engine.overlays().len(), 1);

    use r_playctl::engine::Bounds;
    let bounds = Bounds::new(0.0, 0.0, 640.0, 360.0);
    player
        .command_tx
        .send(r_playctl::player::PlayerCommand::SetBounds(bounds))
        .await
        .unwrap();
    player.settle().await;

    let overlays = engine.overlays();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].frame, bounds);

    let events = player.collect_events(3).await;
    assert_eq!(
        events_with_tag(&events, EventTag::BoundsChanged),
        vec![PlayerEvent::BoundsChanged(bounds)]
    );

    player.shutdown().await;
}
