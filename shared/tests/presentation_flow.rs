mod common;

use assert_matches::assert_matches;
use crux_core::Request;
use noemafeed_shared::capabilities::{
    ClipboardError, EngineOperation, ShareError, ShareOutput,
};
use noemafeed_shared::config::SHARE_TITLE;
use noemafeed_shared::error::{ANALYSIS_FAILED_MESSAGE, DEGRADED_ENGINE_MESSAGE};
use noemafeed_shared::{
    digest_from_url, dispatch, AnalysisRegion, AnalysisStatus, DigestPayload, Direction, Effect,
    EngineStatus, Event, Mode, ToastKind, MSG_ANALYSIS_COPIED, MSG_ANALYSIS_SHARED, MSG_COPY_FAILED,
    MSG_ENGINE_OFF, MSG_LINK_COPIED, MSG_SHARE_FAILED, MSG_SHARE_UNSUPPORTED_LINK_COPIED,
};
use url::Url;

use common::{FakeEngine, Harness};

fn engine_request(effects: Vec<Effect>) -> Request<EngineOperation> {
    effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Engine(request) => Some(request),
            _ => None,
        })
        .expect("an engine request")
}

#[tokio::test]
async fn startup_renders_first_event() {
    let h = Harness::started(FakeEngine::default()).await;

    assert_eq!(h.model.engine, EngineStatus::Ready);
    let view = h.app.view(&h.model);
    assert_eq!(view.position, 0);
    assert_eq!(view.analysis.status, AnalysisStatus::Ready);
    assert_eq!(view.analysis.mode_label.as_deref(), Some("analytical"));
    assert!(view.analysis.markup.contains(&view.title));
    assert!(view.analysis.markup.contains("1990"));
    assert!(h.renders > 0);
}

#[tokio::test]
async fn navigation_over_two_events() {
    let mut h = Harness::two_events(FakeEngine::default());
    h.run(Event::AppStarted).await;

    h.run(Event::Navigate {
        direction: Direction::Next,
    })
    .await;
    let view = h.app.view(&h.model);
    assert_eq!(h.model.cursor.index(), 1);
    assert_eq!(view.title, "E2 title");
    assert!(view.analysis.markup.contains("E2 title"));
    assert!(!view.can_go_next);
    assert!(view.can_go_prev);

    let seq = h.model.render_seq;
    let effects = h.send(Event::Navigate {
        direction: Direction::Next,
    });
    assert_eq!(h.model.cursor.index(), 1);
    assert_eq!(h.model.render_seq, seq);
    assert!(!effects.iter().any(|e| matches!(e, Effect::Engine(_))));

    h.run(Event::Navigate {
        direction: Direction::Prev,
    })
    .await;
    assert_eq!(h.app.view(&h.model).title, "E1 title");
}

#[tokio::test]
async fn prev_at_start_is_a_no_op() {
    let mut h = Harness::started(FakeEngine::default()).await;
    let effects = h.send(Event::Navigate {
        direction: Direction::Prev,
    });
    assert_eq!(h.model.cursor.index(), 0);
    assert!(effects.is_empty());
}

#[tokio::test]
async fn mode_label_follows_selected_mode() {
    let mut h = Harness::started(FakeEngine::default()).await;

    for mode in Mode::ALL {
        h.run(Event::ModeSelected { mode }).await;
        let view = h.app.view(&h.model);
        assert_eq!(view.mode, mode);
        assert_eq!(view.analysis.mode_label.as_deref(), Some(mode.as_str()));
    }
}

#[tokio::test]
async fn action_ids_drive_the_controller() {
    let mut h = Harness::started(FakeEngine::default()).await;

    h.run(dispatch("mode-critical").unwrap()).await;
    h.run(dispatch("btn-next").unwrap()).await;

    assert_eq!(h.model.mode, Mode::Critical);
    assert_eq!(h.model.cursor.index(), 1);
    assert!(dispatch("btn-unknown").is_err());
}

#[tokio::test]
async fn engine_init_failure_degrades() {
    let mut h = Harness::started(FakeEngine {
        fail_init: true,
        ..FakeEngine::default()
    })
    .await;

    assert_eq!(h.model.engine, EngineStatus::Unavailable);
    let view = h.app.view(&h.model);
    assert_eq!(view.analysis.status, AnalysisStatus::Degraded);
    assert_eq!(view.analysis.message.as_deref(), Some(DEGRADED_ENGINE_MESSAGE));
    assert!(!view.engine_ready);

    // Navigation still works; no analysis is attempted.
    let effects = h.send(Event::Navigate {
        direction: Direction::Next,
    });
    assert!(!effects.iter().any(|e| matches!(e, Effect::Engine(_))));
    assert_eq!(h.model.analysis, AnalysisRegion::Degraded);
    assert_eq!(h.app.view(&h.model).position, 1);

    h.run(Event::CopyRequested).await;
    assert!(h.clipboard.is_empty());
    assert_eq!(h.toast().as_deref(), Some(MSG_ENGINE_OFF));
}

#[tokio::test]
async fn knowledge_base_failure_degrades() {
    let h = Harness::started(FakeEngine {
        fail_knowledge_base: true,
        ..FakeEngine::default()
    })
    .await;

    assert_eq!(h.model.engine, EngineStatus::Unavailable);
    assert_eq!(h.model.analysis, AnalysisRegion::Degraded);
}

#[tokio::test]
async fn malformed_analysis_shows_failure_message() {
    let h = Harness::started(FakeEngine {
        malformed: true,
        ..FakeEngine::default()
    })
    .await;

    assert_eq!(h.model.engine, EngineStatus::Ready);
    let view = h.app.view(&h.model);
    assert_eq!(view.analysis.status, AnalysisStatus::Failed);
    assert_eq!(view.analysis.message.as_deref(), Some(ANALYSIS_FAILED_MESSAGE));
}

#[tokio::test]
async fn stale_render_is_discarded() {
    let mut h = Harness::started(FakeEngine::default()).await;

    let critical = engine_request(h.send(Event::ModeSelected {
        mode: Mode::Critical,
    }));
    let constructive = engine_request(h.send(Event::ModeSelected {
        mode: Mode::Constructive,
    }));
    assert_eq!(h.model.analysis, AnalysisRegion::Loading);

    let latest = h.resolve_engine(constructive).await;
    h.feed(latest).await;
    let stale = h.resolve_engine(critical).await;
    h.feed(stale).await;

    let view = h.app.view(&h.model);
    assert_eq!(view.mode, Mode::Constructive);
    assert_eq!(view.analysis.mode_label.as_deref(), Some("constructive"));
}

#[tokio::test]
async fn copy_uses_local_format_when_engine_text_is_empty() {
    let mut h = Harness::started(FakeEngine::default()).await;

    h.run(Event::CopyRequested).await;

    assert_eq!(h.clipboard.len(), 1);
    let text = &h.clipboard[0];
    assert!(text.starts_with("[NoemaFeed • analytical]\n"));
    assert!(text.contains(&h.app.view(&h.model).title));
    assert_eq!(h.toast().as_deref(), Some(MSG_ANALYSIS_COPIED));
}

#[tokio::test]
async fn copy_prefers_engine_plain_summary() {
    let mut h = Harness::started(FakeEngine {
        plain_summary: Some("Plain words for humans".into()),
        ..FakeEngine::default()
    })
    .await;

    h.run(Event::CopyRequested).await;
    assert_eq!(h.clipboard, vec!["Plain words for humans".to_string()]);
}

#[tokio::test]
async fn copy_denied_shows_error_toast() {
    let mut h = Harness::started(FakeEngine::default()).await;
    h.clipboard_result = Err(ClipboardError::PermissionDenied);

    h.run(Event::CopyRequested).await;

    let toast = h.model.active_toast.clone().expect("toast");
    assert_eq!(toast.kind, ToastKind::Error);
    assert_ne!(toast.message, MSG_ANALYSIS_COPIED);
}

#[tokio::test]
async fn share_produces_decodable_link() {
    let mut h = Harness::started(FakeEngine::default()).await;
    h.run(Event::ModeSelected {
        mode: Mode::Critical,
    })
    .await;

    h.run(Event::ShareRequested).await;

    assert_eq!(h.shared_links.len(), 1);
    let (title, link) = &h.shared_links[0];
    assert_eq!(title, SHARE_TITLE);
    let url = Url::parse(link).unwrap();
    assert!(link.starts_with("https://max456im.github.io/noemafeed-mobile/?digest="));
    assert_matches!(
        digest_from_url(&url).unwrap(),
        DigestPayload::Structured(map)
            if map["event_id"] == "demo-event-2026" && map["mode"] == "critical"
    );
    assert!(h.clipboard.is_empty());
    assert_eq!(h.toast().as_deref(), Some(MSG_ANALYSIS_SHARED));
}

#[tokio::test]
async fn share_fallbacks_copy_the_link() {
    let cases = [
        (Ok(ShareOutput::Cancelled), MSG_LINK_COPIED),
        (Ok(ShareOutput::Unsupported), MSG_SHARE_UNSUPPORTED_LINK_COPIED),
        (
            Err(ShareError::Failed {
                reason: "AbortError".into(),
            }),
            MSG_LINK_COPIED,
        ),
    ];

    for (share_result, expected_toast) in cases {
        let mut h = Harness::started(FakeEngine::default()).await;
        h.share_result = share_result;

        h.run(Event::ShareRequested).await;

        assert_eq!(h.shared_links.len(), 1);
        assert_eq!(h.clipboard, vec![h.shared_links[0].1.clone()]);
        assert_eq!(h.toast().as_deref(), Some(expected_toast));
    }
}

#[tokio::test]
async fn share_chain_keeps_its_target_across_navigation() {
    let mut h = Harness::started(FakeEngine::default()).await;

    let analyze = engine_request(h.send(Event::ShareRequested));
    h.run(Event::Navigate {
        direction: Direction::Next,
    })
    .await;
    let events = h.resolve_engine(analyze).await;
    h.feed(events).await;

    let url = Url::parse(&h.shared_links[0].1).unwrap();
    assert_matches!(
        digest_from_url(&url).unwrap(),
        DigestPayload::Structured(map) if map["event_id"] == "demo-event-2026"
    );
}

fn assert_error_toast(h: &Harness, expected: &str) {
    let toast = h.model.active_toast.clone().expect("toast");
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, expected);
}

#[tokio::test]
async fn copy_engine_failures_only_notify() {
    for engine in [
        FakeEngine {
            malformed: true,
            ..FakeEngine::default()
        },
        FakeEngine {
            fail_analysis: true,
            ..FakeEngine::default()
        },
    ] {
        let mut h = Harness::started(engine).await;

        h.run(Event::CopyRequested).await;

        assert!(h.clipboard.is_empty());
        assert_error_toast(&h, MSG_COPY_FAILED);
        assert_eq!(h.model.engine, EngineStatus::Ready);
    }
}

#[tokio::test]
async fn share_engine_failures_only_notify() {
    for engine in [
        FakeEngine {
            malformed: true,
            ..FakeEngine::default()
        },
        FakeEngine {
            fail_analysis: true,
            ..FakeEngine::default()
        },
        FakeEngine {
            fail_digest: true,
            ..FakeEngine::default()
        },
    ] {
        let mut h = Harness::started(engine).await;

        h.run(Event::ShareRequested).await;

        assert!(h.shared_links.is_empty());
        assert!(h.clipboard.is_empty());
        assert_error_toast(&h, MSG_SHARE_FAILED);
    }
}

#[tokio::test]
async fn failed_digest_never_reaches_share() {
    let mut h = Harness::started(FakeEngine {
        fail_digest: true,
        ..FakeEngine::default()
    })
    .await;

    let analyze = engine_request(h.send(Event::ShareRequested));
    let events = h.resolve_engine(analyze).await;
    let mut effects = Vec::new();
    for event in events {
        effects.extend(h.send(event));
    }
    let digest = engine_request(effects);
    assert_matches!(digest.operation, EngineOperation::Digest { .. });

    let events = h.resolve_engine(digest).await;
    let mut effects = Vec::new();
    for event in events {
        effects.extend(h.send(event));
    }
    assert!(!effects.iter().any(|e| matches!(e, Effect::Share(_))));
    assert_error_toast(&h, MSG_SHARE_FAILED);
}
