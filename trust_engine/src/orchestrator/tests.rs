use super::*;
use bleed_rules::{Tactic, TacticTable};
use serde_json::json;
use std::collections::HashSet;
use std::thread;

fn engine() -> TrustEngine {
    TrustEngine::new(Ruleset::reference()).unwrap()
}

fn sid(id: &str) -> SessionId {
    SessionId::new(id).unwrap()
}

fn request(session: &str, character: &str, action: &str, tag: &str) -> ActionRequest {
    ActionRequest {
        session_id: session.to_string(),
        character: character.to_string(),
        action: action.to_string(),
        context_tag: tag.to_string(),
        elapsed_time_ms: 1200,
    }
}

fn open(engine: &TrustEngine, session: &str, character: &str) -> ResponseBundle {
    engine
        .handle_request(&request(session, character, "create", ""))
        .unwrap()
}

#[test]
fn test_create_uses_baseline() {
    let engine = engine();
    let response = open(&engine, "s1", "maya");

    assert_eq!(response.trust_score, 50);
    assert_eq!(response.active_persona, Persona::Guardian);
    assert_eq!(response.tactic, None);
    assert_eq!(response.corruption_level.get(), 0);
    assert_eq!(response.sophistication_level, SophisticationLevel::MIN);
    assert_eq!(engine.session_count(), 1);
    assert!(engine.snapshot(&sid("s1")).unwrap().history().is_empty());
}

#[test]
fn test_vulnerable_character_opens_as_deceiver_with_tactic() {
    let engine = engine();
    let response = open(&engine, "s1", "stanley");

    assert_eq!(response.trust_score, -10);
    assert_eq!(response.active_persona, Persona::Deceiver);
    assert!(response.tactic.is_some());
    assert_eq!(response.corruption_level.get(), 3);
}

#[test]
fn test_romantic_disclosure_scenario() {
    let engine = engine();
    let before = open(&engine, "s1", "maya");

    let after = engine
        .handle_request(&request("s1", "maya", "shared_personal_info", "romantic"))
        .unwrap();

    assert!(after.trust_score < 50);
    assert_eq!(after.trust_score, 27);
    assert_eq!(after.score_delta, -23);
    assert!(after.corruption_level >= before.corruption_level);
    assert_eq!(after.branch, NarrativeBranch::Hold);
}

#[test]
fn test_unknown_session_rejected_without_side_effect() {
    let engine = engine();
    let err = engine
        .handle_request(&request("ghost", "maya", "verified_source", "neutral"))
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::SessionNotFound {
            session_id: "ghost".into()
        }
    );
    assert_eq!(engine.session_count(), 0);
    assert!(engine.snapshot(&sid("ghost")).is_err());
}

#[test]
fn test_invalid_vocabulary_rejected() {
    let engine = engine();
    open(&engine, "s1", "maya");

    let err = engine
        .handle_request(&request("s1", "maya", "hacked_mainframe", "neutral"))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAction { .. }));

    let err = engine
        .handle_request(&request("s1", "maya", "verified_source", "spooky"))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidContextTag { .. }));

    let snapshot = engine.snapshot(&sid("s1")).unwrap();
    assert_eq!(snapshot.trust_score(), 50);
    assert!(snapshot.history().is_empty());
}

#[test]
fn test_unknown_character_rejected() {
    let engine = engine();
    let err = engine
        .handle_request(&request("s1", "zed", "create", ""))
        .unwrap_err();

    assert!(err.is_configuration_error());
    assert_eq!(engine.session_count(), 0);
}

#[test]
fn test_character_mismatch_rejected() {
    let engine = engine();
    open(&engine, "s1", "maya");

    let err = engine
        .handle_request(&request("s1", "eli", "verified_source", "neutral"))
        .unwrap_err();
    assert!(matches!(err, EngineError::CharacterMismatch { .. }));
    assert_eq!(engine.snapshot(&sid("s1")).unwrap().trust_score(), 50);
}

#[test]
fn test_create_restarts_existing_session() {
    let engine = engine();
    open(&engine, "s1", "maya");
    engine
        .handle_request(&request("s1", "maya", "sent_money", "financial"))
        .unwrap();

    let restarted = open(&engine, "s1", "eli");

    assert_eq!(restarted.character, "eli");
    assert_eq!(restarted.trust_score, 20);
    assert!(engine.snapshot(&sid("s1")).unwrap().history().is_empty());
    assert_eq!(engine.session_count(), 1);
}

#[test]
fn test_history_records_decisions_in_order() {
    let engine = engine();
    open(&engine, "s1", "eli");

    for action in ["ignored_warning", "verified_source", "continued_conversation"] {
        engine
            .handle_request(&request("s1", "eli", action, "competitive"))
            .unwrap();
    }

    let snapshot = engine.snapshot(&sid("s1")).unwrap();
    let actions: Vec<_> = snapshot.history().iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![
            Action::IgnoredWarning,
            Action::VerifiedSource,
            Action::ContinuedConversation
        ]
    );

    let replayed = snapshot
        .history()
        .iter()
        .fold(20, |score, record| score + record.score_delta);
    assert_eq!(replayed, snapshot.trust_score());
    assert!(snapshot.history().iter().all(|r| r.elapsed_time_ms == 1200));
}

#[test]
fn test_persona_and_corruption_track_latest_score() {
    let engine = engine();
    open(&engine, "s1", "maya");

    for _ in 0..6 {
        let response = engine
            .handle_request(&request("s1", "maya", "shared_credentials", "romantic"))
            .unwrap();
        assert!((-100..=100).contains(&response.trust_score));
        assert_eq!(
            response.corruption_level,
            corruption_level(response.trust_score, &engine.rules().corruption)
        );
        assert_eq!(response.directives, response.corruption_level.directives());
    }

    let snapshot = engine.snapshot(&sid("s1")).unwrap();
    assert_eq!(snapshot.trust_score(), -100);
    assert_eq!(snapshot.active_persona(), Persona::Deceiver);
    assert_eq!(snapshot.corruption_level().get(), 4);
}

#[test]
fn test_three_resisted_at_level_two_escalates_to_three() {
    let engine = engine();
    open(&engine, "s1", "stanley");

    let mut levels = Vec::new();
    for _ in 0..5 {
        let response = engine
            .handle_request(&request("s1", "stanley", "declined_request", "neutral"))
            .unwrap();
        assert_eq!(response.active_persona, Persona::Deceiver);
        levels.push(response.sophistication_level.get());
    }

    // two resisted at level 1 reach level 2, then three more at level 2
    assert_eq!(levels, vec![1, 2, 2, 3, 3]);
}

#[test]
fn test_resisted_tactic_not_offered_within_window() {
    let engine = engine();
    open(&engine, "s1", "stanley");
    let window = engine.rules().escalation.exclusion_window;

    for _ in 0..5 {
        let response = engine
            .handle_request(&request("s1", "stanley", "asked_for_proof", "neutral"))
            .unwrap();
        let snapshot = engine.snapshot(&sid("s1")).unwrap();

        let recently_resisted: HashSet<Tactic> = snapshot
            .history()
            .iter()
            .rev()
            .take(window)
            .filter_map(|r| r.encounter)
            .filter(|e| e.is_resisted())
            .map(|e| e.tactic)
            .collect();

        if let Some(tactic) = response.tactic {
            assert!(!recently_resisted.contains(&tactic), "{tactic} repeated");
        }
    }
}

#[test]
fn test_sophistication_never_decreases() {
    let engine = engine();
    open(&engine, "s1", "stanley");
    let mut last = SophisticationLevel::MIN;

    let script = [
        "declined_request",
        "declined_request",
        "sent_money",
        "asked_for_proof",
        "continued_conversation",
        "blocked_contact",
        "agreed_to_secrecy",
        "declined_request",
        "declined_request",
        "declined_request",
    ];
    for action in script {
        let response = engine
            .handle_request(&request("s1", "stanley", action, "authority"))
            .unwrap();
        assert!(response.sophistication_level >= last);
        last = response.sophistication_level;
    }
}

#[test]
fn test_guardian_offers_no_tactic() {
    let engine = engine();
    open(&engine, "s1", "maya");

    let response = engine
        .handle_request(&request("s1", "maya", "verified_source", "neutral"))
        .unwrap();
    assert_eq!(response.active_persona, Persona::Guardian);
    assert_eq!(response.tactic, None);
    assert_eq!(response.branch, NarrativeBranch::Advance);
}

#[test]
fn test_failed_pipeline_leaves_session_untouched() {
    let mut tiers = TacticTable::reference();
    let mut broken: Vec<Vec<Tactic>> = bleed_rules::SophisticationLevel::all()
        .map(|level| tiers.tier(level).to_vec())
        .collect();
    broken[1].clear();
    tiers = TacticTable::new(broken);

    let mut rules = Ruleset::reference();
    if let Some(stanley) = rules.characters.get_mut(&CharacterId::new("stanley")) {
        stanley.tactics = tiers;
    }
    // Bypasses validation to exercise the runtime guard.
    let engine = TrustEngine {
        policy: TacticPolicy::new(rules.escalation),
        rules: Arc::new(rules),
        store: InMemorySessionStore::new(),
    };

    open(&engine, "s1", "stanley");
    engine
        .handle_request(&request("s1", "stanley", "declined_request", "neutral"))
        .unwrap();
    let before = engine.snapshot(&sid("s1")).unwrap();

    let err = engine
        .handle_request(&request("s1", "stanley", "declined_request", "neutral"))
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::NoTacticsAvailable {
            character: "stanley".into(),
            level: 2
        }
    );
    assert_eq!(engine.snapshot(&sid("s1")).unwrap(), before);
}

#[test]
fn test_handle_message_classifies_intent() {
    let engine = engine();
    open(&engine, "s1", "maya");

    let message = MessageRequest {
        session_id: "s1".into(),
        character: "maya".into(),
        message: "Can you do a video call first?".into(),
        context_tag: "romantic".into(),
        elapsed_time_ms: 0,
    };
    engine.handle_message(&message).unwrap();

    let snapshot = engine.snapshot(&sid("s1")).unwrap();
    assert_eq!(snapshot.history()[0].action, Action::AskedForProof);

    let unclassified = MessageRequest {
        message: "lol ok".into(),
        ..message.clone()
    };
    assert!(matches!(
        engine.handle_message(&unclassified),
        Err(EngineError::InvalidAction { .. })
    ));

    let too_long = MessageRequest {
        message: "a".repeat(1001),
        ..message
    };
    assert!(matches!(
        engine.handle_message(&too_long),
        Err(EngineError::InvalidRequest { .. })
    ));
}

#[test]
fn test_reset_and_listing() {
    let engine = engine();
    open(&engine, "s1", "maya");

    assert!(engine.reset(&sid("s1")));
    assert!(!engine.reset(&sid("s1")));
    assert_eq!(engine.session_count(), 0);

    let ids: Vec<_> = engine.characters().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["eli", "maya", "stanley"]);
}

#[test]
fn test_open_session_generates_id() {
    let engine = engine();
    let first = engine.open_session(&CharacterId::new("eli")).unwrap();
    let second = engine.open_session(&CharacterId::new("eli")).unwrap();

    assert_ne!(first.session_id, second.session_id);
    assert_eq!(engine.session_count(), 2);

    let follow_up = engine
        .handle_request(&request(&first.session_id, "eli", "verified_source", "neutral"))
        .unwrap();
    assert_eq!(follow_up.session_id, first.session_id);
}

#[test]
fn test_evict_idle() {
    let engine = engine();
    open(&engine, "s1", "maya");

    assert_eq!(engine.evict_idle(Duration::hours(1)), 0);
    assert_eq!(engine.evict_idle(Duration::zero()), 1);
    assert_eq!(engine.session_count(), 0);
}

#[test]
fn test_response_wire_shape() {
    let engine = engine();
    let response = open(&engine, "s1", "stanley");
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["trustScore"], -10);
    assert_eq!(json["activePersona"], "Deceiver");
    assert!(json["tactic"].is_string());
    assert_eq!(json["corruptionLevel"], 3);
    assert_eq!(json["sophisticationLevel"], 1);
    assert_eq!(json["branch"], "hold");

    let guardian = open(&engine, "s2", "maya");
    let json = serde_json::to_value(&guardian).unwrap();
    assert!(json["tactic"].is_null());
}

#[test]
fn test_request_parses_from_json() {
    let raw = r#"{
        "sessionId": "abc",
        "character": "Maya",
        "action": "verified_source",
        "elapsedTimeMs": 350
    }"#;
    let request: ActionRequest = serde_json::from_str(raw).unwrap();

    let engine = engine();
    open(&engine, "abc", "maya");
    let response = engine.handle_request(&request).unwrap();
    assert_eq!(response.character, "maya");
    assert_eq!(request.elapsed_time_ms, 350);
}

#[test]
fn test_fractional_elapsed_time_accepted() {
    let action = |elapsed: serde_json::Value| {
        serde_json::from_value::<ActionRequest>(json!({
            "sessionId": "abc",
            "character": "maya",
            "action": "blocked_contact",
            "elapsedTimeMs": elapsed,
        }))
    };

    assert_eq!(action(json!(350.5)).unwrap().elapsed_time_ms, 351);
    assert_eq!(action(json!(12.2)).unwrap().elapsed_time_ms, 12);
    assert!(action(json!(-4)).is_err());
    assert!(action(json!("soon")).is_err());

    let message: MessageRequest = serde_json::from_value(json!({
        "sessionId": "abc",
        "character": "maya",
        "message": "let me verify",
        "elapsedTimeMs": 87.9,
    }))
    .unwrap();
    assert_eq!(message.elapsed_time_ms, 88);

    let engine = engine();
    open(&engine, "abc", "maya");
    engine.handle_message(&message).unwrap();
    let snapshot = engine.snapshot(&sid("abc")).unwrap();
    assert_eq!(snapshot.history()[0].elapsed_time_ms, 88);

    let missing: ActionRequest = serde_json::from_value(json!({
        "sessionId": "abc",
        "character": "maya",
        "action": "blocked_contact",
    }))
    .unwrap();
    assert_eq!(missing.elapsed_time_ms, 0);
}

#[test]
fn test_concurrent_actions_on_one_session_are_serialized() {
    let engine = Arc::new(engine());
    open(&engine, "shared", "eli");

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let action = if i % 2 == 0 {
                    "ignored_warning"
                } else {
                    "verified_source"
                };
                for _ in 0..25 {
                    engine
                        .handle_request(&request("shared", "eli", action, "competitive"))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let snapshot = engine.snapshot(&sid("shared")).unwrap();
    assert_eq!(snapshot.history().len(), 200);

    let mut score = 20;
    for record in snapshot.history() {
        score += record.score_delta;
        assert!((-100..=100).contains(&score));
    }
    assert_eq!(score, snapshot.trust_score());
}

#[test]
fn test_independent_sessions_in_parallel() {
    let engine = Arc::new(engine());

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let id = format!("player-{i}");
                open(&engine, &id, "maya");
                for _ in 0..10 {
                    engine
                        .handle_request(&request(&id, "maya", "verified_source", "neutral"))
                        .unwrap();
                }
                engine.snapshot(&sid(&id)).unwrap().trust_score()
            })
        })
        .collect();

    let scores: Vec<i32> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    assert!(scores.iter().all(|s| *s == scores[0]));
    assert_eq!(engine.session_count(), 4);
}
