//! One wake → capture → dispatch round, driven through the loop.

use crate::helpers::{Event, FailingBrain, Harness, fast_config};
use hark::collaborators::NoopIndicator;
use hark::filler::default_phrases;
use hark::{
    ConversationLoop, ConversationState, CycleOutcome, Dispatch, HarkError, ListenCycle,
    ListenPhase, ListenResult, MicSignal, PluginRegistry,
};
use std::sync::Arc;
use std::time::Duration;

// ─── Dispatch ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn utterance_is_forwarded_verbatim_once() {
    let h = Harness::new();
    h.mic.wake_and_utter(Some("  turn on the Lights "));
    let mut conversation = ConversationLoop::new(h.session(fast_config(), 12, PluginRegistry::new()));

    let outcome = conversation.run_iteration().await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Dispatched(Dispatch::Query("  turn on the Lights ".into()))
    );
    assert_eq!(
        h.log.events(),
        vec![
            Event::Passive("hark".into()),
            Event::Wakeup,
            Event::Active,
            Event::Think,
            Event::TextFromListen,
            Event::Query("  turn on the Lights ".into()),
            Event::Off,
        ]
    );
    assert_eq!(h.wakes.total(), 1);
}

#[tokio::test]
async fn empty_input_speaks_exactly_one_filler() {
    let h = Harness::new();
    h.mic.wake_and_utter(None);
    let mut conversation = ConversationLoop::new(h.session(fast_config(), 12, PluginRegistry::new()));

    let outcome = conversation.run_iteration().await.unwrap();

    let first = default_phrases()[0].clone();
    assert_eq!(outcome, CycleOutcome::Dispatched(Dispatch::Filler(first.clone())));
    let spoken: Vec<_> = h
        .log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Say(text) => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(spoken, vec![first]);
    assert_eq!(h.log.count(|e| matches!(e, Event::Query(_))), 0);
    assert_eq!(h.log.events().last(), Some(&Event::Off));
}

#[tokio::test]
async fn empty_string_counts_as_no_input() {
    let h = Harness::new();
    h.mic.wake_and_utter(Some(""));
    let mut conversation = ConversationLoop::new(h.session(fast_config(), 12, PluginRegistry::new()));

    let outcome = conversation.run_iteration().await.unwrap();
    assert!(matches!(outcome, CycleOutcome::Dispatched(Dispatch::Filler(_))));
}

#[tokio::test]
async fn empty_input_with_shut_up_flag_stays_silent() {
    let h = Harness::new();
    h.mic.wake_and_utter(None);
    let mut config = fast_config();
    config.conversation.shut_up_if_no_input = true;
    let mut conversation = ConversationLoop::new(h.session(config, 12, PluginRegistry::new()));

    let outcome = conversation.run_iteration().await.unwrap();

    assert_eq!(outcome, CycleOutcome::Dispatched(Dispatch::Silent));
    assert_eq!(h.log.count(|e| matches!(e, Event::Say(_))), 0);
    assert_eq!(h.log.events().last(), Some(&Event::Off));
}

#[tokio::test]
async fn random_filler_comes_from_the_configured_set() {
    let h = Harness::new();
    let phrases = vec!["a?".to_owned(), "b?".to_owned()];
    let mut config = fast_config();
    config.conversation.filler_phrases = phrases.clone();
    let session = hark::Session::new(
        config,
        h.mic.clone(),
        Arc::new(hark::console::EchoBrain::new(h.mic.clone())),
    )
    .with_indicator(Arc::new(NoopIndicator));
    let mut conversation = ConversationLoop::new(session);

    for _ in 0..20 {
        h.mic.wake_and_utter(None);
        match conversation.run_iteration().await.unwrap() {
            CycleOutcome::Dispatched(Dispatch::Filler(phrase)) => assert!(phrases.contains(&phrase)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}

#[tokio::test]
async fn brain_failure_still_turns_indicator_off() {
    let h = Harness::new();
    h.mic.wake_and_utter(Some("order pizza"));
    let session =
        h.session_with_brain(fast_config(), 12, PluginRegistry::new(), Arc::new(FailingBrain));
    let mut state = ConversationState::new("hark");

    let mut cycle = ListenCycle::new(&session);
    let err = cycle.run(&mut state).await.unwrap_err();

    assert!(matches!(err, HarkError::Brain(_)));
    assert_eq!(cycle.phase(), ListenPhase::Dispatching);
    assert_eq!(h.log.events().last(), Some(&Event::Off));
}

#[tokio::test]
async fn cycle_starts_and_ends_idle() {
    let h = Harness::new();
    h.mic.wake_and_utter(Some("hello"));
    let session = h.session(fast_config(), 12, PluginRegistry::new());
    let mut state = ConversationState::new("hark");

    let mut cycle = ListenCycle::new(&session);
    assert_eq!(cycle.phase(), ListenPhase::Idle);
    let outcome = cycle.run(&mut state).await.unwrap();

    assert_eq!(outcome, CycleOutcome::Dispatched(Dispatch::Query("hello".into())));
    assert_eq!(cycle.phase(), ListenPhase::Idle);
}

// ─── Wake detection ───────────────────────────────────────────────────────────

#[tokio::test]
async fn nothing_detected_skips_the_rest_of_the_cycle() {
    let h = Harness::new();
    h.mic.hear(ListenResult::nothing());
    h.mic.hear(ListenResult::detected(0.0, "hark"));
    let mut conversation = ConversationLoop::new(h.session(fast_config(), 12, PluginRegistry::new()));

    assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::NothingHeard);
    assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::NothingHeard);

    assert_eq!(
        h.log.events(),
        vec![Event::Passive("hark".into()), Event::Passive("hark".into())]
    );
    assert_eq!(h.wakes.total(), 0);
}

#[tokio::test]
async fn persona_comes_from_config() {
    let h = Harness::new();
    h.mic.hear(ListenResult::nothing());
    let mut config = fast_config();
    config.conversation.persona = "jarvis".into();
    let mut conversation = ConversationLoop::new(h.session(config, 12, PluginRegistry::new()));

    conversation.run_iteration().await.unwrap();
    assert_eq!(conversation.state().persona(), "jarvis");
    assert_eq!(h.log.events(), vec![Event::Passive("jarvis".into())]);
}

// ─── Mode signals ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn stopped_issues_no_passive_listen() {
    let h = Harness::new();
    let mut conversation = ConversationLoop::new(h.session(fast_config(), 12, PluginRegistry::new()));
    conversation.signal_sender().send(MicSignal::StopForNow).unwrap();

    for _ in 0..3 {
        assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::Stopped);
    }
    assert!(h.log.events().is_empty());

    conversation.signal_sender().send(MicSignal::Resume).unwrap();
    h.mic.hear(ListenResult::nothing());
    assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::NothingHeard);
    assert_eq!(h.log.events(), vec![Event::Passive("hark".into())]);
}

#[tokio::test]
async fn skip_is_cleared_after_one_iteration() {
    let h = Harness::new();
    let mut conversation = ConversationLoop::new(h.session(fast_config(), 12, PluginRegistry::new()));
    conversation.signal_sender().send(MicSignal::SkipPassiveOnce).unwrap();

    assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::SkippedPassive);
    assert!(!conversation.state().skip_passive_listening);
    assert!(h.log.events().is_empty());

    h.mic.hear(ListenResult::nothing());
    assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::NothingHeard);
    assert_eq!(h.log.events(), vec![Event::Passive("hark".into())]);
}

#[tokio::test]
async fn skip_persists_while_chatting() {
    let h = Harness::new();
    let mut conversation = ConversationLoop::new(h.session(fast_config(), 12, PluginRegistry::new()));
    let signals = conversation.signal_sender();
    signals.send(MicSignal::EnterChatting).unwrap();
    signals.send(MicSignal::SkipPassiveOnce).unwrap();

    for _ in 0..3 {
        assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::SkippedPassive);
    }
    assert!(h.log.events().is_empty());

    signals.send(MicSignal::LeaveChatting).unwrap();
    assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::SkippedPassive);
    h.mic.hear(ListenResult::nothing());
    assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::NothingHeard);
}

#[tokio::test]
async fn signals_sent_from_another_task_apply_next_iteration() {
    let h = Harness::new();
    let mut conversation = ConversationLoop::new(h.session(fast_config(), 12, PluginRegistry::new()));
    let signals = conversation.signal_sender();

    tokio::spawn(async move { signals.send(MicSignal::StopForNow) })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(conversation.run_iteration().await.unwrap(), CycleOutcome::Stopped);
    assert!(conversation.state().stopped_for_now);
}

#[tokio::test]
async fn chatting_skip_yields_so_mic_signals_arrive() {
    let h = Harness::new();
    let mut conversation = ConversationLoop::new(h.session(fast_config(), 12, PluginRegistry::new()));
    let signals = conversation.signal_sender();
    signals.send(MicSignal::EnterChatting).unwrap();
    signals.send(MicSignal::SkipPassiveOnce).unwrap();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        signals.send(MicSignal::LeaveChatting).unwrap();
    });

    // Once chatting ends the skip is consumed and the empty script ends the loop.
    let result = tokio::time::timeout(Duration::from_secs(5), conversation.handle_forever()).await;
    let Ok(Err(err)) = result else {
        panic!("loop never saw LeaveChatting");
    };
    assert!(matches!(err, HarkError::Audio(_)));
    assert!(!conversation.state().chatting_mode);
    assert_eq!(h.log.events(), vec![Event::Passive("hark".into())]);
}
