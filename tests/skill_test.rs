use std::time::Duration;

use encore::{
    catalog::Locale, config::EncoreConfig, event_bus::Event, event_bus::EventReceiver,
    skill::Skill, topic,
};
use serde_json::json;
use tokio::time::{sleep, timeout};
use uuid::Uuid;

fn test_config() -> EncoreConfig {
    EncoreConfig {
        event_buffer_size: 64,
        locale: Locale::En,
        intents: None,
    }
}

fn say(site: &str, text: &str) -> Event {
    Event::new(topic::TTS_SAY, json!({"siteId": site, "text": text}))
}

fn captured(site: &str, text: &str, likelihood: f64) -> Event {
    Event::new(
        topic::ASR_TEXT_CAPTURED,
        json!({"siteId": site, "text": text, "likelihood": likelihood}),
    )
}

fn trigger(topic: &str, site: &str, session: &str) -> Event {
    Event::new(topic, json!({"siteId": site, "sessionId": session}))
}

/// The subscriber sees all bus traffic, inbound events included; skip ahead
/// to the next endSession response.
async fn next_end_session(rx: &mut EventReceiver) -> Event {
    timeout(Duration::from_millis(500), async {
        loop {
            let event = rx.recv().await.unwrap();
            if event.topic == topic::DM_END_SESSION {
                return event;
            }
        }
    })
    .await
    .expect("no endSession response on the bus")
}

#[tokio::test]
async fn test_unseen_site_yields_all_three_fallbacks() {
    let skill = Skill::new(&test_config());
    let bus = skill.event_bus();
    let mut rx = bus.subscribe();
    skill.start().unwrap();
    sleep(Duration::from_millis(10)).await;

    // A fresh site per trigger: the say/what triggers are themselves recorded
    // as last intent, which would give RepeatAction something to replay.
    let cases = [
        (
            "hermes/intent/koan:SayItAgain",
            "attic",
            "Sorry, I don't remember what I said. I must have fallen asleep.",
        ),
        (
            "hermes/intent/koan:WhatDidISay",
            "cellar",
            "Sorry, I don't remember what you said. I must have fallen asleep.",
        ),
        (
            "hermes/intent/koan:RepeatAction",
            "garage",
            "Sorry, I don't know what I should repeat.",
        ),
    ];
    for (intent_topic, site, expected) in cases {
        let session = Uuid::new_v4().to_string();
        bus.publish(trigger(intent_topic, site, &session))
            .await
            .unwrap();
        let out = next_end_session(&mut rx).await;
        assert_eq!(out.payload["text"], expected);
        assert_eq!(out.payload["sessionId"], session.as_str());
    }

    skill.shutdown();
}

#[tokio::test]
async fn test_say_it_again_round_trip() {
    let skill = Skill::new(&test_config());
    let bus = skill.event_bus();
    let mut rx = bus.subscribe();
    skill.start().unwrap();
    sleep(Duration::from_millis(10)).await;

    bus.publish(say("kitchen", "dinner is ready")).await.unwrap();
    // Traffic for another site must not leak into the kitchen's answer.
    bus.publish(say("bedroom", "good night")).await.unwrap();

    bus.publish(trigger("hermes/intent/koan:SayItAgain", "kitchen", "s-1"))
        .await
        .unwrap();

    let out = next_end_session(&mut rx).await;
    assert_eq!(out.payload["text"], "dinner is ready");
    assert_eq!(out.payload["sessionId"], "s-1");

    // Both sites were observed, each with its own record.
    assert_eq!(skill.engine().store().sites(), 2);

    skill.shutdown();
}

#[tokio::test]
async fn test_what_did_i_say_round_trip() {
    let skill = Skill::new(&test_config());
    let bus = skill.event_bus();
    let mut rx = bus.subscribe();
    skill.start().unwrap();
    sleep(Duration::from_millis(10)).await;

    bus.publish(captured("kitchen", "set a timer", 0.874))
        .await
        .unwrap();
    bus.publish(captured("kitchen", "what did I say", 0.95))
        .await
        .unwrap();
    bus.publish(trigger("hermes/intent/koan:WhatDidISay", "kitchen", "s-2"))
        .await
        .unwrap();

    let out = next_end_session(&mut rx).await;
    // Likelihood is rounded to two decimals on the way into the store.
    assert_eq!(
        out.payload["text"],
        "I heard \"set a timer\" with likelihood 0.87."
    );

    skill.shutdown();
}

#[tokio::test]
async fn test_capture_window_evicts_oldest() {
    let skill = Skill::new(&test_config());
    let bus = skill.event_bus();
    let mut rx = bus.subscribe();
    skill.start().unwrap();
    sleep(Duration::from_millis(10)).await;

    bus.publish(captured("kitchen", "c1", 0.1)).await.unwrap();
    bus.publish(captured("kitchen", "c2", 0.2)).await.unwrap();
    bus.publish(captured("kitchen", "c3", 0.3)).await.unwrap();
    bus.publish(trigger("hermes/intent/koan:WhatDidISay", "kitchen", "s-3"))
        .await
        .unwrap();

    let out = next_end_session(&mut rx).await;
    assert_eq!(out.payload["text"], "I heard \"c2\" with likelihood 0.2.");

    skill.shutdown();
}

#[tokio::test]
async fn test_repeat_action_round_trip() {
    let skill = Skill::new(&test_config());
    let bus = skill.event_bus();
    let mut rx = bus.subscribe();
    skill.start().unwrap();
    sleep(Duration::from_millis(10)).await;

    bus.publish(Event::new(
        "hermes/intent/someone:SetVolume",
        json!({
            "siteId": "kitchen",
            "sessionId": "old-session",
            "slots": [{"slotName": "level", "value": 7}],
        }),
    ))
    .await
    .unwrap();
    sleep(Duration::from_millis(10)).await;

    bus.publish(trigger("hermes/intent/koan:RepeatAction", "kitchen", "fresh"))
        .await
        .unwrap();

    let replayed = timeout(Duration::from_millis(500), async {
        loop {
            let event = rx.recv().await.unwrap();
            if event.topic == "hermes/intent/someone:SetVolume"
                && event.payload["sessionId"] == "fresh"
            {
                return event;
            }
        }
    })
    .await
    .expect("intent was not replayed");

    assert_eq!(replayed.payload["siteId"], "kitchen");
    assert_eq!(replayed.payload["slots"][0]["value"], 7);

    skill.shutdown();
}

#[tokio::test]
async fn test_french_locale_sentences() {
    let config = EncoreConfig {
        locale: Locale::Fr,
        ..test_config()
    };
    let skill = Skill::new(&config);
    let bus = skill.event_bus();
    let mut rx = bus.subscribe();
    skill.start().unwrap();
    sleep(Duration::from_millis(10)).await;

    bus.publish(trigger("hermes/intent/Tealque:SayItAgain", "salon", "s-1"))
        .await
        .unwrap();

    let out = next_end_session(&mut rx).await;
    assert_eq!(
        out.payload["text"],
        "Désolé, je ne me souviens pas de ce que j'ai dit. Je dois m'être endormi."
    );

    skill.shutdown();
}

#[tokio::test]
async fn test_shutdown_stops_dispatch() {
    let skill = Skill::new(&test_config());
    let bus = skill.event_bus();
    let mut rx = bus.subscribe();
    skill.start().unwrap();
    sleep(Duration::from_millis(10)).await;

    skill.shutdown();
    sleep(Duration::from_millis(10)).await;

    // The loop has exited; a trigger published now gets no answer.
    bus.publish(trigger("hermes/intent/koan:SayItAgain", "kitchen", "s-1"))
        .await
        .unwrap();
    let result = timeout(Duration::from_millis(100), async {
        loop {
            let event = rx.recv().await.unwrap();
            if event.topic == topic::DM_END_SESSION {
                return event;
            }
        }
    })
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_malformed_event_does_not_stop_the_loop() {
    let skill = Skill::new(&test_config());
    let bus = skill.event_bus();
    let mut rx = bus.subscribe();
    skill.start().unwrap();
    sleep(Duration::from_millis(10)).await;

    bus.publish(say("kitchen", "still here")).await.unwrap();
    // likelihood is a string: dropped with a warning, nothing else affected.
    bus.publish(Event::new(
        topic::ASR_TEXT_CAPTURED,
        json!({"siteId": "kitchen", "text": "x", "likelihood": "high"}),
    ))
    .await
    .unwrap();

    bus.publish(trigger("hermes/intent/koan:SayItAgain", "kitchen", "s-1"))
        .await
        .unwrap();

    let out = next_end_session(&mut rx).await;
    assert_eq!(out.payload["text"], "still here");

    skill.shutdown();
}
