//! End-to-end runs: bytes in, avatar effects out

use avatar_speech::avatar::{Effect, Expression, Motion, RecordingAvatar};
use avatar_speech::comm::FramerLimits;
use avatar_speech::config::Options;
use avatar_speech::controller::{Controller, Dispatch};
use avatar_speech::speech::{Timing, CLOSED};
use avatar_speech::time::Millis;

fn controller() -> Controller<RecordingAvatar> {
    Controller::new(RecordingAvatar::new(), &Options::default())
}

/// Tick every 10ms over `from..=to`, draining the avatar's effects with
/// the tick that produced them
fn drain(ctl: &mut Controller<RecordingAvatar>, from: Millis, to: Millis) -> Vec<(Millis, Effect)> {
    let mut effects = Vec::new();
    let mut now = from;
    while now <= to {
        ctl.tick(now);
        effects.extend(ctl.avatar_mut().take_effects().into_iter().map(|e| (now, e)));
        now += 10;
    }
    effects
}

/// Like [`drain`], keeping only the renders
fn drive(ctl: &mut Controller<RecordingAvatar>, from: Millis, to: Millis) -> Vec<(Millis, String)> {
    drain(ctl, from, to)
        .into_iter()
        .filter_map(|(at, effect)| match effect {
            Effect::Render(text) => Some((at, text)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_greeting_reveals_one_char_per_interval() {
    let mut ctl = controller();
    let out = ctl.feed(r#"{"message":["こんにちは","こんにちは"]}"#.as_bytes(), 0);
    assert_eq!(out, vec![Dispatch::Started { segments: 1 }]);
    assert_eq!(ctl.avatar().tones().len(), 1);
    ctl.avatar_mut().take_effects();

    let renders = drive(&mut ctl, 10, 1000);
    assert_eq!(
        renders,
        vec![
            (100, "こん".to_string()),
            (200, "こんに".to_string()),
            (300, "こんにち".to_string()),
            (400, "こんにちは".to_string()),
        ]
    );
    assert_eq!(ctl.avatar().mouth(), CLOSED);
    assert_eq!(ctl.avatar().balloon(), "こんにちは");
    assert!(ctl.has_pending_work());

    // Cleared 2000ms after the last reveal
    ctl.tick(2399);
    assert_eq!(ctl.avatar().balloon(), "こんにちは");
    ctl.tick(2400);
    assert_eq!(ctl.avatar().balloon(), "");
    assert!(!ctl.has_pending_work());
}

#[test]
fn test_two_segments_with_pause() {
    let mut ctl = controller();
    ctl.feed(br#"{"message":["Hi\nBye","Hi\nBye"]}"#, 0);
    assert_eq!(ctl.avatar_mut().take_effects()[0], Effect::Render("H".to_string()));
    let renders = drive(&mut ctl, 10, 1500);
    assert_eq!(
        renders,
        vec![
            (100, "Hi".to_string()),
            (700, "B".to_string()),
            (800, "By".to_string()),
            (900, "Bye".to_string()),
        ]
    );
    assert!(!ctl.is_animating());
}

#[test]
fn test_short_phonetic_still_shows_whole_display() {
    let mut ctl = controller();
    assert_eq!(ctl.speak("AB", "A", 0), Dispatch::Started { segments: 1 });
    ctl.tick(100);
    assert_eq!(ctl.avatar().balloon(), "AB");
    ctl.tick(200);
    assert!(!ctl.is_animating());
    assert_eq!(ctl.avatar().tones().len(), 2);
}

#[test]
fn test_filler_overflow_then_recovery() {
    let mut ctl = controller();
    let filler = vec![b'x'; 5000];
    assert!(ctl.feed(&filler, 0).is_empty());
    let stats = ctl.stats();
    assert_eq!(stats.forced_flushes, 1);
    assert_eq!(stats.records_extracted, 0);
    assert_eq!(ctl.framer().buffered().len(), 904);

    let out = ctl.feed(b"\n{\"message\":[\"ok\"]}", 10);
    assert_eq!(out, vec![Dispatch::Started { segments: 1 }]);
    assert_eq!(ctl.avatar().balloon(), "o");
}

#[test]
fn test_split_delivery_matches_single_chunk() {
    let payload = r#"{"message":["元気ですか？","げんきですか？"],"expression":"Happy"}"#.as_bytes();

    let mut whole = controller();
    whole.feed(payload, 0);
    let mut whole_effects: Vec<(Millis, Effect)> =
        whole.avatar_mut().take_effects().into_iter().map(|e| (0, e)).collect();
    whole_effects.extend(drain(&mut whole, 10, 3000));

    let mut split = controller();
    for chunk in payload.chunks(3) {
        split.feed(chunk, 0);
    }
    let mut split_effects: Vec<(Millis, Effect)> =
        split.avatar_mut().take_effects().into_iter().map(|e| (0, e)).collect();
    split_effects.extend(drain(&mut split, 10, 3000));

    assert_eq!(whole_effects, split_effects);
    assert_eq!(whole_effects[0], (0, Effect::Expression(Expression::Happy)));
    assert!(whole_effects.contains(&(500, Effect::Render("元気ですか？".to_string()))));
    assert_eq!(whole_effects.last(), Some(&(2600, Effect::Clear)));
}

#[test]
fn test_duplicate_within_cooldown_is_dropped() {
    let mut ctl = controller();
    let record = br#"{"message":["a"],"motion":"nod"}"#;
    assert_eq!(ctl.feed(record, 0).len(), 1);
    assert!(ctl.feed(record, 2999).is_empty());
    assert_eq!(ctl.stats().duplicates_dropped, 1);

    ctl.tick(3000);
    assert_eq!(ctl.feed(record, 3000).len(), 1);
    let nods = ctl
        .avatar()
        .effects()
        .iter()
        .filter(|e| **e == Effect::Motion(Motion::Nod))
        .count();
    assert_eq!(nods, 2);
}

#[test]
fn test_legacy_and_raw_text_records() {
    let mut ctl = controller();
    let out = ctl.feed("{\"さようなら\",\"さようなら\"}".as_bytes(), 0);
    assert_eq!(out, vec![Dispatch::Started { segments: 1 }]);
    ctl.stop();

    // A line with no record in it is dropped
    assert!(ctl.feed(b"plain words\n", 10).is_empty());
    assert_eq!(ctl.stats().bytes_discarded, 11);

    let out = ctl.feed(b"{plain words}", 20);
    assert_eq!(out, vec![Dispatch::Started { segments: 1 }]);
    assert_eq!(ctl.avatar().balloon(), "{");
}

#[test]
fn test_custom_timing() {
    let timing = Timing {
        char_interval_ms: 50,
        max_display_chars: 3,
        ..Timing::default()
    };
    let mut ctl = Controller::with_settings(
        RecordingAvatar::new(),
        timing,
        FramerLimits::default(),
        false,
    );
    ctl.speak("abcdef", "", 0);
    ctl.avatar_mut().take_effects();
    let renders = drive(&mut ctl, 10, 400);
    let texts: Vec<&str> = renders.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(texts, vec!["ab", "abc", "bcd", "cde", "def"]);
    assert_eq!(renders[0].0, 50);
}
