//! End-to-end console sessions against the loopback radio.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;

use flex_console::config::ConsoleConfig;
use flex_console::domain::RadioAddress;
use flex_console::error::ConsoleError;
use flex_console::input::ScriptedInput;
use flex_console::render::{Emphasis, Level, Outcome};
use flex_console::session::start;
use flex_console::sink::{LineSink, MemorySink};

fn config(radio: &str) -> ConsoleConfig {
    ConsoleConfig {
        radio: radio.parse().unwrap_or(RadioAddress::Discover),
        ..ConsoleConfig::default()
    }
}

#[tokio::test]
async fn startup_subscription_then_commands() {
    let sink = Arc::new(MemorySink::new());
    let input = ScriptedInput::new(["get radio", "", "set slice 1 mode=CW", "message Hi there"]);

    let Ok(report) = start(&config("loopback"), Arc::clone(&sink) as Arc<dyn LineSink>, input).await
    else {
        panic!("loopback connects");
    };

    // "sub slice all" plus three non-empty input lines.
    assert_eq!(report.commands_sent, 4);
    assert_eq!(report.notices_rendered, 1);
    assert_eq!(report.updates_rendered, 3);
    assert!(!report.interrupted);
    assert!(matches!(report.cause, Some(ConsoleError::Input(_))));

    let lines = sink.lines();
    let texts: Vec<String> = lines.iter().map(|l| l.plain_text()).collect();

    let responses: Vec<&String> = texts.iter().filter(|t| t.starts_with("RES")).collect();
    assert_eq!(
        responses,
        vec![
            "RES 1 00000000",
            "RES 2 00000000 model=LOOPBACK slices=2",
            "RES 3 00000000",
            "RES 4 00000000",
        ]
    );
    assert!(texts.contains(&"MSG Hi there".to_string()));

    let updates: Vec<&String> = texts.iter().filter(|t| t.starts_with("UPD")).collect();
    assert_eq!(updates.len(), 3);
    assert!(updates[0].ends_with("slice 0: RF_frequency=14.074000 mode=DIGU tx=1"));
    assert!(updates[1].ends_with("slice 1: RF_frequency=7.074000 mode=LSB tx=0"));
    assert!(updates[2].ends_with("slice 1: RF_frequency=7.074000 mode=CW tx=0"));

    // Only the changed key of the `set` delta is elevated.
    let Some(changed) = lines
        .iter()
        .filter(|l| l.plain_text().starts_with("UPD"))
        .nth(2)
    else {
        panic!("third update line");
    };
    assert_eq!(changed.emphasis_of("CW"), Some(Emphasis::Value(Level::Elevated)));
    assert_eq!(changed.emphasis_of("tx"), Some(Emphasis::Key(Level::Baseline)));
}

#[tokio::test]
async fn error_responses_are_alarmed_and_session_continues() {
    let sink = Arc::new(MemorySink::new());
    let mut cfg = config(":discover:");
    cfg.startup_commands.clear();
    let input = ScriptedInput::new(["tune 14.1", "get pan 0", "ping"]);

    let Ok(report) = start(&cfg, Arc::clone(&sink) as Arc<dyn LineSink>, input).await else {
        panic!("discovery resolves to loopback");
    };
    assert_eq!(report.commands_sent, 3);

    let lines = sink.lines();
    let texts: Vec<String> = lines.iter().map(|l| l.plain_text()).collect();
    assert_eq!(texts[0], "RES 1 50000015 unknown command");
    assert!(texts[1].starts_with("RES 2 50000017"));
    assert_eq!(texts[2], "RES 3 00000000");
    assert_eq!(
        lines[0].emphasis_of("50000015"),
        Some(Emphasis::Status(Outcome::Alarm))
    );
    assert_eq!(
        lines[2].emphasis_of("00000000"),
        Some(Emphasis::Status(Outcome::Success))
    );
}

#[tokio::test]
async fn unknown_radio_is_fatal() {
    let sink = Arc::new(MemorySink::new());
    let result = start(
        &config("10.0.0.7"),
        Arc::clone(&sink) as Arc<dyn LineSink>,
        ScriptedInput::new(["ping"]),
    )
    .await;

    let Err(err) = result else {
        panic!("expected connection error");
    };
    assert!(err.is_fatal());
    assert!(matches!(err, ConsoleError::Connection { .. }));
    assert!(sink.lines().is_empty());
}
