//! Line builders for every kind of console output.

use super::{Emphasis, Level, Line, Outcome};
use crate::domain::{CommandResponse, Message, StateUpdate};

/// `MSG <text>`
#[must_use]
pub fn message_line(msg: &Message) -> Line {
    Line::new()
        .with("MSG", Emphasis::Tag)
        .with(" ", Emphasis::Plain)
        .with(msg.text.as_str(), Emphasis::Plain)
}

/// `UPD <handle> <object>: k=v k=v ...`, keys in lexicographic order.
///
/// Changed keys and their values carry [`Level::Elevated`], the rest
/// [`Level::Baseline`].
#[must_use]
pub fn update_line(upd: &StateUpdate) -> Line {
    let mut line = Line::new()
        .with("UPD", Emphasis::Tag)
        .with(" ", Emphasis::Plain)
        .with(upd.sender_handle(), Emphasis::Handle)
        .with(" ", Emphasis::Plain)
        .with(upd.object(), Emphasis::Object)
        .with(": ", Emphasis::Plain);

    for (i, (key, value, changed)) in upd.sorted_entries().into_iter().enumerate() {
        let level = if changed {
            Level::Elevated
        } else {
            Level::Baseline
        };
        if i > 0 {
            line.push(" ", Emphasis::Plain);
        }
        line.push(key, Emphasis::Key(level));
        line.push("=", Emphasis::Plain);
        line.push(value, Emphasis::Value(level));
    }
    line
}

/// `RES <serial> <XXXXXXXX>[ <body>]`
#[must_use]
pub fn response_line(res: &CommandResponse) -> Line {
    let outcome = if res.is_error() {
        Outcome::Alarm
    } else {
        Outcome::Success
    };
    let mut line = Line::new()
        .with("RES", Emphasis::Tag)
        .with(" ", Emphasis::Plain)
        .with(res.serial.to_string(), Emphasis::Serial)
        .with(" ", Emphasis::Plain)
        .with(res.error_code_hex(), Emphasis::Status(outcome));
    if !res.body.is_empty() {
        line.push(" ", Emphasis::Plain);
        line.push(res.body.as_str(), Emphasis::Plain);
    }
    line
}

/// `ERR <command>: <reason>` for commands that got no response.
#[must_use]
pub fn failure_line(command: &str, reason: &str) -> Line {
    Line::new()
        .with("ERR", Emphasis::Status(Outcome::Alarm))
        .with(" ", Emphasis::Plain)
        .with(command, Emphasis::Plain)
        .with(": ", Emphasis::Plain)
        .with(reason, Emphasis::Status(Outcome::Alarm))
}

/// Notice printed when an interrupt starts the shutdown.
#[must_use]
pub fn exit_notice() -> Line {
    Line::new().with("Exit on SIGINT", Emphasis::Plain)
}
