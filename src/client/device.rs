//! Command interpreter and object table of the simulated radio.
//!
//! [`SimulatedRadio`] is pure state: it turns one command line into a
//! response plus the side effects the loopback client must deliver
//! (state updates, notices, a response delay). It never touches channels.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use crate::domain::{ClientHandle, CommandResponse, Message, StateUpdate};

/// Status code for an unrecognized verb.
pub const UNKNOWN_COMMAND: u32 = 0x5000_0015;
/// Status code for a recognized verb with malformed arguments.
pub const INVALID_ARGUMENTS: u32 = 0x5000_0016;
/// Status code for a command naming an object the radio does not have.
pub const UNKNOWN_OBJECT: u32 = 0x5000_0017;

/// Result of executing one command.
#[derive(Debug)]
pub struct Execution {
    /// Response to hand back to the caller.
    pub response: CommandResponse,
    /// How long to hold the response before replying.
    pub delay: Option<Duration>,
    /// State deltas to publish to matching subscribers.
    pub updates: Vec<StateUpdate>,
    /// Notice to push on the message channel.
    pub notice: Option<Message>,
}

impl Execution {
    fn reply(response: CommandResponse) -> Self {
        Self {
            response,
            delay: None,
            updates: Vec::new(),
            notice: None,
        }
    }

    fn status(serial: u32, error_code: u32, body: &str) -> Self {
        Self::reply(CommandResponse {
            serial,
            error_code,
            body: body.to_string(),
        })
    }
}

/// In-memory radio: a table of objects, each a flat attribute map.
#[derive(Debug)]
pub struct SimulatedRadio {
    handle: ClientHandle,
    objects: BTreeMap<String, HashMap<String, String>>,
}

impl SimulatedRadio {
    /// Creates a radio with a small default object table.
    #[must_use]
    pub fn new(handle: ClientHandle) -> Self {
        let mut radio = Self::empty(handle);
        radio.merge("radio", &[("model", "LOOPBACK"), ("slices", "2")]);
        radio.merge(
            "slice 0",
            &[("RF_frequency", "14.074000"), ("mode", "DIGU"), ("tx", "1")],
        );
        radio.merge(
            "slice 1",
            &[("RF_frequency", "7.074000"), ("mode", "LSB"), ("tx", "0")],
        );
        radio
    }

    /// Creates a radio with no objects.
    #[must_use]
    pub fn empty(handle: ClientHandle) -> Self {
        Self {
            handle,
            objects: BTreeMap::new(),
        }
    }

    /// Handle stamped on updates this radio emits.
    #[must_use]
    pub const fn handle(&self) -> ClientHandle {
        self.handle
    }

    /// Executes one command line under `serial`.
    pub fn execute(&mut self, serial: u32, command: &str) -> Execution {
        let mut words = command.split_whitespace();
        let Some(verb) = words.next() else {
            return Execution::status(serial, INVALID_ARGUMENTS, "empty command");
        };
        let args: Vec<&str> = words.collect();

        match verb.to_ascii_lowercase().as_str() {
            "ping" => Execution::reply(CommandResponse::ok(serial)),
            "sub" => self.sub(serial, &args),
            "set" => self.set(serial, &args),
            "get" => self.get(serial, &args),
            "message" => {
                let mut exec = Execution::reply(CommandResponse::ok(serial));
                exec.notice = Some(Message::new(args.join(" ")));
                exec
            }
            "sleep" => match args.as_slice() {
                [ms] => match ms.parse::<u64>() {
                    Ok(ms) => {
                        let mut exec = Execution::reply(CommandResponse::ok(serial));
                        exec.delay = Some(Duration::from_millis(ms));
                        exec
                    }
                    Err(_) => Execution::status(serial, INVALID_ARGUMENTS, "bad duration"),
                },
                _ => Execution::status(serial, INVALID_ARGUMENTS, "usage: sleep <ms>"),
            },
            _ => Execution::status(serial, UNKNOWN_COMMAND, "unknown command"),
        }
    }

    /// `sub <prefix> [all]` replays the current state of matching objects.
    fn sub(&self, serial: u32, args: &[&str]) -> Execution {
        let prefix = match args {
            [] => "",
            [prefix, ..] if *prefix == "all" => "",
            [prefix, ..] => *prefix,
        };
        let mut exec = Execution::reply(CommandResponse::ok(serial));
        exec.updates = self
            .objects
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .filter_map(|(name, attrs)| self.snapshot(name, attrs.clone(), HashSet::new()))
            .collect();
        exec
    }

    /// `set <object words...> k=v...`
    fn set(&mut self, serial: u32, args: &[&str]) -> Execution {
        let (pairs, path): (Vec<&str>, Vec<&str>) =
            args.iter().copied().partition(|a| a.contains('='));
        if path.is_empty() || pairs.is_empty() {
            return Execution::status(serial, INVALID_ARGUMENTS, "usage: set <object> k=v...");
        }
        let object = path.join(" ");
        let pairs: Vec<(&str, &str)> = pairs.iter().filter_map(|p| p.split_once('=')).collect();
        if pairs.iter().any(|(k, _)| k.is_empty()) {
            return Execution::status(serial, INVALID_ARGUMENTS, "empty attribute name");
        }

        let changed: HashSet<String> = pairs.iter().map(|(k, _)| (*k).to_string()).collect();
        let attrs = self.merge(&object, &pairs).clone();

        let mut exec = Execution::reply(CommandResponse::ok(serial));
        exec.updates.extend(self.snapshot(&object, attrs, changed));
        exec
    }

    /// `get <object words...>` returns the sorted attribute list as body.
    fn get(&self, serial: u32, args: &[&str]) -> Execution {
        if args.is_empty() {
            return Execution::status(serial, INVALID_ARGUMENTS, "usage: get <object>");
        }
        let object = args.join(" ");
        let Some(attrs) = self.objects.get(&object) else {
            return Execution::status(serial, UNKNOWN_OBJECT, &format!("no object {object:?}"));
        };
        let mut keys: Vec<&String> = attrs.keys().collect();
        keys.sort();
        let body = keys
            .into_iter()
            .filter_map(|k| attrs.get(k).map(|v| format!("{k}={v}")))
            .collect::<Vec<_>>()
            .join(" ");
        Execution::reply(CommandResponse {
            serial,
            error_code: 0,
            body,
        })
    }

    fn merge(&mut self, object: &str, pairs: &[(&str, &str)]) -> &HashMap<String, String> {
        let attrs = self.objects.entry(object.to_string()).or_default();
        for (k, v) in pairs {
            attrs.insert((*k).to_string(), (*v).to_string());
        }
        attrs
    }

    fn snapshot(
        &self,
        object: &str,
        attrs: HashMap<String, String>,
        changed: HashSet<String>,
    ) -> Option<StateUpdate> {
        match StateUpdate::new(self.handle.to_string(), object, attrs, changed) {
            Ok(upd) => Some(upd),
            Err(e) => {
                tracing::error!(error = %e, "simulated radio built an invalid update");
                None
            }
        }
    }
}
