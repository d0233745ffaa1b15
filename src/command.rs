// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{session::RadarSession, settings::SettingsStore};

const HELP: &str = "commands: help status get_timeout set_timeout <seconds> \
get_zone set_zone <x1> <x2> <y1> <y2> get_distance set_distance <y1> <y2> reset_zone";

/// Respond to one host command line.
///
/// The dispatcher is a thin caller of the session configuration and status
/// operations: one line in, one response line out.  Unknown or malformed
/// commands are answered, never fatal.  An empty line yields an empty
/// response.
pub fn dispatch<S: SettingsStore>(session: &mut RadarSession<S>, line: &str) -> String {
    let mut parts = line.split_whitespace();
    let command = match parts.next() {
        Some(command) => command,
        None => return String::new(),
    };
    let args: Vec<&str> = parts.collect();

    match command {
        "help" => HELP.to_string(),
        "status" => format!(
            "enabled={} presence={} active_targets={}",
            session.enabled(),
            session.presence(None),
            session.active_targets()
        ),
        "get_timeout" => format_timeout(session),
        "set_timeout" => match args.as_slice() {
            [seconds] => match seconds.parse::<u32>() {
                Ok(seconds) => apply(session.set_timeout(seconds), || format_timeout(session)),
                Err(_) => "usage: set_timeout <seconds>".to_string(),
            },
            _ => "usage: set_timeout <seconds>".to_string(),
        },
        "get_zone" => format_zone(session),
        "set_zone" => match parse_args::<4>(&args) {
            Some([x1, x2, y1, y2]) => {
                apply(session.set_zone(x1, x2, y1, y2), || format_zone(session))
            }
            None => "usage: set_zone <x1> <x2> <y1> <y2>".to_string(),
        },
        "get_distance" => format_distance(session),
        "set_distance" => match parse_args::<2>(&args) {
            Some([y1, y2]) => apply(session.set_distance(y1, y2), || format_distance(session)),
            None => "usage: set_distance <y1> <y2>".to_string(),
        },
        "reset_zone" => apply(session.reset_zone(), || format_zone(session)),
        _ => format!("unknown command: {} (try help)", command),
    }
}

fn parse_args<const N: usize>(args: &[&str]) -> Option<[i32; N]> {
    if args.len() != N {
        return None;
    }

    let mut values = [0i32; N];
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg.parse().ok()?;
    }
    Some(values)
}

fn apply(
    result: Result<(), crate::settings::Error>,
    current: impl FnOnce() -> String,
) -> String {
    match result {
        Ok(()) => current(),
        Err(err) => format!("error: {}", err),
    }
}

fn format_timeout<S: SettingsStore>(session: &RadarSession<S>) -> String {
    format!("timeout={}", session.config().timeout)
}

fn format_zone<S: SettingsStore>(session: &RadarSession<S>) -> String {
    let config = session.config();
    format!(
        "zone={},{},{},{}",
        config.x1, config.x2, config.y1, config.y2
    )
}

fn format_distance<S: SettingsStore>(session: &RadarSession<S>) -> String {
    let config = session.config();
    format!("distance={},{}", config.y1, config.y2)
}
