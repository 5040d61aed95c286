use chrono::{DateTime, Local};
use thiserror::Error;

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

const KEEP_SUFFIXES: [&str; 2] = [" keep", " k"];

pub const USAGE_HINT: &str = "Invalid alarm format. Use 'message in 10m' or 'message in 1h 30m'. \
Units: d, h, m, s. Append 'keep' or 'k' to keep the alarm after it triggers.";

pub const HELP_TEXT: &str = "Available commands:
  clear  delete all alarms
  help   show this help
  f      add a 10-minute farm alarm
  t      add a 15-minute trade alarm

Alarm format:
  \"message in time\"       e.g. \"farm in 10m\"
  \"message in time keep\"  e.g. \"farm in 1h 30m keep\"
  Time units: d (days), h (hours), m (minutes), s (seconds)";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("no duration tokens found (expected digits followed by d, h, m or s)")]
    NoDuration,
    #[error("duration must be greater than zero")]
    ZeroDuration,
}

/// A parsed request to create one countdown alarm.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmRequest {
    pub message: String,
    pub fire_time: DateTime<Local>,
    pub duration_ms: i64,
    pub keep: bool,
}

impl AlarmRequest {
    pub fn countdown(message: &str, duration_ms: i64, now: DateTime<Local>) -> Self {
        Self {
            message: message.to_string(),
            fire_time: now + chrono::Duration::milliseconds(duration_ms),
            duration_ms,
            keep: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear,
    Help,
    QuickFarm,
    QuickTrade,
    New(AlarmRequest),
}

/// Turns one submitted input line into a command. Command words are matched
/// case-insensitively on the trimmed input; everything else must parse as an
/// alarm request.
pub fn parse_command(input: &str, now: DateTime<Local>) -> Result<Command, ParseError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "clear" => return Ok(Command::Clear),
        "help" => return Ok(Command::Help),
        "f" => return Ok(Command::QuickFarm),
        "t" => return Ok(Command::QuickTrade),
        _ => {}
    }
    parse_alarm_input(input, now).map(Command::New)
}

/// Parses free text like "farm in 1h 30m keep" into an alarm request.
///
/// One pass produces both the message and the duration: the keep suffix is
/// stripped first, then the remainder is split on the first standalone "in",
/// and the right-hand side is scanned for `<int><unit>` tokens.
pub fn parse_alarm_input(input: &str, now: DateTime<Local>) -> Result<AlarmRequest, ParseError> {
    let (stripped, keep) = strip_keep_suffix(input.trim());

    let (message, expression) = match split_on_in(stripped) {
        Some((left, right)) => (left, right),
        None => ("", stripped),
    };

    let duration_ms = scan_duration_ms(expression)?;
    Ok(AlarmRequest {
        message: message.to_string(),
        fire_time: now + chrono::Duration::milliseconds(duration_ms),
        duration_ms,
        keep,
    })
}

/// Detects a trailing " keep" or " k" marker (case-insensitive) and strips
/// exactly the matched suffix.
fn strip_keep_suffix(input: &str) -> (&str, bool) {
    for suffix in KEEP_SUFFIXES {
        if input.len() > suffix.len() {
            let split = input.len() - suffix.len();
            if input.is_char_boundary(split) && input[split..].eq_ignore_ascii_case(suffix) {
                return (input[..split].trim_end(), true);
            }
        }
    }
    (input, false)
}

/// Splits on the first case-insensitive occurrence of the word "in"
/// surrounded by whitespace. Returns (message, duration expression) with
/// the surrounding whitespace trimmed away.
fn split_on_in(text: &str) -> Option<(&str, &str)> {
    let lower = text.to_ascii_lowercase();
    let mut search = 0;
    while let Some(found) = lower[search..].find("in") {
        let pos = search + found;
        let before_ws = text[..pos].ends_with(|c: char| c.is_whitespace());
        let after = &text[pos + 2..];
        let after_ws = after.starts_with(|c: char| c.is_whitespace());
        if pos > 0 && before_ws && after_ws {
            return Some((text[..pos].trim_end(), after.trim_start()));
        }
        search = pos + 1;
    }
    None
}

/// Scans a duration expression for `<int><d|h|m|s>` tokens left to right and
/// sums them in milliseconds. Characters outside tokens are ignored; digits
/// not followed by a unit letter do not form a token.
fn scan_duration_ms(expression: &str) -> Result<i64, ParseError> {
    let lowered = expression.to_ascii_lowercase();
    let bytes = lowered.as_bytes();
    let mut total: i64 = 0;
    let mut found = false;
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let multiplier = match bytes.get(i) {
            Some(b'd') => MS_PER_DAY,
            Some(b'h') => MS_PER_HOUR,
            Some(b'm') => MS_PER_MINUTE,
            Some(b's') => MS_PER_SECOND,
            _ => continue,
        };

        let value = lowered[start..i]
            .parse::<i64>()
            .map_err(|_| ParseError::NoDuration)?;
        total = total.saturating_add(value.saturating_mul(multiplier));
        found = true;
        i += 1;
    }

    if !found {
        return Err(ParseError::NoDuration);
    }
    if total == 0 {
        return Err(ParseError::ZeroDuration);
    }
    Ok(total)
}
