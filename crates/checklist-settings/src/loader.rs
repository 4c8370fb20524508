//! Key/value parsing, data-directory resolution, and env overrides.
//!
//! The settings, checklist-registry and reminder files use the `key=value`
//! properties layout: `#` or `!` start a comment, `:` or blanks also
//! separate key from value, a trailing backslash joins the next line, and
//! backslash escapes protect separators inside keys.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::errors::{Result, SettingsError};
use crate::types::{DATE_FORMAT, Settings};

/// Key holding the show-all-weekday-tasks preference.
pub const SHOW_WEEKDAY_TASKS_KEY: &str = "showWeekdayTasks";
/// Key holding the last processed date.
pub const LAST_DATE_KEY: &str = "lastDate";

/// Env var overriding the data directory.
pub const DATA_DIR_ENV: &str = "CHECKLIST_DATA_DIR";
/// Env var overriding the show-all-weekday-tasks preference.
pub const SHOW_WEEKDAY_TASKS_ENV: &str = "CHECKLIST_SHOW_WEEKDAY_TASKS";

/// Resolve the data directory (`$CHECKLIST_DATA_DIR`, else `~/.dailychecklist`).
pub fn data_dir() -> PathBuf {
    data_dir_from(|name| std::env::var(name).ok())
}

/// [`data_dir`] with variables read through `lookup`.
pub fn data_dir_from(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = read_string(&lookup, DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let home = read_string(&lookup, "HOME").unwrap_or_else(|| "/tmp".to_string());
    PathBuf::from(home).join(".dailychecklist")
}

// ── Properties format ───────────────────────────────────────────────────────

/// Parse properties text into ordered key/value pairs.
///
/// Never fails: lines without a separator become a key with an empty value.
pub fn parse_properties(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut lines = text.lines();
    while let Some(raw) = lines.next() {
        let line = raw.trim_start_matches(is_blank);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let mut logical = line.to_string();
        while continues(&logical) {
            let _ = logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }
        let (key, value) = split_pair(&logical);
        pairs.push((unescape(key), unescape(value)));
    }
    pairs
}

/// Render ordered key/value pairs as properties text with a header comment.
pub fn render_properties(header: &str, pairs: &[(String, String)]) -> String {
    let mut out = format!("#{header}\n");
    for (key, value) in pairs {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// An odd run of trailing backslashes joins the next line.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split at the first unescaped `=`, `:` or blank. Blanks around a single
/// `=` or `:` belong to neither side.
fn split_pair(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }
    let rest = line[key_end..].trim_start_matches(is_blank);
    let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    (&line[..key_end], rest.trim_start_matches(is_blank))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

// ── Settings mapping ────────────────────────────────────────────────────────

/// Interpret properties text as [`Settings`].
///
/// Missing keys default; unknown keys are ignored. Unparseable values are
/// reported as [`SettingsError::Malformed`].
pub fn parse_settings(text: &str) -> Result<Settings> {
    let mut settings = Settings::default();
    for (key, value) in parse_properties(text) {
        match key.as_str() {
            SHOW_WEEKDAY_TASKS_KEY => {
                settings.show_weekday_tasks = parse_bool(&value).ok_or_else(|| {
                    SettingsError::malformed(&key, format!("not a boolean: {value:?}"))
                })?;
            }
            LAST_DATE_KEY => {
                let value = value.trim();
                settings.last_processed_date = if value.is_empty() {
                    None
                } else {
                    Some(NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
                        SettingsError::malformed(&key, format!("{value:?}: {e}"))
                    })?)
                };
            }
            _ => {}
        }
    }
    Ok(settings)
}

/// Render [`Settings`] as properties text.
pub fn render_settings(settings: &Settings) -> String {
    let mut pairs = vec![(
        SHOW_WEEKDAY_TASKS_KEY.to_string(),
        settings.show_weekday_tasks.to_string(),
    )];
    if let Some(date) = settings.last_processed_date {
        pairs.push((LAST_DATE_KEY.to_string(), date.format(DATE_FORMAT).to_string()));
    }
    render_properties("Daily checklist settings", &pairs)
}

// ── Env overrides ───────────────────────────────────────────────────────────

/// Values taken from the environment for the current process only.
///
/// They sit on top of the stored settings and are never written back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// `CHECKLIST_SHOW_WEEKDAY_TASKS`, when it holds a valid boolean.
    pub show_weekday_tasks: Option<bool>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through `lookup`. Invalid values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            show_weekday_tasks: read_bool(&lookup, SHOW_WEEKDAY_TASKS_ENV),
        }
    }

    /// `settings` with the overrides laid over it.
    #[must_use]
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(v) = self.show_weekday_tasks {
            settings.show_weekday_tasks = v;
        }
        settings
    }
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn read_string(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.is_empty())
}

fn read_bool(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<bool> {
    let val = lookup(name)?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
