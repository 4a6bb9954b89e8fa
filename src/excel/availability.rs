//! Parsing of free-text availability remarks for visiting faculty, e.g.
//! `"Mon, Wed 10am-1pm, Fri full day"`.

use crate::models::{FIRST_HOUR, N_SLOTS};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Day keys in calendar order, as used in `vf_timing` maps.
pub const DAY_ORDER: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityWindow {
    /// Three-letter day key; `None` means every day.
    pub day: Option<String>,
    pub start_min: Option<u32>,
    pub end_min: Option<u32>,
    pub full_day: bool,
    pub raw: String,
}

fn time_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\s*(?:-|–|to)\s*(\d{1,2})(?::(\d{2}))?\s*(am|pm)?")
            .expect("valid time range regex")
    })
}

fn day_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:mon(?:day)?|tue(?:sday)?|wed(?:nesday)?|thu(?:rsday)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?)\b")
            .expect("valid day regex")
    })
}

fn full_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:full day|fullday|all day)\b").expect("valid full-day regex"))
}

fn combined_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:combined\s+class|combined|combine)\s*(?:with|:)?\s*(.+)").expect("valid combined regex")
    })
}

fn class_splitter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",| and |/|;").expect("valid splitter regex"))
}

/// Split on commas that are not inside parentheses.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = (depth - 1).max(0),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn day_keys(part: &str) -> Vec<String> {
    day_token_re()
        .find_iter(part)
        .map(|m| m.as_str()[..3].to_lowercase())
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum Meridiem {
    Am,
    Pm,
}

fn meridiem(m: Option<regex::Match<'_>>) -> Option<Meridiem> {
    m.map(|m| if m.as_str().eq_ignore_ascii_case("pm") { Meridiem::Pm } else { Meridiem::Am })
}

fn to_minutes(hour: u32, minute: u32, mer: Option<Meridiem>) -> u32 {
    let hour = match mer {
        Some(Meridiem::Pm) if hour != 12 => hour + 12,
        Some(Meridiem::Am) if hour == 12 => 0,
        _ => hour,
    };
    hour * 60 + minute
}

/// Resolve a range whose sides may lack am/pm. A bare side borrows the
/// other side's marker when that keeps the range ordered; with no marker
/// at all, hours before the first teaching hour are read as afternoon.
fn resolve_range(caps: &regex::Captures<'_>) -> Option<(u32, u32)> {
    let sh: u32 = caps.get(1)?.as_str().parse().ok()?;
    let sm: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let eh: u32 = caps.get(4)?.as_str().parse().ok()?;
    let em: u32 = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let mut s_mer = meridiem(caps.get(3));
    let mut e_mer = meridiem(caps.get(6));

    match (s_mer, e_mer) {
        (None, Some(m)) => {
            if to_minutes(sh, sm, Some(m)) < to_minutes(eh, em, Some(m)) {
                s_mer = Some(m);
            }
        }
        (Some(m), None) => {
            if to_minutes(sh, sm, Some(m)) < to_minutes(eh, em, Some(m)) {
                e_mer = Some(m);
            }
        }
        (None, None) => {
            if (1..FIRST_HOUR).contains(&sh) {
                s_mer = Some(Meridiem::Pm);
            }
            if (1..FIRST_HOUR).contains(&eh) || (eh < sh && eh < 12) {
                e_mer = Some(Meridiem::Pm);
            }
        }
        _ => {}
    }
    Some((to_minutes(sh, sm, s_mer), to_minutes(eh, em, e_mer)))
}

/// Parse remarks into availability windows. Empty input yields nothing.
pub fn parse_availability(remarks: Option<&str>) -> Vec<AvailabilityWindow> {
    let Some(text) = remarks.map(str::trim).filter(|t| !t.is_empty()) else {
        return Vec::new();
    };
    let mut out = Vec::new();

    for part in split_top_level(text) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let raw = part.to_string();
        let days = day_keys(part);

        if full_day_re().is_match(part) {
            if days.is_empty() {
                out.push(AvailabilityWindow { day: None, start_min: None, end_min: None, full_day: true, raw });
            } else {
                for d in days {
                    out.push(AvailabilityWindow { day: Some(d), start_min: None, end_min: None, full_day: true, raw: raw.clone() });
                }
            }
            continue;
        }

        if let Some((start, end)) = time_range_re().captures(part).and_then(|c| resolve_range(&c)) {
            if days.is_empty() {
                out.push(AvailabilityWindow { day: None, start_min: Some(start), end_min: Some(end), full_day: false, raw });
            } else {
                for d in days {
                    out.push(AvailabilityWindow {
                        day: Some(d),
                        start_min: Some(start),
                        end_min: Some(end),
                        full_day: false,
                        raw: raw.clone(),
                    });
                }
            }
            continue;
        }

        for d in days {
            out.push(AvailabilityWindow { day: Some(d), start_min: None, end_min: None, full_day: false, raw: raw.clone() });
        }
    }
    out
}

/// Project windows onto the hourly slot grid for every day of the week.
/// A slot is marked when the window overlaps it.
pub fn availability_to_vf_timing(windows: &[AvailabilityWindow]) -> BTreeMap<String, Vec<u8>> {
    let mut mapping: BTreeMap<String, Vec<u8>> =
        DAY_ORDER.iter().map(|d| (d.to_string(), vec![0u8; N_SLOTS])).collect();

    for w in windows {
        let days: Vec<&str> = match &w.day {
            Some(d) => vec![d.as_str()],
            None => DAY_ORDER.to_vec(),
        };
        for d in days {
            let Some(slots) = mapping.get_mut(d) else { continue };
            let (start, end) = match (w.full_day, w.start_min, w.end_min) {
                (false, Some(s), Some(e)) => (s, e),
                _ => {
                    slots.iter_mut().for_each(|s| *s = 1);
                    continue;
                }
            };
            for (idx, slot) in slots.iter_mut().enumerate() {
                let slot_start = (FIRST_HOUR + idx as u32) * 60;
                let slot_end = slot_start + 60;
                if !(end <= slot_start || start >= slot_end) {
                    *slot = 1;
                }
            }
        }
    }
    mapping
}

/// Extract class names from remarks like `"Combined with CSE-A, CSE-B and IT"`.
pub fn parse_combined_classes(remarks: Option<&str>) -> Vec<String> {
    let Some(text) = remarks else { return Vec::new() };
    let Some(caps) = combined_re().captures(text) else { return Vec::new() };
    let tail = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    class_splitter_re()
        .split(tail)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
