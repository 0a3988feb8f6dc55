//! Program title cleaning and match-key normalization.
//!
//! `TitleCleaner::clean` produces the display form of a title; it runs its
//! single-pass cleaner to a fixpoint, so cleaning is idempotent by
//! construction. `normalize_for_match` produces the lowercase token form
//! used by the similarity heuristics.

use regex::Regex;

use crate::config::MatchingConfig;

/// Sentinel for fields with no usable content after cleaning.
pub const UNSPECIFIED: &str = "Unspecified";

/// Month-name alternation shared by the date-shaped patterns.
const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

/// Tokens that never make a title segment meaningful on their own.
const GENERIC_WORDS: &[&str] = &[
    "workshop",
    "workshops",
    "webinar",
    "webinars",
    "session",
    "sessions",
    "program",
    "programs",
    "programme",
    "programmes",
    "training",
    "trainings",
    "event",
    "events",
    "series",
    "class",
    "classes",
    "online",
    "part",
    "intro",
];

/// Plural to singular for domain nouns the sources pluralize
/// inconsistently. Values never appear as keys, so one application
/// reaches the fixpoint.
const LEMMA_TABLE: &[(&str, &str)] = &[
    ("automations", "automation"),
    ("technologies", "technology"),
    ("strategies", "strategy"),
    ("businesses", "business"),
    ("workshops", "workshop"),
    ("webinars", "webinar"),
    ("sessions", "session"),
    ("skills", "skill"),
    ("tools", "tool"),
    ("marketers", "marketer"),
];

/// Cleans raw program titles into display form.
pub struct TitleCleaner {
    date_prefix: Regex,
    paren_suffix: Regex,
    date_fragment: Regex,
    segment_split: Regex,
    min_segment_len: usize,
}

impl TitleCleaner {
    pub fn new(matching: &MatchingConfig) -> Self {
        TitleCleaner {
            date_prefix: Regex::new(&format!(
                r"(?i)^\s*\d{{1,2}}(?:st|nd|rd|th)?\s+(?:{MONTHS})\b\.?\s*(?:\d{{4}})?\s*[–—:,-]*\s*"
            ))
            .unwrap(),
            paren_suffix: Regex::new(&format!(
                r"(?i)\s*\((?:[^()]*(?:\d{{1,2}}\s*[/.-]\s*\d{{1,2}}|\d{{1,2}}\s*[:.]\s*\d{{2}}|\d{{1,2}}\s*(?:am|pm)|\b(?:{MONTHS})\b|unspecified|tbc|tba|postponed|cancelled)[^()]*)\)\s*$"
            ))
            .unwrap(),
            date_fragment: Regex::new(&format!(
                r"(?i)^\s*(?:\d{{1,2}}\s*[/.-]\s*\d{{1,2}}(?:\s*[/.-]\s*\d{{2,4}})?|\d{{1,2}}(?:st|nd|rd|th)?\s+(?:{MONTHS})\b(?:\s+\d{{4}})?|(?:{MONTHS})\b\s+\d{{1,2}}(?:st|nd|rd|th)?(?:\s*,?\s*\d{{4}})?|\d{{4}})\s*$"
            ))
            .unwrap(),
            segment_split: Regex::new(r"\s+[–—-]\s+").unwrap(),
            min_segment_len: matching.min_segment_len,
        }
    }

    /// Clean a raw title into its display form.
    ///
    /// Runs the single-pass cleaner until it stops changing the string, so
    /// `clean(clean(x)) == clean(x)` holds for every input. Titles with no
    /// surviving content collapse to [`UNSPECIFIED`].
    pub fn clean(&self, raw: &str) -> String {
        let mut current = raw.to_string();
        loop {
            let next = self.clean_once(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn clean_once(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return UNSPECIFIED.to_string();
        }
        let mut s = trimmed.to_string();
        while let Some(m) = self.paren_suffix.find(&s) {
            s.truncate(m.start());
        }
        let mut s = self.date_prefix.replace(&s, "").into_owned();
        while let Some(idx) = s.rfind(',') {
            if self.date_fragment.is_match(&s[idx + 1..]) {
                s.truncate(idx);
            } else {
                break;
            }
        }
        let s = collapse_ws(&s);
        if s.is_empty() {
            return UNSPECIFIED.to_string();
        }
        let segments: Vec<&str> = self
            .segment_split
            .split(&s)
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .collect();
        if segments.len() <= 1 {
            return s;
        }
        if let Some(best) = first_longest(segments.iter().copied().filter(|seg| self.is_meaningful(seg)))
        {
            return best.to_string();
        }
        match first_longest(segments.iter().copied()) {
            Some(seg) => seg.to_string(),
            None => s,
        }
    }

    /// A segment is meaningful when it is long enough, not itself a date,
    /// and not made of generic filler words alone.
    fn is_meaningful(&self, segment: &str) -> bool {
        segment.chars().count() > self.min_segment_len
            && !self.date_fragment.is_match(segment)
            && !purely_generic(segment)
    }
}

/// Longest element by char count; the first one wins ties.
fn first_longest<'a>(items: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for item in items {
        let len = item.chars().count();
        match best {
            Some((_, best_len)) if len <= best_len => {}
            _ => best = Some((item, len)),
        }
    }
    best.map(|(item, _)| item)
}

fn purely_generic(segment: &str) -> bool {
    let mut saw_word = false;
    for token in segment.split_whitespace() {
        let word: String = token
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if word.is_empty() {
            continue;
        }
        saw_word = true;
        if word.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !GENERIC_WORDS.contains(&word.as_str()) {
            return false;
        }
    }
    saw_word
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a title into its comparison form: lowercase, punctuation
/// flattened to spaces, whitespace collapsed, tokens run through the lemma
/// table. Idempotent.
pub fn normalize_for_match(name: &str) -> String {
    let lowered = name.to_lowercase();
    let spaced: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced
        .split_whitespace()
        .map(lemmatize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn lemmatize(token: &str) -> &str {
    for (plural, singular) in LEMMA_TABLE {
        if token == *plural {
            return singular;
        }
    }
    token
}
