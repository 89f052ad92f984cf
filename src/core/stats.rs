//! Derived values shown under the editor: counts, read time and tone.

use std::fmt;

const WORDS_PER_MINUTE: usize = 200;

// Checked in this order; the first category with a hit wins.
const FRIENDLY_KEYWORDS: &[&str] = &["delighted", "pleased", "warm"];
const URGENT_KEYWORDS: &[&str] = &["must", "urgently", "soon"];
const FORMAL_KEYWORDS: &[&str] = &["hereby", "pursuant", "corporate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Friendly,
    Urgent,
    Formal,
    Professional,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tone::Friendly => "Friendly",
            Tone::Urgent => "Urgent",
            Tone::Formal => "Formal",
            Tone::Professional => "Professional",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftStats {
    pub characters: usize,
    pub words: usize,
    pub read_minutes: usize,
    pub tone: Tone,
}

impl DraftStats {
    pub fn compute(subject: &str, body: &str) -> Self {
        let words = word_count(body);
        Self {
            characters: character_count(subject, body),
            words,
            read_minutes: read_minutes(words),
            tone: detect_tone(body),
        }
    }
}

pub fn character_count(subject: &str, body: &str) -> usize {
    subject.chars().count() + body.chars().count()
}

pub fn word_count(body: &str) -> usize {
    body.split_whitespace().count()
}

pub fn read_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE)
}

pub fn detect_tone(body: &str) -> Tone {
    let lowered = body.to_lowercase();
    let hit = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if hit(FRIENDLY_KEYWORDS) {
        Tone::Friendly
    } else if hit(URGENT_KEYWORDS) {
        Tone::Urgent
    } else if hit(FORMAL_KEYWORDS) {
        Tone::Formal
    } else {
        Tone::Professional
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_collapses_whitespace() {
        assert_eq!(word_count("Hello   world\n\nfoo"), 3);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn test_character_count_sums_both_fields() {
        assert_eq!(character_count("abc", "de"), 5);
        assert_eq!(character_count("ñ", "é"), 2);
    }

    #[test]
    fn test_read_minutes_rounds_up() {
        assert_eq!(read_minutes(0), 0);
        assert_eq!(read_minutes(1), 1);
        assert_eq!(read_minutes(200), 1);
        assert_eq!(read_minutes(201), 2);
    }

    #[test]
    fn test_tone_friendly() {
        assert_eq!(detect_tone("A warm welcome to you"), Tone::Friendly);
    }

    #[test]
    fn test_tone_urgent() {
        assert_eq!(detect_tone("You must act urgently"), Tone::Urgent);
    }

    #[test]
    fn test_tone_formal() {
        assert_eq!(detect_tone("Pursuant to our agreement"), Tone::Formal);
    }

    #[test]
    fn test_tone_default_professional() {
        assert_eq!(detect_tone("Here is the quote you asked for."), Tone::Professional);
    }

    #[test]
    fn test_tone_friendly_beats_urgent() {
        assert_eq!(detect_tone("We are PLEASED to say you must reply"), Tone::Friendly);
    }

    #[test]
    fn test_tone_matches_substrings() {
        // "soon" inside "sooner" still counts
        assert_eq!(detect_tone("The sooner the better"), Tone::Urgent);
    }

    #[test]
    fn test_compute_combines_values() {
        let stats = DraftStats::compute("Hi", "one two three");
        assert_eq!(stats.characters, 15);
        assert_eq!(stats.words, 3);
        assert_eq!(stats.read_minutes, 1);
        assert_eq!(stats.tone, Tone::Professional);
    }
}
