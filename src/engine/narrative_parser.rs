use std::sync::OnceLock;

use regex::Regex;

use crate::model::parsed_segment::{ParseMode, ParsedSegment};

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    Narrative,
    Collecting,
    Done,
}

/// Splits a model response into narrative, choices and feedback.
/// Never fails: unexpected layouts fall back to the best guess.
pub fn parse_segment(raw: &str, mode: ParseMode) -> ParsedSegment {
    if raw.trim().is_empty() {
        return ParsedSegment::default();
    }

    let mut segment = scan_lines(raw);

    if let ParseMode::Bounded { max_choices } = mode {
        segment.choices = extract_choices(raw, max_choices);
    }

    segment
}

fn scan_lines(raw: &str) -> ParsedSegment {
    let mut segment = ParsedSegment::default();
    let mut phase = ScanPhase::Narrative;

    for line in raw.lines() {
        let line = line.trim();

        match phase {
            ScanPhase::Narrative => {
                if is_choices_header(line) {
                    phase = ScanPhase::Collecting;
                    continue;
                }

                if !line.is_empty() && !starts_with_ignore_case(line, "output format") {
                    segment.narrative.push(line.to_string());
                }
            }

            ScanPhase::Collecting => {
                if line.is_empty() {
                    continue;
                }

                match numbered_choice(line) {
                    // a bare "1." offers nothing to pick
                    Some("") => continue,
                    Some(choice) => segment.choices.push(choice.to_string()),
                    None => {
                        segment.feedback = Some(line.to_string());
                        phase = ScanPhase::Done;
                    }
                }
            }

            ScanPhase::Done => break,
        }
    }

    segment
}

fn is_choices_header(line: &str) -> bool {
    starts_with_ignore_case(line, "choices") || line.starts_with("2.")
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// "1. Go to the forest" or "2) Help Spark"
fn numbered_choice(line: &str) -> Option<&str> {
    let bytes = line.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_digit() || !matches!(bytes[1], b'.' | b')') {
        return None;
    }

    Some(line[2..].trim())
}

fn choices_section() -> &'static Regex {
    static SECTION: OnceLock<Regex> = OnceLock::new();
    SECTION.get_or_init(|| {
        Regex::new(r"(?s)Choices?:\s*1\..*?\n2\.").expect("choices section pattern is valid")
    })
}

fn numbered_item() -> &'static Regex {
    static ITEM: OnceLock<Regex> = OnceLock::new();
    ITEM.get_or_init(|| Regex::new(r"\d+\.[ \t]*(.*)").expect("numbered item pattern is valid"))
}

/// Numbered items from the whole response, capped at `max_choices`.
/// Without a recognisable "Choices:" section the reader still gets
/// generic options so the story can go on. Empty items are skipped and
/// the slots they leave take the generic option for that position.
pub fn extract_choices(raw: &str, max_choices: usize) -> Vec<String> {
    if !choices_section().is_match(raw) {
        return fallback_choices(max_choices);
    }

    let mut choices: Vec<String> = numbered_item()
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|choice| !choice.is_empty())
        .take(max_choices)
        .collect();

    for slot in choices.len()..max_choices {
        choices.push(format!("Option {}", slot + 1));
    }

    choices
}

pub fn fallback_choices(max_choices: usize) -> Vec<String> {
    (1..=max_choices).map(|i| format!("Option {}", i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CHOICES: ParseMode = ParseMode::Bounded { max_choices: 2 };

    #[test]
    fn unbounded_splits_story_choices_and_feedback() {
        let raw = "Once upon a time.\nChoices:\n1. Go left\n2. Go right\nGreat job!";
        let segment = parse_segment(raw, ParseMode::Unbounded);

        assert_eq!(segment.narrative_text(), "Once upon a time.");
        assert_eq!(segment.choices, vec!["Go left", "Go right"]);
        assert_eq!(segment.feedback.as_deref(), Some("Great job!"));
    }

    #[test]
    fn bounded_keeps_two_choices_and_trailing_feedback() {
        let raw = "Spark found a shiny stone.\n\
                   Choices:\n\
                   1. Keep the stone\n\
                   2. Give it to a friend\n\
                   You are a kind explorer!";
        let segment = parse_segment(raw, TWO_CHOICES);

        assert_eq!(segment.choices, vec!["Keep the stone", "Give it to a friend"]);
        assert_eq!(segment.feedback.as_deref(), Some("You are a kind explorer!"));
    }

    #[test]
    fn no_header_falls_back_per_mode() {
        let raw = "Just a story with no options.";

        let bounded = parse_segment(raw, TWO_CHOICES);
        assert_eq!(bounded.choices, vec!["Option 1", "Option 2"]);

        let unbounded = parse_segment(raw, ParseMode::Unbounded);
        assert!(unbounded.choices.is_empty());
        assert_eq!(unbounded.narrative_text(), raw);
        assert_eq!(unbounded.feedback, None);
    }

    #[test]
    fn empty_input_is_empty_segment() {
        for mode in [ParseMode::Unbounded, TWO_CHOICES] {
            assert_eq!(parse_segment("", mode), ParsedSegment::default());
            assert_eq!(parse_segment(" \n\n  ", mode), ParsedSegment::default());
        }
    }

    #[test]
    fn regex_mode_keeps_first_two_of_four() {
        let raw = "The bridge wobbled.\n\
                   Choices:\n\
                   1. Hold the rope\n\
                   2. Call Spark\n\
                   3. Walk back\n\
                   4. Sit down";
        assert_eq!(extract_choices(raw, 2), vec!["Hold the rope", "Call Spark"]);
    }

    #[test]
    fn regex_mode_scans_the_whole_response() {
        let raw = "1. Story Segment: Alex met an owl.\n\
                   Choices:\n\
                   1. Say hi\n\
                   2. Wave";
        assert_eq!(
            extract_choices(raw, 2),
            vec!["Story Segment: Alex met an owl.", "Say hi"]
        );
    }

    #[test]
    fn regex_mode_needs_a_second_item() {
        let raw = "Choices:\n1. Only one way forward";
        assert_eq!(extract_choices(raw, 2), vec!["Option 1", "Option 2"]);
    }

    #[test]
    fn regex_mode_accepts_singular_header() {
        let raw = "Choice:\n1. Left\n2. Right";
        assert_eq!(extract_choices(raw, 2), vec!["Left", "Right"]);
    }

    #[test]
    fn non_numbered_line_ends_collection() {
        let raw = "Choices:\n1. Share\nThat was thoughtful.\n2. Keep\nMore story";
        let segment = parse_segment(raw, ParseMode::Unbounded);

        assert_eq!(segment.choices, vec!["Share"]);
        assert_eq!(segment.feedback.as_deref(), Some("That was thoughtful."));
        assert!(segment.narrative.is_empty());
    }

    #[test]
    fn format_echo_is_understood() {
        let raw = "Output format:\n\
                   1. Story Segment\n\
                   Alex and Spark saw a rainbow.\n\
                   2. Choices\n\
                   1) Follow the rainbow\n\
                   2) Paint a picture\n\
                   3. You are doing great!";
        let segment = parse_segment(raw, ParseMode::Unbounded);

        assert_eq!(
            segment.narrative,
            vec!["1. Story Segment", "Alex and Spark saw a rainbow."]
        );
        assert_eq!(
            segment.choices,
            vec!["Follow the rainbow", "Paint a picture", "You are doing great!"]
        );
        assert_eq!(segment.feedback, None);
    }

    #[test]
    fn digit_without_punctuation_is_not_a_choice() {
        let raw = "10 little stars shone.\nchoices:\n1. Count them\n3 more stars appeared";
        let segment = parse_segment(raw, ParseMode::Unbounded);

        assert_eq!(segment.narrative, vec!["10 little stars shone."]);
        assert_eq!(segment.choices, vec!["Count them"]);
        assert_eq!(segment.feedback.as_deref(), Some("3 more stars appeared"));
    }

    #[test]
    fn lone_digit_becomes_feedback() {
        let raw = "Choices:\n1. Hop\n7";
        let segment = parse_segment(raw, ParseMode::Unbounded);
        assert_eq!(segment.choices, vec!["Hop"]);
        assert_eq!(segment.feedback.as_deref(), Some("7"));
    }

    #[test]
    fn blank_lines_inside_choices_are_skipped() {
        let raw = "Story.\nCHOICES\n\n1. Up\n\n2. Down\n\nKeep going!";
        let segment = parse_segment(raw, ParseMode::Unbounded);
        assert_eq!(segment.choices, vec!["Up", "Down"]);
        assert_eq!(segment.feedback.as_deref(), Some("Keep going!"));
    }

    #[test]
    fn bare_number_is_not_offered_as_a_choice() {
        let raw = "Story.\nChoices:\n1.\n2. Go right\nYay";
        let segment = parse_segment(raw, ParseMode::Unbounded);

        assert_eq!(segment.choices, vec!["Go right"]);
        assert_eq!(segment.feedback.as_deref(), Some("Yay"));
    }

    #[test]
    fn bounded_mode_fills_empty_slots_with_generic_options() {
        let raw = "Story.\nChoices:\n1. Go\n2.";
        assert_eq!(parse_segment(raw, TWO_CHOICES).choices, vec!["Go", "Option 2"]);

        let raw = "Story.\nChoices:\n1. \n2. ";
        assert_eq!(parse_segment(raw, TWO_CHOICES).choices, vec!["Option 1", "Option 2"]);
    }

    #[test]
    fn bare_number_does_not_take_the_next_line() {
        let raw = "Story.\nChoices:\n1.\n2. Go right\nYay";
        assert_eq!(extract_choices(raw, 2), vec!["Go right", "Option 2"]);
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let raw = "Ünïcode stóry 🐉\nChoices:\n1. Fly 🐉\n🌟 Amazing!";
        let segment = parse_segment(raw, ParseMode::Unbounded);
        assert_eq!(segment.choices, vec!["Fly 🐉"]);
        assert_eq!(segment.feedback.as_deref(), Some("🌟 Amazing!"));
    }
}
