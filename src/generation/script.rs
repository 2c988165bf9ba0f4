//! Text shaping applied around language model calls.

/// Dialogue markers stripped from podcast scripts, in removal order.
const SPEAKER_MARKERS: [&str; 4] = ["Host A:", "Host B:", "Q:", "A:"];

/// Keep at most `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Turn raw model output into a single narration paragraph.
///
/// Every speaker marker is removed, then whitespace runs collapse to one space.
/// Removal repeats until no marker survives, since deleting one can splice
/// its neighbours into another (`"QA::"` becomes `"A:"`).
pub fn clean_podcast_script(raw: &str) -> String {
    let mut script = raw.to_string();
    loop {
        let before = script.len();
        for marker in SPEAKER_MARKERS {
            script = script.replace(marker, "");
        }
        if script.len() == before {
            break;
        }
    }
    script.split_whitespace().collect::<Vec<_>>().join(" ")
}
