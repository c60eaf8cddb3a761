/// Clause terminators, full-width and ASCII.
const DELIMITERS: &[char] = &['，', '。', '！', '？', ',', '!', '?'];

/// Split a reply into display fragments.
///
/// Each delimiter stays attached to the clause before it, fragments are
/// trimmed, empty ones are dropped, and an unterminated tail is kept.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if DELIMITERS.contains(&ch) {
            push_trimmed(&mut fragments, &current);
            current.clear();
        }
    }
    push_trimmed(&mut fragments, &current);
    fragments
}

fn push_trimmed(fragments: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        fragments.push(trimmed.to_string());
    }
}
