/// Greedy word wrap. Words longer than `width` (long SMILES strings, paths)
/// are split across lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let cut = word.char_indices().nth(width).map(|(i, _)| i).unwrap_or(word.len());
            lines.push(word[..cut].to_string());
            word = &word[cut..];
        }
        if word.is_empty() {
            continue;
        }

        let current_len = current.chars().count();
        if current.is_empty() {
            current = word.to_string();
        } else if current_len + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Shortens `s` to at most `max_len` characters, ending in `…` when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_len - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap("failed to parse SMILES", 12), vec!["failed to", "parse SMILES"]);
    }

    #[test]
    fn splits_words_longer_than_the_width() {
        assert_eq!(
            wrap("bad CC(C)(C)C(=O)OC1=CC=CC=C1", 10),
            vec!["bad", "CC(C)(C)C(", "=O)OC1=CC=", "CC=C1"]
        );
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate("CCO", 10), "CCO");
        assert_eq!(truncate("c1ccccc1O", 5), "c1cc…");
        assert_eq!(truncate("ÅÅÅÅ", 3), "ÅÅ…");
    }
}
