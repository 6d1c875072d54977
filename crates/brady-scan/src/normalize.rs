//! Best-effort cleanup of backend option lists.
//!
//! The backend answers with a plain-text numbered list. Newlines arrive
//! either literally or as the two-character `\n` escape, lines carry
//! ordinal markers in whatever shape the model felt like (`1.`, `2)`,
//! `3 -`, bullets), and quoting is inconsistent. This is a tolerant
//! normalizer, not a parser: clean what is recognizable, drop what is
//! empty, never fail.

/// Split a raw response body into cleaned option lines.
pub fn clean_lines(raw: &str) -> Vec<String> {
    raw.replace("\\n", "\n")
        .lines()
        .filter_map(clean_line)
        .collect()
}

/// Clean a single line; `None` when nothing usable remains.
fn clean_line(line: &str) -> Option<String> {
    let stripped = strip_ordinal(line.trim());

    let cleaned: String = stripped
        .chars()
        .filter(|c| !matches!(c, '\\' | '"' | '\u{201c}' | '\u{201d}'))
        .collect();

    let cleaned = cleaned
        .trim_matches('\'')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Drop a leading bullet or `<digits><separator>` ordinal marker.
/// Bare numbers with no separator are kept ("2024 budget" stays intact).
fn strip_ordinal(line: &str) -> &str {
    let after_bullet = line
        .trim_start_matches(['-', '*', '\u{2022}'])
        .trim_start();

    let digits_end = after_bullet
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_bullet.len());
    if digits_end > 0 && digits_end < after_bullet.len() {
        let rest = after_bullet[digits_end..].trim_start();
        if let Some(r) = rest.strip_prefix(['.', ')', ':', '-']) {
            return r.trim_start();
        }
    }
    after_bullet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_vector_with_escaped_newlines_and_quotes() {
        // Escaped newlines, escaped quotes, and a bare line, all in one body.
        let raw = r#"1. "Pizza"\n2. \"Tacos\"\n3. Salad"#;
        assert_eq!(clean_lines(raw), vec!["Pizza", "Tacos", "Salad"]);
    }

    #[test]
    fn literal_newlines_work_the_same() {
        let raw = "1. Water\n2. Juice\n3. Milk";
        assert_eq!(clean_lines(raw), vec!["Water", "Juice", "Milk"]);
    }

    #[test]
    fn ordinal_marker_shapes() {
        assert_eq!(clean_lines("1) Go outside"), vec!["Go outside"]);
        assert_eq!(clean_lines("2: Stay home"), vec!["Stay home"]);
        assert_eq!(clean_lines("3 - Watch a movie"), vec!["Watch a movie"]);
        assert_eq!(clean_lines("- Read a book"), vec!["Read a book"]);
        assert_eq!(clean_lines("\u{2022} Take a nap"), vec!["Take a nap"]);
    }

    #[test]
    fn bare_leading_number_is_not_an_ordinal() {
        assert_eq!(clean_lines("2024 budget review"), vec!["2024 budget review"]);
        // A line that is only a number has no separator to strip.
        assert_eq!(clean_lines("42"), vec!["42"]);
    }

    #[test]
    fn empty_and_whitespace_lines_are_dropped() {
        let raw = "1. Soup\n\n   \n2. Bread";
        assert_eq!(clean_lines(raw), vec!["Soup", "Bread"]);
    }

    #[test]
    fn lines_that_clean_to_nothing_are_dropped() {
        assert!(clean_lines(r#"1. "\\""#).is_empty());
    }

    #[test]
    fn interior_whitespace_is_collapsed() {
        assert_eq!(clean_lines("1.  Play   the   piano "), vec!["Play the piano"]);
    }

    #[test]
    fn apostrophes_inside_words_survive() {
        assert_eq!(clean_lines("1. Let's go swimming"), vec!["Let's go swimming"]);
        assert_eq!(clean_lines("2. 'quoted option'"), vec!["quoted option"]);
    }

    #[test]
    fn smart_quotes_are_stripped() {
        assert_eq!(
            clean_lines("1. \u{201c}Ice cream\u{201d}"),
            vec!["Ice cream"]
        );
    }

    #[test]
    fn garbage_in_reasonable_lines_out() {
        // Unnumbered prose still comes through as one option per line.
        let raw = "maybe pizza\\nmaybe not";
        assert_eq!(clean_lines(raw), vec!["maybe pizza", "maybe not"]);
    }
}
