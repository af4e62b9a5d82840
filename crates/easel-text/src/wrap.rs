//! Greedy word wrapping
//!
//! Lines are filled token by token with no look-ahead. Existing line breaks are
//! always kept, and a token wider than the target width gets a line of its own
//! rather than being split.

/// Measured-width capability for the font currently configured on a context
pub trait TextMeasure {
    /// Width of `text` in pixels
    fn measure(&self, text: &str) -> f64;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> f64,
{
    fn measure(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Wrap `text` into lines no wider than `max_width` where possible
pub fn wrap_lines<M>(measure: &M, text: &str, max_width: f64) -> Vec<String>
where
    M: TextMeasure + ?Sized,
{
    let space_width = measure.measure(" ");
    let mut lines = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for source_line in text.split('\n') {
        let source_line = source_line.strip_suffix('\r').unwrap_or(source_line);
        let mut remaining = max_width;

        for token in source_line.split(' ') {
            let token_width = measure.measure(token);
            let consumed = token_width + space_width;

            if consumed > remaining {
                if !pending.is_empty() {
                    lines.push(pending.join(" "));
                    pending.clear();
                }
                pending.push(token);
                remaining = max_width - token_width;
            } else {
                remaining -= consumed;
                pending.push(token);
            }
        }

        if !pending.is_empty() {
            lines.push(pending.join(" "));
            pending.clear();
        }
    }

    tracing::trace!(lines = lines.len(), max_width, "wrapped text");
    lines
}

/// Wrap `text` and rejoin the lines with `\n`
pub fn wrap_text<M>(measure: &M, text: &str, max_width: f64) -> String
where
    M: TextMeasure + ?Sized,
{
    wrap_lines(measure, text, max_width).join("\n")
}

/// Baseline positions for drawing multi-line text starting at `y`.
///
/// Line `i` sits at `floor(y + i * line_height)`.
pub fn multiline_positions(text: &str, y: f64, line_height: f64) -> Vec<(&str, f64)> {
    let mut cursor = y;
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| {
            let at = cursor.floor();
            cursor += line_height;
            (line, at)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One unit per character, spaces included
    fn per_char(text: &str) -> f64 {
        text.chars().count() as f64
    }

    #[test]
    fn test_two_words_per_line() {
        // Each placed token reserves its trailing space
        let lines = wrap_lines(&per_char, "aaaa bbbb cccc", 10.0);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_first_token_reserves_no_space() {
        // "bbbb" opens a line without its space, leaving room for "cccc"
        let lines = wrap_lines(&per_char, "aaaa bbbb cccc", 9.0);
        assert_eq!(lines, vec!["aaaa", "bbbb cccc"]);
    }

    #[test]
    fn test_oversized_token() {
        let lines = wrap_lines(&per_char, "a verylongword b", 5.0);
        assert_eq!(lines, vec!["a", "verylongword", "b"]);
    }

    #[test]
    fn test_hard_breaks() {
        let lines = wrap_lines(&per_char, "aa\nbb", 100.0);
        assert_eq!(lines, vec!["aa", "bb"]);

        let lines = wrap_lines(&per_char, "aa\r\nbb", 100.0);
        assert_eq!(lines, vec!["aa", "bb"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(wrap_lines(&per_char, "", 10.0), vec![""]);
        assert_eq!(wrap_text(&per_char, "a\n\nb", 10.0), "a\n\nb");
    }

    #[test]
    fn test_multiline_positions() {
        let positions = multiline_positions("one\ntwo\nthree", 10.0, 12.5);
        assert_eq!(positions, vec![("one", 10.0), ("two", 22.0), ("three", 35.0)]);
    }
}
