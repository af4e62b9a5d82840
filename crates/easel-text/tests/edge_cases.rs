//! Edge case tests for easel-text

use easel_text::*;

// ============================================================================
// FONT SIZE PARSING
// ============================================================================

#[test]
fn test_parse_font_size_common_values() {
    assert_eq!(parse_font_size("16px"), 16.0);
    assert_eq!(parse_font_size("1in"), 96.0);
    assert_eq!(parse_font_size("garbage"), 0.0);
}

#[test]
fn test_parse_font_size_repeated() {
    let first = parse_font_size("bold 1.25em Roboto");
    let second = parse_font_size("bold 1.25em Roboto");
    assert_eq!(first, second);
    assert!((first - 1.25 * 16.0 / 0.75).abs() < 1e-9);
}

#[test]
fn test_parse_font_size_first_match_wins() {
    assert_eq!(parse_font_size("10px / 2em serif"), 10.0);
}

#[test]
fn test_clear_cache_keeps_results() {
    let before = parse_font_size("3pc");
    clear_font_size_cache();
    assert_eq!(parse_font_size("3pc"), before);
}

// ============================================================================
// WRAPPING
// ============================================================================

/// Four units per word, one per space
fn fixed_words(text: &str) -> f64 {
    if text == " " { 1.0 } else { text.len() as f64 }
}

#[test]
fn test_wrap_greedy_packing() {
    let wrapped = wrap_text(&fixed_words, "aaaa bbbb cccc dddd", 10.0);
    assert_eq!(wrapped, "aaaa bbbb\ncccc dddd");
}

#[test]
fn test_wrap_preserves_hard_breaks_regardless_of_width() {
    let wrapped = wrap_text(&fixed_words, "aaaa\nbbbb", 1000.0);
    assert_eq!(wrapped, "aaaa\nbbbb");
}

#[test]
fn test_wrap_zero_width() {
    let lines = wrap_lines(&fixed_words, "aa bb", 0.0);
    assert_eq!(lines, vec!["aa", "bb"]);
}

#[test]
fn test_wrap_consecutive_spaces_keep_empty_tokens() {
    // Empty tokens cost one space width each
    let lines = wrap_lines(&fixed_words, "aa  bb", 100.0);
    assert_eq!(lines, vec!["aa  bb"]);
}

#[test]
fn test_wrap_closure_measure() {
    let scale = 2.0;
    let measure = move |s: &str| s.chars().count() as f64 * scale;
    let lines = wrap_lines(&measure, "ab cd ef", 12.0);
    assert_eq!(lines, vec!["ab cd", "ef"]);
}

#[test]
fn test_wrap_is_stateless() {
    let a = wrap_lines(&fixed_words, "aaaa bbbb cccc", 10.0);
    let b = wrap_lines(&fixed_words, "aaaa bbbb cccc", 10.0);
    assert_eq!(a, b);
}

// ============================================================================
// FONT SHORTHAND
// ============================================================================

#[test]
fn test_shorthand_rejects_sizeless() {
    assert!("serif".parse::<FontShorthand>().is_err());
}

#[test]
fn test_shorthand_with_fraction() {
    let font: FontShorthand = "16.5px Arial".parse().unwrap();
    assert_eq!(font.size, 16.5);
    assert_eq!(font.rest, "px Arial");
}
