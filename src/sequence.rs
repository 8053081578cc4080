//! Display ordering for verified images.
//!
//! Images are ordered by the first run of digits in their filename, so
//! `2.jpg` comes before `10.jpg` and `screenshot3.png` sorts as 3. Files with
//! no digits get a sentinel key and land after every numbered file. Ties
//! (equal numbers, or any two un-numbered files) are broken by collation
//! order: names are compared first ignoring accents and case (`Éclair` sorts
//! with `eclair`, before `zebra`), then with accents, then by exact bytes so
//! the ordering stays total and deterministic.

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Key given to filenames with no digits; larger than any realistic image count.
pub const UNNUMBERED_KEY: u64 = 999_999;

/// Final path segment of a URL or path.
pub fn filename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// First contiguous run of ASCII digits in `name`, as an integer.
///
/// Runs too long for `u64` saturate to `u64::MAX`.
pub fn numeric_key(name: &str) -> u64 {
    let Some(start) = name.find(|c: char| c.is_ascii_digit()) else {
        return UNNUMBERED_KEY;
    };
    let digits = name[start..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();
    digits.parse().unwrap_or(u64::MAX)
}

/// Base letters only: decomposed, combining marks dropped, lowercased.
fn primary_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Decomposed and lowercased, so accented letters follow their base letter.
fn secondary_key(name: &str) -> String {
    name.nfd().flat_map(char::to_lowercase).collect()
}

/// Compare two filenames: numeric key first, then collation order.
pub fn compare_filenames(a: &str, b: &str) -> Ordering {
    numeric_key(a)
        .cmp(&numeric_key(b))
        .then_with(|| primary_key(a).cmp(&primary_key(b)))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| a.cmp(b))
}

/// Sort URLs in display order, comparing their filenames.
pub fn sequence<T: AsRef<str>>(items: &mut [T]) {
    items.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());
        compare_filenames(filename(a), filename(b)).then_with(|| a.cmp(b))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(input: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        sequence(&mut v);
        v
    }

    #[test]
    fn numbers_sort_numerically() {
        assert_eq!(sorted(&["10.jpg", "2.jpg", "1.jpg"]), vec!["1.jpg", "2.jpg", "10.jpg"]);
    }

    #[test]
    fn numbered_before_unnumbered_then_alphabetical() {
        assert_eq!(sorted(&["b.jpg", "a.jpg", "5.jpg"]), vec!["5.jpg", "a.jpg", "b.jpg"]);
    }

    #[test]
    fn sorts_by_filename_not_full_path() {
        assert_eq!(
            sorted(&["../p/x-imgs/10.png", "../p/2.png", "../p/x-imgs/screenshot3.png"]),
            vec!["../p/2.png", "../p/x-imgs/screenshot3.png", "../p/x-imgs/10.png"]
        );
    }

    #[test]
    fn padded_and_plain_numbers_tie_then_compare_names() {
        assert_eq!(sorted(&["1.jpg", "01.jpg"]), vec!["01.jpg", "1.jpg"]);
    }

    #[test]
    fn extension_breaks_numeric_tie() {
        assert_eq!(sorted(&["3.png", "3.jpg"]), vec!["3.jpg", "3.png"]);
    }

    #[test]
    fn case_insensitive_then_exact() {
        assert_eq!(
            sorted(&["b.jpg", "B.jpg", "a.jpg"]),
            vec!["a.jpg", "B.jpg", "b.jpg"]
        );
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        assert_eq!(
            sorted(&["zebra.png", "Éclair.png"]),
            vec!["Éclair.png", "zebra.png"]
        );
        assert_eq!(
            sorted(&["über.png", "vast.png", "apple.png"]),
            vec!["apple.png", "über.png", "vast.png"]
        );
    }

    #[test]
    fn unaccented_before_accented_on_equal_letters() {
        assert_eq!(
            sorted(&["éclair.png", "eclair.png"]),
            vec!["eclair.png", "éclair.png"]
        );
    }

    #[test]
    fn composed_and_decomposed_forms_are_totally_ordered() {
        let composed = "\u{e9}t\u{e9}.png";
        let decomposed = "e\u{301}te\u{301}.png";
        let a = sorted(&[composed, decomposed]);
        let b = sorted(&[decomposed, composed]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn accents_rank_below_numbers() {
        assert_eq!(sorted(&["Éclair.png", "2.png"]), vec!["2.png", "Éclair.png"]);
    }

    #[test]
    fn only_first_digit_run_counts() {
        assert_eq!(numeric_key("shot12-v3.png"), 12);
        assert_eq!(numeric_key("img007.webp"), 7);
    }

    #[test]
    fn no_digits_is_sentinel() {
        assert_eq!(numeric_key("cover.png"), UNNUMBERED_KEY);
    }

    #[test]
    fn huge_digit_run_saturates() {
        assert_eq!(numeric_key("123456789012345678901234567890.png"), u64::MAX);
    }

    #[test]
    fn filename_of_bare_name() {
        assert_eq!(filename("a.png"), "a.png");
        assert_eq!(filename("/x/y/a.png"), "a.png");
    }

    #[test]
    fn ordering_is_deterministic_for_any_input_order() {
        let a = sorted(&["c.png", "2.jpg", "a.png", "10.jpg", "2.png"]);
        let b = sorted(&["10.jpg", "a.png", "2.png", "c.png", "2.jpg"]);
        assert_eq!(a, b);
    }
}
