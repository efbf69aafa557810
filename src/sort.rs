//! Name ordering for outline entries and headings
//!
//! Every comparator works on display names only. `SortMode::None` keeps the
//! input order; all other modes use a stable sort so entries that compare
//! equal stay in input order too.

use std::cmp::Ordering;

use crate::settings::SortMode;

/// Compare two names under `mode`
pub fn compare_names(mode: SortMode, a: &str, b: &str) -> Ordering {
    match mode {
        SortMode::None => Ordering::Equal,
        SortMode::Alphabetical => locale_cmp(a, b),
        SortMode::ReverseAlphabetical => locale_cmp(b, a),
        SortMode::Natural => natural_cmp(a, b),
        SortMode::ReverseNatural => natural_cmp(b, a),
    }
}

/// Stable in-place sort of `items` by the name `key` returns
pub fn sort_by_name<T, F>(items: &mut [T], mode: SortMode, key: F)
where
    F: Fn(&T) -> &str,
{
    if mode == SortMode::None {
        return;
    }
    items.sort_by(|a, b| compare_names(mode, key(a), key(b)));
}

/// Case-insensitive compare with a lowercase-first tie-break
///
/// Approximates a default-locale collation: "apple" < "Banana" < "cherry",
/// and "a" < "A" when the folded forms are equal.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    // Uppercase code points sort before lowercase, so reverse the raw compare
    folded.then_with(|| b.cmp(a))
}

/// One run of a name split for natural ordering
#[derive(Debug, PartialEq)]
enum Run<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn split_runs(s: &str) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                runs.push(make_run(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(prev) = in_digits {
        runs.push(make_run(&s[start..], prev));
    }
    runs
}

fn make_run(s: &str, digits: bool) -> Run<'_> {
    if digits {
        Run::Digits(s)
    } else {
        Run::Text(s)
    }
}

/// Compare digit runs by numeric value without overflowing
fn numeric_cmp(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Numeric-aware compare: "file2" < "file10", "a2b" < "a10b"
///
/// Names are split into alternating digit and non-digit runs and compared
/// run by run. Digit runs compare by value, text runs with [`locale_cmp`].
/// When one name is a run-prefix of the other, the shorter sorts first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_runs = split_runs(a);
    let b_runs = split_runs(b);

    for (x, y) in a_runs.iter().zip(b_runs.iter()) {
        let ord = match (x, y) {
            (Run::Digits(x), Run::Digits(y)) => numeric_cmp(x, y),
            (Run::Digits(x), Run::Text(y)) | (Run::Text(x), Run::Digits(y)) | (Run::Text(x), Run::Text(y)) => {
                if x == y {
                    Ordering::Equal
                } else {
                    locale_cmp(x, y)
                }
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a_runs.len().cmp(&b_runs.len())
}
