// src/config/fuzzy.rs

//! Fuzzy matching for validator error messages.
//!
//! Used only to improve error messages ("did you mean ...?"), never to
//! silently correct configuration.

/// Case-insensitive edit distance between two strings: the minimum number
/// of single-character insertions, deletions, or substitutions required to
/// change one into the other.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row rolling variant of the classic matrix.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// The closest candidate within `max_distance` edits of `input`, if any.
pub fn closest_match<'a>(
    input: &str,
    candidates: &[&'a str],
    max_distance: usize,
) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;

    for candidate in candidates {
        let distance = edit_distance(input, candidate);
        if distance > max_distance {
            continue;
        }
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((candidate, distance)),
        }
    }

    best.map(|(name, _)| name)
}

/// Suggest a candidate for an unrecognized token, or `None` when nothing is
/// close enough.
///
/// The threshold scales with input length (len/2), clamped to [2, 5] so
/// short typos still match and wildly different strings never do. Exact
/// matches are not suggestions.
pub fn suggest_closest(input: &str, candidates: &[&str]) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }

    let max_distance = (input.len() / 2).clamp(2, 5);

    closest_match(input, candidates, max_distance)
        .filter(|m| !m.eq_ignore_ascii_case(input))
        .map(|m| m.to_string())
}
