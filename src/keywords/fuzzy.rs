//! Native fuzzy-match ratio, standing in for the original's
//! `difflib.SequenceMatcher.ratio()`. A Levenshtein-distance-based ratio
//! suffices for the threshold comparisons the keyword engines need.

/// Similarity ratio in `[0.0, 1.0]`; `1.0` means identical strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(&a, &b);
    1.0 - (distance as f64 / max_len as f64)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());

    if n == 0 {
        return m;
    }
    if m == 0 {
        return n;
    }

    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; m + 1];

    for i in 1..=n {
        curr[0] = i;
        for j in 1..=m {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m]
}

/// Best similarity ratio between `needle` and any whitespace-separated
/// token (or sliding window of `window_len` tokens) of `haystack`.
pub fn best_token_ratio(needle: &str, haystack: &str, window_len: usize) -> f64 {
    let words: Vec<&str> = haystack.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let window_len = window_len.max(1);
    let mut best = 0.0f64;

    if window_len == 1 {
        for w in &words {
            let r = ratio(needle, w);
            if r > best {
                best = r;
            }
        }
        return best;
    }

    if words.len() < window_len {
        return ratio(needle, &words.join(" "));
    }

    for window in words.windows(window_len) {
        let candidate = window.join(" ");
        let r = ratio(needle, &candidate);
        if r > best {
            best = r;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_ratio_one() {
        assert_eq!(ratio("robotics", "robotics"), 1.0);
    }

    #[test]
    fn similar_strings_high_ratio() {
        let r = ratio("survey", "surveys");
        assert!(r > 0.8, "got {r}");
    }

    #[test]
    fn dissimilar_strings_low_ratio() {
        let r = ratio("robotics", "zzzzzzzz");
        assert!(r < 0.3, "got {r}");
    }

    #[test]
    fn best_token_ratio_finds_best_window() {
        let r = best_token_ratio("manipulation", "mobile manipulations for robots", 1);
        assert!(r > 0.9, "got {r}");
    }
}
