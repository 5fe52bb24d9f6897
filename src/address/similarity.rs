/// Edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() { return b.len() }
    if b.is_empty() { return a.len() }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized similarity in [0, 1]: `1 - levenshtein / max_len`.
///
/// Identical strings (including two empty strings) score exactly 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b { return 1.0 }

    let max_len = a.chars().count().max(b.chars().count());
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}
