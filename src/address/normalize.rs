use std::sync::LazyLock;

use ahash::{AHashMap, AHashSet};

/// Street-type abbreviations and their expansions.
static ABBREVIATIONS: LazyLock<AHashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("av", "avenida"), ("av.", "avenida"), ("ave", "avenida"), ("ave.", "avenida"),
        ("avda", "avenida"), ("avda.", "avenida"),
        ("c.", "calle"), ("cll", "calle"), ("cll.", "calle"),
        ("blvd", "boulevard"), ("blvd.", "boulevard"), ("bvd", "boulevard"), ("bvd.", "boulevard"),
        ("priv", "privada"), ("priv.", "privada"),
        ("frac", "fraccionamiento"), ("frac.", "fraccionamiento"), ("fracc", "fraccionamiento"), ("fracc.", "fraccionamiento"),
        ("col", "colonia"), ("col.", "colonia"),
        ("calz", "calzada"), ("calz.", "calzada"),
        ("carr", "carretera"), ("carr.", "carretera"),
        ("prol", "prolongacion"), ("prol.", "prolongacion"),
        ("cda", "cerrada"), ("cda.", "cerrada"),
        ("and", "andador"), ("and.", "andador"),
    ].into_iter().collect()
});

/// Filler words that carry no identity in a street name.
static STOPWORDS: LazyLock<AHashSet<&'static str>> = LazyLock::new(|| {
    ["de", "del", "la", "el", "los", "las", "y", "e"].into_iter().collect()
});

/// Fold accented Latin letters to their bare form so "Juárez" matches "Juarez".
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        _ => c,
    }
}

/// Expand one token, trying it verbatim first (so "av." hits) and then with
/// surrounding punctuation stripped (so "juarez," becomes "juarez").
fn expand(token: &str) -> Option<&str> {
    if let Some(&full) = ABBREVIATIONS.get(token) { return Some(full) }

    let bare = token.trim_matches(|c: char| !c.is_alphanumeric());
    if bare.is_empty() { return None }
    Some(ABBREVIATIONS.get(bare).copied().unwrap_or(bare))
}

/// Canonical form of a street name, used only as a fuzzy-matching key.
///
/// Lowercases, folds accents, expands abbreviations, collapses immediately
/// repeated tokens, drops Spanish stopwords and collapses whitespace.
pub fn normalize_street(street: &str) -> String {
    let lowered: String = street.trim().to_lowercase().chars().map(fold_diacritic).collect();

    let mut tokens: Vec<&str> = Vec::new();
    for token in lowered.split_whitespace().filter_map(expand) {
        if tokens.last() != Some(&token) { tokens.push(token) }
    }

    tokens.retain(|token| !STOPWORDS.contains(*token));
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::normalize_street;

    #[test]
    fn expands_abbreviations() {
        assert_eq!(normalize_street("Av Juarez"), "avenida juarez");
        assert_eq!(normalize_street("AV. JUAREZ"), "avenida juarez");
        assert_eq!(normalize_street("ave juarez"), "avenida juarez");
        assert_eq!(normalize_street("C. 5"), "calle 5");
        assert_eq!(normalize_street("Blvd Kukulcan"), "boulevard kukulcan");
        assert_eq!(normalize_street("Priv. Olmos"), "privada olmos");
        assert_eq!(normalize_street("Frac Las Palmas"), "fraccionamiento palmas");
        assert_eq!(normalize_street("col centro"), "colonia centro");
    }

    #[test]
    fn bare_letter_is_not_an_abbreviation() {
        assert_eq!(normalize_street("Calle C"), "calle c");
        assert_ne!(normalize_street("Calle C"), normalize_street("Calle"));
        assert_eq!(normalize_street("c. hidalgo"), "calle hidalgo");
    }

    #[test]
    fn folds_accents_and_collapses_repeats() {
        assert_eq!(normalize_street("Av. Juárez Juárez"), normalize_street("avenida juarez"));
        assert_eq!(normalize_street("juarez juarez juarez"), "juarez");
    }

    #[test]
    fn strips_stopwords_and_whitespace() {
        assert_eq!(normalize_street("  Calle   de la   Luz "), "calle luz");
        assert_eq!(normalize_street("Paseo de los Héroes"), "paseo heroes");
        assert_eq!(normalize_street("Calle Hidalgo y Costilla"), "calle hidalgo costilla");
    }

    #[test]
    fn strips_edge_punctuation() {
        assert_eq!(normalize_street("Av, Juarez,"), "avenida juarez");
        assert_eq!(normalize_street("- - -"), "");
        assert_eq!(normalize_street(""), "");
    }

    #[test]
    fn deterministic() {
        let s = "Blvd. Adolfo López Mateos";
        assert_eq!(normalize_street(s), normalize_street(s));
    }
}
