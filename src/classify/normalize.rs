use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::canonical_combining_class;

/// Strip diacritics and uppercase: `"São Paulo"` -> `"SAO PAULO"`.
///
/// Text is NFD-decomposed and every combining mark is dropped before
/// uppercasing. Whitespace is left untouched.
pub fn normalize_text(text: &str) -> String {
    text.nfd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_uppercases() {
        assert_eq!(normalize_text("São Paulo"), "SAO PAULO");
        assert_eq!(normalize_text("Brasília"), "BRASILIA");
        assert_eq!(normalize_text("Itaú de Minas"), "ITAU DE MINAS");
        assert_eq!(normalize_text("Concentração Urbana"), "CONCENTRACAO URBANA");
    }

    #[test]
    fn precomposed_and_decomposed_agree() {
        let decomposed = "Sa\u{0303}o Paulo";
        assert_eq!(normalize_text(decomposed), normalize_text("São Paulo"));
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        assert_eq!(normalize_text(" Pará "), " PARA ");
        assert_eq!(normalize_text(""), "");
    }
}
