//! Country flags built from regional indicator symbols.

/// White flag, shown when no usable country code is known.
pub const PLACEHOLDER_FLAG: &str = "\u{1F3F3}\u{FE0F}";

/// 'A' + this offset is REGIONAL INDICATOR SYMBOL LETTER A (U+1F1E6).
const REGIONAL_INDICATOR_OFFSET: u32 = 127_397;

/// Trim and uppercase a country code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Exactly two ASCII letters, any case.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Flag for an ISO 3166-1 alpha-2 code, e.g. "US" -> 🇺🇸.
///
/// Case is normalized here so callers never have to. Empty or malformed
/// codes yield [`PLACEHOLDER_FLAG`].
pub fn country_flag(code: &str) -> String {
    let code = normalize_code(code);
    if !is_well_formed(&code) {
        return PLACEHOLDER_FLAG.to_string();
    }

    code.chars()
        .filter_map(|c| char::from_u32(c as u32 + REGIONAL_INDICATOR_OFFSET))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_two_regional_indicators() {
        let flag = country_flag("US");
        assert_eq!(flag, "\u{1F1FA}\u{1F1F8}");
        assert_eq!(flag.chars().count(), 2);
    }

    #[test]
    fn every_uppercase_pair_is_two_codepoints() {
        for a in 'A'..='Z' {
            for b in ['A', 'M', 'Z'] {
                let code: String = [a, b].iter().collect();
                let flag = country_flag(&code);
                assert_eq!(flag.chars().count(), 2, "{code}");
                assert_eq!(flag, country_flag(&code));
            }
        }
    }

    #[test]
    fn lowercase_matches_uppercase() {
        assert_eq!(country_flag("np"), country_flag("NP"));
        assert_eq!(country_flag(" gb "), country_flag("GB"));
    }

    #[test]
    fn empty_or_malformed_yield_placeholder() {
        assert_eq!(country_flag(""), PLACEHOLDER_FLAG);
        assert_eq!(country_flag("U"), PLACEHOLDER_FLAG);
        assert_eq!(country_flag("USA"), PLACEHOLDER_FLAG);
        assert_eq!(country_flag("1A"), PLACEHOLDER_FLAG);
        assert_eq!(country_flag("ÄÖ"), PLACEHOLDER_FLAG);
    }
}
