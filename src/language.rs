//! Name types, languages and language masks.
//!
//! A [`NameType`] selects a rule-table family and an ordering of the
//! languages relevant to it. Within one name type every language is assigned
//! a distinct power-of-two value, so a `u32` mask describes a union of
//! candidate languages. The same [`Language`] has different numeric values
//! across name types; all mask arithmetic therefore goes through
//! [`Language::mask`] and the [`NameType`] accessors rather than through
//! hard-coded constants.

use std::fmt;

/// Rule-table family for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameType {
    /// General-purpose tables covering the widest language set.
    Generic,
    /// Tables tuned for Ashkenazic Jewish surnames.
    Ashkenazic,
    /// Tables tuned for Sephardic Jewish surnames.
    Sephardic,
}

/// Accuracy of the final-rules passes.
///
/// `Exact` keeps more phonetic distinctions and yields fewer alternatives;
/// `Approximate` folds distinctions that commonly vary across spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accuracy {
    /// Stricter matching, fewer alternatives.
    Exact,
    /// Looser matching, more alternatives.
    Approximate,
}

/// A language known to at least one name type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Language {
    Any,
    Arabic,
    Cyrillic,
    Czech,
    Dutch,
    English,
    French,
    German,
    Greek,
    GreekLatin,
    Hebrew,
    Hungarian,
    Italian,
    Polish,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Turkish,
}

use Language::*;

const GENERIC_LANGUAGES: &[Language] = &[
    Any, Arabic, Cyrillic, Czech, Dutch, English, French, German, Greek, GreekLatin, Hebrew,
    Hungarian, Italian, Polish, Portuguese, Romanian, Russian, Spanish, Turkish,
];

const ASHKENAZIC_LANGUAGES: &[Language] = &[
    Any, Cyrillic, English, French, German, Hebrew, Hungarian, Polish, Romanian, Russian, Spanish,
];

const SEPHARDIC_LANGUAGES: &[Language] = &[Any, French, Hebrew, Italian, Portuguese, Spanish];

impl NameType {
    /// All name types, in a fixed order.
    pub const ALL: [NameType; 3] = [NameType::Generic, NameType::Ashkenazic, NameType::Sephardic];

    /// The ordered language list for this name type. Index 0 is always
    /// [`Language::Any`]; a language's mask value is `1 << index`.
    pub fn languages(self) -> &'static [Language] {
        match self {
            NameType::Generic => GENERIC_LANGUAGES,
            NameType::Ashkenazic => ASHKENAZIC_LANGUAGES,
            NameType::Sephardic => SEPHARDIC_LANGUAGES,
        }
    }

    /// The mask with every listed language's bit set.
    pub fn universe(self) -> u32 {
        (1u32 << self.languages().len()) - 1
    }

    /// Decode a mask into the languages whose bits are set.
    pub fn decode(self, mask: u32) -> Vec<Language> {
        self.languages()
            .iter()
            .copied()
            .filter(|lang| lang.mask(self).map(|m| m & mask != 0).unwrap_or(false))
            .collect()
    }

    /// The single language selected by `mask`, if the mask has exactly one
    /// bit set and that bit belongs to this name type.
    pub fn single(self, mask: u32) -> Option<Language> {
        if mask.count_ones() != 1 || mask & self.universe() == 0 {
            return None;
        }
        let index = mask.trailing_zeros() as usize;
        self.languages().get(index).copied()
    }

    /// Directory name used by the on-disk rule layout.
    pub fn dir_name(self) -> &'static str {
        match self {
            NameType::Generic => "Generic",
            NameType::Ashkenazic => "Ashkenazic",
            NameType::Sephardic => "Sephardic",
        }
    }
}

impl Language {
    /// Lowercase name as used in rule file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Any => "any",
            Arabic => "arabic",
            Cyrillic => "cyrillic",
            Czech => "czech",
            Dutch => "dutch",
            English => "english",
            French => "french",
            German => "german",
            Greek => "greek",
            GreekLatin => "greeklatin",
            Hebrew => "hebrew",
            Hungarian => "hungarian",
            Italian => "italian",
            Polish => "polish",
            Portuguese => "portuguese",
            Romanian => "romanian",
            Russian => "russian",
            Spanish => "spanish",
            Turkish => "turkish",
        }
    }

    /// This language's single-bit mask within `name_type`, or `None` when
    /// the name type does not list it.
    pub fn mask(self, name_type: NameType) -> Option<u32> {
        name_type
            .languages()
            .iter()
            .position(|&lang| lang == self)
            .map(|index| 1u32 << index)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OR together the masks of `languages` under `name_type`. Languages the
/// name type does not list contribute nothing.
pub fn combine(name_type: NameType, languages: &[Language]) -> u32 {
    languages
        .iter()
        .filter_map(|lang| lang.mask(name_type))
        .fold(0, |acc, mask| acc | mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_is_bit_zero_everywhere() {
        for name_type in NameType::ALL {
            assert_eq!(Language::Any.mask(name_type), Some(1));
        }
    }

    #[test]
    fn test_generic_values_are_distinct_powers_of_two() {
        let mut seen = 0u32;
        for lang in NameType::Generic.languages() {
            let mask = lang.mask(NameType::Generic).unwrap();
            assert_eq!(mask.count_ones(), 1);
            assert_eq!(seen & mask, 0, "duplicate bit for {lang}");
            seen |= mask;
        }
        assert_eq!(seen, NameType::Generic.universe());
    }

    #[test]
    fn test_values_differ_across_name_types() {
        // german is index 7 in Generic but index 4 in Ashkenazic
        assert_eq!(Language::German.mask(NameType::Generic), Some(128));
        assert_eq!(Language::German.mask(NameType::Ashkenazic), Some(16));
        assert_eq!(Language::German.mask(NameType::Sephardic), None);
    }

    #[test]
    fn test_universe() {
        assert_eq!(NameType::Generic.universe(), (1 << 19) - 1);
        assert_eq!(NameType::Ashkenazic.universe(), 2047);
        assert_eq!(NameType::Sephardic.universe(), 63);
    }

    #[test]
    fn test_combine_and_decode() {
        let mask = combine(NameType::Generic, &[Language::English, Language::German]);
        assert_eq!(mask, 32 | 128);
        assert_eq!(
            NameType::Generic.decode(mask),
            vec![Language::English, Language::German]
        );
    }

    #[test]
    fn test_single() {
        assert_eq!(NameType::Generic.single(128), Some(Language::German));
        assert_eq!(NameType::Generic.single(1), Some(Language::Any));
        assert_eq!(NameType::Generic.single(96), None);
        assert_eq!(NameType::Sephardic.single(128), None);
    }
}
