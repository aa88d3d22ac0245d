//! Memoizing rule-table store.
//!
//! Rule data is load-once and immutable; the registry is the only mutable
//! process-wide state, a fill-once cache keyed on `(NameType, TableKind)`.
//! Tables are handed out as `Arc`s so concurrent encodes share them without
//! copying; the lock guards only the map, never the rewrite path.
//!
//! Two sources exist. [`RuleRegistry::embedded`] serves the bundled data
//! compiled in behind the `embedded-rules` feature; a unit test asserts the
//! whole bundled set parses. [`RuleRegistry::from_dir`] reads the on-disk
//! layout (`<root>/<NameTypeDir>/<prefix>_<lang>.json`) and validates every
//! present file eagerly, so rule-data defects surface at load time and
//! never during an encode. A missing optional table is an empty pass, not
//! an error.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::detect::LanguageDetector;
use crate::error::RuleError;
use crate::language::{Accuracy, NameType};
use crate::rules::loader::{parse_detect_rules, parse_rule_table};
use crate::rules::{RuleTable, TableKind};

enum RuleSource {
    #[cfg(feature = "embedded-rules")]
    Embedded,
    Dir(PathBuf),
}

/// Shared, memoizing store of rule tables and language detectors.
pub struct RuleRegistry {
    source: RuleSource,
    tables: RwLock<FxHashMap<(NameType, TableKind), Arc<RuleTable>>>,
    detectors: RwLock<FxHashMap<NameType, Arc<LanguageDetector>>>,
}

impl RuleRegistry {
    /// The registry over the bundled rule data.
    #[cfg(feature = "embedded-rules")]
    pub fn embedded() -> Self {
        RuleRegistry {
            source: RuleSource::Embedded,
            tables: RwLock::new(FxHashMap::default()),
            detectors: RwLock::new(FxHashMap::default()),
        }
    }

    /// The process-wide registry over the bundled rule data.
    #[cfg(feature = "embedded-rules")]
    pub fn global() -> Arc<RuleRegistry> {
        use std::sync::LazyLock;
        static GLOBAL: LazyLock<Arc<RuleRegistry>> =
            LazyLock::new(|| Arc::new(RuleRegistry::embedded()));
        Arc::clone(&GLOBAL)
    }

    /// Load a registry from an on-disk rule-data root, validating every
    /// file that is present.
    pub fn from_dir(root: impl Into<PathBuf>) -> Result<Self, RuleError> {
        let registry = RuleRegistry {
            source: RuleSource::Dir(root.into()),
            tables: RwLock::new(FxHashMap::default()),
            detectors: RwLock::new(FxHashMap::default()),
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Eagerly load and cache every table the source can name.
    fn validate(&self) -> Result<(), RuleError> {
        for name_type in NameType::ALL {
            for kind in Self::kinds_for(name_type) {
                let table = self.read_table(name_type, kind)?;
                self.tables
                    .write()
                    .insert((name_type, kind), Arc::new(table));
            }
            let detector = self.read_detector(name_type)?;
            self.detectors.write().insert(name_type, Arc::new(detector));
        }
        Ok(())
    }

    fn kinds_for(name_type: NameType) -> impl Iterator<Item = TableKind> {
        let languages = name_type.languages();
        let main = languages.iter().map(|&lang| TableKind::Main(lang));
        let common = [Accuracy::Approximate, Accuracy::Exact]
            .into_iter()
            .map(TableKind::FinalCommon);
        let per_language = [Accuracy::Approximate, Accuracy::Exact]
            .into_iter()
            .flat_map(move |accuracy| {
                languages
                    .iter()
                    .map(move |&lang| TableKind::FinalLanguage(accuracy, lang))
            });
        main.chain(common).chain(per_language)
    }

    /// Fetch a table, filling the cache on first use. Unknown tables
    /// resolve to the empty table.
    pub fn table(&self, name_type: NameType, kind: TableKind) -> Arc<RuleTable> {
        if let Some(table) = self.tables.read().get(&(name_type, kind)) {
            return Arc::clone(table);
        }
        let table = Arc::new(self.read_table(name_type, kind).unwrap_or_default());
        Arc::clone(
            self.tables
                .write()
                .entry((name_type, kind))
                .or_insert(table),
        )
    }

    /// Fetch the language detector for a name type.
    pub fn detector(&self, name_type: NameType) -> Arc<LanguageDetector> {
        if let Some(detector) = self.detectors.read().get(&name_type) {
            return Arc::clone(detector);
        }
        let detector = Arc::new(
            self.read_detector(name_type)
                .unwrap_or_else(|_| LanguageDetector::empty(name_type)),
        );
        Arc::clone(self.detectors.write().entry(name_type).or_insert(detector))
    }

    /// Drop every cached table. Idempotent; concurrent encodes simply
    /// repopulate the cache.
    pub fn clear_cache(&self) {
        self.tables.write().clear();
        self.detectors.write().clear();
    }

    fn read_table(&self, name_type: NameType, kind: TableKind) -> Result<RuleTable, RuleError> {
        match &self.source {
            #[cfg(feature = "embedded-rules")]
            RuleSource::Embedded => match embedded::table_json(name_type, kind) {
                Some(json) => parse_rule_table(json),
                None => Ok(RuleTable::empty()),
            },
            RuleSource::Dir(root) => {
                let path = root.join(kind.rel_path(name_type));
                match std::fs::read_to_string(&path) {
                    Ok(json) => parse_rule_table(&json),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                        Ok(RuleTable::empty())
                    }
                    Err(_) => Err(RuleError::FileNotFound(path.display().to_string())),
                }
            }
        }
    }

    fn read_detector(&self, name_type: NameType) -> Result<LanguageDetector, RuleError> {
        let rules = match &self.source {
            #[cfg(feature = "embedded-rules")]
            RuleSource::Embedded => parse_detect_rules(embedded::detect_json(name_type))?,
            RuleSource::Dir(root) => {
                let path = root
                    .join(name_type.dir_name())
                    .join("language_rules.json");
                match std::fs::read_to_string(&path) {
                    Ok(json) => parse_detect_rules(&json)?,
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
                    Err(_) => return Err(RuleError::FileNotFound(path.display().to_string())),
                }
            }
        };
        Ok(LanguageDetector::new(name_type, rules))
    }
}

#[cfg(feature = "embedded-rules")]
mod embedded {
    use crate::language::{Accuracy, Language, NameType};
    use crate::rules::TableKind;

    /// Bundled JSON for one table, when the bundle carries it.
    pub(super) fn table_json(name_type: NameType, kind: TableKind) -> Option<&'static str> {
        use Accuracy::{Approximate, Exact};
        use Language::*;
        use NameType::{Ashkenazic, Generic, Sephardic};
        use TableKind::{FinalCommon, FinalLanguage, Main};

        let json = match (name_type, kind) {
            (Generic, Main(Any)) => include_str!("data/generic/rules_any.json"),
            (Generic, Main(English)) => include_str!("data/generic/rules_english.json"),
            (Generic, Main(German)) => include_str!("data/generic/rules_german.json"),
            (Generic, Main(French)) => include_str!("data/generic/rules_french.json"),
            (Generic, Main(Spanish)) => include_str!("data/generic/rules_spanish.json"),
            (Generic, Main(Polish)) => include_str!("data/generic/rules_polish.json"),
            (Generic, Main(Cyrillic)) => include_str!("data/generic/rules_cyrillic.json"),
            (Generic, Main(Hebrew)) => include_str!("data/generic/rules_hebrew.json"),
            (Generic, Main(Greek)) => include_str!("data/generic/rules_greek.json"),
            (Generic, FinalCommon(Approximate)) => {
                include_str!("data/generic/approx_common.json")
            }
            (Generic, FinalCommon(Exact)) => include_str!("data/generic/exact_common.json"),
            (Generic, FinalLanguage(Approximate, Any)) => {
                include_str!("data/generic/approx_any.json")
            }
            (Generic, FinalLanguage(Approximate, English)) => {
                include_str!("data/generic/approx_english.json")
            }
            (Generic, FinalLanguage(Approximate, German)) => {
                include_str!("data/generic/approx_german.json")
            }
            (Generic, FinalLanguage(Approximate, French)) => {
                include_str!("data/generic/approx_french.json")
            }
            (Generic, FinalLanguage(Approximate, Spanish)) => {
                include_str!("data/generic/approx_spanish.json")
            }
            (Generic, FinalLanguage(Approximate, Polish)) => {
                include_str!("data/generic/approx_polish.json")
            }
            (Generic, FinalLanguage(Exact, Any)) => include_str!("data/generic/exact_any.json"),
            (Ashkenazic, Main(Any)) => include_str!("data/ashkenazic/rules_any.json"),
            (Ashkenazic, FinalCommon(Approximate)) => {
                include_str!("data/ashkenazic/approx_common.json")
            }
            (Ashkenazic, FinalCommon(Exact)) => {
                include_str!("data/ashkenazic/exact_common.json")
            }
            (Ashkenazic, FinalLanguage(Approximate, Any)) => {
                include_str!("data/ashkenazic/approx_any.json")
            }
            (Ashkenazic, FinalLanguage(Exact, Any)) => {
                include_str!("data/ashkenazic/exact_any.json")
            }
            (Sephardic, Main(Any)) => include_str!("data/sephardic/rules_any.json"),
            (Sephardic, FinalCommon(Approximate)) => {
                include_str!("data/sephardic/approx_common.json")
            }
            (Sephardic, FinalCommon(Exact)) => {
                include_str!("data/sephardic/exact_common.json")
            }
            (Sephardic, FinalLanguage(Approximate, Any)) => {
                include_str!("data/sephardic/approx_any.json")
            }
            (Sephardic, FinalLanguage(Exact, Any)) => {
                include_str!("data/sephardic/exact_any.json")
            }
            _ => return None,
        };
        Some(json)
    }

    /// Bundled language-detection rules for a name type.
    pub(super) fn detect_json(name_type: NameType) -> &'static str {
        match name_type {
            NameType::Generic => include_str!("data/generic/language_rules.json"),
            NameType::Ashkenazic => include_str!("data/ashkenazic/language_rules.json"),
            NameType::Sephardic => include_str!("data/sephardic/language_rules.json"),
        }
    }
}

#[cfg(all(test, feature = "embedded-rules"))]
mod tests {
    use super::*;
    use crate::language::Language;

    #[test]
    fn test_every_embedded_table_parses() {
        let registry = RuleRegistry::embedded();
        for name_type in NameType::ALL {
            for kind in RuleRegistry::kinds_for(name_type) {
                // a parse failure must not be silently mapped to empty
                if let Some(json) = embedded::table_json(name_type, kind) {
                    let table = parse_rule_table(json)
                        .unwrap_or_else(|e| panic!("{name_type:?}/{kind:?}: {e}"));
                    assert!(!table.is_empty(), "{name_type:?}/{kind:?} is empty");
                }
                let _ = registry.table(name_type, kind);
            }
            let detector = registry.detector(name_type);
            assert_eq!(detector.name_type(), name_type);
        }
    }

    #[test]
    fn test_unknown_table_is_empty() {
        let registry = RuleRegistry::embedded();
        let table = registry.table(NameType::Generic, TableKind::Main(Language::Turkish));
        assert!(table.is_empty());
    }

    #[test]
    fn test_from_dir_round_trip() {
        let root = std::env::temp_dir().join("beidermorse_registry_test");
        let generic = root.join("Generic");
        std::fs::create_dir_all(&generic).unwrap();
        std::fs::write(
            generic.join("rules_any.json"),
            r#"{ "rules": [ { "pattern": "a", "phonetic": "a" } ] }"#,
        )
        .unwrap();
        std::fs::write(
            generic.join("language_rules.json"),
            r#"{ "rules": [ { "pattern": "/x/", "languages": 2, "accept": true } ] }"#,
        )
        .unwrap();

        let registry = RuleRegistry::from_dir(&root).unwrap();
        let table = registry.table(NameType::Generic, TableKind::Main(Language::Any));
        assert_eq!(table.len(), 1);
        // tables the directory does not carry resolve to empty passes
        assert!(registry
            .table(NameType::Sephardic, TableKind::Main(Language::Any))
            .is_empty());
        assert_eq!(registry.detector(NameType::Generic).detect("x"), 2);

        std::fs::write(generic.join("rules_any.json"), "{ not json").unwrap();
        assert!(RuleRegistry::from_dir(&root).is_err());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_cache_round_trip() {
        let registry = RuleRegistry::embedded();
        let kind = TableKind::Main(Language::Any);
        let first = registry.table(NameType::Generic, kind);
        let second = registry.table(NameType::Generic, kind);
        assert!(Arc::ptr_eq(&first, &second));

        registry.clear_cache();
        registry.clear_cache();
        let third = registry.table(NameType::Generic, kind);
        assert_eq!(third.len(), first.len());
    }
}
