//! # beidermorse
//!
//! Multilingual phonetic matching for personal names.
//!
//! This library implements the Beider-Morse Phonetic Matching (BMPM)
//! algorithm together with the Daitch-Mokotoff soundex. Given a name in
//! arbitrary Unicode text, it produces language-annotated phonetic
//! encodings that can be compared across spellings, languages and
//! romanizations:
//!
//! > Beider, Alexander, and Stephen P. Morse. "Beider-Morse Phonetic
//! > Matching: An alternative to Soundex with fewer false hits." Avotaynu:
//! > the International Review of Jewish Genealogy 24.2 (2008).
//!
//! ## Example
//!
//! ```rust
//! use beidermorse::prelude::*;
//!
//! let encoder = BeiderMorse::new(NameType::Generic, Accuracy::Approximate);
//!
//! let phonetic = encoder.encode("Smith").unwrap();
//! assert!(phonetic.contains("smit"));
//!
//! // Six-digit Daitch-Mokotoff codes, several branches per name.
//! let codes = beidermorse::dm_soundex("Cohen");
//! assert!(codes.split(' ').count() >= 2);
//! ```
//!
//! The rewrite engine is parametric over its rule tables: the bundled data
//! (behind the default `embedded-rules` feature) flows through the same
//! JSON loader as tables supplied with [`RuleRegistry::from_dir`].
//!
//! [`RuleRegistry::from_dir`]: crate::rules::registry::RuleRegistry::from_dir

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algebra;
pub mod detect;
pub mod dm_soundex;
pub mod engine;
pub mod error;
pub mod language;
pub mod normalize;
pub mod rules;

pub use crate::dm_soundex::{dm_soundex, dm_soundex_codes};
pub use crate::engine::BeiderMorse;
pub use crate::error::{InputError, RuleError};
pub use crate::language::{Accuracy, Language, NameType};
pub use crate::rules::registry::RuleRegistry;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::dm_soundex::{dm_soundex, dm_soundex_codes};
    pub use crate::engine::BeiderMorse;
    pub use crate::error::{InputError, RuleError};
    pub use crate::language::{Accuracy, Language, NameType};
    pub use crate::rules::registry::RuleRegistry;
}
