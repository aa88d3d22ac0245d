//! Rewrite rule model.
//!
//! A [`Rule`] is an immutable record: a literal pattern, two optional
//! context regexes, a phonetic replacement in the algebra of
//! [`crate::algebra`], and an optional language predicate. Rules never
//! change after construction; the context regexes are compiled exactly once
//! when the rule is built, so a failing pattern surfaces at load time and
//! the rewrite path never sees a regex error.
//!
//! A [`RuleTable`] is an ordered sequence of rules. Order is significant:
//! the engine fires the first rule whose predicates hold, and tables are
//! authored with longer or more specific patterns ahead of their subsumers.

pub mod loader;
pub mod registry;

use regex::Regex;

use crate::error::RuleError;
use crate::language::{Accuracy, Language, NameType};

/// How a rule's language mask is tested against the context mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// The rule applies when the masks intersect.
    #[default]
    Any,
    /// The rule applies only when the context covers the whole rule mask.
    All,
}

/// One immutable rewrite rule.
#[derive(Debug)]
pub struct Rule {
    pattern: String,
    left: Option<Regex>,
    right: Option<Regex>,
    phonetic: String,
    language_mask: Option<u32>,
    logical_op: LogicalOp,
}

impl Rule {
    /// Build a rule, compiling its context regexes.
    ///
    /// `left_context` is matched against the text before the firing
    /// position (anchored at its end), `right_context` against the text
    /// after the pattern (anchored at its start). Empty contexts always
    /// match. Unicode matching is the `regex` default and stays on.
    pub fn new(
        pattern: impl Into<String>,
        left_context: &str,
        right_context: &str,
        phonetic: impl Into<String>,
        language_mask: Option<u32>,
        logical_op: LogicalOp,
    ) -> Result<Self, RuleError> {
        let left = compile_context(left_context, ContextSide::Left)?;
        let right = compile_context(right_context, ContextSide::Right)?;
        Ok(Rule {
            pattern: pattern.into(),
            left,
            right,
            phonetic: phonetic.into(),
            language_mask,
            logical_op,
        })
    }

    /// The literal pattern this rule consumes.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The phonetic replacement emitted when this rule fires.
    pub fn phonetic(&self) -> &str {
        &self.phonetic
    }

    /// Pattern and context predicates at byte position `pos` of `input`.
    pub fn matches_at(&self, input: &str, pos: usize) -> bool {
        let rest = &input[pos..];
        if !rest.starts_with(self.pattern.as_str()) {
            return false;
        }
        if let Some(left) = &self.left {
            if !left.is_match(&input[..pos]) {
                return false;
            }
        }
        if let Some(right) = &self.right {
            if !right.is_match(&rest[self.pattern.len()..]) {
                return false;
            }
        }
        true
    }

    /// Language predicate against the context mask.
    pub fn applies_to(&self, context_mask: u32) -> bool {
        match self.language_mask {
            None => true,
            Some(mask) => match self.logical_op {
                LogicalOp::Any => context_mask & mask != 0,
                LogicalOp::All => context_mask & mask == mask,
            },
        }
    }
}

enum ContextSide {
    Left,
    Right,
}

fn compile_context(context: &str, side: ContextSide) -> Result<Option<Regex>, RuleError> {
    if context.is_empty() {
        return Ok(None);
    }
    let anchored = match side {
        ContextSide::Left => format!("(?:{context})$"),
        ContextSide::Right => format!("^(?:{context})"),
    };
    Regex::new(&anchored)
        .map(Some)
        .map_err(|source| RuleError::Pattern {
            pattern: context.to_string(),
            source: Box::new(source),
        })
}

/// An ordered, immutable sequence of rules.
#[derive(Debug, Default)]
pub struct RuleTable {
    name: Option<String>,
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Build a table from rules, optionally carrying the source name.
    pub fn new(name: Option<String>, rules: Vec<Rule>) -> Self {
        RuleTable { name, rules }
    }

    /// A table with no rules; the engine treats it as a no-op pass.
    pub fn empty() -> Self {
        RuleTable::default()
    }

    /// The table's name, if its source file carried one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// True when the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Iterate the rules in firing order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

/// Identifies one rule table within a name-type family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// The main rewrite table for a language (`rules_<lang>.json`).
    Main(Language),
    /// The common final table shared by every language
    /// (`approx_common.json` / `exact_common.json`).
    FinalCommon(Accuracy),
    /// The language-specific final table
    /// (`approx_<lang>.json` / `exact_<lang>.json`).
    FinalLanguage(Accuracy, Language),
}

impl TableKind {
    /// File name of this table in the on-disk layout.
    pub fn file_name(self) -> String {
        match self {
            TableKind::Main(lang) => format!("rules_{}.json", lang.as_str()),
            TableKind::FinalCommon(Accuracy::Approximate) => "approx_common.json".to_string(),
            TableKind::FinalCommon(Accuracy::Exact) => "exact_common.json".to_string(),
            TableKind::FinalLanguage(Accuracy::Approximate, lang) => {
                format!("approx_{}.json", lang.as_str())
            }
            TableKind::FinalLanguage(Accuracy::Exact, lang) => {
                format!("exact_{}.json", lang.as_str())
            }
        }
    }

    /// Full relative path under a rule-data root.
    pub fn rel_path(self, name_type: NameType) -> String {
        format!("{}/{}", name_type.dir_name(), self.file_name())
    }
}
