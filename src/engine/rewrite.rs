//! The position-scanning rewrite passes.
//!
//! [`rewrite`] is the main pass: it consumes the normalized input left to
//! right, fires the first rule whose predicates hold, and accumulates the
//! rule's phonetic under [`concat_compatible`], which prunes alternatives
//! whose language attributes contradict the context mask. A position no
//! rule covers advances one codepoint and emits nothing; main tables cover
//! the whole input alphabet, so the skipped residue is delimiters.
//!
//! [`apply_final_rules`] runs one final-rules pass over an intermediate
//! phonetic. Each alternative is rewritten independently with the same
//! first-match loop; its trailing language attribute is carried around the
//! scan untouched. Final tables are partial, so a position no rule covers
//! copies its character through instead of dropping it. An empty table is
//! an identity pass.

use smallvec::SmallVec;

use crate::algebra::{collapse, expand, is_dead, normalize_attrs};
use crate::rules::RuleTable;

/// Alternatives rarely exceed a handful per concatenation.
type Alternatives = SmallVec<[String; 8]>;

/// Run the main rewrite pass over `input`.
pub fn rewrite(input: &str, table: &RuleTable, context_mask: u32) -> String {
    let mut phonetic = String::new();
    let mut pos = 0;

    while pos < input.len() {
        let mut fired = None;
        for rule in table.iter() {
            if !rule.matches_at(input, pos) || !rule.applies_to(context_mask) {
                continue;
            }
            match concat_compatible(&phonetic, rule.phonetic(), context_mask) {
                Some(next) => {
                    phonetic = next;
                    fired = Some(rule.pattern().len());
                    break;
                }
                // every branch incompatible: treat as non-match
                None => continue,
            }
        }
        match fired {
            Some(len) => pos += len,
            None => pos += codepoint_len(input, pos),
        }
    }
    phonetic
}

/// Concatenate a phonetic fragment onto the running output, keeping only
/// the branches compatible with `context_mask`.
///
/// Bracket-free concatenations pass through untouched. Otherwise the joined
/// string is expanded; each alternative gets the context mask appended as
/// an attribute (unless the context is pure `Any`), is canonicalized, and
/// is dropped when dead. `None` means no branch survived.
pub fn concat_compatible(phonetic: &str, fragment: &str, context_mask: u32) -> Option<String> {
    if !phonetic.contains('[') && !fragment.contains('[') {
        let mut joined = String::with_capacity(phonetic.len() + fragment.len());
        joined.push_str(phonetic);
        joined.push_str(fragment);
        return Some(joined);
    }

    let joined = format!("{phonetic}{fragment}");
    let mut survivors = Alternatives::new();
    for alternative in expand(&joined) {
        let candidate = if context_mask != 1 {
            normalize_attrs(&format!("{alternative}[{context_mask}]"), false)
        } else {
            alternative
        };
        if candidate.is_empty() || is_dead(&candidate) {
            continue;
        }
        if !survivors.iter().any(|s| *s == candidate) {
            survivors.push(candidate);
        }
    }

    if survivors.is_empty() {
        None
    } else {
        Some(collapse(&survivors))
    }
}

/// Run one final-rules pass over an intermediate phonetic.
///
/// With `strip` set, every language attribute is removed from the result;
/// otherwise attributes keep riding along in canonical trailing position.
pub fn apply_final_rules(
    phonetic: &str,
    table: &RuleTable,
    context_mask: u32,
    strip: bool,
) -> String {
    if table.is_empty() || phonetic.is_empty() {
        return phonetic.to_string();
    }

    let alternatives: Vec<String> = if phonetic.contains('(') {
        expand(phonetic)
    } else {
        phonetic.split('|').map(str::to_string).collect()
    };

    let mut results: Vec<String> = Vec::new();
    for alternative in alternatives {
        let alternative = normalize_attrs(&alternative, false);
        if alternative.is_empty() || is_dead(&alternative) {
            continue;
        }
        // canonical form: bare text plus at most one trailing attribute
        let (bare, attr) = match alternative.find('[') {
            Some(k) => alternative.split_at(k),
            None => (alternative.as_str(), ""),
        };

        let mut rewritten = rewrite_keeping_unmatched(bare, table, context_mask);
        rewritten.push_str(attr);

        for expanded in expand(&rewritten) {
            let canonical = normalize_attrs(&expanded, false);
            if canonical.is_empty() || is_dead(&canonical) {
                continue;
            }
            if !results.contains(&canonical) {
                results.push(canonical);
            }
        }
    }

    if !strip {
        return collapse(&results);
    }
    let mut stripped: Vec<String> = Vec::with_capacity(results.len());
    for alternative in &results {
        let bare = normalize_attrs(alternative, true);
        if bare.is_empty() {
            continue;
        }
        if !stripped.contains(&bare) {
            stripped.push(bare);
        }
    }
    collapse(&stripped)
}

/// First-match scan for final passes: unmatched characters are copied
/// through.
fn rewrite_keeping_unmatched(bare: &str, table: &RuleTable, context_mask: u32) -> String {
    let mut acc = String::with_capacity(bare.len());
    let mut pos = 0;

    while pos < bare.len() {
        let mut fired = None;
        for rule in table.iter() {
            if !rule.matches_at(bare, pos) || !rule.applies_to(context_mask) {
                continue;
            }
            match concat_compatible(&acc, rule.phonetic(), context_mask) {
                Some(next) => {
                    acc = next;
                    fired = Some(rule.pattern().len());
                    break;
                }
                None => continue,
            }
        }
        match fired {
            Some(len) => pos += len,
            None => {
                let len = codepoint_len(bare, pos);
                acc.push_str(&bare[pos..pos + len]);
                pos += len;
            }
        }
    }
    acc
}

fn codepoint_len(s: &str, pos: usize) -> usize {
    s[pos..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::loader::parse_rule_table;

    fn table(json: &str) -> RuleTable {
        parse_rule_table(json).unwrap()
    }

    fn letters() -> RuleTable {
        table(
            r#"{ "rules": [
                { "pattern": "th", "phonetic": "t" },
                { "pattern": "s", "phonetic": "(s|z)" },
                { "pattern": "a", "phonetic": "a" },
                { "pattern": "i", "phonetic": "i" },
                { "pattern": "m", "phonetic": "m" },
                { "pattern": "t", "phonetic": "t" } ] }"#,
        )
    }

    #[test]
    fn test_rewrite_first_match_wins() {
        // "th" precedes "t", so "smith" keeps a single t
        assert_eq!(rewrite("smith", &letters(), 1), "(s|z)mit");
    }

    #[test]
    fn test_rewrite_silent_skip_drops_unknown() {
        let t = letters();
        assert_eq!(rewrite("smi th", &t, 1), rewrite("smith", &t, 1));
        assert_eq!(rewrite("???", &t, 1), "");
    }

    #[test]
    fn test_rewrite_language_gated_rule() {
        let t = table(
            r#"{ "rules": [
                { "pattern": "sz", "phonetic": "s", "languageMask": 8192 },
                { "pattern": "s", "phonetic": "z" },
                { "pattern": "z", "phonetic": "c" } ] }"#,
        );
        // polish bit set: digraph rule fires
        assert_eq!(rewrite("sz", &t, 8192), "s");
        // polish bit clear: falls through to the single letters
        assert_eq!(rewrite("sz", &t, 32), "zc");
    }

    #[test]
    fn test_concat_plain() {
        assert_eq!(concat_compatible("ab", "cd", 544), Some("abcd".to_string()));
        assert_eq!(concat_compatible("", "", 1), Some(String::new()));
    }

    #[test]
    fn test_concat_appends_context_attr() {
        assert_eq!(
            concat_compatible("a", "(b|c[128])", 160),
            Some("(ab[160]|ac[128])".to_string())
        );
    }

    #[test]
    fn test_concat_any_context_keeps_attrs() {
        assert_eq!(
            concat_compatible("a", "b[128]", 1),
            Some("ab[128]".to_string())
        );
    }

    #[test]
    fn test_concat_prunes_incompatible_branch() {
        // [32] is disjoint from context 128, only the bare branch survives
        assert_eq!(
            concat_compatible("x", "(y[32]|z)", 128),
            Some("xz[128]".to_string())
        );
    }

    #[test]
    fn test_concat_none_when_all_branches_die() {
        assert_eq!(concat_compatible("x[32]", "y[64]", 128), None);
        assert_eq!(concat_compatible("", "(a[32]|b[64])", 128), None);
    }

    #[test]
    fn test_rewrite_incompatible_rule_tries_next() {
        let t = table(
            r#"{ "rules": [
                { "pattern": "a", "phonetic": "x[32]" },
                { "pattern": "a", "phonetic": "y" } ] }"#,
        );
        // first rule's only branch dies against context 128, second fires
        assert_eq!(rewrite("a", &t, 128), "y");
    }

    #[test]
    fn test_rewrite_dead_everywhere_yields_empty() {
        let t = table(r#"{ "rules": [ { "pattern": "a", "phonetic": "x[32]" } ] }"#);
        assert_eq!(rewrite("a", &t, 128), "");
    }

    #[test]
    fn test_final_empty_table_is_identity() {
        let p = "(smit|zmit)";
        assert_eq!(apply_final_rules(p, &RuleTable::empty(), 1, true), p);
    }

    #[test]
    fn test_final_rewrites_each_alternative() {
        let t = table(r#"{ "rules": [ { "pattern": "z", "phonetic": "s" } ] }"#);
        assert_eq!(apply_final_rules("(smit|zmit)", &t, 1, false), "smit");
    }

    #[test]
    fn test_final_copies_unmatched_chars() {
        let t = table(r#"{ "rules": [ { "pattern": "q", "phonetic": "k" } ] }"#);
        assert_eq!(apply_final_rules("(smit|zmit)", &t, 1, false), "(smit|zmit)");
    }

    #[test]
    fn test_final_attr_carried_and_stripped() {
        let t = table(r#"{ "rules": [ { "pattern": "z", "phonetic": "s" } ] }"#);
        assert_eq!(
            apply_final_rules("(smit[544]|zmit[544])", &t, 544, false),
            "smit[544]"
        );
        assert_eq!(
            apply_final_rules("(smit[544]|zmit[544])", &t, 544, true),
            "smit"
        );
    }

    #[test]
    fn test_final_group_in_rule_output() {
        let t = table(r#"{ "rules": [ { "pattern": "g", "phonetic": "(g|k)" } ] }"#);
        assert_eq!(apply_final_rules("berg", &t, 1, false), "(berg|berk)");
    }

    #[test]
    fn test_final_all_alternatives_dead_yields_empty() {
        let t = table(r#"{ "rules": [ { "pattern": "a", "phonetic": "a[64]" } ] }"#);
        // the rewritten branch's [64] collides with the incoming [32]
        assert_eq!(apply_final_rules("a[32]", &t, 1, false), "");
    }
}
