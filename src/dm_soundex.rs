//! Daitch-Mokotoff soundex.
//!
//! A longest-match pattern encoder producing fixed-length six-digit codes.
//! Several sounds are ambiguous (`ch` may be read as in *Chaim* or as in
//! *Church*), so encoding maintains parallel branches and a single name can
//! yield several codes; comparing the code *sets* is what makes the scheme
//! useful for surname indexes.
//!
//! This pipeline is independent of the Beider-Morse engine: it has its own
//! normalizer (diacritic folding, `,` `/` and space as part separators) and
//! a private rule table. Invalid characters are skipped, never errors.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

/// Code length every branch is truncated or zero-padded to.
const CODE_LENGTH: usize = 6;

/// Sentinel meaning "emit nothing, reset the branch's last code".
const NC: &str = "999";

/// Letters that count as vowels for the before-vowel column.
const VOWELS: &str = "aeioujy";

struct DmRule {
    pattern: &'static str,
    /// Codes for the three positions: word start, before a vowel, elsewhere.
    codes: [&'static str; 3],
    /// Alternate reading, present only for the ambiguous patterns.
    alternate: Option<[&'static str; 3]>,
}

const fn rule(pattern: &'static str, codes: [&'static str; 3]) -> DmRule {
    DmRule {
        pattern,
        codes,
        alternate: None,
    }
}

const fn rule_alt(
    pattern: &'static str,
    codes: [&'static str; 3],
    alternate: [&'static str; 3],
) -> DmRule {
    DmRule {
        pattern,
        codes,
        alternate: Some(alternate),
    }
}

/// The coding table. Patterns run up to seven letters; the index below
/// serves them longest-first so the scan always takes the longest match.
static DM_RULES: &[DmRule] = &[
    rule("ai", ["0", "1", NC]),
    rule("aj", ["0", "1", NC]),
    rule("ay", ["0", "1", NC]),
    rule("au", ["0", "7", NC]),
    rule("a", ["0", NC, NC]),
    rule("b", ["7", "7", "7"]),
    rule("chs", ["5", "54", "54"]),
    rule_alt("ch", ["4", "4", "4"], ["5", "5", "5"]),
    rule_alt("ck", ["5", "5", "5"], ["45", "45", "45"]),
    rule("csz", ["4", "4", "4"]),
    rule("czs", ["4", "4", "4"]),
    rule("cz", ["4", "4", "4"]),
    rule("cs", ["4", "4", "4"]),
    rule_alt("c", ["4", "4", "4"], ["5", "5", "5"]),
    rule("drz", ["4", "4", "4"]),
    rule("drs", ["4", "4", "4"]),
    rule("dsh", ["4", "4", "4"]),
    rule("dsz", ["4", "4", "4"]),
    rule("ds", ["4", "4", "4"]),
    rule("dzh", ["4", "4", "4"]),
    rule("dzs", ["4", "4", "4"]),
    rule("dz", ["4", "4", "4"]),
    rule("dt", ["3", "3", "3"]),
    rule("d", ["3", "3", "3"]),
    rule("ei", ["0", "1", NC]),
    rule("ej", ["0", "1", NC]),
    rule("ey", ["0", "1", NC]),
    rule("eu", ["1", "1", NC]),
    rule("e", ["0", NC, NC]),
    rule("fb", ["7", "7", "7"]),
    rule("f", ["7", "7", "7"]),
    rule("g", ["5", "5", "5"]),
    rule("h", ["5", "5", NC]),
    rule("ia", ["1", NC, NC]),
    rule("ie", ["1", NC, NC]),
    rule("io", ["1", NC, NC]),
    rule("iu", ["1", NC, NC]),
    rule("i", ["0", NC, NC]),
    rule_alt("j", ["1", NC, NC], ["4", "4", "4"]),
    rule("ks", ["5", "54", "54"]),
    rule("kh", ["5", "5", "5"]),
    rule("k", ["5", "5", "5"]),
    rule("l", ["8", "8", "8"]),
    rule("mn", ["66", "66", "66"]),
    rule("m", ["6", "6", "6"]),
    rule("nm", ["66", "66", "66"]),
    rule("n", ["6", "6", "6"]),
    rule("oi", ["0", "1", NC]),
    rule("oj", ["0", "1", NC]),
    rule("oy", ["0", "1", NC]),
    rule("o", ["0", NC, NC]),
    rule("pf", ["7", "7", "7"]),
    rule("ph", ["7", "7", "7"]),
    rule("p", ["7", "7", "7"]),
    rule("q", ["5", "5", "5"]),
    rule_alt("rz", ["4", "4", "4"], ["94", "94", "94"]),
    rule("rs", ["94", "94", "94"]),
    rule("r", ["9", "9", "9"]),
    rule("schtsch", ["2", "4", "4"]),
    rule("schtsh", ["2", "4", "4"]),
    rule("schtch", ["2", "4", "4"]),
    rule("scht", ["2", "43", "43"]),
    rule("schd", ["2", "43", "43"]),
    rule("sch", ["4", "4", "4"]),
    rule("shtch", ["2", "4", "4"]),
    rule("shtsh", ["2", "4", "4"]),
    rule("shch", ["2", "4", "4"]),
    rule("sht", ["2", "43", "43"]),
    rule("shd", ["2", "43", "43"]),
    rule("sh", ["4", "4", "4"]),
    rule("stch", ["2", "4", "4"]),
    rule("stsch", ["2", "4", "4"]),
    rule("strz", ["2", "4", "4"]),
    rule("strs", ["2", "4", "4"]),
    rule("stsh", ["2", "4", "4"]),
    rule("st", ["2", "43", "43"]),
    rule("sc", ["2", "4", "4"]),
    rule("szcz", ["2", "4", "4"]),
    rule("szcs", ["2", "4", "4"]),
    rule("szt", ["2", "43", "43"]),
    rule("szd", ["2", "43", "43"]),
    rule("sz", ["4", "4", "4"]),
    rule("sd", ["2", "43", "43"]),
    rule("s", ["4", "4", "4"]),
    rule("ttsch", ["4", "4", "4"]),
    rule("ttch", ["4", "4", "4"]),
    rule("tch", ["4", "4", "4"]),
    rule("th", ["3", "3", "3"]),
    rule("trz", ["4", "4", "4"]),
    rule("trs", ["4", "4", "4"]),
    rule("tsch", ["4", "4", "4"]),
    rule("tsh", ["4", "4", "4"]),
    rule("tts", ["4", "4", "4"]),
    rule("ttsz", ["4", "4", "4"]),
    rule("ts", ["4", "4", "4"]),
    rule("tc", ["4", "4", "4"]),
    rule("ttz", ["4", "4", "4"]),
    rule("tzs", ["4", "4", "4"]),
    rule("tsz", ["4", "4", "4"]),
    rule("tz", ["4", "4", "4"]),
    rule("t", ["3", "3", "3"]),
    rule("ui", ["0", "1", NC]),
    rule("uj", ["0", "1", NC]),
    rule("uy", ["0", "1", NC]),
    rule("ue", ["0", NC, NC]),
    rule("u", ["0", NC, NC]),
    rule("v", ["7", "7", "7"]),
    rule("w", ["7", "7", "7"]),
    rule("x", ["5", "54", "54"]),
    rule("y", ["1", NC, NC]),
    rule("zhdzh", ["2", "4", "4"]),
    rule("zdzh", ["2", "4", "4"]),
    rule("zdz", ["2", "4", "4"]),
    rule("zhd", ["2", "43", "43"]),
    rule("zd", ["2", "43", "43"]),
    rule("zsch", ["4", "4", "4"]),
    rule("zsh", ["4", "4", "4"]),
    rule("zh", ["4", "4", "4"]),
    rule("zs", ["4", "4", "4"]),
    rule("z", ["4", "4", "4"]),
];

/// Rules grouped by first letter, longest pattern first.
static RULE_INDEX: LazyLock<FxHashMap<u8, Vec<&'static DmRule>>> = LazyLock::new(|| {
    let mut index: FxHashMap<u8, Vec<&'static DmRule>> = FxHashMap::default();
    for rule in DM_RULES {
        index
            .entry(rule.pattern.as_bytes()[0])
            .or_default()
            .push(rule);
    }
    for rules in index.values_mut() {
        rules.sort_by_key(|rule| std::cmp::Reverse(rule.pattern.len()));
    }
    index
});

/// Diacritic folding for the letters common in surname sources.
fn fold(c: char) -> Option<char> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ą' | 'æ' => 'a',
        'è' | 'é' | 'ê' | 'ë' | 'ę' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ő' | 'ø' | 'œ' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ű' => 'u',
        'ç' | 'ć' | 'č' => 'c',
        'ñ' | 'ń' => 'n',
        'ł' => 'l',
        'ś' | 'š' => 's',
        'ß' => 's',
        'ż' | 'ź' | 'ž' => 'z',
        'ý' | 'ÿ' => 'y',
        'ď' | 'đ' | 'ð' => 'd',
        'ť' | 'þ' => 't',
        'ř' => 'r',
        other => other,
    };
    folded.is_ascii_lowercase().then_some(folded)
}

/// Lowercase, fold and split the input into encodable parts.
fn split_parts(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    for c in input.chars().flat_map(char::to_lowercase) {
        if c == ' ' || c == ',' || c == '/' {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        } else if let Some(folded) = fold(c) {
            current.push(folded);
        }
        // anything else is silently skipped
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[derive(Clone, PartialEq, Eq)]
struct Branch {
    code: String,
    last: String,
}

impl Branch {
    fn new() -> Self {
        Branch {
            code: String::with_capacity(CODE_LENGTH),
            last: String::new(),
        }
    }

    fn apply(&mut self, code: &str) {
        if code == NC {
            self.last.clear();
            return;
        }
        if self.last != code {
            self.code.push_str(code);
        }
        self.last.clear();
        self.last.push_str(code);
    }

    fn finish(mut self) -> String {
        self.code.truncate(CODE_LENGTH);
        while self.code.len() < CODE_LENGTH {
            self.code.push('0');
        }
        self.code
    }
}

/// Column index for a match: word start, before vowel, or elsewhere.
fn column(part: &str, pos: usize, pattern_len: usize) -> usize {
    if pos == 0 {
        return 0;
    }
    match part[pos + pattern_len..].chars().next() {
        Some(next) if VOWELS.contains(next) => 1,
        _ => 2,
    }
}

fn encode_part(part: &str) -> Vec<String> {
    let mut branches = vec![Branch::new()];

    let mut pos = 0;
    while pos < part.len() {
        let first = part.as_bytes()[pos];
        let matched = RULE_INDEX
            .get(&first)
            .and_then(|rules| rules.iter().find(|rule| part[pos..].starts_with(rule.pattern)));

        let Some(rule) = matched else {
            pos += 1;
            continue;
        };
        let col = column(part, pos, rule.pattern.len());
        let code = rule.codes[col];

        match rule.alternate {
            None => {
                for branch in &mut branches {
                    branch.apply(code);
                }
            }
            Some(alternate) => {
                let alt_code = alternate[col];
                let mut doubled = Vec::with_capacity(branches.len() * 2);
                for branch in branches {
                    let mut primary = branch.clone();
                    primary.apply(code);
                    if !doubled.contains(&primary) {
                        doubled.push(primary);
                    }
                    let mut secondary = branch;
                    secondary.apply(alt_code);
                    if !doubled.contains(&secondary) {
                        doubled.push(secondary);
                    }
                }
                branches = doubled;
            }
        }
        pos += rule.pattern.len();
    }

    let mut codes = Vec::with_capacity(branches.len());
    for branch in branches {
        let code = branch.finish();
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

/// Encode a name into its Daitch-Mokotoff codes.
///
/// Parts separated by spaces, commas or slashes are encoded independently;
/// the result is the deduplicated list of six-digit codes.
///
/// ```rust
/// use beidermorse::dm_soundex_codes;
///
/// let codes = dm_soundex_codes("Cohen");
/// assert!(codes.contains(&"556000".to_string()));
/// ```
pub fn dm_soundex_codes(input: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in split_parts(input) {
        for code in encode_part(&part) {
            if !out.contains(&code) {
                out.push(code);
            }
        }
    }
    out
}

/// [`dm_soundex_codes`] joined with single spaces; empty input yields `""`.
pub fn dm_soundex(input: &str) -> String {
    dm_soundex_codes(input).join(" ")
}
