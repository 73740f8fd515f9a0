//! Identifier normalization
//!
//! Turns arbitrary schema keys into identifiers the target language accepts.
//! Type names go through [`normalize`]; field names go through
//! [`Naming::escape_identifier`], which keeps the document's spelling
//! whenever it is already legal.

use std::collections::{BTreeSet, HashSet};

/// Target keywords that cannot be used as bare field names
pub const RESERVED_WORDS: &[&str] = &[
    "abort", "any", "anydata", "as", "boolean", "break", "byte", "check", "checkpanic", "class",
    "client", "const", "continue", "decimal", "distinct", "do", "else", "enum", "error", "fail",
    "false", "final", "float", "foreach", "fork", "from", "function", "future", "handle", "if",
    "import", "in", "int", "is", "isolated", "join", "json", "let", "listener", "lock", "map",
    "match", "never", "new", "null", "object", "on", "panic", "private", "public", "readonly",
    "record", "remote", "resource", "retry", "return", "rollback", "select", "service", "start",
    "stream", "string", "table", "transaction", "trap", "true", "type", "typedesc", "typeof",
    "var", "wait", "where", "while", "worker", "xml",
];

/// `[_A-Za-z][_A-Za-z0-9]*`
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Normalize a raw key into an identifier
///
/// Legal identifiers keep their spelling. Anything else is split on
/// non-alphanumeric characters and each word is capitalized, so
/// `pet-store` becomes `PetStore`. `capitalize` controls the case of the
/// leading character. Returns an empty string when nothing usable remains.
///
/// # Examples
/// ```
/// use openapi_typegen_parser::schema::naming::normalize;
///
/// assert_eq!(normalize("pet", true), "Pet");
/// assert_eq!(normalize("pet-store", true), "PetStore");
/// assert_eq!(normalize("Pet Tag", false), "petTag");
/// ```
pub fn normalize(raw: &str, capitalize: bool) -> String {
    let raw = raw.trim();

    let mut identifier = if is_valid_identifier(raw) {
        raw.to_string()
    } else {
        let words: Vec<&str> = raw
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let multi_word = words.len() > 1;
        let mut joined = String::new();
        for word in words {
            if multi_word {
                joined.push_str(&upper_first(word));
            } else {
                joined.push_str(word);
            }
        }
        joined
    };

    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }

    if capitalize {
        upper_first(&identifier)
    } else {
        lower_first(&identifier)
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Field-name escaping rules for one run
#[derive(Debug, Clone)]
pub struct Naming {
    reserved: BTreeSet<String>,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            reserved: RESERVED_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl Naming {
    /// Built-in keywords plus `extra`
    pub fn with_reserved_words<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut naming = Self::default();
        naming.reserved.extend(extra.into_iter().map(Into::into));
        naming
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(word)
    }

    /// Escape a property key for use as a record field name
    ///
    /// Legal, non-reserved keys are returned unchanged. Reserved words get a
    /// `'` prefix; other keys get the prefix and every illegal character
    /// backslash-escaped (`first-name` becomes `'first\-name`).
    pub fn escape_identifier(&self, raw: &str) -> String {
        let raw = raw.trim();
        if is_valid_identifier(raw) {
            if self.is_reserved(raw) {
                return format!("'{}", raw);
            }
            return raw.to_string();
        }

        let mut escaped = String::with_capacity(raw.len() + 4);
        escaped.push('\'');
        for c in raw.chars() {
            if !(c == '_' || c.is_ascii_alphanumeric()) {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }
}

/// Pass-scoped table of claimed names
///
/// The first claimant of a name keeps it; later claimants get the smallest
/// free numeric suffix.
#[derive(Debug, Default, Clone)]
pub struct CollisionTable {
    taken: HashSet<String>,
}

impl CollisionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base`, or a suffixed variant if it is already taken
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }

        let mut n = 1usize;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Mark a name as taken without disambiguation
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}
