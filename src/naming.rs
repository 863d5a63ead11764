//! identifier casing
//!
//! graphql names to rust identifiers: `snake_case` fields and methods,
//! `PascalCase` types and variants, keyword escaping, and de-duplication.

use serde::Deserialize;
use std::collections::HashSet;

/// naming options, read from the `naming` block of the project config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingOptions {
    /// treat a run of capitals as one word: `userID` -> `user_id`.
    /// when false every capital starts a word: `userID` -> `user_i_d`.
    pub preserve_acronyms: bool,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            preserve_acronyms: true,
        }
    }
}

impl NamingOptions {
    /// `snake_case` field or method identifier, keyword-safe
    pub fn field_ident(&self, name: &str) -> String {
        let snake = self
            .words(name)
            .iter()
            .map(|word| word.to_lowercase())
            .collect::<Vec<_>>()
            .join("_");
        escape_ident(fallback(snake, "field"))
    }

    /// `PascalCase` type or variant identifier
    pub fn type_ident(&self, name: &str) -> String {
        let pascal: String = self.words(name).iter().map(|word| capitalize(word)).collect();
        let pascal = fallback(pascal, "Value");
        match pascal.as_str() {
            "Self" | "Box" | "Option" | "Result" | "String" | "Vec" | "Serialize"
            | "Deserialize" => format!("{pascal}Type"),
            _ => pascal,
        }
    }

    /// split a graphql name into words on `_`, `-`, and case changes
    fn words(&self, name: &str) -> Vec<String> {
        let mut words = Vec::new();
        for part in name.split(['_', '-']).filter(|part| !part.is_empty()) {
            // all-caps parts (`NORTH`, `ID`) are single words
            if part.chars().all(|ch| !ch.is_lowercase()) {
                words.push(part.to_string());
                continue;
            }
            let chars: Vec<char> = part.chars().collect();
            let mut current = String::new();
            for (idx, ch) in chars.iter().copied().enumerate() {
                let boundary = idx > 0 && ch.is_uppercase() && {
                    let prev = chars[idx - 1];
                    let next_lower = chars.get(idx + 1).is_some_and(|next| next.is_lowercase());
                    if self.preserve_acronyms {
                        !prev.is_uppercase() || next_lower
                    } else {
                        true
                    }
                };
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }
            if !current.is_empty() {
                words.push(current);
            }
        }
        words
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|ch| ch.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

fn fallback(ident: String, default: &str) -> String {
    if ident.is_empty() {
        default.to_string()
    } else if ident.starts_with(|ch: char| ch.is_ascii_digit()) {
        format!("_{ident}")
    } else {
        ident
    }
}

/// escape rust keywords as raw identifiers
pub fn escape_ident(ident: String) -> String {
    match ident.as_str() {
        // cannot be raw identifiers
        "self" | "Self" | "super" | "crate" => format!("{ident}_"),
        _ if is_rust_keyword(&ident) => format!("r#{ident}"),
        _ => ident,
    }
}

/// hands out unique names within one scope, suffixing repeats with 2, 3, ..
#[derive(Debug, Default, Clone)]
pub struct NameSet {
    taken: HashSet<String>,
}

impl NameSet {
    /// empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// true if `name` is already handed out
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// claim `name` exactly; false if it is taken
    pub fn claim(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    /// claim `name`, or the first free `name2`, `name3`, ..
    pub fn unique(&mut self, name: &str) -> String {
        if self.claim(name) {
            return name.to_string();
        }
        // a suffixed keyword is no longer a keyword
        let base = name.strip_prefix("r#").unwrap_or(name);
        let sep = if base.ends_with(|ch: char| ch.is_ascii_digit()) {
            "_"
        } else {
            ""
        };
        let mut counter = 2;
        loop {
            let candidate = format!("{base}{sep}{counter}");
            if self.claim(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

fn is_rust_keyword(name: &str) -> bool {
    matches!(
        name,
        "as" | "break"
            | "const"
            | "continue"
            | "crate"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "Self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "macro"
            | "override"
            | "priv"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
            | "try"
            | "gen"
    )
}
