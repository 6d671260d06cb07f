//! Naming derivation
//!
//! Builds the bundle of derived names one view needs in generated code:
//! data-class name, list-class name, API accessor names, and file stem.
//! Derivation is a pure function of the source name, so re-deriving from a
//! generated class's recorded source name always yields the same bundle.

use serde::Serialize;

/// The five name variants derived for one view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiClass {
    /// Name the bundle was derived from (the view's display name)
    pub source_name: String,
    /// Singular data-class name, PascalCase ("Person")
    pub data_class: String,
    /// Plural list-class name ("PersonList")
    pub list_class: String,
    /// API accessor class, pluralized PascalCase + suffix ("PersonsAPI")
    pub api_class: String,
    /// API accessor attribute, pluralized snake_case ("persons")
    pub api_attribute: String,
    /// File stem, singular snake_case ("person")
    pub file_name: String,
}

impl ApiClass {
    /// Derive the full bundle from a display name.
    pub fn from_name(name: &str) -> Self {
        let singular_pascal = to_pascal_case(&singularize(name));
        let plural_pascal = to_pascal_case(&pluralize(name));

        Self {
            source_name: name.to_string(),
            data_class: singular_pascal.clone(),
            list_class: format!("{}List", singular_pascal),
            api_class: format!("{}API", plural_pascal),
            api_attribute: to_snake_case(&plural_pascal),
            file_name: to_snake_case(&singular_pascal),
        }
    }

    /// Write-side class name ("PersonWrite")
    pub fn write_class(&self) -> String {
        format!("{}Write", self.data_class)
    }
}

// =============================================================================
// Case Conversion
// =============================================================================

/// Convert string to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    // All-caps input (SCREAMING_SNAKE_CASE) lowercases the word tails
    let is_all_caps = s
        .chars()
        .all(|c| c.is_ascii_uppercase() || c == '_' || c == '-' || c == ' ');

    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else if is_all_caps {
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert string to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c == '-' || c == ' ' {
            result.push('_');
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_ascii_lowercase();
        }
    }

    // Generated identifiers must not collide with Python keywords
    if is_python_keyword(&result) {
        result.push('_');
    }

    result
}

// =============================================================================
// Inflection
// =============================================================================

/// Pluralize an English name. Handles the regular suffix rules only; the
/// generated code never depends on linguistic perfection, only stability.
pub fn pluralize(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let lower = s.to_ascii_lowercase();
    if let Some(stem) = strip_y_for_ies(s, &lower) {
        return format!("{}ies", stem);
    }
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{}es", s);
    }
    format!("{}s", s)
}

/// Singularize an English name (inverse of [`pluralize`] on its own output)
pub fn singularize(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    if lower.ends_with("ies") && s.len() > 3 {
        return format!("{}y", &s[..s.len() - 3]);
    }
    for suffix in ["ses", "xes", "zes", "ches", "shes"] {
        if lower.ends_with(suffix) {
            return s[..s.len() - 2].to_string();
        }
    }
    if lower.ends_with('s') && !lower.ends_with("ss") && s.len() > 1 {
        return s[..s.len() - 1].to_string();
    }
    s.to_string()
}

/// "city" -> Some("cit"); "day" -> None (vowel before the y)
fn strip_y_for_ies<'a>(s: &'a str, lower: &str) -> Option<&'a str> {
    if !lower.ends_with('y') || s.len() < 2 {
        return None;
    }
    let before = lower.as_bytes()[lower.len() - 2];
    if matches!(before, b'a' | b'e' | b'i' | b'o' | b'u') {
        None
    } else {
        Some(&s[..s.len() - 1])
    }
}

/// Check if a string is a Python keyword
fn is_python_keyword(s: &str) -> bool {
    matches!(
        s,
        "False" | "None" | "True" | "and" | "as" | "assert" | "async" | "await"
            | "break" | "class" | "continue" | "def" | "del" | "elif" | "else"
            | "except" | "finally" | "for" | "from" | "global" | "if" | "import"
            | "in" | "is" | "lambda" | "nonlocal" | "not" | "or" | "pass"
            | "raise" | "return" | "try" | "while" | "with" | "yield"
    )
}
