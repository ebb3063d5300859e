//! Naming convention utilities for generated code.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `ComplexSubtype` | [`to_snake_case`] | `complex_subtype` |
//! | `ComplexSubtype` | [`initials`] | `cs` |
//! | `atlas_sdk` + `Resource` | [`shorten`] | `atlas_sdk_r` |
//! | `type` | [`safe_ident`] | `type_` |

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Convert PascalCase or camelCase to snake_case, keeping acronyms together.
///
/// # Examples
///
/// ```
/// use schemabridge::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("ComplexSubtype"), "complex_subtype");
/// assert_eq!(to_snake_case("AtlasAPI"), "atlas_api");
/// assert_eq!(to_snake_case("already_snake"), "already_snake");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if prev_lower || acronym_end {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Lowercased first letter of each word of an identifier.
///
/// Generic arguments and leading reference sigils are ignored.
///
/// # Examples
///
/// ```
/// use schemabridge::naming::initials;
///
/// assert_eq!(initials("ComplexSubtype"), "cs");
/// assert_eq!(initials("OptionalRef"), "or");
/// assert_eq!(initials("str"), "s");
/// assert_eq!(initials("&mut Vec<String>"), "v");
/// ```
pub fn initials(name: &str) -> String {
    let name = name.trim_start_matches(['&', '*']).trim_start_matches("mut ").trim_start();
    let head = name.split(['<', '(', '[']).next().unwrap_or(name);
    to_snake_case(head)
        .split('_')
        .filter_map(|word| word.chars().next())
        .collect()
}

/// Short alias for a type named `name` living in the package whose last path
/// segment is `package_base`.
///
/// # Examples
///
/// ```
/// use schemabridge::naming::shorten;
///
/// assert_eq!(shorten("atlas_sdk", "Resource"), "atlas_sdk_r");
/// assert_eq!(shorten("", "Resource"), "r");
/// ```
pub fn shorten(package_base: &str, name: &str) -> String {
    let short = initials(name);
    if package_base.is_empty() {
        short
    } else {
        format!("{package_base}_{short}")
    }
}

/// Whether `name` is a reserved word.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Append `_` to names that are Rust keywords.
///
/// # Examples
///
/// ```
/// use schemabridge::naming::safe_ident;
///
/// assert_eq!(safe_ident("type"), "type_");
/// assert_eq!(safe_ident("res"), "res");
/// ```
pub fn safe_ident(name: &str) -> String {
    if is_keyword(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Make every name in `names` unique by suffixing repeats with a counter.
pub fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut counter = 2;
        while seen.contains(&candidate) {
            candidate = format!("{name}{counter}");
            counter += 1;
        }
        seen.push(candidate);
    }
    seen
}
