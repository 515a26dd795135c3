use heck::ToPascalCase;

use crate::ir::Identifier;

/// Prepended to identifiers that would otherwise start with a digit.
pub const DIGIT_PREFIX: &str = "X_";

/// Dropped from compound operation identifiers.
const RETRIEVE_WORD: &str = "Get";

/// Well-known initialisms, rendered all upper-case (or all lower-case when
/// they open an unexported name).
const INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL",
    "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

/// Turn an arbitrary document name into a Go identifier.
///
/// Runs in two passes. The first drops punctuation and upper-cases the
/// character after it; lone underscores count as punctuation while runs of
/// two or more are kept. The second splits the result into words and
/// canonicalizes initialisms. The result is stable under re-normalization.
pub fn normalize(raw: &str, capitalize: bool) -> Identifier {
    Identifier::new(normalize_str(raw, capitalize))
}

fn normalize_str(raw: &str, capitalize: bool) -> String {
    // Some documents carry names like `options[]limit`.
    let name = match raw.rfind(']') {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    };
    let name = strip_digit_prefix(name);

    let fixed = fix_name(&depunct(name, capitalize));
    let fixed = if fixed == "Typ" {
        "Type".to_string()
    } else {
        fixed
    };
    with_digit_prefix(fixed)
}

/// Normalize an `operationId` into a method name.
///
/// `Get` is removed wherever it occurs unless it is the whole name. A name
/// that strips down to nothing keeps its original form.
pub fn operation_identifier(raw: &str) -> Identifier {
    let name = normalize_str(raw, true);
    if name == RETRIEVE_WORD {
        return Identifier::new(name);
    }

    let stripped = name.replace(RETRIEVE_WORD, "");
    let stripped = strip_digit_prefix(&stripped);
    if stripped.is_empty() {
        return Identifier::new(name);
    }
    Identifier::new(with_digit_prefix(upper_first(stripped)))
}

/// Normalize a parameter name into an unexported field name.
pub fn parameter_identifier(raw: &str) -> Identifier {
    Identifier::new(lower_leading(&normalize_str(raw, false)))
}

/// Whether `word` is in the initialism table, ignoring case.
pub fn is_initialism(word: &str) -> bool {
    let upper = word.to_uppercase();
    INITIALISMS.contains(&upper.as_str())
}

/// Remove punctuation, upper-casing the character that follows it.
///
/// `-`, `.`, `$`, `/` and any other character that cannot appear in an
/// identifier are dropped. A lone `_` is dropped too; a run of two or more
/// is copied as-is.
fn depunct(ident: &str, capitalize: bool) -> String {
    let mut out = String::with_capacity(ident.len());
    let mut need_cap = capitalize;
    let mut preserve = false;

    for (i, c) in ident.char_indices() {
        if c == '_' {
            if preserve || ident[i..].starts_with("__") {
                preserve = true;
            } else {
                need_cap = true;
                continue;
            }
        } else {
            preserve = false;
            if !c.is_alphanumeric() {
                need_cap = true;
                continue;
            }
        }

        if need_cap {
            out.extend(c.to_uppercase());
            need_cap = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Apply Go initialism casing to a punctuation-free name.
///
/// Words break at every lower-to-non-lower transition and around
/// underscore runs, which are copied through unchanged.
pub fn fix_name(name: &str) -> String {
    if name == "_" {
        return name.to_string();
    }
    if name == "type" {
        return "typ".to_string();
    }
    if !name.chars().any(char::is_uppercase) {
        return name.to_string();
    }

    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '_' {
            let start = i;
            while i < chars.len() && chars[i] == '_' {
                i += 1;
            }
            out.extend(&chars[start..i]);
            continue;
        }

        let start = i;
        i += 1;
        while i < chars.len()
            && chars[i] != '_'
            && !(chars[i - 1].is_lowercase() && !chars[i].is_lowercase())
        {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        out.push_str(&fix_word(&word, start == 0));
    }
    out
}

fn fix_word(word: &str, leading: bool) -> String {
    if is_initialism(word) {
        // Lower-case only when it opens the name and was lower-case already.
        if leading && word.starts_with(char::is_lowercase) {
            return word.to_lowercase();
        }
        return word.to_uppercase();
    }
    if !leading && word.to_lowercase() == word {
        return upper_first(word);
    }
    word.to_string()
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower the first character, or the whole leading initialism (`IDValue` -> `idValue`).
fn lower_leading(name: &str) -> String {
    let initialism = INITIALISMS
        .iter()
        .filter(|init| {
            name.starts_with(**init) && !name[init.len()..].starts_with(char::is_lowercase)
        })
        .max_by_key(|init| init.len());

    match initialism {
        Some(init) => format!("{}{}", init.to_lowercase(), &name[init.len()..]),
        None => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

fn starts_with_digit(s: &str) -> bool {
    s.starts_with(char::is_numeric)
}

fn strip_digit_prefix(name: &str) -> &str {
    match name.strip_prefix(DIGIT_PREFIX) {
        Some(rest) if starts_with_digit(rest) => rest,
        _ => name,
    }
}

fn with_digit_prefix(name: String) -> String {
    if starts_with_digit(&name) {
        format!("{DIGIT_PREFIX}{name}")
    } else {
        name
    }
}

/// Derive a camelCase operation name from HTTP method + path.
///
/// Examples:
/// - `GET /users` → `listUsers`
/// - `POST /users` → `createUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `DELETE /users/{userId}` → `deleteUser`
/// - `GET /users/{userId}/messages` → `listUsersMessages`
pub fn route_to_name(method: &str, path: &str) -> String {
    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in path.split('/').filter(|s| !s.is_empty()) {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let method_upper = method.to_uppercase();
    let prefix = match method_upper.as_str() {
        "GET" if ends_with_param => "get",
        "GET" => "list",
        "POST" => "create",
        "PUT" => "update",
        "DELETE" => "delete",
        "PATCH" => "patch",
        "OPTIONS" => "options",
        "HEAD" => "head",
        "TRACE" => "trace",
        _ => "call",
    };

    let last = resource_parts.len().saturating_sub(1);
    let resource: String = resource_parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i == last && ends_with_param {
                singularize(part).to_pascal_case()
            } else {
                part.to_pascal_case()
            }
        })
        .collect();

    format!("{prefix}{resource}")
}

/// Naive singularization: strips trailing 's' if present.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}
