use oapigen_core::ir::{HttpMethod, TypeRef};

/// First line of every generated file. Also how `--clean` recognises them.
pub const GENERATED_HEADER: &str = "// Code generated by oapigen. DO NOT EDIT.";

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Names a generated method body already uses: packages, receivers and
/// the fields of every `...Call` struct.
const RESERVED_LOCALS: &[&str] = &[
    "body", "c", "context", "ctx", "fmt", "header", "http", "params", "r", "ret", "s", "url",
];

/// File name suffixes the Go toolchain treats as test files or build constraints.
const SPECIAL_SUFFIXES: &[&str] = &[
    "test", "aix", "android", "darwin", "dragonfly", "freebsd", "illumos", "ios", "js", "linux",
    "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "386", "amd64", "arm", "arm64",
    "loong64", "mips", "mips64", "mips64le", "mipsle", "ppc64", "ppc64le", "riscv64", "s390x",
    "wasm",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Whether `name` can be used as a package clause.
///
/// Package names are kept to lower-case ASCII so they also work as directory names.
pub fn is_valid_package(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !is_keyword(name)
}

/// Package name derived from an API title: `Swagger Petstore` → `swaggerpetstore`.
pub fn default_package(title: &str) -> String {
    let name: String = title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if is_valid_package(&name) {
        name
    } else {
        "client".to_string()
    }
}

/// An unexported identifier safe to use as a parameter or struct field in
/// generated method bodies.
pub fn local_name(name: &str) -> String {
    if is_keyword(name) || RESERVED_LOCALS.contains(&name) {
        format!("{name}Param")
    } else {
        name.to_string()
    }
}

/// Method receiver: the lower-cased first letter of the type.
pub fn receiver(type_name: &str) -> String {
    type_name
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase().to_string())
        .unwrap_or_else(|| "x".to_string())
}

/// `http.MethodGet` and friends.
pub fn method_constant(method: HttpMethod) -> String {
    let verb = method.as_str();
    let mut name = String::with_capacity(verb.len());
    for (i, c) in verb.chars().enumerate() {
        if i == 0 {
            name.push(c);
        } else {
            name.push(c.to_ascii_lowercase());
        }
    }
    format!("http.Method{name}")
}

/// Quote `value` as a Go interpreted string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Turn free text into a doc-comment sentence fragment introduced by `a`/`an`.
///
/// `Everything about your Pets` → `an everything about your pets.`
pub fn describe(text: &str) -> Option<String> {
    let mut sentence = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if sentence.is_empty() {
        return None;
    }
    sentence = sentence.to_lowercase();
    if !sentence.ends_with('.') {
        sentence.push('.');
    }
    if ["a ", "an ", "the "].iter().any(|article| sentence.starts_with(article)) {
        return Some(sentence);
    }
    let article = if sentence.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "an"
    } else {
        "a"
    };
    Some(format!("{article} {sentence}"))
}

/// Collapse free text onto one comment line.
pub fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render free text as `//` comment lines, keeping its line breaks.
pub fn comment(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end]
        .iter()
        .map(|line| {
            if line.is_empty() {
                "//".to_string()
            } else {
                format!("// {line}")
            }
        })
        .collect()
}

/// Go-safe file stem for a type name: `NewPet` → `new_pet`.
pub fn file_stem(name: &str) -> String {
    use heck::ToSnakeCase;

    let stem = name.to_snake_case();
    let suffix = stem.rsplit('_').next().unwrap_or_default();
    if SPECIAL_SUFFIXES.contains(&suffix) {
        format!("{stem}_gen")
    } else {
        stem
    }
}

/// Standard-library packages needed by a set of types, sorted and deduplicated.
pub fn imports<'a>(types: impl IntoIterator<Item = &'a TypeRef>) -> Vec<&'static str> {
    let mut imports: Vec<&'static str> = types.into_iter().filter_map(TypeRef::import).collect();
    imports.sort_unstable();
    imports.dedup();
    imports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_names() {
        assert!(is_valid_package("petstore"));
        assert!(is_valid_package("pet_store2"));
        assert!(!is_valid_package("Petstore"));
        assert!(!is_valid_package("2pets"));
        assert!(!is_valid_package("pet-store"));
        assert!(!is_valid_package("func"));
        assert!(!is_valid_package(""));
    }

    #[test]
    fn test_default_package() {
        assert_eq!(default_package("Swagger Petstore"), "swaggerpetstore");
        assert_eq!(default_package("3D API"), "client");
        assert_eq!(default_package("!!!"), "client");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("petID"), "petID");
        assert_eq!(local_name("range"), "rangeParam");
        assert_eq!(local_name("body"), "bodyParam");
        assert_eq!(local_name("url"), "urlParam");
    }

    #[test]
    fn test_method_constant() {
        assert_eq!(method_constant(HttpMethod::Get), "http.MethodGet");
        assert_eq!(method_constant(HttpMethod::Options), "http.MethodOptions");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("/pets"), "\"/pets\"");
        assert_eq!(quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(quote("x\u{1}"), "\"x\\u0001\"");
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            describe("Everything about your Pets").as_deref(),
            Some("an everything about your pets.")
        );
        assert_eq!(
            describe("Store\n  orders.").as_deref(),
            Some("a store orders.")
        );
        assert_eq!(describe("A pet shelter").as_deref(), Some("a pet shelter."));
        assert_eq!(describe("  "), None);
    }

    #[test]
    fn test_comment() {
        assert_eq!(
            comment("\nFirst line.\n\nSecond paragraph.  \n\n"),
            vec!["// First line.", "//", "// Second paragraph."]
        );
        assert!(comment("   ").is_empty());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("NewPet"), "new_pet");
        assert_eq!(file_stem("APIResponse"), "api_response");
        assert_eq!(file_stem("LoadTest"), "load_test_gen");
        assert_eq!(file_stem("BuildLinux"), "build_linux_gen");
        assert_eq!(file_stem("Linux"), "linux_gen");
        assert_eq!(file_stem("Tester"), "tester");
    }

    #[test]
    fn test_imports() {
        let types = [
            TypeRef::Scalar("time.Time"),
            TypeRef::sequence(TypeRef::Scalar("time.Time")),
            TypeRef::Scalar("*os.File"),
            TypeRef::Scalar("string"),
        ];
        assert_eq!(imports(&types), vec!["os", "time"]);
    }
}
