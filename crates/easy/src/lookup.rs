//! Case-insensitive prefix lookup over `const` name tables
//!
//! A name resolves to the first entry whose canonical name, minus the
//! optional namespace (`CURLOPT_`, `CURLINFO_`), is a case-insensitive
//! prefix of the input minus the same namespace. Tables are checked at
//! compile time with [`is_unambiguous`] so every entry stays reachable.

/// One row of a name table
#[derive(Debug, Clone, Copy)]
pub struct Entry<T> {
    /// Canonical name, including the namespace
    pub name: &'static str,
    /// Value the name resolves to
    pub value: T,
}

/// Resolve `input` against `table`.
pub fn resolve<T: Copy>(table: &[Entry<T>], namespace: &str, input: &str) -> Option<T> {
    let ns = namespace.as_bytes();
    let input = strip_namespace(input.as_bytes(), ns);
    table
        .iter()
        .find(|entry| has_prefix_ci(input, strip_namespace(entry.name.as_bytes(), ns)))
        .map(|entry| entry.value)
}

/// Every name carries the namespace, has a non-empty tail, and no entry is
/// shadowed by an earlier one whose tail is a prefix of its own.
pub const fn is_unambiguous<T>(table: &[Entry<T>], namespace: &str) -> bool {
    let ns = namespace.as_bytes();
    let mut i = 0;
    while i < table.len() {
        let name = table[i].name.as_bytes();
        if !has_prefix_ci(name, ns) || name.len() == ns.len() {
            return false;
        }
        let tail = strip_namespace(name, ns);
        let mut j = i + 1;
        while j < table.len() {
            if has_prefix_ci(strip_namespace(table[j].name.as_bytes(), ns), tail) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const fn strip_namespace<'a>(name: &'a [u8], namespace: &[u8]) -> &'a [u8] {
    if has_prefix_ci(name, namespace) {
        name.split_at(namespace.len()).1
    } else {
        name
    }
}

const fn has_prefix_ci(input: &[u8], prefix: &[u8]) -> bool {
    if input.len() < prefix.len() {
        return false;
    }
    let mut i = 0;
    while i < prefix.len() {
        if input[i].to_ascii_uppercase() != prefix[i].to_ascii_uppercase() {
            return false;
        }
        i += 1;
    }
    true
}
