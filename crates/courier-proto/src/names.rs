//! Textual validators for the protocol's naming grammars.
//!
//! Pure string predicates, consulted by the validator for the Path,
//! Interface, Member, and ErrorName header fields. Error names reuse the
//! interface grammar.

/// Maximum byte length of an interface or member name.
const MAX_NAME_LEN: usize = 255;

/// Whether `path` satisfies object-path syntax.
///
/// A valid path is `/` alone, or `/`-joined non-empty elements of
/// `[A-Za-z0-9_]`, with no trailing slash.
#[must_use]
pub fn is_valid_object_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    if !path.starts_with('/') || path.ends_with('/') {
        return false;
    }
    path.split('/').skip(1).all(|element| {
        !element.is_empty()
            && element.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

/// Whether `name` satisfies interface-name syntax.
///
/// At least two `.`-separated elements, each starting with a letter or
/// underscore and continuing with `[A-Za-z0-9_]`, at most 255 bytes total.
#[must_use]
pub fn is_valid_interface_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    let mut elements = 0;
    for element in name.split('.') {
        if !is_valid_name_element(element) {
            return false;
        }
        elements += 1;
    }
    elements >= 2
}

/// Whether `name` satisfies member-name syntax.
///
/// A single name element: starts with a letter or underscore, continues
/// with `[A-Za-z0-9_]`, 1 to 255 bytes, no dots.
#[must_use]
pub fn is_valid_member_name(name: &str) -> bool {
    name.len() <= MAX_NAME_LEN && is_valid_name_element(name)
}

fn is_valid_name_element(element: &str) -> bool {
    let mut bytes = element.bytes();
    let Some(first) = bytes.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != b'_' {
        return false;
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
