use std::path::{Component, Path};

use crate::error::{Error, Result};

/// Normalize a raw zip entry name into a `/`-separated relative path.
///
/// Backslashes are treated as separators and `.` components are dropped.
/// Absolute names, drive prefixes, and names whose `..` components climb
/// above the archive root are rejected.
pub fn sanitize_entry_name(raw: &str) -> Result<String> {
    if raw.contains('\0') {
        return Err(Error::InvalidPath(raw.replace('\0', "\\0")));
    }

    let unified = raw.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(Error::InvalidPath(raw.to_string()));
    }

    let mut parts: Vec<&str> = Vec::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => return Err(Error::InvalidPath(raw.to_string())),
            },
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(Error::InvalidPath(raw.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidPath(raw.to_string()));
            }
        }
    }

    // "C:foo" parses as a normal component on unix hosts
    if parts.first().is_some_and(|first| first.len() >= 2 && first.as_bytes()[1] == b':') {
        return Err(Error::InvalidPath(raw.to_string()));
    }

    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_relative_name() {
        assert_eq!(sanitize_entry_name("entities/color.json").unwrap(), "entities/color.json");
    }

    #[test]
    fn separators_and_dots_are_normalized() {
        assert_eq!(sanitize_entry_name("./intents\\greet.json").unwrap(), "intents/greet.json");
        assert_eq!(sanitize_entry_name("a//b/../c").unwrap(), "a/c");
    }

    #[test]
    fn trailing_slash_directory() {
        assert_eq!(sanitize_entry_name("entities/").unwrap(), "entities");
    }

    #[test]
    fn zip_slip_rejected() {
        assert!(matches!(sanitize_entry_name("../etc/passwd"), Err(Error::InvalidPath(_))));
        assert!(matches!(sanitize_entry_name("a/../../b"), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn absolute_and_drive_rejected() {
        assert!(matches!(sanitize_entry_name("/etc/passwd"), Err(Error::InvalidPath(_))));
        assert!(matches!(sanitize_entry_name("\\etc\\passwd"), Err(Error::InvalidPath(_))));
        assert!(matches!(sanitize_entry_name("C:\\windows"), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn null_byte_rejected() {
        assert!(matches!(sanitize_entry_name("app\0.json"), Err(Error::InvalidPath(_))));
    }
}
