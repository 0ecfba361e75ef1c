pub mod cat;
pub mod info;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod put;
pub mod rm;
pub mod stat;

/// Normalize a user-supplied path to the drive form: `\`-separated and
/// rooted, without empty segments.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    format!("\\{}", segments.join("\\"))
}

/// Parent of a normalized path, or `None` for the root.
pub fn parent_path(path: &str) -> Option<&str> {
    if path == "\\" {
        return None;
    }
    match path.rfind('\\') {
        Some(0) => Some("\\"),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "\\");
        assert_eq!(normalize_path("/"), "\\");
        assert_eq!(normalize_path("\\"), "\\");
        assert_eq!(normalize_path("/a/b"), "\\a\\b");
        assert_eq!(normalize_path("a\\b\\"), "\\a\\b");
        assert_eq!(normalize_path("//a//b.txt"), "\\a\\b.txt");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("\\"), None);
        assert_eq!(parent_path("\\a"), Some("\\"));
        assert_eq!(parent_path("\\a\\b"), Some("\\a"));
    }
}
