//! Driver path helpers.
//!
//! Driver paths arrive backslash-separated and rooted at the volume
//! (`\dir\file.txt`). They are translated to repository paths by separator
//! replacement only.

use cmisdrive_core::RepoPath;

/// Translate a driver path to the repository path it addresses.
#[inline]
pub fn to_repo_path(driver_path: &str) -> RepoPath {
    RepoPath::from_driver_path(driver_path)
}

/// True for the volume root (`\` or the empty path).
pub fn is_root(driver_path: &str) -> bool {
    driver_path.is_empty() || driver_path == "\\"
}

/// Match a file name against a driver search pattern.
///
/// `*` matches any run of characters and `?` exactly one. Matching ignores
/// ASCII case, as directory searches on the driver side do.
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    if pattern.is_empty() || pattern == "*" || pattern == "*.*" {
        return true;
    }
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let name: Vec<char> = name.chars().map(|c| c.to_ascii_lowercase()).collect();

    // Iterative wildcard match with single-star backtracking
    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match star {
                Some((sp, sn)) => {
                    p = sp + 1;
                    n = sn + 1;
                    star = Some((sp, sn + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_repo_path() {
        assert_eq!(to_repo_path("\\docs\\a.txt").as_str(), "/docs/a.txt");
        assert!(to_repo_path("\\").is_root());
    }

    #[test]
    fn test_is_root() {
        assert!(is_root("\\"));
        assert!(is_root(""));
        assert!(!is_root("\\a"));
    }

    #[test]
    fn test_match_everything() {
        for pattern in ["", "*", "*.*"] {
            assert!(matches_pattern(pattern, "anything.txt"));
            assert!(matches_pattern(pattern, "noext"));
        }
    }

    #[test]
    fn test_match_wildcards() {
        assert!(matches_pattern("*.txt", "notes.txt"));
        assert!(!matches_pattern("*.txt", "notes.md"));
        assert!(matches_pattern("re?ort*", "report-2024.pdf"));
        assert!(!matches_pattern("re?ort", "reort"));
        assert!(matches_pattern("a*b*c", "aXXbYYc"));
        assert!(!matches_pattern("a*b*c", "aXXbYY"));
    }

    #[test]
    fn test_match_ignores_ascii_case() {
        assert!(matches_pattern("README.*", "readme.md"));
        assert!(matches_pattern("exact", "EXACT"));
    }

    #[test]
    fn test_match_unicode_names() {
        assert!(matches_pattern("r?sum?.docx", "résumé.docx"));
    }
}
