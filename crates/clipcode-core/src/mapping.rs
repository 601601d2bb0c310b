use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extension of indexed snippet files (matched case-insensitively).
pub const TEXT_EXTENSION: &str = "txt";

/// Two-part identifier of an indexed file: the owning directory's digits and
/// the lowercased remainder of the file's base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Code {
    pub digit: String,
    pub key: String,
}

impl Code {
    pub fn new(digit: impl Into<String>, key: impl AsRef<str>) -> Self {
        Self {
            digit: digit.into(),
            key: key.as_ref().to_lowercase(),
        }
    }

    /// Code formed by the sequence path: one numeral, one key character.
    pub fn from_chars(digit: char, key: char) -> Self {
        Self::new(digit.to_string(), key.to_string())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.digit, self.key)
    }
}

/// Immutable lookup table from codes to absolute file paths.
#[derive(Debug, Clone, Default)]
pub struct MappingIndex {
    entries: HashMap<Code, PathBuf>,
}

impl MappingIndex {
    /// Scans `root` once. Unreadable entries are skipped; the result may be empty.
    ///
    /// Directories and files are visited in name order, so when two files
    /// produce the same code the one sorting last wins.
    pub fn build<P: AsRef<Path>>(root: P) -> Self {
        let root = absolute(root.as_ref());
        info!("Scanning {} for files...", root.display());

        let mut index = Self::default();
        for (digit, dir) in sorted_entries(&root) {
            if !dir.is_dir() || digit.is_empty() || !digit.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            for (file_name, path) in sorted_entries(&dir) {
                if !path.is_file() {
                    continue;
                }
                let Some(stem) = text_stem(&file_name) else {
                    continue;
                };
                let Some(rest) = stem.strip_prefix(digit.as_str()) else {
                    debug!("Skipping {}: does not start with {}", file_name, digit);
                    continue;
                };
                if rest.is_empty() {
                    continue;
                }
                index.insert(Code::new(digit.clone(), rest), path);
            }
        }

        info!("Indexed {} file(s)", index.len());
        index
    }

    fn insert(&mut self, code: Code, path: PathBuf) {
        if let Some(previous) = self.entries.insert(code.clone(), path) {
            warn!(
                "Code {} registered twice; {} is replaced by {}",
                code,
                previous.display(),
                self.entries[&code].display()
            );
        }
    }

    pub fn get(&self, code: &Code) -> Option<&Path> {
        self.entries.get(code).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&Code, &Path)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(code, path)| (code, path.as_path()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

impl FromIterator<(Code, PathBuf)> for MappingIndex {
    fn from_iter<I: IntoIterator<Item = (Code, PathBuf)>>(iter: I) -> Self {
        let mut index = Self::default();
        for (code, path) in iter {
            index.insert(code, path);
        }
        index
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Readable children of `dir` as (file name, path), sorted by name.
/// Entries that cannot be read or whose names are not UTF-8 are dropped.
fn sorted_entries(dir: &Path) -> Vec<(String, PathBuf)> {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warn!("Cannot read directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut entries: Vec<(String, PathBuf)> = read_dir
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            Some((name, entry.path()))
        })
        .collect();
    entries.sort();
    entries
}

/// Base name of a text file, or None for any other extension.
fn text_stem(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if ext.eq_ignore_ascii_case(TEXT_EXTENSION) && !stem.is_empty() {
        Some(stem)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel).unwrap();
        path
    }

    #[test]
    fn test_indexes_matching_files_only() {
        let tmp = TempDir::new().unwrap();
        let a = touch(tmp.path(), "1/1a.txt");
        let x = touch(tmp.path(), "1/1x.txt");
        touch(tmp.path(), "1/2a.txt");

        let index = MappingIndex::build(tmp.path());
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&Code::new("1", "a")), Some(a.as_path()));
        assert_eq!(index.get(&Code::new("1", "x")), Some(x.as_path()));
        assert_eq!(index.get(&Code::new("2", "a")), None);
    }

    #[test]
    fn test_paths_are_absolute() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "3/3q.txt");
        let index = MappingIndex::build(tmp.path());
        let path = index.get(&Code::new("3", "q")).unwrap();
        assert!(path.is_absolute());
    }

    #[test]
    fn test_uppercase_name_is_lowercased() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "1/1A.txt");
        let index = MappingIndex::build(tmp.path());
        assert!(index.get(&Code::new("1", "a")).is_some());
        assert!(index.get(&Code::new("1", "A")).is_some(), "lookup is normalized too");
    }

    #[test]
    fn test_skips_non_digit_dirs_and_other_extensions() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "notes/notesa.txt");
        touch(tmp.path(), "1a/1ab.txt");
        touch(tmp.path(), "2/2b.md");
        touch(tmp.path(), "2/2.txt");
        touch(tmp.path(), "1a.txt");
        let c = touch(tmp.path(), "2/2c.TXT");

        let index = MappingIndex::build(tmp.path());
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&Code::new("2", "c")), Some(c.as_path()));
    }

    #[test]
    fn test_multi_digit_dir_and_long_remainder() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "12/12a.txt");
        touch(tmp.path(), "4/4greeting.txt");

        let index = MappingIndex::build(tmp.path());
        assert!(index.get(&Code::new("12", "a")).is_some());
        assert!(index.get(&Code::new("4", "greeting")).is_some());
    }

    #[test]
    fn test_duplicate_code_last_in_name_order_wins() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "1/1A.txt");
        let lower = touch(tmp.path(), "1/1a.txt");

        // Only observable on case-sensitive file systems.
        if fs::read_dir(tmp.path().join("1")).unwrap().count() == 2 {
            let index = MappingIndex::build(tmp.path());
            assert_eq!(index.len(), 1);
            assert_eq!(index.get(&Code::new("1", "a")), Some(lower.as_path()));
        }
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let index = MappingIndex::build(tmp.path().join("nope"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_iter_is_sorted() {
        let index: MappingIndex = vec![
            (Code::new("2", "a"), PathBuf::from("/b")),
            (Code::new("1", "b"), PathBuf::from("/a")),
            (Code::new("1", "a"), PathBuf::from("/c")),
        ]
        .into_iter()
        .collect();
        let codes: Vec<String> = index.iter().map(|(c, _)| c.to_string()).collect();
        assert_eq!(codes, vec!["1a", "1b", "2a"]);
    }
}
