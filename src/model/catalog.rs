//! Ordered class catalog with stable index assignment.

use std::io;
use std::path::Path;

use crate::constants::DEFAULT_CLASSES;

/// The ordered set of class names shared by every annotation format.
///
/// Indices are assigned by position and stay stable for the lifetime of the
/// catalog; YOLO class indices and COCO category ids both resolve against
/// this ordering.
#[derive(Debug, Clone, Default)]
pub struct ClassCatalog {
    names: Vec<String>,
}

impl ClassCatalog {
    /// Build a catalog from an ordered list of names, dropping blanks.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .filter(|n: &String| !n.trim().is_empty())
                .collect(),
        }
    }

    /// Load the catalog from a classes file, one name per line.
    ///
    /// If the file does not exist, the default catalog is written there and
    /// returned, so a fresh working directory is immediately usable.
    pub fn load_or_default(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            let contents = DEFAULT_CLASSES.join("\n");
            std::fs::write(path, &contents)?;
            log::info!("Wrote default class catalog to {:?}", path);
            return Ok(Self::from_names(DEFAULT_CLASSES.iter().copied()));
        }

        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_names(contents.lines().map(str::trim));
        log::info!("Loaded {} classes from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Index of a class name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Class name at an index, if in range.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_assignment_is_positional() {
        let catalog = ClassCatalog::from_names(["dog", "person", "cat"]);
        assert_eq!(catalog.index_of("dog"), Some(0));
        assert_eq!(catalog.index_of("cat"), Some(2));
        assert_eq!(catalog.name_at(1), Some("person"));
        assert_eq!(catalog.name_at(3), None);
        assert_eq!(catalog.index_of("bird"), None);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let catalog = ClassCatalog::from_names(["dog", "", "  ", "cat"]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.index_of("cat"), Some(1));
    }

    #[test]
    fn test_load_writes_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.txt");

        let catalog = ClassCatalog::load_or_default(&path).unwrap();
        assert_eq!(
            catalog.iter().collect::<Vec<_>>(),
            vec!["dog", "person", "cat", "tv", "car"]
        );

        // The default file must now exist and reload identically.
        let reloaded = ClassCatalog::load_or_default(&path).unwrap();
        assert_eq!(reloaded.len(), catalog.len());
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.txt");
        std::fs::write(&path, "boat\nplane\n").unwrap();

        let catalog = ClassCatalog::load_or_default(&path).unwrap();
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["boat", "plane"]);
    }
}
