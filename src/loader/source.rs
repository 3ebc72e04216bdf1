use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::error::Result;

/// Where inbound tables come from.
///
/// An absent table is `Ok(None)`, not an error; the loader decides whether
/// the absence is fatal.
pub trait TableSource {
    fn open(&self, table: &str) -> Result<Option<Box<dyn Read + '_>>>;
}

/// Reads tables as files under a directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TableSource for DirSource {
    fn open(&self, table: &str) -> Result<Option<Box<dyn Read + '_>>> {
        let path = self.root.join(table);
        if !path.is_file() {
            return Ok(None);
        }
        let file = File::open(path)?;
        Ok(Some(Box::new(file) as Box<dyn Read + '_>))
    }
}

/// Holds tables as in-memory CSV text.
#[derive(Default)]
pub struct MemorySource {
    tables: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str, csv: &str) -> Self {
        self.tables.insert(table.to_string(), csv.to_string());
        self
    }
}

impl TableSource for MemorySource {
    fn open(&self, table: &str) -> Result<Option<Box<dyn Read + '_>>> {
        Ok(self
            .tables
            .get(table)
            .map(|csv| Box::new(csv.as_bytes()) as Box<dyn Read + '_>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_memory_source_missing_table() {
        let source = MemorySource::new().with_table("a.csv", "year\n2020\n");
        assert!(source.open("b.csv").unwrap().is_none());
        assert!(source.open("a.csv").unwrap().is_some());
    }

    #[test]
    fn test_dir_source_reads_file() {
        let dir = env::temp_dir().join("ecofusion_dir_source_test");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("t.csv"), "year\n2020\n").unwrap();

        let source = DirSource::new(&dir);
        let mut content = String::new();
        source
            .open("t.csv")
            .unwrap()
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "year\n2020\n");
        assert!(source.open("absent.csv").unwrap().is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}
