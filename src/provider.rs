//! Collaborators injected into a run: where the grammar and docs come from,
//! and where definition files are read from and written to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{GenError, Result};
use crate::grammar::{DocMap, Grammar};

pub trait SpecProvider {
    fn grammar(&self) -> Result<Grammar>;
    fn docs(&self) -> Result<DocMap>;
}

/// Reads a local copy of `spirv.core.grammar.json` and an opname -> doc JSON
/// object. Without a docs file every instruction is undocumented.
#[derive(Debug, Clone)]
pub struct JsonSpecProvider {
    pub grammar_path: PathBuf,
    pub docs_path: Option<PathBuf>,
}

impl JsonSpecProvider {
    pub fn new(grammar_path: impl Into<PathBuf>, docs_path: Option<PathBuf>) -> Self {
        Self {
            grammar_path: grammar_path.into(),
            docs_path,
        }
    }
}

fn read_spec_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| GenError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

impl SpecProvider for JsonSpecProvider {
    fn grammar(&self) -> Result<Grammar> {
        Grammar::from_json(&read_spec_file(&self.grammar_path)?)
    }

    fn docs(&self) -> Result<DocMap> {
        match &self.docs_path {
            Some(path) => DocMap::from_json(&read_spec_file(path)?),
            None => Ok(DocMap::default()),
        }
    }
}

/// Grammar and docs already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSpecProvider {
    pub grammar: Grammar,
    pub docs: DocMap,
}

impl SpecProvider for StaticSpecProvider {
    fn grammar(&self) -> Result<Grammar> {
        Ok(self.grammar.clone())
    }

    fn docs(&self) -> Result<DocMap> {
        Ok(self.docs.clone())
    }
}

/// Whole-file load/store of definition files.
pub trait FileStore {
    fn read(&mut self, path: &Path) -> anyhow::Result<String>;
    fn write(&mut self, path: &Path, text: &str) -> anyhow::Result<()>;
}

pub struct DiskStore;

impl FileStore for DiskStore {
    fn read(&mut self, path: &Path) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
    fn write(&mut self, path: &Path, text: &str) -> anyhow::Result<()> {
        Ok(std::fs::write(path, text)?)
    }
}

/// In-memory files; used for dry runs and tests. Counts writes per path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub files: HashMap<PathBuf, String>,
    pub writes: HashMap<PathBuf, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), text.into());
        self
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn write_count(&self, path: impl AsRef<Path>) -> usize {
        self.writes.get(path.as_ref()).copied().unwrap_or(0)
    }
}

impl FileStore for MemoryStore {
    fn read(&mut self, path: &Path) -> anyhow::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file"))
    }
    fn write(&mut self, path: &Path, text: &str) -> anyhow::Result<()> {
        self.files.insert(path.to_path_buf(), text.to_string());
        *self.writes.entry(path.to_path_buf()).or_default() += 1;
        Ok(())
    }
}
