use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Layout rules of the generated TableGen text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub line_budget: usize, // max width of packed case lists and one-line summaries
    pub list_indent: usize, // indent of packed case lists inside `[ ... ]`
    pub wrap_width: usize,  // doc wrap width, indent included
    pub wrap_indent: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            line_budget: 80,
            list_indent: 6,
            wrap_width: 76,
            wrap_indent: 4,
        }
    }
}

impl FormatConfig {
    /// Reads a JSON object; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading format config {}", path.display()))?;
        let cfg = serde_json::from_str(&text)
            .with_context(|| format!("parsing format config {}", path.display()))?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: FormatConfig = serde_json::from_str(r#"{ "line_budget": 100 }"#).unwrap();
        assert_eq!(cfg.line_budget, 100);
        assert_eq!(cfg.list_indent, 6);
        assert_eq!(cfg.wrap_width, 76);
    }
}
