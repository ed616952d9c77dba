use anyhow::{Context, Result};
use cykplus_core::{Label, MemoryRuleTable};
use std::path::Path;

/// Extension of compiled rule tables.
pub const COMPILED_EXT: &str = "bin";

/// Load a table, compiled or text, named after the file stem.
pub fn load_table(path: &Path, default_lhs: &Label) -> Result<MemoryRuleTable> {
    let compiled = path.extension().and_then(|s| s.to_str()) == Some(COMPILED_EXT);
    let table = if compiled {
        MemoryRuleTable::load_bincode(path)
    } else {
        MemoryRuleTable::load_text_file(path, default_lhs)
    };
    table.with_context(|| format!("loading rule table {}", path.display()))
}

pub fn run(input: &Path, output: &Path, default_lhs: &str) -> Result<usize> {
    let table = MemoryRuleTable::load_text_file(input, &Label::new(default_lhs))
        .with_context(|| format!("reading {}", input.display()))?;
    table
        .save_bincode(output)
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(table.len())
}
