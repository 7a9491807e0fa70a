use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use spirv_dialect_gen::{run, DiskStore, FileStore, FormatConfig, JsonSpecProvider, MemoryStore, Request};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Update SPIR-V dialect definitions using the SPIR-V spec"
)]
struct Opts {
    /// Local copy of spirv.core.grammar.json
    #[arg(long, value_name = "FILE")]
    grammar: PathBuf,
    /// JSON object mapping opnames to their documentation text
    #[arg(long, value_name = "FILE")]
    docs: Option<PathBuf>,
    /// Path to SPIRVBase.td
    #[arg(long, value_name = "FILE")]
    base_td_path: Option<PathBuf>,
    /// Path to SPIRVOps.td (or another ops file)
    #[arg(long, value_name = "FILE")]
    op_td_path: Option<PathBuf>,
    /// SPIR-V enum to add to SPIRVBase.td (no value: refresh existing enums)
    #[arg(long, value_name = "KIND", num_args = 0..=1, default_missing_value = "")]
    new_enum: Option<String>,
    /// Opcodes to add to SPIRVBase.td (no value: refresh existing opcodes)
    #[arg(long, value_name = "OPNAME", num_args = 0..)]
    new_opcodes: Option<Vec<String>>,
    /// Instructions to add to the ops file (no value: refresh existing ops)
    #[arg(long, value_name = "OPNAME", num_args = 0..)]
    new_inst: Option<Vec<String>>,
    /// Instruction category, used as the TableGen base class `SPV_<category>`
    #[arg(long, default_value = "Op")]
    inst_category: String,
    /// JSON file overriding the output layout (line budget, indents)
    #[arg(long, value_name = "FILE")]
    format_config: Option<PathBuf>,
    /// Print the regenerated files instead of writing them
    #[arg(long)]
    dry_run: bool,
}

/// In-memory copies of the files the requested modes will rewrite.
fn dry_run_store(req: &Request, disk: &mut impl FileStore) -> Result<MemoryStore> {
    let base = req
        .base_path
        .as_ref()
        .filter(|_| req.new_enum.is_some() || req.new_opcodes.is_some());
    let ops = req.ops_path.as_ref().filter(|_| req.new_inst.is_some());

    let mut store = MemoryStore::new();
    for path in base.into_iter().chain(ops) {
        let text = disk
            .read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        store = store.with_file(path.clone(), text);
    }
    Ok(store)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let cfg = match &opts.format_config {
        Some(path) => FormatConfig::load(path)?,
        None => FormatConfig::default(),
    };
    let provider = JsonSpecProvider::new(&opts.grammar, opts.docs.clone());
    let req = Request {
        base_path: opts.base_td_path,
        ops_path: opts.op_td_path,
        new_enum: opts.new_enum,
        new_opcodes: opts.new_opcodes,
        new_inst: opts.new_inst,
        inst_category: opts.inst_category,
    };

    let report = if opts.dry_run {
        let mut store = dry_run_store(&req, &mut DiskStore)?;
        let report = run(&req, &provider, &mut store, &cfg)?;
        for path in &report.written {
            println!("==> {} <==", path.display());
            print!("{}", store.get(path).unwrap_or_default());
        }
        report
    } else {
        run(&req, &provider, &mut DiskStore, &cfg)?
    };

    if report.ops.is_some() {
        println!(
            "Done. Note that this tool just generates a template; please read the spec \
             and update traits, arguments, and results accordingly."
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_copies_only_targeted_files() {
        let mut disk = MemoryStore::new().with_file("SPIRVBase.td", "base").with_file("SPIRVOps.td", "ops");
        let req = Request {
            base_path: Some("SPIRVBase.td".into()),
            ops_path: Some("SPIRVOps.td".into()),
            new_opcodes: Some(vec![]),
            ..Request::default()
        };
        let store = dry_run_store(&req, &mut disk).unwrap();
        assert_eq!(store.get("SPIRVBase.td"), Some("base"));
        assert_eq!(store.get("SPIRVOps.td"), None);
    }

    #[test]
    fn dry_run_reports_unreadable_target() {
        let req = Request {
            ops_path: Some("missing/SPIRVOps.td".into()),
            new_inst: Some(vec![]),
            ..Request::default()
        };
        let err = dry_run_store(&req, &mut MemoryStore::new()).unwrap_err();
        assert!(format!("{err:#}").contains("reading missing/SPIRVOps.td"), "{err:#}");
    }
}
