//! One regeneration run: every requested mode is computed against in-memory
//! copies first, and files are written only once all of them succeeded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::FormatConfig;
use crate::enums::enum_fragment;
use crate::error::{GenError, Result};
use crate::extract::{
    existing_enum_kinds, existing_opcodes, extract_op_info, MarkedSection, OpSection,
    ENUM_SECTION_MARKER, OPCODE_SECTION_MARKER, OP_DEF_SEPARATOR,
};
use crate::filter::FilterSet;
use crate::grammar::{DocMap, Grammar};
use crate::merge::{merge_enum_section, merge_op_section, merge_opcode_section};
use crate::opcodes::opcode_fragment;
use crate::ops::{op_definition, ExistingInfo, DEFAULT_CATEGORY};
use crate::provider::{FileStore, SpecProvider};

/// Which modes to run and on which files. `None` skips a mode; an empty
/// name or list refreshes what the file already holds.
#[derive(Debug, Clone)]
pub struct Request {
    pub base_path: Option<PathBuf>,
    pub ops_path: Option<PathBuf>,
    pub new_enum: Option<String>,
    pub new_opcodes: Option<Vec<String>>,
    pub new_inst: Option<Vec<String>>,
    pub inst_category: String,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            base_path: None,
            ops_path: None,
            new_enum: None,
            new_opcodes: None,
            new_inst: None,
            inst_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl Request {
    pub fn validate(&self) -> Result<()> {
        if self.base_path.is_none() {
            if self.new_enum.is_some() {
                return Err(GenError::MissingTargetPath("enum generation"));
            }
            if self.new_opcodes.is_some() {
                return Err(GenError::MissingTargetPath("opcode generation"));
            }
        }
        if self.ops_path.is_none() && self.new_inst.is_some() {
            return Err(GenError::MissingTargetPath("op generation"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub written: Vec<PathBuf>,
    pub enums: Option<FilterSet>,
    pub opcodes: Option<FilterSet>,
    pub ops: Option<FilterSet>,
}

fn log_filter(section: &str, filter: &FilterSet) {
    if filter.is_empty() {
        info!(section, "section is empty; nothing to regenerate");
        return;
    }
    let added: Vec<&str> = filter.added().collect();
    info!(section, total = filter.len(), added = ?added, "regenerating");
    for name in filter.names() {
        debug!(section, name, provenance = ?filter.provenance(name), "filter entry");
    }
}

/// Regenerates the enum section of a base definitions file.
pub fn regenerate_enums(
    text: &str,
    grammar: &Grammar,
    requested: &[String],
    cfg: &FormatConfig,
) -> Result<(String, FilterSet)> {
    let section = MarkedSection::split(text, ENUM_SECTION_MARKER)?;
    let filter = FilterSet::union(requested.iter().cloned(), existing_enum_kinds(section.body));
    log_filter("enum", &filter);

    let mut fragments = Vec::with_capacity(filter.len());
    for name in filter.names() {
        let kind = grammar
            .operand_kind(name)
            .ok_or_else(|| GenError::UnknownOperandKind(name.to_string()))?;
        match enum_fragment(kind, cfg) {
            Some(f) => fragments.push(f),
            None => warn!(kind = name, "operand kind has no enumerants; nothing to generate"),
        }
    }
    Ok((merge_enum_section(&section, fragments), filter))
}

/// Regenerates the opcode section of a base definitions file.
pub fn regenerate_opcodes(
    text: &str,
    grammar: &Grammar,
    requested: &[String],
    cfg: &FormatConfig,
) -> Result<(String, FilterSet)> {
    let section = MarkedSection::split(text, OPCODE_SECTION_MARKER)?;
    let filter = FilterSet::union(requested.iter().cloned(), existing_opcodes(section.body));
    log_filter("opcode", &filter);

    if let Some(missing) = filter.names().find(|name| grammar.instruction(name).is_none()) {
        return Err(GenError::UnknownInstruction(missing.to_string()));
    }
    // Grammar order, so opcode aliases keep their relative order after sorting.
    let instructions: Vec<_> = grammar
        .instructions()
        .iter()
        .filter(|inst| filter.contains(&inst.opname))
        .collect();
    let fragment = opcode_fragment(&instructions, cfg);
    Ok((merge_opcode_section(&section, &fragment), filter))
}

/// Regenerates every op record of an ops definitions file, keeping the
/// hand-written sections of the ops already there.
pub fn regenerate_ops(
    text: &str,
    grammar: &Grammar,
    docs: &DocMap,
    requested: &[String],
    inst_category: &str,
    cfg: &FormatConfig,
) -> Result<(String, FilterSet)> {
    let section = OpSection::split(text, OP_DEF_SEPARATOR)?;

    let mut existing: HashMap<String, ExistingInfo> = HashMap::new();
    let mut discovered = Vec::with_capacity(section.blocks.len());
    for block in &section.blocks {
        let info = extract_op_info(block)?;
        if existing.contains_key(&info.opname) {
            warn!(opname = %info.opname, "op defined twice; keeping the first definition");
            continue;
        }
        discovered.push(info.opname.clone());
        existing.insert(info.opname.clone(), info);
    }

    let filter = FilterSet::union(requested.iter().cloned(), discovered);
    log_filter("op", &filter);

    let empty = ExistingInfo::default();
    let mut defs = Vec::with_capacity(filter.len());
    for opname in filter.names() {
        let inst = grammar
            .instruction(opname)
            .ok_or_else(|| GenError::UnknownInstruction(opname.to_string()))?;
        let doc = docs
            .get(opname)
            .ok_or_else(|| GenError::MissingDocumentation(opname.to_string()))?;
        let info = existing.get(opname).unwrap_or(&empty);
        defs.push(op_definition(inst, doc, info, inst_category, cfg)?);
    }
    Ok((merge_op_section(&section, &defs), filter))
}

fn read(store: &mut impl FileStore, path: &Path) -> Result<String> {
    store.read(path).map_err(|source| GenError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs every mode named in `req`. Nothing is written unless all of them
/// succeed; each targeted file is then written exactly once.
pub fn run<P, S>(req: &Request, provider: &P, store: &mut S, cfg: &FormatConfig) -> Result<Report>
where
    P: SpecProvider,
    S: FileStore,
{
    req.validate()?;
    let grammar = provider.grammar()?;
    let mut report = Report::default();
    let mut pending: Vec<(PathBuf, String)> = Vec::new();

    if let Some(path) = req.base_path.as_ref().filter(|_| req.new_enum.is_some() || req.new_opcodes.is_some()) {
        let mut text = read(store, path)?;
        if let Some(kind) = &req.new_enum {
            let requested: Vec<String> = if kind.is_empty() { vec![] } else { vec![kind.clone()] };
            let (out, filter) = regenerate_enums(&text, &grammar, &requested, cfg)?;
            text = out;
            report.enums = Some(filter);
        }
        if let Some(opnames) = &req.new_opcodes {
            let (out, filter) = regenerate_opcodes(&text, &grammar, opnames, cfg)?;
            text = out;
            report.opcodes = Some(filter);
        }
        pending.push((path.clone(), text));
    }

    if let (Some(opnames), Some(path)) = (&req.new_inst, &req.ops_path) {
        let docs = provider.docs()?;
        let text = read(store, path)?;
        let (out, filter) = regenerate_ops(&text, &grammar, &docs, opnames, &req.inst_category, cfg)?;
        report.ops = Some(filter);
        pending.push((path.clone(), out));
    }

    for (path, text) in pending {
        store.write(&path, &text).map_err(|source| GenError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = text.len(), "wrote definitions");
        report.written.push(path);
    }
    Ok(report)
}
