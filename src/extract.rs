//! Splits existing definition files and recovers the hand-written parts of
//! previously generated op records.

use crate::error::{GenError, Result};
use crate::ops::ExistingInfo;

pub const ENUM_SECTION_MARKER: &str = "enum section. Generated from SPIR-V spec; DO NOT MODIFY!";
pub const OPCODE_SECTION_MARKER: &str = "opcode section. Generated from SPIR-V spec; DO NOT MODIFY!";
pub const OP_DEF_SEPARATOR: &str = "\n// -----\n\n";

/// A file split around the two occurrences of a section marker: the opening
/// comment and the `// End` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedSection<'a> {
    pub marker: &'a str,
    pub prefix: &'a str,
    pub body: &'a str,
    pub suffix: &'a str,
}

impl<'a> MarkedSection<'a> {
    pub fn split(text: &'a str, marker: &'a str) -> Result<Self> {
        let found = text.matches(marker).count();
        if found < 2 {
            return Err(GenError::MarkerNotFound { marker: marker.to_string(), found });
        }
        if found > 2 {
            return Err(GenError::AmbiguousMarker { marker: marker.to_string(), found });
        }
        let mut parts = text.splitn(3, marker);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(body), Some(suffix)) => Ok(Self { marker, prefix, body, suffix }),
            _ => Err(GenError::MarkerNotFound { marker: marker.to_string(), found }),
        }
    }
}

/// The ops file: a header, one block per op, and a footer, all separated by
/// [`OP_DEF_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpSection<'a> {
    pub header: &'a str,
    pub blocks: Vec<&'a str>,
    pub footer: &'a str,
}

impl<'a> OpSection<'a> {
    pub fn split(text: &'a str, separator: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(separator).collect();
        if parts.len() < 2 {
            return Err(GenError::MarkerNotFound { marker: separator.to_string(), found: 0 });
        }
        let last = parts.len() - 1;
        Ok(Self {
            header: parts[0],
            blocks: parts[1..last].to_vec(),
            footer: parts[last],
        })
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Identifiers that directly follow `prefix`, with their byte offsets.
fn idents_after<'a>(text: &'a str, prefix: &str) -> Vec<(usize, &'a str)> {
    text.match_indices(prefix)
        .filter_map(|(idx, _)| {
            let rest = &text[idx + prefix.len()..];
            let end = rest.find(|c: char| !is_word(c)).unwrap_or(rest.len());
            (end > 0).then(|| (idx, &rest[..end]))
        })
        .collect()
}

/// Operand kinds with an `SPV_<Kind>Attr` definition in an enum section.
pub fn existing_enum_kinds(body: &str) -> Vec<String> {
    idents_after(body, "def SPV_")
        .into_iter()
        .filter_map(|(_, ident)| ident.strip_suffix("Attr"))
        .filter(|kind| !kind.is_empty())
        .map(str::to_string)
        .collect()
}

/// Opnames with an `SPV_OC_<OpName>` case in an opcode section.
pub fn existing_opcodes(body: &str) -> Vec<String> {
    idents_after(body, "def SPV_OC_")
        .into_iter()
        .map(|(_, opname)| opname.to_string())
        .collect()
}

/// Text strictly between the first `start` and the next `end`, plus what
/// follows `end`. A missing `start` yields `None` and the input unchanged; a
/// `start` without `end` means the file no longer has the expected shape.
pub fn between<'a>(base: &'a str, start: &str, end: &str) -> Result<(Option<&'a str>, &'a str)> {
    let Some(pos) = base.find(start) else {
        return Ok((None, base));
    };
    let rest = &base[pos + start.len()..];
    let stop = rest.find(end).ok_or_else(|| GenError::DelimiterNotFound {
        start: start.to_string(),
        end: end.to_string(),
    })?;
    Ok((Some(&rest[..stop]), &rest[stop + end.len()..]))
}

// `[` ... matching `]`, nested brackets allowed.
fn bracketed(text: &str) -> Option<(usize, usize)> {
    let open = text.find('[')?;
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, open + i));
                }
            }
            _ => {}
        }
    }
    None
}

/// Recovers the hand-editable sections of one op block.
pub fn extract_op_info(block: &str) -> Result<ExistingInfo> {
    let defs: Vec<(usize, &str)> = idents_after(block, "def SPV_")
        .into_iter()
        .filter_map(|(idx, ident)| ident.strip_suffix("Op").map(|name| (idx, name)))
        .filter(|(_, name)| !name.is_empty())
        .collect();
    let &[(def_pos, name)] = defs.as_slice() else {
        return Err(GenError::OpDefinitionCount { found: defs.len() });
    };

    // Header: `def SPV_<Name>Op : SPV_<Category><"<Name>"<category args>[<traits>]> {`
    let def = &block[def_pos..];
    let header_end = def.find("{\n").ok_or_else(|| GenError::DelimiterNotFound {
        start: format!("def SPV_{name}Op"),
        end: "{\\n".to_string(),
    })?;
    let header = &def[..header_end];
    let params = header
        .split_once('<')
        .map(|(_, p)| p)
        .ok_or_else(|| GenError::DelimiterNotFound {
            start: format!("def SPV_{name}Op"),
            end: "<".to_string(),
        })?;
    let (_, after_name) = between(params, "\"", "\"")?;
    let (category_args, traits) = match bracketed(after_name) {
        Some((open, close)) => (&after_name[..open], &after_name[open + 1..close]),
        None => {
            let stop = after_name.rfind('>').unwrap_or(after_name.len());
            (&after_name[..stop], "")
        }
    };

    let (assembly, rest) = between(block, "### Custom assembly form\n", "}];\n")?;
    let (arguments, rest) = between(rest, "  let arguments = (ins", ");\n")?;
    let (results, rest) = between(rest, "  let results = (outs", ");\n")?;

    let extras = rest.trim_matches(|c: char| c == ' ' || c == '}' || c == '\n');
    let extras = if extras.is_empty() {
        String::new()
    } else {
        format!("\n  {extras}\n")
    };

    Ok(ExistingInfo {
        opname: format!("Op{name}"),
        category_args: Some(category_args.to_string()),
        traits: Some(traits.to_string()),
        assembly: Some(assembly.unwrap_or("").to_string()),
        arguments: Some(arguments.unwrap_or("").to_string()),
        results: Some(results.unwrap_or("").to_string()),
        extras: Some(extras),
    })
}
