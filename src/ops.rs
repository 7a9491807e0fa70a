//! Op records (`def SPV_<Name>Op : SPV_<Category><...>`) derived from the
//! instruction grammar and its documentation.

use serde::Serialize;

use crate::config::FormatConfig;
use crate::error::{GenError, Result};
use crate::format::{normalize_identifier, wrap_paragraph};
use crate::grammar::{Instruction, Operand, Quantifier};

/// Operand kinds with no argument mapping yet.
pub const UNIMPLEMENTED_KINDS: &[&str] = &[
    "LiteralString",
    "LiteralContextDependentNumber",
    "LiteralExtInstInteger",
    "LiteralSpecConstantOpInteger",
    "PairLiteralIntegerIdRef",
    "PairIdRefLiteralInteger",
    "PairIdRefIdRef",
];

pub const DEFAULT_CATEGORY: &str = "Op";

const DEFAULT_ASSEMBLY: &str = "\n    ``` {.ebnf}\n    [TODO]\n    ```\n\n    For example:\n\n    ```\n    [TODO]\n    ```\n  ";

/// Hand-written sections recovered from a previous op definition. A field
/// that is `Some` replaces whatever would be derived from the grammar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExistingInfo {
    pub opname: String,
    pub category_args: Option<String>,
    pub traits: Option<String>,
    pub assembly: Option<String>,
    pub arguments: Option<String>,
    pub results: Option<String>,
    pub extras: Option<String>,
}

/// Maps one grammar operand to an ODS argument, `<Type>:$<name>`.
pub fn map_operand(opname: &str, operand: &Operand) -> Result<String> {
    use Quantifier::*;

    let kind = operand.kind.as_str();
    let q = operand.quantifier;
    let unimplemented = || GenError::UnimplementedOperandKind {
        opname: opname.to_string(),
        kind: kind.to_string(),
    };

    let arg_type = match kind {
        // These encode results and never become arguments.
        "IdResultType" | "IdResult" => return Err(unimplemented()),
        "IdRef" => match q {
            Exactly1 => "SPV_Type".to_string(),
            Optional => "SPV_Optional<SPV_Type>".to_string(),
            Variadic => "Variadic<SPV_Type>".to_string(),
        },
        // TODO: constrain these to values produced by OpConstant.
        "IdMemorySemantics" | "IdScope" => {
            if q != Exactly1 {
                return Err(GenError::UnsupportedQuantifier {
                    opname: opname.to_string(),
                    kind: kind.to_string(),
                    quantifier: q,
                });
            }
            "I32".to_string()
        }
        "LiteralInteger" => match q {
            Exactly1 => "I32Attr".to_string(),
            Optional => "OptionalAttr<I32Attr>".to_string(),
            Variadic => "OptionalAttr<I32ArrayAttr>".to_string(),
        },
        k if UNIMPLEMENTED_KINDS.contains(&k) => return Err(unimplemented()),
        // Everything else is an enum operand, carried as an op attribute.
        _ => match q {
            Exactly1 => format!("SPV_{kind}Attr"),
            Optional => format!("OptionalAttr<SPV_{kind}Attr>"),
            Variadic => {
                return Err(GenError::InvalidVariadicEnum {
                    opname: opname.to_string(),
                    kind: kind.to_string(),
                })
            }
        },
    };

    let name = match operand.name.as_deref() {
        Some(n) if !n.is_empty() => normalize_identifier(n),
        _ => kind.to_lowercase(),
    };
    Ok(format!("{arg_type}:${name}"))
}

fn render_summary(summary: &str, cfg: &FormatConfig) -> String {
    let summary = summary.trim();
    if summary.chars().count() + "  let summary = \"\";".len() <= cfg.line_budget {
        format!("\"{summary}\"")
    } else {
        format!(
            "[{{\n{}\n  }}]",
            wrap_paragraph(summary, cfg.wrap_width, cfg.wrap_indent)
        )
    }
}

fn render_description(body: &str, cfg: &FormatConfig) -> String {
    body.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| wrap_paragraph(line, cfg.wrap_width, cfg.wrap_indent))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full TableGen op record for `inst`. Only the plain `Op` category spells
/// out `arguments`/`results`; other categories inherit them from their base
/// class.
pub fn op_definition(
    inst: &Instruction,
    doc: &str,
    existing: &ExistingInfo,
    inst_category: &str,
    cfg: &FormatConfig,
) -> Result<String> {
    let opname = inst.opname.strip_prefix("Op").unwrap_or(&inst.opname);

    let category_args = existing
        .category_args
        .as_deref()
        .unwrap_or("")
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    let traits = existing.traits.as_deref().unwrap_or("");

    let (summary, body) = doc.split_once('\n').unwrap_or((doc, ""));
    let summary = render_summary(summary, cfg);
    let description = render_description(body, cfg);
    let assembly = existing.assembly.as_deref().unwrap_or(DEFAULT_ASSEMBLY);

    let mut out = format!(
        "def SPV_{opname}Op : SPV_{inst_category}<\"{opname}\"{category_args}, [{traits}]> {{\n  \
         let summary = {summary};\n\n  \
         let description = [{{\n{description}\n\n    \
         ### Custom assembly form\n{assembly}}}];\n"
    );

    if inst_category == DEFAULT_CATEGORY {
        let mut operands = inst.operands.as_slice();

        let mut results = String::new();
        if let Some((first, rest)) = operands.split_first() {
            if first.kind == "IdResultType" {
                results = "\n    SPV_Type:$result\n  ".to_string();
                operands = rest;
            }
        }
        if let Some(r) = &existing.results {
            results = r.clone();
        }

        if let Some((first, rest)) = operands.split_first() {
            if first.kind == "IdResult" {
                operands = rest;
            }
        }

        let arguments = match &existing.arguments {
            Some(a) => a.clone(),
            None => {
                let args = operands
                    .iter()
                    .map(|o| map_operand(&inst.opname, o))
                    .collect::<Result<Vec<_>>>()?;
                if args.is_empty() {
                    String::new()
                } else {
                    format!("\n    {}\n  ", args.join(",\n    "))
                }
            }
        };

        out.push_str(&format!(
            "\n  let arguments = (ins{arguments});\n\n  let results = (outs{results});\n"
        ));
    }

    out.push_str(existing.extras.as_deref().unwrap_or(""));
    out.push_str("}\n");

    tracing::debug!(opname = %inst.opname, preserved = existing.opname == inst.opname, "generated op definition");
    Ok(out)
}
