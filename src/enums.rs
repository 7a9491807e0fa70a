use serde::Serialize;

use crate::config::FormatConfig;
use crate::format::{acronym, aligned_cases, render_wrapped_list};
use crate::grammar::OperandKind;

/// Generated TableGen text for one operand kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumFragment {
    pub kind: String,
    pub text: String,
}

/// Case definitions plus the `SPV_<Kind>Attr` enum attribute for `kind`.
/// Returns `None` for kinds without enumerants (ids, literals, composites).
pub fn enum_fragment(kind: &OperandKind, cfg: &FormatConfig) -> Option<EnumFragment> {
    let cases = kind.unique_enumerants();
    if cases.is_empty() {
        return None;
    }

    let name = &kind.name;
    let category = if kind.is_bit_enum() { "Bit" } else { "I32" };
    let acr = acronym(name);

    let defs: Vec<(String, String)> = cases
        .iter()
        .map(|e| {
            (
                format!("SPV_{acr}_{}", e.symbol),
                format!("{category}EnumAttrCase<\"{}\", {}>", e.symbol, e.value),
            )
        })
        .collect();
    let case_names: Vec<&str> = defs.iter().map(|(def, _)| def.as_str()).collect();
    let case_list = render_wrapped_list(&case_names, cfg.list_indent, cfg.line_budget);

    let attr = format!(
        "def SPV_{name}Attr :\n    \
         {category}EnumAttr<\"{name}\", \"valid SPIR-V {name}\", [\n\
         {case_list}\n    \
         ]> {{\n  \
         let returnType = \"::mlir::spirv::{name}\";\n  \
         let convertFromStorage = \"static_cast<::mlir::spirv::{name}>($_self.getInt())\";\n  \
         let cppNamespace = \"::mlir::spirv\";\n\
         }}"
    );

    tracing::debug!(kind = %name, cases = cases.len(), "generated enum fragment");
    Some(EnumFragment {
        kind: name.clone(),
        text: format!("{}\n\n{attr}", aligned_cases(&defs)),
    })
}
