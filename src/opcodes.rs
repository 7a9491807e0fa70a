use crate::config::FormatConfig;
use crate::format::{aligned_cases, render_wrapped_list};
use crate::grammar::Instruction;

/// `SPV_OC_*` cases for `instructions` in opcode order, followed by the
/// `SPV_OpcodeAttr` aggregate. Empty input renders as an empty string.
pub fn opcode_fragment(instructions: &[&Instruction], cfg: &FormatConfig) -> String {
    if instructions.is_empty() {
        return String::new();
    }

    let mut sorted = instructions.to_vec();
    sorted.sort_by_key(|inst| inst.opcode); // stable: ties keep input order

    let defs: Vec<(String, String)> = sorted
        .iter()
        .map(|inst| {
            (
                format!("SPV_OC_{}", inst.opname),
                format!("I32EnumAttrCase<\"{}\", {}>", inst.opname, inst.opcode),
            )
        })
        .collect();
    let names: Vec<&str> = defs.iter().map(|(def, _)| def.as_str()).collect();
    let list = render_wrapped_list(&names, cfg.list_indent, cfg.line_budget);

    let attr = format!(
        "def SPV_OpcodeAttr :\n    \
         I32EnumAttr<\"Opcode\", \"valid SPIR-V instructions\", [\n\
         {list}\n      \
         ]> {{\n    \
         let returnType = \"::mlir::spirv::Opcode\";\n    \
         let convertFromStorage = \"static_cast<::mlir::spirv::Opcode>($_self.getInt())\";\n    \
         let cppNamespace = \"::mlir::spirv\";\n\
         }}"
    );

    tracing::debug!(opcodes = sorted.len(), "generated opcode fragment");
    format!("{}\n\n{attr}", aligned_cases(&defs))
}
