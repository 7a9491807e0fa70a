use pretty_assertions::assert_eq;
use serde_json::json;

use spirv_dialect_gen::extract::{ENUM_SECTION_MARKER, OPCODE_SECTION_MARKER};
use spirv_dialect_gen::{run, FormatConfig, Grammar, MemoryStore, Request, StaticSpecProvider};

const BASE_TD: &str = "SPIRVBase.td";

fn grammar() -> Grammar {
    Grammar::from_value(json!({
        "operand_kinds": [
            { "category": "ValueEnum", "kind": "StorageClass", "enumerants": [
                { "enumerant": "Input", "value": 1 },
                { "enumerant": "Output", "value": 3 },
                { "enumerant": "Input", "value": 1 }
            ]},
            { "category": "BitEnum", "kind": "MemoryAccess", "enumerants": [
                { "enumerant": "None", "value": "0x0000" },
                { "enumerant": "Volatile", "value": "0x0001" }
            ]},
            { "category": "Id", "kind": "IdRef" }
        ],
        "instructions": [
            { "opname": "OpNop", "opcode": 0 },
            { "opname": "OpLoad", "opcode": 61 },
            { "opname": "OpStore", "opcode": 62 }
        ]
    }))
    .unwrap()
}

fn base_file(enums: &str, opcodes: &str) -> String {
    format!(
        "//===- SPIRVBase.td ----*- tablegen -*-===//\n\n\
         include \"mlir/IR/OpBase.td\"\n\n\
         // {e}\n\n{enums}\n\n// End {e}\n\n\
         def SPV_Hand : SPV_Type;\n\n\
         // {o}\n\n{opcodes}\n\n// End {o}\n\n\
         #endif // SPIRV_BASE\n",
        e = ENUM_SECTION_MARKER,
        o = OPCODE_SECTION_MARKER,
    )
}

const STORAGE_CLASS: &str = "\
def SPV_SC_Input  : I32EnumAttrCase<\"Input\", 1>;
def SPV_SC_Output : I32EnumAttrCase<\"Output\", 3>;

def SPV_StorageClassAttr :
    I32EnumAttr<\"StorageClass\", \"valid SPIR-V StorageClass\", [
      SPV_SC_Input, SPV_SC_Output
    ]> {
  let returnType = \"::mlir::spirv::StorageClass\";
  let convertFromStorage = \"static_cast<::mlir::spirv::StorageClass>($_self.getInt())\";
  let cppNamespace = \"::mlir::spirv\";
}";

const MEMORY_ACCESS: &str = "\
def SPV_MA_None     : BitEnumAttrCase<\"None\", 0>;
def SPV_MA_Volatile : BitEnumAttrCase<\"Volatile\", 1>;

def SPV_MemoryAccessAttr :
    BitEnumAttr<\"MemoryAccess\", \"valid SPIR-V MemoryAccess\", [
      SPV_MA_None, SPV_MA_Volatile
    ]> {
  let returnType = \"::mlir::spirv::MemoryAccess\";
  let convertFromStorage = \"static_cast<::mlir::spirv::MemoryAccess>($_self.getInt())\";
  let cppNamespace = \"::mlir::spirv\";
}";

const LOAD_STORE_OPCODES: &str = "\
def SPV_OC_OpLoad  : I32EnumAttrCase<\"OpLoad\", 61>;
def SPV_OC_OpStore : I32EnumAttrCase<\"OpStore\", 62>;

def SPV_OpcodeAttr :
    I32EnumAttr<\"Opcode\", \"valid SPIR-V instructions\", [
      SPV_OC_OpLoad, SPV_OC_OpStore
      ]> {
    let returnType = \"::mlir::spirv::Opcode\";
    let convertFromStorage = \"static_cast<::mlir::spirv::Opcode>($_self.getInt())\";
    let cppNamespace = \"::mlir::spirv\";
}";

fn provider() -> StaticSpecProvider {
    StaticSpecProvider { grammar: grammar(), docs: Default::default() }
}

fn enum_request(kind: &str) -> Request {
    Request {
        base_path: Some(BASE_TD.into()),
        new_enum: Some(kind.to_string()),
        ..Request::default()
    }
}

#[test]
fn duplicate_enumerant_values_are_dropped() {
    let mut store = MemoryStore::new().with_file(BASE_TD, base_file("", ""));
    let report = run(&enum_request("StorageClass"), &provider(), &mut store, &FormatConfig::default()).unwrap();

    assert_eq!(store.get(BASE_TD).unwrap(), base_file(STORAGE_CLASS, ""));
    assert_eq!(report.written.len(), 1);
    let enums = report.enums.unwrap();
    assert_eq!(enums.added().collect::<Vec<_>>(), ["StorageClass"]);
}

#[test]
fn existing_enums_are_kept_and_sorted() {
    let mut store = MemoryStore::new().with_file(BASE_TD, base_file(STORAGE_CLASS, ""));
    run(&enum_request("MemoryAccess"), &provider(), &mut store, &FormatConfig::default()).unwrap();

    let expected = format!("{MEMORY_ACCESS}\n\n{STORAGE_CLASS}");
    assert_eq!(store.get(BASE_TD).unwrap(), base_file(&expected, ""));
}

#[test]
fn refresh_without_new_kind_is_idempotent() {
    let original = base_file(&format!("{MEMORY_ACCESS}\n\n{STORAGE_CLASS}"), LOAD_STORE_OPCODES);
    let mut store = MemoryStore::new().with_file(BASE_TD, original.clone());
    let req = Request {
        base_path: Some(BASE_TD.into()),
        new_enum: Some(String::new()),
        new_opcodes: Some(vec![]),
        ..Request::default()
    };
    run(&req, &provider(), &mut store, &FormatConfig::default()).unwrap();
    assert_eq!(store.get(BASE_TD).unwrap(), original);
}

#[test]
fn enums_and_opcodes_share_one_write() {
    let mut store = MemoryStore::new().with_file(BASE_TD, base_file("", ""));
    let req = Request {
        base_path: Some(BASE_TD.into()),
        new_enum: Some("StorageClass".into()),
        new_opcodes: Some(vec!["OpStore".into(), "OpLoad".into()]),
        ..Request::default()
    };
    let report = run(&req, &provider(), &mut store, &FormatConfig::default()).unwrap();

    assert_eq!(store.write_count(BASE_TD), 1);
    assert_eq!(store.get(BASE_TD).unwrap(), base_file(STORAGE_CLASS, LOAD_STORE_OPCODES));
    assert_eq!(report.opcodes.unwrap().len(), 2);
}

#[test]
fn new_opcodes_merge_with_existing_ones() {
    let mut store = MemoryStore::new().with_file(BASE_TD, base_file("", LOAD_STORE_OPCODES));
    let req = Request {
        base_path: Some(BASE_TD.into()),
        new_opcodes: Some(vec!["OpNop".into()]),
        ..Request::default()
    };
    run(&req, &provider(), &mut store, &FormatConfig::default()).unwrap();

    let text = store.get(BASE_TD).unwrap();
    assert!(text.contains("def SPV_OC_OpNop   : I32EnumAttrCase<\"OpNop\", 0>;\n"));
    assert!(text.contains("      SPV_OC_OpNop, SPV_OC_OpLoad, SPV_OC_OpStore\n"));
}

#[test]
fn text_outside_markers_is_untouched() {
    let original = base_file("", "");
    let mut store = MemoryStore::new().with_file(BASE_TD, original.clone());
    run(&enum_request("StorageClass"), &provider(), &mut store, &FormatConfig::default()).unwrap();
    let text = store.get(BASE_TD).unwrap();

    let head_end = original.find(ENUM_SECTION_MARKER).unwrap();
    assert_eq!(&text[..head_end], &original[..head_end]);
    let tail = original.split("// End ").nth(1).unwrap();
    let tail = &tail[tail.find('\n').unwrap()..];
    assert!(text.contains(tail));
}

#[test]
fn narrow_budget_wraps_aggregate_list() {
    let mut store = MemoryStore::new().with_file(BASE_TD, base_file("", ""));
    let cfg = FormatConfig { line_budget: 20, ..FormatConfig::default() };
    run(&enum_request("StorageClass"), &provider(), &mut store, &cfg).unwrap();
    assert!(store.get(BASE_TD).unwrap().contains("[\n      SPV_SC_Input,\n      SPV_SC_Output\n    ]>"));
}

#[test]
fn opcode_aliases_keep_grammar_order() {
    let grammar = Grammar::from_value(json!({
        "instructions": [
            { "opname": "OpReportIntersectionNV", "opcode": 5334 },
            { "opname": "OpReportIntersectionKHR", "opcode": 5334 },
            { "opname": "OpNop", "opcode": 0 }
        ]
    }))
    .unwrap();
    let provider = StaticSpecProvider { grammar, docs: Default::default() };
    let mut store = MemoryStore::new().with_file(BASE_TD, base_file("", ""));
    let req = Request {
        base_path: Some(BASE_TD.into()),
        new_opcodes: Some(vec![
            "OpReportIntersectionKHR".into(),
            "OpReportIntersectionNV".into(),
            "OpNop".into(),
        ]),
        ..Request::default()
    };
    run(&req, &provider, &mut store, &FormatConfig::default()).unwrap();

    let text = store.get(BASE_TD).unwrap();
    assert!(text.contains(
        "def SPV_OC_OpNop                   : I32EnumAttrCase<\"OpNop\", 0>;\n\
         def SPV_OC_OpReportIntersectionNV  : I32EnumAttrCase<\"OpReportIntersectionNV\", 5334>;\n\
         def SPV_OC_OpReportIntersectionKHR : I32EnumAttrCase<\"OpReportIntersectionKHR\", 5334>;\n"
    ));
    assert!(text.contains("      SPV_OC_OpNop, SPV_OC_OpReportIntersectionNV, SPV_OC_OpReportIntersectionKHR\n"));
}

#[test]
fn unknown_opcode_is_an_error() {
    let mut store = MemoryStore::new().with_file(BASE_TD, base_file("", ""));
    let req = Request {
        base_path: Some(BASE_TD.into()),
        new_opcodes: Some(vec!["OpLoad".into(), "OpMissing".into()]),
        ..Request::default()
    };
    let err = run(&req, &provider(), &mut store, &FormatConfig::default()).unwrap_err();
    assert!(matches!(err, spirv_dialect_gen::GenError::UnknownInstruction(ref op) if op == "OpMissing"));
    assert_eq!(store.write_count(BASE_TD), 0);
}
