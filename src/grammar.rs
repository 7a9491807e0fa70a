//! Typed view of `spirv.core.grammar.json` and of the per-instruction docs.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GenError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    BitEnum,
    ValueEnum,
    Id,
    Literal,
    Composite,
    #[default]
    #[serde(other)]
    Other,
}

/// Per-operand cardinality; absent in the grammar means exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quantifier {
    #[default]
    #[serde(rename = "")]
    Exactly1,
    #[serde(rename = "?")]
    Optional,
    #[serde(rename = "*")]
    Variadic,
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantifier::Exactly1 => f.write_str("exactly one"),
            Quantifier::Optional => f.write_str("optional"),
            Quantifier::Variadic => f.write_str("variadic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enumerant {
    pub symbol: String,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperandKind {
    pub name: String,
    pub category: Category,
    pub enumerants: Vec<Enumerant>,
}

impl OperandKind {
    pub fn is_bit_enum(&self) -> bool {
        self.category == Category::BitEnum
    }

    /// Enumerants with duplicate values dropped; the first spelling of a value wins.
    pub fn unique_enumerants(&self) -> Vec<&Enumerant> {
        let mut seen = HashSet::new();
        self.enumerants
            .iter()
            .filter(|e| seen.insert(e.value))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    pub kind: String,
    #[serde(default)]
    pub quantifier: Quantifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Operand {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            quantifier: Quantifier::Exactly1,
            name: None,
        }
    }

    pub fn named(kind: &str, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new(kind)
        }
    }

    pub fn with_quantifier(mut self, quantifier: Quantifier) -> Self {
        self.quantifier = quantifier;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Instruction {
    pub opname: String,
    pub opcode: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub operands: Vec<Operand>,
}

#[derive(Deserialize)]
struct RawGrammar {
    #[serde(default)]
    operand_kinds: Vec<RawOperandKind>,
    #[serde(default)]
    instructions: Vec<RawInstruction>,
}

#[derive(Deserialize)]
struct RawOperandKind {
    kind: Option<String>,
    #[serde(default)]
    category: Category,
    #[serde(default)]
    enumerants: Vec<RawEnumerant>,
}

#[derive(Deserialize)]
struct RawEnumerant {
    enumerant: Option<String>,
    #[serde(default)]
    value: Value,
}

#[derive(Deserialize)]
struct RawInstruction {
    opname: Option<String>,
    opcode: Option<u32>,
    class: Option<String>,
    #[serde(default)]
    operands: Vec<Operand>,
}

/// Operand kinds and instructions of one grammar revision, in file order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Grammar {
    operand_kinds: Vec<OperandKind>,
    instructions: Vec<Instruction>,
}

impl Grammar {
    pub fn new(operand_kinds: Vec<OperandKind>, instructions: Vec<Instruction>) -> Self {
        Self {
            operand_kinds,
            instructions,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| GenError::MalformedSpec(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawGrammar = serde_json::from_value(value)
            .map_err(|e| GenError::MalformedSpec(e.to_string()))?;

        let mut operand_kinds = Vec::with_capacity(raw.operand_kinds.len());
        for (i, k) in raw.operand_kinds.into_iter().enumerate() {
            let name = k
                .kind
                .ok_or_else(|| GenError::MalformedSpec(format!("operand kind #{i} has no `kind`")))?;
            let mut enumerants = Vec::with_capacity(k.enumerants.len());
            for e in k.enumerants {
                let symbol = e.enumerant.ok_or_else(|| {
                    GenError::MalformedSpec(format!("{name}: enumerant without a name"))
                })?;
                let value = parse_value(&e.value).ok_or_else(|| {
                    GenError::MalformedSpec(format!("{name}.{symbol}: bad value {}", e.value))
                })?;
                enumerants.push(Enumerant { symbol, value });
            }
            operand_kinds.push(OperandKind {
                name,
                category: k.category,
                enumerants,
            });
        }

        let mut instructions = Vec::with_capacity(raw.instructions.len());
        for (i, inst) in raw.instructions.into_iter().enumerate() {
            let opname = inst
                .opname
                .ok_or_else(|| GenError::MalformedSpec(format!("instruction #{i} has no `opname`")))?;
            let opcode = inst
                .opcode
                .ok_or_else(|| GenError::MalformedSpec(format!("{opname} has no `opcode`")))?;
            instructions.push(Instruction {
                opname,
                opcode,
                class: inst.class,
                operands: inst.operands,
            });
        }

        tracing::debug!(
            kinds = operand_kinds.len(),
            instructions = instructions.len(),
            "loaded SPIR-V grammar"
        );
        Ok(Self {
            operand_kinds,
            instructions,
        })
    }

    pub fn operand_kinds(&self) -> &[OperandKind] {
        &self.operand_kinds
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn operand_kind(&self, name: &str) -> Option<&OperandKind> {
        self.operand_kinds.iter().find(|k| k.name == name)
    }

    pub fn instruction(&self, opname: &str) -> Option<&Instruction> {
        self.instructions.iter().find(|i| i.opname == opname)
    }
}

// Bit enums spell values as hex strings, value enums as plain numbers.
fn parse_value(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => {
            let s = s.trim();
            if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                s.parse::<u32>().ok()
            }
        }
        _ => None,
    }
}

/// Instruction documentation keyed by opname (`OpLoad` ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocMap(BTreeMap<String, String>);

impl DocMap {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GenError::MalformedSpec(format!("docs: {e}")))
    }

    pub fn insert(&mut self, opname: &str, doc: &str) {
        self.0.insert(opname.to_string(), doc.to_string());
    }

    pub fn get(&self, opname: &str) -> Option<&str> {
        self.0.get(opname).map(String::as_str)
    }
}
