use std::path::PathBuf;

use crate::grammar::Quantifier;

pub type Result<T, E = GenError> = std::result::Result<T, E>;

/// Every failure aborts the whole run; nothing is written once one of these is raised.
#[derive(thiserror::Error, Debug)]
pub enum GenError {
    #[error("malformed SPIR-V grammar: {0}")]
    MalformedSpec(String),
    #[error("{opname}: operand kind `{kind}` cannot be {quantifier}")]
    UnsupportedQuantifier {
        opname: String,
        kind: String,
        quantifier: Quantifier,
    },
    #[error("{opname}: operand kind `{kind}` is not supported yet")]
    UnimplementedOperandKind { opname: String, kind: String },
    #[error("{opname}: enum operand `{kind}` cannot be variadic")]
    InvalidVariadicEnum { opname: String, kind: String },
    #[error("marker `{marker}` must appear twice, found {found}")]
    MarkerNotFound { marker: String, found: usize },
    #[error("marker `{marker}` is ambiguous: found {found} occurrences")]
    AmbiguousMarker { marker: String, found: usize },
    #[error("cannot find `{end}` after `{start}`")]
    DelimiterNotFound { start: String, end: String },
    #[error("expected exactly one op definition per block, found {found}")]
    OpDefinitionCount { found: usize },
    #[error("unknown operand kind `{0}`")]
    UnknownOperandKind(String),
    #[error("unknown instruction `{0}`")]
    UnknownInstruction(String),
    #[error("no documentation for `{0}`")]
    MissingDocumentation(String),
    #[error("{0} requires a target file path")]
    MissingTargetPath(&'static str),
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
