pub mod config;
pub mod enums;
pub mod error;
pub mod extract;
pub mod filter;
pub mod format;
pub mod grammar;
pub mod merge;
pub mod opcodes;
pub mod ops;
pub mod provider;
pub mod update;

pub use config::FormatConfig;
pub use error::{GenError, Result};
pub use grammar::{DocMap, Grammar, Instruction, Operand, OperandKind, Quantifier};
pub use provider::{DiskStore, FileStore, JsonSpecProvider, MemoryStore, SpecProvider, StaticSpecProvider};
pub use update::{run, Report, Request};
