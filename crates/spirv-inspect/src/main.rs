use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use std::path::{Path, PathBuf};

use spirv_dialect_gen::enums::enum_fragment;
use spirv_dialect_gen::opcodes::opcode_fragment;
use spirv_dialect_gen::ops::{op_definition, ExistingInfo};
use spirv_dialect_gen::{DocMap, FormatConfig, Grammar};

#[derive(Parser, Debug)]
#[command(author, version, about = "SPIR-V grammar inspector", long_about=None)]
struct Cli {
    /// Local copy of spirv.core.grammar.json
    #[arg(value_name = "GRAMMAR")]
    grammar: PathBuf,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List operand kinds with their category and number of distinct values
    Kinds,
    /// List instructions, optionally only one grammar class
    Instructions {
        #[arg(long)]
        class: Option<String>,
    },
    /// Preview the enum attribute generated for an operand kind
    Enum { kind: String },
    /// Preview the opcode enum for a set of instructions
    Opcodes {
        #[arg(value_name = "OPNAME", num_args = 1..)]
        opnames: Vec<String>,
    },
    /// Preview a freshly generated op definition
    Op {
        opname: String,
        /// JSON object mapping opnames to documentation
        #[arg(long, value_name = "FILE")]
        docs: Option<PathBuf>,
        #[arg(long, default_value = "Op")]
        inst_category: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Clone, Serialize)]
struct KindRow { name: String, category: String, values: usize }

#[derive(Debug, Clone, Serialize)]
struct InstRow { opname: String, opcode: u32, class: Option<String>, operands: usize }

#[derive(Debug, Clone, Serialize)]
struct Preview { name: String, text: String }

fn load_grammar(path: &Path) -> Result<Grammar> {
    let text = std::fs::read_to_string(path)?;
    Ok(Grammar::from_json(&text)?)
}

fn render<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
        OutputFormat::Text => text(),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let grammar = load_grammar(&cli.grammar)?;
    let cfg = FormatConfig::default();

    let buf = match cli.cmd {
        Command::Kinds => {
            let rows: Vec<KindRow> = grammar
                .operand_kinds()
                .iter()
                .map(|k| KindRow { name: k.name.clone(), category: format!("{:?}", k.category), values: k.unique_enumerants().len() })
                .collect();
            render(cli.format, &rows, || {
                let mut s = format!("{:<36} {:<10} {:>6}\n", "kind", "category", "values");
                for r in &rows {
                    s.push_str(&format!("{:<36} {:<10} {:>6}\n", r.name, r.category, r.values));
                }
                s
            })?
        }
        Command::Instructions { class } => {
            let rows: Vec<InstRow> = grammar
                .instructions()
                .iter()
                .filter(|i| class.is_none() || i.class == class)
                .map(|i| InstRow { opname: i.opname.clone(), opcode: i.opcode, class: i.class.clone(), operands: i.operands.len() })
                .collect();
            render(cli.format, &rows, || {
                let mut s = String::new();
                for r in &rows {
                    s.push_str(&format!("{:>5} {:<40} {}\n", r.opcode, r.opname, r.class.as_deref().unwrap_or("-")));
                }
                s
            })?
        }
        Command::Enum { kind } => {
            let k = grammar.operand_kind(&kind).ok_or_else(|| anyhow!("unknown operand kind: {kind}"))?;
            let frag = enum_fragment(k, &cfg).ok_or_else(|| anyhow!("{kind} has no enumerants"))?;
            render(cli.format, &frag, || format!("{}\n", frag.text))?
        }
        Command::Opcodes { opnames } => {
            let mut insts = Vec::new();
            for name in &opnames {
                insts.push(grammar.instruction(name).ok_or_else(|| anyhow!("unknown instruction: {name}"))?);
            }
            let text = opcode_fragment(&insts, &cfg);
            let preview = Preview { name: "Opcode".into(), text };
            render(cli.format, &preview, || format!("{}\n", preview.text))?
        }
        Command::Op { opname, docs, inst_category } => {
            let inst = grammar.instruction(&opname).ok_or_else(|| anyhow!("unknown instruction: {opname}"))?;
            let docs = match docs {
                Some(path) => DocMap::from_json(&std::fs::read_to_string(path)?)?,
                None => DocMap::default(),
            };
            let doc = docs.get(&opname).unwrap_or("");
            let text = op_definition(inst, doc, &ExistingInfo::default(), &inst_category, &cfg)?;
            let preview = Preview { name: opname, text };
            render(cli.format, &preview, || preview.text.clone())?
        }
    };

    if let Some(path) = cli.out { std::fs::write(path, buf)?; } else { print!("{}", buf); }
    Ok(())
}
