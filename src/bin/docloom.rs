//! Command-line interface for docloom
//! This binary inspects and converts RTF files at each pipeline stage.
//!
//! Usage:
//!   docloom tokens `<path>`                    - Dump the raw token stream as JSON
//!   docloom groups `<path>`                    - Dump the group tree as JSON
//!   docloom convert `<path>` [--format `<fmt>`]  - Convert to a structured document

use clap::{Arg, Command};

use docloom::rtf;
use docloom::rtf::group::build_tree;
use docloom::rtf::tokenizer::Tokenizer;

fn main() {
    let matches = Command::new("docloom")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting and converting RTF files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens")
                .about("Dump the raw token stream as JSON")
                .arg(
                    Arg::new("path")
                        .help("Path to the RTF file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("groups")
                .about("Dump the group tree as JSON")
                .arg(
                    Arg::new("path")
                        .help("Path to the RTF file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert to a structured document")
                .arg(
                    Arg::new("path")
                        .help("Path to the RTF file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format ('json' or 'text')")
                        .default_value("json"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("tokens", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            handle_tokens_command(path);
        }
        Some(("groups", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            handle_groups_command(path);
        }
        Some(("convert", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let format = sub.get_one::<String>("format").unwrap();
            handle_convert_command(path, format);
        }
        _ => unreachable!(),
    }
}

fn read_input(path: &str) -> Vec<u8> {
    std::fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    })
}

/// Handle the tokens command
fn handle_tokens_command(path: &str) {
    let bytes = read_input(path);
    let tokens: Vec<_> = Tokenizer::new(&bytes).collect();
    print_json(&tokens);
}

/// Handle the groups command
fn handle_groups_command(path: &str) {
    let bytes = read_input(path);
    let root = build_tree(Tokenizer::new(&bytes)).unwrap_or_else(|e| {
        eprintln!("Parse error: {}", e);
        std::process::exit(1);
    });
    print_json(&root);
}

/// Handle the convert command
fn handle_convert_command(path: &str, format: &str) {
    let bytes = read_input(path);
    let document = rtf::parse(&bytes).unwrap_or_else(|e| {
        eprintln!("Parse error: {}", e);
        std::process::exit(1);
    });
    match format {
        "text" => println!("{}", document.body_text()),
        "json" => print_json(&document),
        other => {
            eprintln!("Unknown format: {}", other);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            std::process::exit(1);
        }
    }
}
