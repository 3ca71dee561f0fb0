use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use gloss_compiler::{parse, GoEmitter, Lexer};

#[derive(Parser, Debug)]
#[command(name = "glossc")]
#[command(about = "Gloss compiler (front-end)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a source file and print a brief summary
    Parse { file: PathBuf },
    /// Dump the token stream of a source file
    Tokens { file: PathBuf },
    /// Parse a source file and emit Go source on stdout
    Compile { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Parse { file } => {
            let source = fs::read(&file).expect("failed to read file");
            let (source_file, diagnostics) = parse(&source);
            for diag in diagnostics.messages() {
                eprintln!("{diag}");
            }
            if diagnostics.has_errors() {
                std::process::exit(1);
            }
            println!("Parsed OK: {} declarations", source_file.declarations.len());
        }
        Command::Tokens { file } => {
            let source = fs::read(&file).expect("failed to read file");
            let (tokens, diagnostics) = Lexer::new(&source).tokenize();
            for (i, tok) in tokens.iter().enumerate() {
                println!(
                    "{:03} {:?} {:?} at {}:{}",
                    i, tok.kind, tok.literal, tok.line, tok.column
                );
            }
            for diag in diagnostics.messages() {
                eprintln!("{diag}");
            }
            if diagnostics.has_errors() {
                std::process::exit(1);
            }
        }
        Command::Compile { file } => {
            let source = fs::read(&file).expect("failed to read file");
            let (source_file, diagnostics) = parse(&source);
            if diagnostics.has_errors() {
                for diag in diagnostics.messages() {
                    eprintln!("{diag}");
                }
                std::process::exit(1);
            }
            let stdout = std::io::stdout();
            let mut emitter = GoEmitter::new(stdout.lock());
            emitter.emit(&source_file).expect("failed to write output");
        }
    }
}
