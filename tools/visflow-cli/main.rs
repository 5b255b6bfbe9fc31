use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::time::Instant;
use visflow::prelude::*;

/// Compiles and inspects saved visual programs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a program specification into a script
    Compile {
        /// Path to the program specification JSON file
        spec_path: String,
        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Literal syntax of the target language
        #[arg(short, long, value_enum, default_value_t = TargetCli::Javascript)]
        target: TargetCli,
        /// Maximum depth of nested data sources
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Print a program specification as a tree
    Tree {
        /// Path to the program specification JSON file
        spec_path: String,
    },
    /// Rebuild the graph from a specification and report what could not be restored
    Check {
        /// Path to the program specification JSON file
        spec_path: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetCli {
    Javascript,
    Python,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            spec_path,
            output,
            target,
            max_depth,
        } => run_compile(&spec_path, output, target, max_depth),
        Command::Tree { spec_path } => {
            let spec = load_spec(&spec_path);
            print!("{}", DisplaySpec { spec: &spec });
        }
        Command::Check { spec_path } => run_check(&spec_path),
    }
}

fn run_compile(spec_path: &str, output: Option<String>, target: TargetCli, max_depth: Option<usize>) {
    let spec = load_spec(spec_path);

    let mut builder = Compiler::builder();
    builder = match target {
        TargetCli::Javascript => builder.with_literal_formatter(QuotingTable::javascript()),
        TargetCli::Python => builder.with_literal_formatter(QuotingTable::python()),
    };
    if let Some(depth) = max_depth {
        builder = builder.with_max_depth(depth);
    }
    let compiler = builder.build();

    let compile_start = Instant::now();
    let program = compiler
        .compile(&spec)
        .unwrap_or_else(|e| exit_with_error(&format!("Compilation failed: {}", e)));
    let compile_duration = compile_start.elapsed();

    match output {
        Some(path) => {
            fs::write(&path, &program.script).unwrap_or_else(|e| {
                exit_with_error(&format!("Could not write to file '{}': {}", path, e))
            });
            println!(
                "Compiled {} flows ({} hoisted functions) into '{}' in {:?}",
                spec.flows.len(),
                program.functions.len(),
                path,
                compile_duration
            );
        }
        None => println!("{}", program.script),
    }
}

fn run_check(spec_path: &str) {
    let spec = load_spec(spec_path);
    let mut session = GraphSession::default();
    let report = import(&mut session, &NodeRegistry::standard(), &spec);

    println!("Nodes restored:   {}", report.nodes.len());
    println!("Connectors:       {}", session.connector_count());
    println!("Skipped nodes:    {}", report.skipped_nodes.len());
    for uid in &report.skipped_nodes {
        println!("  -> {}", uid);
    }
    println!("Skipped edges:    {}", report.skipped_edges);
    if !report.skipped_nodes.is_empty() || report.skipped_edges > 0 {
        std::process::exit(2);
    }
}

fn load_spec(path: &str) -> ProgramSpec {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read specification file '{}': {}", path, e))
    });
    ProgramSpec::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse specification: {}", e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
