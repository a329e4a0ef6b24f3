//! SysY compiler CLI
//!
//! Compiles a SysY source file to LLVM text IR:
//! `sysyc <input-file> <output-file>`. Exits 0 on success and 1 on
//! argument, I/O, or syntax errors.

use clap::{CommandFactory, Parser as ClapParser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(name = "sysyc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SysY compiler - lower SysY source to LLVM text IR", long_about = None)]
struct Cli {
    /// Input SysY source file
    #[arg(required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Output LLVM IR file
    #[arg(required_unless_present = "completions")]
    output: Option<PathBuf>,

    /// Generate a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Missing or invalid arguments exit 1; --help/--version exit 0
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "sysyc", &mut io::stdout());
        return;
    }

    let (Some(input), Some(output)) = (cli.input, cli.output) else {
        eprintln!("Usage: sysyc <input-file> <output-file>");
        process::exit(1);
    };

    match sysyc::compile_file(&input, &output) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
