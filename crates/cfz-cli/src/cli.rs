//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "cfz",
    version,
    about = "Generate fuzz allocators and a call-site driver for C translation units"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log errors only.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (repeat for more).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate allocator source (and a driver) for C sources.
    Generate(GenerateArgs),
    /// Dump extracted function signatures as JSON.
    Signatures(SignaturesArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// compile_commands.json to pull preprocessor flags from.
    #[arg(long, value_name = "PATH")]
    pub compile_db: Option<PathBuf>,

    /// Output name: writes <NAME>_allocs.c, <NAME>.c and
    /// config-<NAME>.json instead of printing to stdout.
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,

    /// Emit allocators only, no driver main.
    #[arg(long)]
    pub no_driver: bool,

    /// Print the extracted type maps as JSON to stderr.
    #[arg(long)]
    pub dump_maps: bool,

    /// C source files, optionally followed by preprocessor flags
    /// (-Idir, -Dname=value, ...).
    #[arg(required = true, value_name = "FILE|PP-FLAG", allow_hyphen_values = true)]
    pub inputs: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SignaturesArgs {
    /// C source files, optionally followed by preprocessor flags.
    #[arg(required = true, value_name = "FILE|PP-FLAG", allow_hyphen_values = true)]
    pub inputs: Vec<String>,
}

/// Split trailing preprocessor flags from the source-file list.
pub fn partition_inputs(inputs: &[String]) -> (Vec<PathBuf>, Vec<String>) {
    let mut files = Vec::new();
    let mut pp_args = Vec::new();
    for input in inputs {
        if input.starts_with('-') || !pp_args.is_empty() && is_flag_value(&pp_args, input) {
            pp_args.push(input.clone());
        } else {
            files.push(PathBuf::from(input));
        }
    }
    (files, pp_args)
}

/// A bare token directly after a flag that takes a separate argument
/// belongs to that flag, not to the file list.
fn is_flag_value(pp_args: &[String], _token: &str) -> bool {
    matches!(
        pp_args.last().map(String::as_str),
        Some("-I" | "-D" | "-U" | "-include" | "-imacros" | "-isystem" | "-iquote" | "-idirafter" | "-x")
    )
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn generate_parses_files_and_flags() {
        let cli = Cli::parse_from([
            "cfz", "generate", "-o", "out", "a.c", "b.c", "-Iinclude", "-DDEBUG=1",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.output.as_deref(), Some("out"));
        let (files, pp_args) = partition_inputs(&args.inputs);
        assert_eq!(files, vec![PathBuf::from("a.c"), PathBuf::from("b.c")]);
        assert_eq!(pp_args, vec!["-Iinclude", "-DDEBUG=1"]);
    }

    #[test]
    fn separate_flag_arguments_stay_with_their_flag() {
        let (files, pp_args) = partition_inputs(&[
            "main.c".to_string(),
            "-I".to_string(),
            "include".to_string(),
            "-DX".to_string(),
        ]);
        assert_eq!(files, vec![PathBuf::from("main.c")]);
        assert_eq!(pp_args, vec!["-I", "include", "-DX"]);
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::parse_from(["cfz", "signatures", "--verbose", "a.c"]);
        assert_eq!(cli.verbose, 1);
        assert!(!cli.quiet);
    }

    #[test]
    fn no_driver_and_dump_maps_default_off() {
        let cli = Cli::parse_from(["cfz", "generate", "a.c"]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(!args.no_driver);
        assert!(!args.dump_maps);
    }
}
