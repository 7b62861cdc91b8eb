//! The batch pipeline: sanitize → parse → extract → synthesize → emit.

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use cfz_codegen::{synthesize_allocators, synthesize_driver};
use cfz_parser::{
    CTree, Sanitizer, extract_functions, extract_types, parse_c,
};
use tracing::info;

use crate::cli::{GenerateArgs, SignaturesArgs, partition_inputs};
use crate::compile_db;

pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let (files, mut pp_args) = partition_inputs(&args.inputs);
    if files.is_empty() {
        bail!("no input files given");
    }

    if let Some(db_path) = &args.compile_db {
        let entries = compile_db::load(db_path)?;
        for flag in compile_db::flags_for(&entries, &files) {
            if !pp_args.contains(&flag) {
                pp_args.push(flag);
            }
        }
    }

    let tree = parse_unit(&files, &pp_args)?;
    let maps = extract_types(&tree).context("type extraction failed")?;
    info!(
        value_types = maps.name_to_struct.len(),
        pointer_types = maps.pointer_to_struct.len(),
        "extracted type maps"
    );
    if args.dump_maps {
        eprintln!("{}", serde_json::to_string_pretty(&maps)?);
    }

    let allocators = synthesize_allocators(&maps)?;
    let driver = if args.no_driver {
        None
    } else {
        Some(synthesize_driver(&extract_functions(&tree), &maps))
    };

    match &args.output {
        None => {
            print!("{allocators}");
            if let Some(driver) = &driver {
                println!();
                print!("{driver}");
            }
        }
        Some(name) => write_output_set(name, &allocators, driver.as_deref(), &files, &pp_args)?,
    }
    Ok(())
}

pub fn run_signatures(args: &SignaturesArgs) -> anyhow::Result<()> {
    let (files, pp_args) = partition_inputs(&args.inputs);
    if files.is_empty() {
        bail!("no input files given");
    }
    let tree = parse_unit(&files, &pp_args)?;
    // Extraction is run for its diagnostics; the signature walk itself
    // tolerates anything the grammar accepted.
    extract_types(&tree).context("source failed to parse")?;
    let table = extract_functions(&tree);
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

/// Sanitize every input and concatenate them, in argument order, into
/// one umbrella translation unit.
fn parse_unit(files: &[PathBuf], pp_args: &[String]) -> anyhow::Result<CTree> {
    let sanitizer = Sanitizer::with_flags(pp_args);
    let mut unit = String::new();
    for file in files {
        let cleaned = sanitizer
            .sanitize_file(file)
            .with_context(|| format!("cannot process {}", file.display()))?;
        unit.push_str(&cleaned);
        unit.push('\n');
    }
    Ok(parse_c(&unit))
}

/// Write `<name>_allocs.c`, `<name>.c` (when a driver was generated)
/// and the companion `config-<name>.json` describing the run.
fn write_output_set(
    name: &str,
    allocators: &str,
    driver: Option<&str>,
    files: &[PathBuf],
    pp_args: &[String],
) -> anyhow::Result<()> {
    let allocs_path = format!("{name}_allocs.c");
    std::fs::write(&allocs_path, allocators)
        .with_context(|| format!("cannot write {allocs_path}"))?;
    let mut written = vec![allocs_path.clone()];

    if let Some(driver) = driver {
        let driver_path = format!("{name}.c");
        let contents = format!("#include \"{allocs_path}\"\n\n{driver}");
        std::fs::write(&driver_path, contents)
            .with_context(|| format!("cannot write {driver_path}"))?;
        written.push(driver_path);
    }

    let config = serde_json::json!({
        "files": written,
        "inputs": files,
        "cpp-extra-args": pp_args,
    });
    let config_path = format!("config-{name}.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("cannot write {config_path}"))?;
    info!(config = %config_path, "wrote output set");
    Ok(())
}
