//! compile_commands.json handling.
//!
//! Only front-end-relevant flags are forwarded: include paths,
//! defines, standard selection, and the like. Codegen flags from the
//! original compiler invocation mean nothing to a textual pre-pass.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tracing::debug;

/// One entry of a compilation database. Either `arguments` or
/// `command` is present.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub command: Option<String>,
}

/// Flags that matter to preprocessing; everything else is dropped.
const KEPT_PREFIXES: &[&str] = &[
    "-I", "-D", "-U", "-isystem", "-iquote", "-idirafter", "-include",
    "-imacros", "-std=", "-x", "-nostdinc", "-f", "-m", "-Xclang",
];

/// Kept flags that may carry their value as a separate argument.
const SEPARATE_ARG_FLAGS: &[&str] = &[
    "-I", "-D", "-U", "-isystem", "-iquote", "-idirafter", "-include", "-imacros", "-x",
];

pub fn load(path: &Path) -> anyhow::Result<Vec<CompileCommand>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read compilation database {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("malformed compilation database {}", path.display()))
}

/// Collect the deduplicated preprocessor flags of every entry whose
/// `file` names one of the given inputs, in database order.
pub fn flags_for(entries: &[CompileCommand], inputs: &[PathBuf]) -> Vec<String> {
    let mut flags = Vec::new();
    for entry in entries {
        if !matches_any(entry, inputs) {
            continue;
        }
        let args = match (&entry.arguments, &entry.command) {
            (Some(arguments), _) => arguments.clone(),
            (None, Some(command)) => split_command(command),
            (None, None) => continue,
        };
        debug!(file = %entry.file, flags = args.len(), "using compilation database entry");
        flags.extend(extract_pp_options(&args, Path::new(&entry.directory)));
    }
    dedup_preserving_order(flags)
}

fn matches_any(entry: &CompileCommand, inputs: &[PathBuf]) -> bool {
    let entry_path = resolve(Path::new(&entry.file), Path::new(&entry.directory));
    inputs.iter().any(|input| {
        let input_path = input
            .canonicalize()
            .unwrap_or_else(|_| input.clone());
        input_path == entry_path || input.as_path() == Path::new(&entry.file)
    })
}

fn resolve(path: &Path, directory: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        directory.join(path)
    };
    joined.canonicalize().unwrap_or(joined)
}

/// Keep only preprocessor-relevant flags. Include paths are rewritten
/// absolute against the entry's `directory`, since the database's
/// relative paths mean nothing from our working directory.
fn extract_pp_options(args: &[String], directory: &Path) -> Vec<String> {
    let mut kept = Vec::new();
    let mut iter = args.iter().peekable();
    // First token is the compiler itself.
    iter.next();
    while let Some(arg) = iter.next() {
        if !KEPT_PREFIXES.iter().any(|p| arg.starts_with(p)) {
            continue;
        }
        if SEPARATE_ARG_FLAGS.contains(&arg.as_str()) {
            let Some(value) = iter.next() else { break };
            kept.push(join_flag(arg, value, directory));
        } else if let Some(dir) = arg.strip_prefix("-I") {
            kept.push(format!("-I{}", resolve(Path::new(dir), directory).display()));
        } else {
            kept.push(arg.clone());
        }
    }
    kept
}

fn join_flag(flag: &str, value: &str, directory: &Path) -> String {
    if flag == "-I" {
        format!("-I{}", resolve(Path::new(value), directory).display())
    } else {
        format!("{flag}{value}")
    }
}

/// Split a shell command line on whitespace, honoring single and
/// double quotes. No escape processing beyond that; databases in the
/// wild do not nest quoting.
pub fn split_command(command: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in command.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        args.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            },
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

fn dedup_preserving_order(flags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    flags
        .into_iter()
        .filter(|flag| seen.insert(flag.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(directory: &str, file: &str, command: &str) -> CompileCommand {
        CompileCommand {
            directory: directory.to_string(),
            file: file.to_string(),
            arguments: None,
            command: Some(command.to_string()),
        }
    }

    #[test]
    fn split_command_honors_quotes() {
        let args = split_command(r#"cc -DNAME="two words" -I "my dir" main.c"#);
        assert_eq!(args, vec!["cc", "-DNAME=two words", "-I", "my dir", "main.c"]);
    }

    #[test]
    fn only_frontend_flags_survive() {
        let e = entry(
            "/proj",
            "main.c",
            "cc -O2 -Wall -c -o main.o -DDEBUG -std=c99 -fno-builtin main.c",
        );
        let flags = flags_for(&[e], &[PathBuf::from("main.c")]);
        assert_eq!(flags, vec!["-DDEBUG", "-std=c99", "-fno-builtin"]);
    }

    #[test]
    fn relative_include_paths_resolve_against_directory() {
        let e = entry("/proj/build", "main.c", "cc -I../include -c main.c");
        let flags = flags_for(&[e], &[PathBuf::from("main.c")]);
        assert_eq!(flags, vec!["-I/proj/build/../include"]);
    }

    #[test]
    fn separate_argument_forms_are_joined() {
        let e = entry("/proj", "main.c", "cc -D FOO=1 -U BAR -c main.c");
        let flags = flags_for(&[e], &[PathBuf::from("main.c")]);
        assert_eq!(flags, vec!["-DFOO=1", "-UBAR"]);
    }

    #[test]
    fn entries_for_other_files_are_ignored() {
        let e = entry("/proj", "other.c", "cc -DNOPE -c other.c");
        let flags = flags_for(&[e], &[PathBuf::from("main.c")]);
        assert!(flags.is_empty());
    }

    #[test]
    fn duplicate_flags_collapse_in_first_seen_order() {
        let a = entry("/proj", "main.c", "cc -DX -DY -c main.c");
        let b = entry("/proj", "main.c", "cc -DY -DX -DZ -c main.c");
        let flags = flags_for(&[a, b], &[PathBuf::from("main.c")]);
        assert_eq!(flags, vec!["-DX", "-DY", "-DZ"]);
    }

    #[test]
    fn arguments_array_is_preferred_over_command() {
        let e = CompileCommand {
            directory: "/proj".to_string(),
            file: "main.c".to_string(),
            arguments: Some(vec![
                "cc".to_string(),
                "-DFROM_ARGS".to_string(),
                "main.c".to_string(),
            ]),
            command: Some("cc -DFROM_COMMAND main.c".to_string()),
        };
        let flags = flags_for(&[e], &[PathBuf::from("main.c")]);
        assert_eq!(flags, vec!["-DFROM_ARGS"]);
    }

    #[test]
    fn loads_real_database_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("compile_commands.json");
        std::fs::write(
            &db,
            r#"[{"directory": "/proj", "file": "main.c", "command": "cc -DX -c main.c"}]"#,
        )
        .unwrap();
        let entries = load(&db).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file, "main.c");
    }
}
