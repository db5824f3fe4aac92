//! Minimal CLI: check JSON documents against a descriptor.
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::descriptor::Descriptor;
use crate::engine::find_mismatch;
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON/NDJSON documents against a runtime type descriptor
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// check every input document against the descriptor
    Check(CheckOut),
    /// print the descriptor's printable form
    Describe(DescriptorSettings),
}

#[derive(Args, Debug, Clone)]
struct DescriptorSettings {
    /// descriptor as a JSON file path or inline JSON (e.g. '{"list": "int"}')
    #[arg(long, short)]
    descriptor: String,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    descriptor_settings: DescriptorSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// only print failing documents
    #[arg(long, short)]
    quiet: bool,
}

/// One document pulled out of an input file.
#[derive(Debug)]
struct Document {
    label: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl DescriptorSettings {
    fn load(&self) -> Result<Descriptor> {
        let raw = self.descriptor.trim();
        let source = if raw.starts_with('{') || raw.starts_with('"') {
            raw.to_string()
        } else {
            std::fs::read_to_string(raw)
                .with_context(|| format!("failed to read descriptor file {raw}"))?
        };
        let descriptor = crate::path_de::descriptor_from_str(&source)
            .with_context(|| format!("invalid descriptor {raw}"))?;
        debug!(%descriptor, "descriptor loaded");
        Ok(descriptor)
    }
}

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            if self.ndjson {
                for (i, line) in source.lines().enumerate() {
                    if line.trim().is_empty() { continue; }
                    let label = format!("{source_path_str}:{}", i + 1);
                    let json_value = serde_json::from_str::<serde_json::Value>(line)
                        .with_context(|| format!("failed to parse JSON line ({label})"))?;
                    out.push(self.select(label, json_value)?);
                }
            } else {
                let json_value = serde_json::from_str::<serde_json::Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                out.push(self.select(source_path_str, json_value)?);
            }
        }
        info!(documents = out.len(), "inputs loaded");
        Ok(out)
    }

    fn select(&self, label: String, json_value: serde_json::Value) -> Result<Document> {
        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(ptr) => json_value
                .pointer(ptr)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {ptr} not found in {label}"))?,
        };
        Ok(Document { label, value: Value::from(json_value) })
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Returns `false` when at least one document failed its check.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Describe(settings) => {
                println!("{}", settings.load()?);
                Ok(true)
            }
            Command::Check(target) => {
                let descriptor = target.descriptor_settings.load()?;
                let documents = target.input_settings.load_documents()?;

                // one shared descriptor, documents checked in parallel
                let results = documents
                    .par_iter()
                    .map(|doc| find_mismatch(&doc.value, &descriptor))
                    .collect::<Vec<_>>();

                let mut failed = 0usize;
                for (doc, mismatch) in documents.iter().zip(&results) {
                    match mismatch {
                        None => {
                            if !target.quiet {
                                println!("{} {}", "✔".green(), doc.label);
                            }
                        }
                        Some(m) => {
                            failed += 1;
                            println!("{} {}: {m}", "✘".red(), doc.label);
                        }
                    }
                }
                info!(total = documents.len(), failed, %descriptor, "check finished");
                Ok(failed == 0)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            if !Path::new(pattern).exists() {
                bail!("input file not found: {pattern}");
            }
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("runtype-cli-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_check_command() {
        let cli = CommandLineInterface::try_parse_from([
            "runtype", "check", "--descriptor", r#"{"list": "int"}"#, "--input", "a.json", "b.json",
        ])
        .unwrap();
        match cli.cmd {
            Command::Check(c) => {
                assert_eq!(c.input_settings.input, vec!["a.json", "b.json"]);
                assert!(!c.input_settings.ndjson);
                assert_eq!(c.descriptor_settings.load().unwrap(), Descriptor::list(crate::Primitive::Int));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ndjson_lines_with_pointer() {
        let dir = scratch_dir("ndjson");
        let path = dir.join("rows.ndjson");
        std::fs::write(&path, "{\"row\": [1, 2]}\n\n{\"row\": [1, \"x\"]}\n").unwrap();
        let settings = InputSettings {
            ndjson: true,
            json_pointer: Some("/row".into()),
            input: vec![path.to_string_lossy().to_string()],
        };
        let docs = settings.load_documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[1].label.ends_with(":3"));

        let d = Descriptor::list(crate::Primitive::Int);
        assert!(find_mismatch(&docs[0].value, &d).is_none());
        let m = find_mismatch(&docs[1].value, &d).unwrap();
        assert_eq!(m.to_string(), "at $[1]: expected int, found str");
        std::fs::remove_dir_all(dir).ok();
    }

    fn check_cli(descriptor: &str, inputs: &[String]) -> CommandLineInterface {
        let mut argv = vec!["runtype".to_string(), "check".into(), "--descriptor".into(), descriptor.into(), "--input".into()];
        argv.extend(inputs.iter().cloned());
        CommandLineInterface::try_parse_from(argv).unwrap()
    }

    #[test]
    fn run_reports_failure_when_any_document_fails() {
        let dir = scratch_dir("run-mixed");
        let good = dir.join("good.json");
        let bad = dir.join("bad.json");
        std::fs::write(&good, "[1, 2]").unwrap();
        std::fs::write(&bad, "[1, \"x\"]").unwrap();
        let inputs = [good.to_string_lossy().to_string(), bad.to_string_lossy().to_string()];

        assert!(!check_cli(r#"{"list": "int"}"#, &inputs).run().unwrap());
        assert!(check_cli(r#"{"list": "int"}"#, &inputs[..1]).run().unwrap());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn run_errors_on_missing_input_or_bad_descriptor() {
        let dir = scratch_dir("run-errors");
        let missing = [dir.join("absent.json").to_string_lossy().to_string()];
        assert!(check_cli(r#"{"list": "int"}"#, &missing).run().is_err());

        let doc = dir.join("doc.json");
        std::fs::write(&doc, "1").unwrap();
        let inputs = [doc.to_string_lossy().to_string()];
        assert!(check_cli(r#"{"list": "integer"}"#, &inputs).run().is_err());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn describe_prints_and_succeeds() {
        let cli = CommandLineInterface::try_parse_from([
            "runtype", "describe", "--descriptor", r#"{"dict": {"key": "str", "value": {"any": ["int", "none"]}}}"#,
        ])
        .unwrap();
        assert!(cli.run().unwrap());

        let cli = CommandLineInterface::try_parse_from(["runtype", "describe", "-d", r#"{"any": []}"#]).unwrap();
        assert!(cli.run().is_err());
    }

    #[test]
    fn globs_must_match_something() {
        let dir = scratch_dir("glob");
        std::fs::write(dir.join("one.json"), "1").unwrap();
        let found = resolve_file_path_patterns([format!("{}/*.json", dir.display())]).unwrap();
        assert_eq!(found.len(), 1);
        assert!(resolve_file_path_patterns([format!("{}/*.yaml", dir.display())]).is_err());
        assert!(resolve_file_path_patterns([format!("{}/missing.json", dir.display())]).is_err());
        std::fs::remove_dir_all(dir).ok();
    }
}
