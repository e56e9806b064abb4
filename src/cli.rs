//! Minimal CLI: match JSON/NDJSON documents against an expected document, or list their paths.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde_json::{json, Value};

use json_lookslike::{compile, render, strict, RenderOptions, Results};

use crate::jq_exec::JqFilter;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// check JSON documents against an expected shape and report every mismatch by path
#[derive(Parser, Debug)]
#[command(name = "json-lookslike", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// match each input document against the expected document
    Check(CheckOut),
    /// print every path present in each input document
    Paths(PathsOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Format {
    Text,
    Json,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// JSON document describing the expected shape; leaves are compared by value
    #[arg(long, short)]
    expected: PathBuf,

    /// also fail on fields that the expected document does not mention
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// include passing checks in the report
    #[arg(long, default_value_t = false)]
    all: bool,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct PathsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One loaded input value, labelled with where it came from.
#[derive(Debug)]
struct Document {
    source: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let jq_filter = self.jq_expr.as_deref().map(JqFilter::compile).transpose()?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let label = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({label})"))?;

            let mut parsed = Vec::<(String, Value)>::new();
            if self.ndjson {
                for (i, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let value = serde_json::from_str::<Value>(line).with_context(|| {
                        format!("failed to parse NDJSON line {} ({label})", i + 1)
                    })?;
                    parsed.push((format!("{label}:{}", i + 1), value));
                }
            } else {
                let value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({label})"))?;
                parsed.push((label.clone(), value));
            }

            for (label, value) in parsed {
                let value = match self.json_pointer.as_ref() {
                    None => value,
                    Some(ptr) => value.pointer(ptr).cloned().with_context(|| {
                        format!("JSON pointer {ptr} selects nothing in ({label})")
                    })?,
                };
                match jq_filter.as_ref() {
                    None => out.push(Document { source: label, value }),
                    Some(jq_filter) => {
                        let results = jq_filter.apply(&value).with_context(|| {
                            format!("failed to apply jq expression to ({label})")
                        })?;
                        for (i, value) in results.into_iter().enumerate() {
                            out.push(Document { source: format!("{label}#{i}"), value });
                        }
                    }
                }
            }
        }
        tracing::info!(documents = out.len(), "loaded input documents");
        Ok(out)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Returns `Ok(false)` when at least one document failed to match.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Check(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(true);
                }

                let expected_label = target.expected.display();
                let expected_src = std::fs::read_to_string(&target.expected)
                    .with_context(|| format!("failed to read expected file ({expected_label})"))?;
                let expected = serde_json::from_str::<Value>(&expected_src)
                    .with_context(|| format!("failed to parse expected file ({expected_label})"))?;
                let validator = match target.strict {
                    true => strict(compile(expected)),
                    false => compile(expected),
                };

                let documents = target.input_settings.load_documents()?;
                let checked: Vec<(&Document, Results)> = documents
                    .par_iter()
                    .map(|doc| (doc, validator.check(&doc.value)))
                    .collect();
                let all_valid = checked.iter().all(|(_, r)| r.is_valid());
                for (doc, r) in &checked {
                    tracing::debug!(
                        source = %doc.source,
                        valid = r.is_valid(),
                        outcomes = r.len(),
                        "checked document"
                    );
                }

                let report = match target.format {
                    Format::Text => {
                        let opts = RenderOptions {
                            only_failures: !target.all,
                            color: target.out.is_none(),
                        };
                        let mut text = String::new();
                        for (doc, r) in &checked {
                            text.push_str(&format!("── {}\n", doc.source));
                            text.push_str(&render(r, &opts));
                        }
                        text
                    }
                    Format::Json => {
                        let entries: Vec<Value> = checked
                            .iter()
                            .map(|(doc, r)| {
                                let shown = match target.all {
                                    true => (*r).clone(),
                                    false => r.detailed_errors(),
                                };
                                json!({
                                    "source": doc.source,
                                    "valid": r.is_valid(),
                                    "results": shown,
                                })
                            })
                            .collect();
                        serde_json::to_string_pretty(&entries)?
                    }
                };
                write_output(target.out.as_ref(), &report)?;
                Ok(all_valid)
            }
            Command::Paths(target) => {
                let documents = target.input_settings.load_documents()?;
                let mut text = String::new();
                for doc in &documents {
                    text.push_str(&format!("── {}\n", doc.source));
                    json_lookslike::path::walk(&doc.value, &mut |path, value| {
                        if !path.is_root() {
                            let kind = json_lookslike::isdefs::type_name(value);
                            text.push_str(&format!("{path}\t{kind}\n"));
                        }
                    });
                }
                write_output(target.out.as_ref(), &text)?;
                Ok(true)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&PathBuf>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, text)
                .with_context(|| format!("failed to write ({})", out.display()))?;
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, text: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path.to_string_lossy().to_string()
    }

    fn cli(args: &[&str]) -> CommandLineInterface {
        let argv = std::iter::once("json-lookslike").chain(args.iter().copied());
        CommandLineInterface::try_parse_from(argv).unwrap()
    }

    fn json_report(path: &Path) -> Vec<Value> {
        let text = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn check_returns_false_when_any_document_mismatches() {
        let dir = tempfile::tempdir().unwrap();
        let expected = write(dir.path(), "expected.json", r#"{"id": 1, "tags": ["a"]}"#);
        let good = write(dir.path(), "good.json", r#"{"id": 1, "tags": ["a"], "x": 0}"#);
        let bad = write(dir.path(), "bad.json", r#"{"id": 2, "tags": []}"#);
        let out = dir.path().join("report.txt");
        let out_arg = out.to_string_lossy().to_string();

        let only_good: &[&str] = &["check", "-e", &expected, "-i", &good, "-o", &out_arg];
        assert!(cli(only_good).run().unwrap());

        let both: &[&str] = &["check", "-e", &expected, "-i", &good, &bad, "-o", &out_arg];
        assert!(!cli(both).run().unwrap());
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("✘ id:"), "{text}");
        assert!(text.contains("✘ tags.[0]: expected this key to be present"), "{text}");
    }

    #[test]
    fn strict_flag_rejects_unmentioned_fields() {
        let dir = tempfile::tempdir().unwrap();
        let expected = write(dir.path(), "expected.json", r#"{"id": 1}"#);
        let input = write(dir.path(), "in.json", r#"{"id": 1, "extra": true}"#);
        let out = dir.path().join("report.txt").to_string_lossy().to_string();

        assert!(cli(&["check", "-e", &expected, "-i", &input, "-o", &out]).run().unwrap());
        let strict_args: &[&str] =
            &["check", "--strict", "-e", &expected, "-i", &input, "-o", &out];
        assert!(!cli(strict_args).run().unwrap());
    }

    #[test]
    fn ndjson_lines_are_labelled_in_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let expected = write(dir.path(), "expected.json", r#"{"id": 1}"#);
        let input = write(dir.path(), "docs.ndjson", "{\"id\": 1}\n\n{\"id\": 2}\n");
        let out = dir.path().join("report.json");
        let out_arg = out.to_string_lossy().to_string();

        let args: &[&str] = &[
            "check", "--ndjson", "--format", "json", "-e", &expected, "-i", &input, "-o", &out_arg,
        ];
        assert!(!cli(args).run().unwrap());

        let report = json_report(&out);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0]["source"], format!("{input}:1"));
        assert_eq!(report[0]["valid"], true);
        assert_eq!(report[0]["results"], serde_json::json!({}));
        assert_eq!(report[1]["source"], format!("{input}:3"));
        assert_eq!(report[1]["valid"], false);
        assert_eq!(report[1]["results"]["id"][0]["valid"], false);
    }

    #[test]
    fn json_pointer_selecting_nothing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let expected = write(dir.path(), "expected.json", "{}");
        let input = write(dir.path(), "in.json", r#"{"data": {}}"#);

        let args: &[&str] =
            &["check", "--json-pointer", "/data/items", "-e", &expected, "-i", &input];
        let err = cli(args).run().unwrap_err();
        assert!(format!("{err:#}").contains("selects nothing"), "{err:#}");
    }

    #[test]
    fn jq_expression_fans_out_documents() {
        let dir = tempfile::tempdir().unwrap();
        let expected = write(dir.path(), "expected.json", r#"{"kind": "item"}"#);
        let input = write(
            dir.path(),
            "in.json",
            r#"{"items": [{"kind": "item", "n": 1}, {"kind": "item", "n": 2}]}"#,
        );
        let out = dir.path().join("report.json");
        let out_arg = out.to_string_lossy().to_string();

        let args: &[&str] = &[
            "check", "--jq-expr", ".items[]", "--format", "json", "--all",
            "-e", &expected, "-i", &input, "-o", &out_arg,
        ];
        assert!(cli(args).run().unwrap());

        let report = json_report(&out);
        let sources: Vec<&str> = report.iter().filter_map(|e| e["source"].as_str()).collect();
        assert_eq!(sources, [format!("{input}#0"), format!("{input}#1")]);
        assert_eq!(report[1]["results"]["kind"][0]["message"], "is valid");
    }

    #[test]
    fn invalid_jq_expression_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(dir.path(), "in.json", "{}");
        assert!(cli(&["paths", "--jq-expr", ".[", "-i", &input]).run().is_err());
    }

    #[test]
    fn paths_lists_every_node_with_its_kind() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(dir.path(), "in.json", r#"{"a": {"b": [1]}, "a.b": true}"#);
        let out = dir.path().join("paths.txt");
        let out_arg = out.to_string_lossy().to_string();

        assert!(cli(&["paths", "-i", &input, "-o", &out_arg]).run().unwrap());
        let text = std::fs::read_to_string(&out).unwrap();
        let listed: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(
            listed,
            ["a\tobject", "a.b\tarray", "a.b.[0]\tnumber", "[\"a.b\"]\tbool"]
        );
    }

    #[test]
    fn glob_without_matches_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.json").to_string_lossy().to_string();
        assert!(cli(&["paths", "-i", &pattern]).run().is_err());
    }
}
