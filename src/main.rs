// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use willdraft::{CanonicalDataRecord, DocumentEngine, DocumentType, EngineConfig, RawPerson, RawWillRecord};

/// Assembles wills and powers of attorney from template trees.
#[derive(Parser, Debug)]
#[command(name = "willdraft", version, about, long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one document to HTML.
    Render(RenderArgs),
    /// Check every template module for authoring defects.
    Lint(LintArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Directory holding `<jurisdiction>/<document_type>.yaml` template files.
    #[arg(long, env = "WILLDRAFT_TEMPLATES")]
    templates: PathBuf,

    /// Jurisdiction name, e.g. "Ontario" or "British Columbia".
    #[arg(long)]
    jurisdiction: Option<String>,

    #[arg(long, value_enum)]
    document: DocumentType,

    /// Canonical record (YAML or JSON).
    #[arg(long, conflicts_with_all = ["raw", "people"], required_unless_present = "raw")]
    data: Option<PathBuf>,

    /// Stored will or power-of-attorney record (YAML or JSON); needs --people.
    #[arg(long, requires = "people")]
    raw: Option<PathBuf>,

    /// People list for --raw.
    #[arg(long, requires = "raw")]
    people: Option<PathBuf>,

    /// Write the document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Engine settings file (YAML).
    #[arg(long, env = "WILLDRAFT_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "WILLDRAFT_DEFAULT_JURISDICTION")]
    default_jurisdiction: Option<String>,

    /// Organization named when the institutional placeholder is appointed.
    #[arg(long, env = "WILLDRAFT_INSTITUTION_NAME")]
    institution_name: Option<String>,

    /// Person reference that stands for the institution instead of a named individual.
    #[arg(long, env = "WILLDRAFT_INSTITUTIONAL_SENTINEL")]
    institutional_sentinel: Option<String>,

    /// Text rendered for a person reference that matches nobody.
    #[arg(long, env = "WILLDRAFT_UNKNOWN_LABEL")]
    unknown_label: Option<String>,
}

impl ConfigArgs {
    fn load(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_yaml_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(default_jurisdiction) = &self.default_jurisdiction {
            config.default_jurisdiction = default_jurisdiction.clone();
        }
        if let Some(institution_name) = &self.institution_name {
            config.institution_name = institution_name.clone();
        }
        if let Some(institutional_sentinel) = &self.institutional_sentinel {
            config.institutional_sentinel = institutional_sentinel.clone();
        }
        if let Some(unknown_label) = &self.unknown_label {
            config.unknown_label = unknown_label.clone();
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct LintArgs {
    #[arg(long, env = "WILLDRAFT_TEMPLATES")]
    templates: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let res = match cli.command {
        Command::Render(args) => run_render(&args),
        Command::Lint(args) => run_lint(&args),
    };

    match res {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_render(args: &RenderArgs) -> anyhow::Result<ExitCode> {
    let config = args.config.load()?;
    let jurisdiction = args
        .jurisdiction
        .clone()
        .unwrap_or_else(|| config.default_jurisdiction.clone());
    let engine = DocumentEngine::from_directory(&args.templates, config);

    let document = match (&args.data, &args.raw, &args.people) {
        (Some(data), _, _) => {
            let record: CanonicalDataRecord = read_data(data)?;
            engine.render(&jurisdiction, args.document, &record)?
        }
        (None, Some(raw), Some(people)) => {
            let raw: RawWillRecord = read_data(raw)?;
            let people: Vec<RawPerson> = read_data(people)?;
            engine.render_raw(&jurisdiction, args.document, &raw, &people)?
        }
        _ => bail!("either --data or both --raw and --people are required"),
    };

    for id in document.fallback_ids() {
        tracing::warn!(node = id, "node rendered its fallback text");
    }

    match &args.output {
        Some(path) => fs::write(path, &document.body).with_context(|| format!("cannot write {}", path.display()))?,
        None => println!("{}", document.body),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_lint(args: &LintArgs) -> anyhow::Result<ExitCode> {
    let reports = willdraft::lint_directory(&args.templates)
        .with_context(|| format!("cannot lint templates in {}", args.templates.display()))?;

    let mut issue_count = 0;
    for (slug, document_type, issues) in &reports {
        for issue in issues {
            println!("{}/{}: {}", slug, document_type, issue);
            issue_count += 1;
        }
    }

    if issue_count > 0 {
        eprintln!("{} issue(s) in {} module(s)", issue_count, reports.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

// serde_yaml also reads JSON, so one reader serves both formats.
fn read_data<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let input = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_yaml::from_str(&input).with_context(|| format!("cannot parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_requires_a_data_source() {
        let res = Cli::try_parse_from([
            "willdraft",
            "render",
            "--templates",
            "templates",
            "--document",
            "primary_will",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn render_with_raw_inputs() {
        let cli = Cli::try_parse_from([
            "willdraft",
            "render",
            "--templates",
            "templates",
            "--document",
            "poa_property",
            "--raw",
            "will.json",
            "--people",
            "people.json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.document, DocumentType::PoaProperty);
        assert!(args.data.is_none());
    }

    #[test]
    fn data_conflicts_with_raw() {
        let res = Cli::try_parse_from([
            "willdraft",
            "render",
            "--templates",
            "t",
            "--document",
            "primary_will",
            "--data",
            "r.yaml",
            "--raw",
            "w.json",
            "--people",
            "p.json",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn config_flags_override_individual_fields() {
        let cli = Cli::try_parse_from([
            "willdraft",
            "render",
            "--templates",
            "t",
            "--document",
            "primary_will",
            "--data",
            "r.yaml",
            "--institution-name",
            "Northern Trust",
            "--institutional-sentinel",
            "trust-co",
            "--unknown-label",
            "[NAME TO BE CONFIRMED]",
        ])
        .unwrap();
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        let config = args.config.load().unwrap();
        assert_eq!(config.institution_name, "Northern Trust");
        assert_eq!(config.institutional_sentinel, "trust-co");
        assert_eq!(config.unknown_label, "[NAME TO BE CONFIRMED]");
        assert_eq!(config.none_tokens, EngineConfig::default().none_tokens);
    }

    #[test]
    fn json_records_load_through_the_data_reader() {
        let path = std::env::temp_dir().join(format!("willdraft-record-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"personal": {"first_name": "Jane"}, "residue_info": {"pattern": "heirs_at_law"}, "wipeout_info": {"custom": "to charity"}}"#,
        )
        .unwrap();
        let record: CanonicalDataRecord = read_data(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(record.personal.first_name, "Jane");
        assert!(record.residue_info.is_some());
        assert!(record.wipeout_info.is_some());
    }
}
