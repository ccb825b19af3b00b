// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::Result;
use crate::prompt::catalog::Catalog;
use crate::prompt::variables::Variable;
use crate::session::AnalysisSession;

/// CelestialLens - chart readings streamed from Gemini
#[derive(Parser, Debug)]
#[command(name = "celestial-lens")]
#[command(version, about = "Stream chart readings from a multimodal model")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze chart screenshots and stream the reading
    Analyze(AnalyzeArgs),

    /// List templates and styles
    #[command(alias = "ls")]
    Catalog,

    /// Print the composed prompt without contacting the model
    Prompt(ComposeArgs),
}

/// Prompt composition options shared by `analyze` and `prompt`
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ComposeArgs {
    /// Template id (see `catalog`)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Style id appended to the prompt
    #[arg(short, long)]
    pub style: Option<String>,

    /// Variable value, e.g. `--var current_job=designer` (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(Variable, String)>,

    /// Free-text instruction replacing the template text
    #[arg(short, long)]
    pub prompt: Option<String>,
}

impl ComposeArgs {
    /// Apply these options to a session
    pub fn apply(&self, session: &mut AnalysisSession, catalog: &Catalog) -> Result<()> {
        if let Some(id) = &self.template {
            session.select_template_id(catalog, id)?;
        }
        session.set_style(catalog, self.style.as_deref())?;
        for (variable, value) in &self.vars {
            session.set_variable(*variable, value.clone());
        }
        if let Some(prompt) = &self.prompt {
            session.set_override(prompt.clone());
        }
        Ok(())
    }
}

/// Arguments for the analyze subcommand
#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Chart screenshots, sent in the given order
    #[arg(required = true, value_name = "IMAGES")]
    pub images: Vec<PathBuf>,

    #[command(flatten)]
    pub compose: ComposeArgs,

    /// Deployment profile (deep, fast, ...)
    #[arg(long)]
    pub profile: Option<String>,

    /// Override the profile's model
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Parse `name=value` into a variable assignment
pub fn parse_var(raw: &str) -> std::result::Result<(Variable, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let variable = name.trim().parse::<Variable>().map_err(|e| e.to_string())?;
    Ok((variable, value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_verbose_multiple() {
        let cli = Cli::parse_from(["celestial-lens", "-vv", "catalog"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Catalog));
    }

    #[test]
    fn test_cli_config_path() {
        let cli = Cli::parse_from(["celestial-lens", "--config", "/tmp/s.json", "catalog"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["celestial-lens"]).is_err());
    }

    #[test]
    fn test_analyze_args() {
        let cli = Cli::parse_from([
            "celestial-lens",
            "analyze",
            "a.png",
            "b.jpg",
            "--template",
            "talent_3",
            "--style",
            "plain",
            "--var",
            "current_job=設計師",
            "--profile",
            "fast",
        ]);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(
            args.images,
            vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]
        );
        assert_eq!(args.compose.template.as_deref(), Some("talent_3"));
        assert_eq!(args.compose.style.as_deref(), Some("plain"));
        assert_eq!(
            args.compose.vars,
            vec![(Variable::CurrentJob, "設計師".to_string())]
        );
        assert_eq!(args.profile.as_deref(), Some("fast"));
        assert!(args.model.is_none());
    }

    #[test]
    fn test_analyze_requires_images() {
        assert!(Cli::try_parse_from(["celestial-lens", "analyze"]).is_err());
    }

    #[test]
    fn test_prompt_args() {
        let cli = Cli::parse_from(["celestial-lens", "prompt", "-p", "hello {strength_a}"]);
        let Commands::Prompt(args) = cli.command else {
            panic!("expected prompt");
        };
        assert_eq!(args.prompt.as_deref(), Some("hello {strength_a}"));
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("strength_b=a=b").unwrap(),
            (Variable::StrengthB, "a=b".to_string())
        );
        assert!(parse_var("strength_b").is_err());
        assert!(parse_var("unknown=1").is_err());
    }

    #[test]
    fn test_unknown_var_rejected_by_clap() {
        assert!(Cli::try_parse_from(["celestial-lens", "prompt", "--var", "x=1"]).is_err());
    }

    #[test]
    fn test_compose_args_apply() {
        let catalog = Catalog::builtin();
        let mut session = AnalysisSession::new();
        let args = ComposeArgs {
            template: Some("talent_3".to_string()),
            style: None,
            vars: vec![(Variable::CurrentJob, "工程師".to_string())],
            prompt: None,
        };
        args.apply(&mut session, &catalog).unwrap();
        assert!(session.compose(&catalog).starts_with("我目前正在做 工程師，"));
    }

    #[test]
    fn test_compose_args_apply_unknown_style() {
        let catalog = Catalog::builtin();
        let mut session = AnalysisSession::new();
        let args = ComposeArgs {
            style: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(args.apply(&mut session, &catalog).is_err());
    }
}
