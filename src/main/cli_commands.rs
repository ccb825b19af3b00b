// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};

use tokio_util::sync::CancellationToken;

use celestial_lens::cli::{AnalyzeArgs, ComposeArgs};
use celestial_lens::config::Settings;
use celestial_lens::error::{InferenceError, LensError, Result};
use celestial_lens::llm::client::InferenceClient;
use celestial_lens::llm::factory::ProviderFactory;
use celestial_lens::prompt::catalog::Catalog;
use celestial_lens::session::AnalysisSession;

fn build_session(
    args: &ComposeArgs,
    settings: &Settings,
    catalog: &Catalog,
) -> Result<AnalysisSession> {
    let mut session = AnalysisSession::new()
        .with_not_provided_marker(settings.defaults.not_provided_marker.clone());
    args.apply(&mut session, catalog)?;
    Ok(session)
}

/// Stream an analysis of the given screenshots to stdout
pub(super) async fn run_analyze(args: AnalyzeArgs, settings: Settings, verbose: u8) -> Result<()> {
    let catalog = settings.load_catalog()?;

    let mut config = match &args.profile {
        Some(name) => settings.profile(name)?.clone(),
        None => settings.default_profile()?.clone(),
    };
    if let Some(model) = args.model {
        config.model = model;
    }

    let mut session = build_session(&args.compose, &settings, &catalog)?;
    for path in &args.images {
        session.add_file(path.clone())?;
    }

    let client = InferenceClient::new(ProviderFactory::create(&settings));

    if verbose > 0 {
        eprintln!(
            "[verbose] {} image(s), backend {}, model {}",
            session.attachments().len(),
            client.backend_name(),
            config.model
        );
        for (i, attachment) in session.attachments().iter().enumerate() {
            eprintln!(
                "[verbose]   {}. {} ({})",
                i + 1,
                attachment.display_name(),
                attachment.media_type()
            );
        }
    }

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let mut output = FragmentWriter::new(io::stdout());
    let result = session
        .analyze(
            &client,
            &catalog,
            &config,
            |fragment| output.write(fragment),
            &cancel,
        )
        .await;
    ctrl_c.abort();

    // The partial text stays on screen; the failure message follows it.
    println!();
    match result {
        Ok(_) => Ok(()),
        Err(LensError::Inference(err)) => {
            let code = report_failure(&err, &mut io::stderr());
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Streams fragments to a writer, stopping after the first write error
struct FragmentWriter<W: Write> {
    out: W,
    failed: bool,
}

impl<W: Write> FragmentWriter<W> {
    fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    fn write(&mut self, fragment: &str) {
        if self.failed {
            return;
        }
        let written = self
            .out
            .write_all(fragment.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            self.failed = true;
            tracing::debug!(error = %e, "output closed, dropping the rest of the stream");
        }
    }
}

/// Print the user-facing message once and pick the exit code.
///
/// The raw detail only goes to the log.
fn report_failure(err: &InferenceError, stderr: &mut impl Write) -> i32 {
    if let Some(detail) = &err.detail {
        tracing::debug!(kind = %err.kind, %detail, "analysis failed");
    }
    let _ = writeln!(stderr, "{}", err.message);
    if err.is_cancelled() {
        0
    } else {
        1
    }
}

/// List templates and styles
pub(super) fn run_catalog(settings: &Settings) -> Result<()> {
    let catalog = settings.load_catalog()?;

    for category in catalog.categories() {
        println!("{}", category.title);
        for template in &category.templates {
            let vars: Vec<&str> = template.variables().iter().map(|v| v.name()).collect();
            if vars.is_empty() {
                println!("  {:<20} {}", template.id, template.label);
            } else {
                println!(
                    "  {:<20} {} ({})",
                    template.id,
                    template.label,
                    vars.join(", ")
                );
            }
        }
        println!();
    }

    println!("Styles");
    for style in catalog.styles() {
        println!("  {:<20} {}", style.id, style.label);
    }

    Ok(())
}

/// Print the prompt an analysis would send
pub(super) fn run_prompt(args: ComposeArgs, settings: &Settings) -> Result<()> {
    let catalog = settings.load_catalog()?;
    let session = build_session(&args, settings, &catalog)?;
    println!("{}", session.compose(&catalog));
    Ok(())
}
