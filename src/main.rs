// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! domscope CLI entrypoint.
//!
//! Loads an HTML file (or the built-in demo page), builds the mirror tree and runs
//! the terminal inspector. `--dump` prints the inspector rows instead.

use std::error::Error;
use std::fs::File;
use std::path::Path;

use domscope::config::InspectorConfig;
use domscope::inspector::Inspector;
use domscope::live::parse_document;
use domscope::screen::ScreenTree;
use domscope::tui::{TuiTheme, DEMO_PAGE};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter directives.
const LOG_ENV_VAR: &str = "DOMSCOPE_LOG";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<file.html>] [--config <path>] [--log-file <path>] [--dump]\n  {program} --demo [--config <path>] [--log-file <path>] [--dump]\n\nWithout a file the built-in demo page is inspected.\n--config reads a JSON config (default: $DOMSCOPE_CONFIG, then built-in defaults).\n--log-file writes logs filtered by $DOMSCOPE_LOG (default \"warn\").\n--dump prints the inspector rows as text and exits; it logs to stderr."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    input: Option<String>,
    demo: bool,
    config: Option<String>,
    log_file: Option<String>,
    dump: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--dump" => {
                if options.dump {
                    return Err(());
                }
                options.dump = true;
            }
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?);
            }
            "--log-file" => {
                if options.log_file.is_some() {
                    return Err(());
                }
                options.log_file = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.input.is_some() {
                    return Err(());
                }
                options.input = Some(arg);
            }
        }
    }

    if options.demo && options.input.is_some() {
        return Err(());
    }

    Ok(options)
}

fn init_logging(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let file_layer = match &options.log_file {
        Some(path) => {
            let file = File::create(path)
                .map_err(|err| format!("failed to open log file {path}: {err}"))?;
            Some(
                fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };
    // The terminal UI owns stdout and stderr; only --dump may log to stderr.
    let stderr_layer = options
        .dump
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(true));
    if file_layer.is_none() && stderr_layer.is_none() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "domscope".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };
        init_logging(&options)?;

        let config = InspectorConfig::resolve(options.config.as_deref().map(Path::new))?;
        let source = match &options.input {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|err| format!("failed to read {path}: {err}"))?,
            None => DEMO_PAGE.to_owned(),
        };

        let mut document = parse_document(&source, &config.html_options())?;
        document.set_viewport_height(config.live_viewport_rows);
        let mut screen = ScreenTree::new();
        screen.set_viewport_height(config.screen_viewport_rows);
        let build_options = config.build_options(&document);
        let inspector = Inspector::build_document(document, screen, &build_options)?;
        tracing::info!(
            input = options.input.as_deref().unwrap_or("<demo>"),
            mirrored = inspector.tree().len(),
            "document loaded"
        );

        if options.dump {
            print!("{}", inspector.screen().dump());
            return Ok(());
        }

        let theme = TuiTheme::from_env()?;
        domscope::tui::run(inspector, theme)
    })();

    if let Err(err) = result {
        tracing::error!(error = %err, "domscope failed");
        eprintln!("domscope: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| (*value).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_positional_input_with_flags() {
        let options = parse_options(args(&[
            "page.html",
            "--dump",
            "--config",
            "cfg.json",
            "--log-file",
            "out.log",
        ]))
        .expect("parse options");
        assert_eq!(
            options,
            CliOptions {
                input: Some("page.html".to_owned()),
                demo: false,
                config: Some("cfg.json".to_owned()),
                log_file: Some("out.log".to_owned()),
                dump: true,
            }
        );
    }

    #[test]
    fn parses_demo_flag() {
        let options = parse_options(args(&["--demo"])).expect("parse options");
        assert!(options.demo);
        assert!(options.input.is_none());
    }

    #[test]
    fn rejects_demo_with_input() {
        parse_options(args(&["--demo", "page.html"])).unwrap_err();
        parse_options(args(&["page.html", "--demo"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_and_duplicate_args() {
        parse_options(args(&["--nope"])).unwrap_err();
        parse_options(args(&["--dump", "--dump"])).unwrap_err();
        parse_options(args(&["a.html", "b.html"])).unwrap_err();
        parse_options(args(&["--config", "a", "--config", "b"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_flag_values() {
        parse_options(args(&["--config"])).unwrap_err();
        parse_options(args(&["--log-file"])).unwrap_err();
    }
}
