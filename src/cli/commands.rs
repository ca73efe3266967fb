//! Command execution
//!
//! Resolves settings (files, env, flags), reads the input, runs the treemap
//! service and writes the finished document.

use std::io::{self, IsTerminal, Read, Write};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{InputKind, OutputFormat};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::path::{expand_path, resolve_input};

/// Execute the parsed command line.
pub fn execute(cli: &Cli) -> CliResult<()> {
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = resolve_settings(cli)?;
    match &cli.command {
        Some(Commands::Config { command }) => config_command(command, &settings),
        None => render(cli, settings),
    }
}

/// Layered settings with command line flags applied last.
pub fn resolve_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    apply_overrides(cli, &mut settings);
    debug!("settings: {:?}", settings);
    Ok(settings)
}

/// Flags given on the command line replace configured values.
pub fn apply_overrides(cli: &Cli, settings: &mut Settings) {
    let layout = &mut settings.layout;
    if let Some(width) = cli.width {
        layout.width = width;
    }
    if let Some(height) = cli.height {
        layout.height = height;
    }
    if let Some(margin) = cli.margin_box {
        layout.margin_box = margin;
    }
    if let Some(padding) = cli.padding_box {
        layout.padding_box = padding;
    }
    if let Some(padding) = cli.padding {
        layout.padding_root = padding;
    }

    let normalize = &mut settings.normalize;
    if let Some(depth) = cli.max_depth {
        normalize.max_depth = depth;
    }
    if let Some(symbols) = cli.symbols {
        normalize.include_symbols = symbols;
    }
    if let Some(pure) = cli.symbols_pure {
        normalize.include_pure_symbols = pure;
    }
    if let Some(unknown) = cli.unknown {
        normalize.include_unknown = unknown;
    }

    if let Some(naming) = cli.naming {
        settings.naming = naming.into();
    }
    if cli.csv {
        settings.format = OutputFormat::Csv;
    } else if let Some(format) = cli.format {
        settings.format = format.into();
    }
}

#[instrument(level = "debug", skip_all)]
fn render(cli: &Cli, settings: Settings) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let service = &container.treemap;

    let (text, kind) = match (&cli.coverprofile, &cli.input) {
        (Some(profile), _) => {
            let path = resolve_input(profile)?;
            (service.read_input(&path)?, InputKind::Coverage)
        }
        (None, Some(input)) => {
            let path = resolve_input(input)?;
            (service.read_input(&path)?, InputKind::Symtab)
        }
        (None, None) => (read_stdin()?, InputKind::Symtab),
    };

    // Rendered completely before anything is written
    let document = service.run(&text, kind)?;

    match &cli.output {
        Some(path) => {
            let path = expand_path(path);
            service.write_output(&path, &document)?;
            output::success(&format!(
                "wrote {} ({})",
                path.display(),
                container.settings.format
            ));
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(document.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| InfraError::io("write stdout", e))?;
        }
    }
    Ok(())
}

fn read_stdin() -> CliResult<String> {
    if io::stdin().is_terminal() {
        output::warning("reading symbols from the terminal, pipe `go tool nm -size` output or use --input");
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| InfraError::io("read stdin", e))?;
    Ok(text)
}

fn config_command(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            print!("{}", settings.to_toml()?);
        }
        ConfigCommands::Template => {
            print!("{}", Settings::template());
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let state = if path.exists() { "exists" } else { "not found" };
                println!("global: {} ({})", path.display(), state);
            }
            None => {
                return Err(CliError::Usage(
                    "cannot determine config directory".to_string(),
                ))
            }
        },
    }
    Ok(())
}
