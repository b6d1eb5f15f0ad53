//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::TreeNodeConvert;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = project_dir(cli)?;
    match &cli.command {
        Some(Commands::Show { pattern }) => _show(&container(&project_dir)?, pattern),
        Some(Commands::Filter {
            pattern,
            file,
            indices,
            json,
            parallel,
        }) => _filter(
            &container(&project_dir)?,
            pattern,
            file,
            *indices,
            *json,
            *parallel,
        ),
        Some(Commands::Classify {
            file,
            channels,
            json,
            parallel,
        }) => _classify(&container(&project_dir)?, file, channels, *json, *parallel),
        Some(Commands::Particles) => _particles(&container(&project_dir)?),
        Some(Commands::Config { command }) => _config(command, &project_dir),
        Some(Commands::Completion { shell }) => {
            _completion(*shell);
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see 'decaymatch --help'".into(),
        )),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("current directory", e))),
    }
}

fn container(project_dir: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(project_dir))?;
    Ok(ServiceContainer::new(settings)?)
}

#[instrument(skip(container))]
fn _show(container: &ServiceContainer, pattern: &str) -> CliResult<()> {
    let matcher = container.matcher(false);
    let node = matcher.pattern(pattern)?;
    output::info(&node.display(matcher.table()));
    output::info(&node.to_tree_string(matcher.table()));
    Ok(())
}

#[instrument(skip(container))]
fn _filter(
    container: &ServiceContainer,
    pattern: &str,
    file: &Path,
    indices: bool,
    json: bool,
    parallel: bool,
) -> CliResult<()> {
    let matcher = container.matcher(parallel);
    let pattern = matcher.pattern(pattern)?;
    let candidates = container.candidates().load(file)?;
    let retained = matcher.retained_indices(&candidates, &pattern);
    debug!("retained: {:?}", retained);

    if indices {
        output::info(&retained.iter().join("\n"));
        return Ok(());
    }
    if json {
        for idx in &retained {
            let line = serde_json::to_string(&candidates[*idx]).map_err(InfraError::from)?;
            output::info(&line);
        }
        return Ok(());
    }

    output::header(&format!(
        "{} of {} candidates match {}",
        retained.len(),
        candidates.len(),
        pattern.display(matcher.table())
    ));
    for idx in retained {
        let tree = matcher.tree_of(&candidates[idx]);
        output::candidate(idx, &tree.display(matcher.table()));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _classify(
    container: &ServiceContainer,
    file: &Path,
    assignments: &[String],
    json: bool,
    parallel: bool,
) -> CliResult<()> {
    let matcher = container.matcher(parallel);
    let channels = if assignments.is_empty() {
        container.configured_channels()?
    } else {
        assignments
            .iter()
            .enumerate()
            .map(|(mode_id, assignment)| matcher.channel(assignment, mode_id as u32))
            .collect::<Result<Vec<_>, _>>()?
    };
    if channels.is_empty() {
        return Err(CliError::Usage(
            "no channels configured, pass --channel NAME=DESCRIPTOR".into(),
        ));
    }

    let candidates = container.candidates().load(file)?;
    let summary = matcher.summarize(&candidates, &channels);

    if json {
        let text = serde_json::to_string_pretty(&summary).map_err(InfraError::from)?;
        output::info(&text);
        return Ok(());
    }

    output::header(&format!("{} candidates", summary.total));
    for (channel, count) in channels.iter().zip(&summary.channels) {
        let efficiency = summary.fraction(count);
        output::detail(&format!(
            "{:<12} mode {:<3} {:>8}  {:>6.2}%  {}",
            count.name,
            count.mode_id,
            count.count,
            efficiency * 100.0,
            channel.pattern.display(matcher.table())
        ));
    }
    output::detail(&format!("{:<12} {:>17}", "unmatched", summary.unmatched));
    Ok(())
}

fn _particles(container: &ServiceContainer) -> CliResult<()> {
    let table = container.table();
    output::header(&format!("{} particles", table.len()));
    for (name, code) in table.iter() {
        output::detail(&format!("{:<16} {:>10}", name, code));
    }
    Ok(())
}

fn _config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(project_dir)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create dir for {}", path.display()), e))?;
            fs.write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            let local = local_config_path(project_dir);
            match global_config_path() {
                Some(global) => output::detail(&format!(
                    "global: {}{}",
                    global.display(),
                    existence(&global)
                )),
                None => output::warning("cannot determine global config directory"),
            }
            output::detail(&format!("local:  {}{}", local.display(), existence(&local)));
            Ok(())
        }
    }
}

fn existence(path: &Path) -> &'static str {
    if path.exists() {
        ""
    } else {
        " (not found)"
    }
}

fn _completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
