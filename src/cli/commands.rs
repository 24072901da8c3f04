//! Command dispatch: one handler per subcommand

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{
    format_trail, render_tree_string, DashboardSummary, LocationService, NewLocation,
    TreeFilterMode, TreeOptions, UnknownParentPolicy,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::infrastructure::seed::SeedDocument;
use crate::infrastructure::{InfraError, ServiceContainer};
use crate::util::path::expand_path;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    // Commands that need no location data
    match command {
        Commands::Completion { shell } => return _completion(*shell),
        Commands::Config { command } => return _config(cli, command),
        _ => {}
    }

    let settings = load_settings(cli)?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Tree {
            filter,
            prune,
            select,
        } => _tree(&container, filter.as_deref(), *prune, select.as_deref()),
        Commands::Table { filter, under } => {
            _table(&container, filter.as_deref().unwrap_or(""), under.as_deref())
        }
        Commands::Show { id } => _show(&container, id),
        Commands::Path { id, full } => _path(&container, id, *full),
        Commands::Add {
            name,
            parent,
            address,
            on_missing_parent,
        } => _add(
            &container,
            name,
            parent.as_deref(),
            address.as_deref(),
            *on_missing_parent,
        ),
        Commands::Dashboard => _dashboard(&container),
        Commands::Export { output } => _export(&container, output.as_deref()),
        Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(seed) = &cli.seed {
        settings.seed_file = Some(expand_path(seed));
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

#[instrument(skip(container))]
fn _tree(
    container: &ServiceContainer,
    filter: Option<&str>,
    prune: bool,
    select: Option<&str>,
) -> CliResult<()> {
    let service = container.location_service()?;
    if let Some(id) = select {
        if !service.forest().contains(id) {
            return Err(CliError::not_found(id));
        }
    }
    let mode = if prune {
        TreeFilterMode::Prune
    } else {
        container.settings.tree_filter
    };
    let options = TreeOptions {
        query: filter.map(str::to_string),
        mode,
        selected: select.map(str::to_string),
    };
    output::info(render_tree_string(service.forest(), &options).trim_end());
    Ok(())
}

#[instrument(skip(container))]
fn _table(container: &ServiceContainer, filter: &str, under: Option<&str>) -> CliResult<()> {
    let service = container.location_service()?;
    let table = service.table(filter, under)?;
    output::info(&table);
    Ok(())
}

/// Selection goes through the portal navigator like a click in the sidebar.
#[instrument(skip(container))]
fn _show(container: &ServiceContainer, id: &str) -> CliResult<()> {
    let mut portal = container.portal()?;
    portal
        .navigator()
        .view_location(id)
        .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    portal.process_pending();

    let detail = portal
        .location_detail()
        .ok_or_else(|| CliError::not_found(id))?;
    let trail = portal
        .service()
        .trail(id, false)
        .ok_or_else(|| CliError::not_found(id))?;

    let title = if detail.favorite {
        format!("{} ★", detail.row.name)
    } else {
        detail.row.name.clone()
    };
    output::header(&title);
    output::detail(&format!("Id:        {}", detail.row.id));
    output::detail(&format!("Path:      {}", format_trail(&trail)));
    output::detail(&format!("Address:   {}", detail.row.address));
    output::detail(&format!(
        "SDS files: {} ({} including sub-locations)",
        detail.row.sds_count, detail.total_sds_count
    ));
    output::detail(&format!(
        "Level:     {}",
        if detail.is_root {
            "Root location"
        } else {
            "Sub-location"
        }
    ));

    if detail.children.is_empty() {
        output::detail(&"No sub-locations");
    } else {
        output::header(&"Sub-locations");
        for child in &detail.children {
            output::detail(&format!(
                "{} ({} files) [{}]",
                child.name, child.sds_count, child.id
            ));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn _path(container: &ServiceContainer, id: &str, full: bool) -> CliResult<()> {
    let service = container.location_service()?;
    let trail = service
        .trail(id, full)
        .ok_or_else(|| CliError::not_found(id))?;
    output::info(&format_trail(&trail));
    Ok(())
}

#[instrument(skip(container))]
fn _add(
    container: &ServiceContainer,
    name: &str,
    parent: Option<&str>,
    address: Option<&str>,
    on_missing_parent: Option<UnknownParentPolicy>,
) -> CliResult<()> {
    let mut service: LocationService = container.location_service()?;
    let mut new = NewLocation::new(name);
    if let Some(parent) = parent {
        new = new.under(parent);
    }
    if let Some(address) = address {
        new = new.with_address(address);
    }
    let policy = on_missing_parent.unwrap_or_else(|| service.policy());
    let id = service.create_location_with_policy(new, policy)?;

    let trail = service
        .trail(&id, true)
        .ok_or_else(|| CliError::not_found(&id))?;
    output::action("Added", &format!("{} ({})", format_trail(&trail), id));
    output::warning(&"in-memory only, the seed is not modified");

    let options = TreeOptions {
        selected: Some(id),
        mode: container.settings.tree_filter,
        ..TreeOptions::default()
    };
    output::info(render_tree_string(service.forest(), &options).trim_end());
    Ok(())
}

#[instrument(skip(container))]
fn _dashboard(container: &ServiceContainer) -> CliResult<()> {
    let portal = container.portal()?;
    let DashboardSummary {
        total_sds,
        locations,
        favorites,
        roots,
        depth,
    } = portal.dashboard();

    output::header(&portal.section());
    output::detail(&format!("Total SDS:    {}", total_sds));
    output::detail(&format!("Locations:    {}", locations));
    output::detail(&format!("Favorites:    {}", favorites));
    output::detail(&format!("Facilities:   {}", roots));
    output::detail(&format!("Levels:       {}", depth));
    output::detail(&format!("Source:       {}", container.seed.describe()));
    Ok(())
}

#[instrument(skip(container))]
fn _export(container: &ServiceContainer, path: Option<&Path>) -> CliResult<()> {
    let service = container.location_service()?;
    let document = SeedDocument {
        locations: service.forest().to_locations(),
    };
    let text = document.to_toml()?;
    match path {
        Some(path) => {
            container
                .fs
                .write(path, &text)
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action(
                "Exported",
                &format!("{} locations to {}", service.forest().len(), path.display()),
            );
        }
        None => output::info(text.trim_end()),
    }
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::action("Global", &format!("{}{}", path.display(), state));
                }
                None => output::warning(&"no home directory, global config disabled"),
            }
            if let Some(path) = &cli.config {
                output::action("Explicit", &path.display());
            }
        }
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
    }
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
