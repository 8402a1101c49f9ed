mod command;

use anyhow::{Context, Result};
use clap::Parser;
use command::{Command, HELP};
use orgview_api::AddConnectionRequest;
use orgview_app::{
    DirectoryService, ExplorerController, ExplorerSettings, HttpDataSource, LocalDataSource,
    OrgDataSource,
};
use orgview_events::{Event, EventListener, SelectionOrigin};
use orgview_graph::RetainedSurface;
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of a running orgview-server
    #[arg(short, long, conflicts_with = "data")]
    server: Option<String>,

    /// Employee directory JSON file, used in-process
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Container width for the diagram layout
    #[arg(short, long)]
    width: Option<f32>,

    /// Generations visible below the root after selecting someone
    #[arg(long)]
    depth: Option<u32>,

    /// Person to show on startup
    #[arg(short, long)]
    person: Option<String>,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,
}

/// Prints user-facing notifications as they arrive.
struct ConsoleNotifier;

impl EventListener for ConsoleNotifier {
    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::ShowInfo { message } => println!("info: {message}"),
            Event::ShowWarning { message } => println!("warning: {message}"),
            Event::ShowError { message } => eprintln!("error: {message}"),
            Event::StatusUpdate { message } => tracing::info!("{message}"),
            other => tracing::debug!(?other, "event"),
        }
    }
}

type Explorer = ExplorerController<RetainedSurface>;

fn print_diagram(controller: &mut Explorer) {
    // The console has no animation clock: jump to the end of every transition.
    controller.surface_mut().finish();
    let text = controller.surface().render_text();
    if text.is_empty() {
        println!("(nothing selected)");
    } else {
        print!("{text}");
    }
}

fn print_champions(controller: &Explorer) {
    if controller.champions().is_empty() {
        println!("No champions in this hierarchy.");
        return;
    }
    for champion in controller.champions() {
        println!(
            "{} ({}) - {} connections: {} direct, {} indirect",
            champion.name,
            champion.initials(),
            champion.total_connections,
            champion.direct_connections,
            champion.indirect_connections,
        );
    }
}

fn print_stats(controller: &Explorer) {
    let Some(stats) = controller.opportunities() else {
        println!("(nothing selected)");
        return;
    };
    println!(
        "{} people: {} direct, {} indirect, {} none",
        stats.total, stats.counts.direct, stats.counts.indirect, stats.counts.none
    );
    if let Some(banner) = stats.banner() {
        println!("{}", banner.message());
    }
    let contacts = stats
        .high_priority_contacts
        .iter()
        .map(|c| ("high priority", c))
        .chain(stats.opportunities.iter().map(|c| ("opportunity", c)));
    for (label, contact) in contacts {
        println!(
            "  {label:<13} {} - {} ({})",
            contact.name, contact.position, contact.location
        );
    }
}

/// Run one command. Returns `false` when the session should end.
async fn run_command(
    controller: &mut Explorer,
    source: &dyn OrgDataSource,
    settings: &ExplorerSettings,
    command: Command,
) -> bool {
    let redraw = match command {
        Command::Quit => return false,
        Command::Help => {
            println!("{HELP}");
            false
        }
        Command::Select(name) => {
            controller
                .select_person(source, &name, SelectionOrigin::Cli)
                .await;
            true
        }
        Command::Search(query) => {
            controller.search_and_select(source, &query).await;
            true
        }
        Command::Suggest(prefix) => {
            match source.autocomplete(&prefix, settings.autocomplete_limit).await {
                Ok(suggestions) if suggestions.is_empty() => println!("No suggestions."),
                Ok(suggestions) => {
                    for s in suggestions {
                        println!("  {} - {} ({})", s.name, s.position, s.department);
                    }
                }
                Err(err) => println!("Autocomplete failed: {err}"),
            }
            false
        }
        Command::Toggle(key) => match controller.on_node_toggled(&key) {
            Ok(outcome) => {
                tracing::debug!(?outcome, "Toggled");
                true
            }
            Err(err) => {
                println!("{err}");
                false
            }
        },
        Command::ExpandAll => report(controller.on_expand_all_requested()),
        Command::CollapseAll => report(controller.on_collapse_all_requested()),
        Command::Reset => report(controller.on_reset()),
        Command::Resize(width) => report(controller.on_resize(width)),
        Command::Champions => {
            print_champions(controller);
            false
        }
        Command::Highlight(name) => {
            if let Some(summary) = controller.highlight_champion(&name) {
                println!(
                    "Highlighted {} cards and {} map locations.",
                    summary.cards, summary.markers
                );
            }
            true
        }
        Command::Clear => {
            controller.clear_highlights();
            true
        }
        Command::Map => {
            match controller.map() {
                Some(map) => print!("{}", map.render_text()),
                None => println!("No map data."),
            }
            false
        }
        Command::Stats => {
            print_stats(controller);
            false
        }
        Command::Connect {
            name,
            champion,
            relationship,
        } => {
            let req = AddConnectionRequest {
                name,
                connection_champion: champion,
                relationship,
                ..Default::default()
            };
            controller.add_connection(source, req).await.is_ok()
        }
    };

    controller.events().dispatch_to(&mut ConsoleNotifier);
    if redraw {
        print_diagram(controller);
    }
    true
}

fn report<T, E: std::fmt::Display>(result: Result<T, E>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            println!("{err}");
            false
        }
    }
}

fn load_settings(args: &Args) -> ExplorerSettings {
    let mut settings = match &args.settings {
        Some(path) => ExplorerSettings::load_from(path),
        None => ExplorerSettings::load(),
    };
    if let Some(width) = args.width {
        settings.diagram.container_width = width;
    }
    if let Some(depth) = args.depth {
        settings.diagram.initial_depth = depth;
    }
    if args.server.is_some() {
        settings.server_url = args.server.clone();
    }
    if args.data.is_some() {
        settings.data_file = args.data.clone();
        settings.server_url = None;
    }
    settings
}

fn open_source(settings: &ExplorerSettings) -> Result<Box<dyn OrgDataSource>> {
    if let Some(url) = &settings.server_url {
        let source = HttpDataSource::new(url).context("Failed to configure server connection")?;
        println!("Using server {}", source.base_url());
        return Ok(Box::new(source));
    }

    let service = match &settings.data_file {
        Some(path) => DirectoryService::open(path)
            .with_context(|| format!("Failed to load directory from {}", path.display()))?,
        None => DirectoryService::sample().context("Failed to load bundled sample directory")?,
    };
    Ok(Box::new(LocalDataSource::new(service)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let settings = load_settings(&args);
    if args.save_settings {
        let saved = match &args.settings {
            Some(path) => settings.save_to(path),
            None => settings.save(),
        };
        saved.context("Failed to save settings")?;
    }
    let source = open_source(&settings)?;
    let mut controller = ExplorerController::new(RetainedSurface::new(), settings.diagram.clone());

    if let Some(person) = &args.person {
        let select = Command::Select(person.clone());
        run_command(&mut controller, source.as_ref(), &settings, select).await;
    }

    println!("Type 'help' for commands.");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Ok(command) => {
                if !run_command(&mut controller, source.as_ref(), &settings, command).await {
                    break;
                }
            }
            Err(err) => println!("{err}"),
        }
    }
    Ok(())
}
