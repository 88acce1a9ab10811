/// stowview terminal viewer
///
/// Loads a vessel layout and a container manifest and shows the stowage
/// plan as ASCII boxes.
/// Controls:
///   - WASD / Arrow Keys: Rotate the ship
///   - +/-: Zoom
///   - /: Search (id, or bay=/row=/tier=/size=)
///   - c: Clear search
///   - O: Toggle orthographic view
///   - Space: Toggle spin
///   - Q/ESC: Quit

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use stowview_core::{ContainerSize, SearchCriteria, StowagePlan, StructuralLayout};
use stowview_terminal::TerminalApp;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stowview-terminal", version, about = "View a container stowage plan in the terminal")]
struct Args {
    /// Structural layout document (JSON)
    #[arg(long)]
    layout: PathBuf,

    /// Container manifest (JSON or CSV)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Initial search: container id
    #[arg(long)]
    id: Option<String>,

    /// Initial search: bay
    #[arg(long)]
    bay: Option<u32>,

    /// Initial search: row
    #[arg(long)]
    row: Option<u32>,

    /// Initial search: tier
    #[arg(long)]
    tier: Option<u32>,

    /// Initial search: size (20ft, 40ft or 45ft)
    #[arg(long)]
    size: Option<ContainerSize>,

    /// Print the placed containers instead of opening the viewer
    #[arg(long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut plan = StowagePlan::new();

    // A broken layout leaves the viewer running with nothing placed
    match fs::read(&args.layout) {
        Ok(data) => {
            if let Err(err) = plan.set_layout(StructuralLayout::from_slice(&data)) {
                eprintln!("error: {err}");
            }
        }
        Err(err) => {
            let reason = format!("cannot read {}: {err}", args.layout.display());
            eprintln!("error: {reason}");
            plan.fail_layout(reason);
        }
    }

    if let Some(path) = &args.manifest {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        match plan.load_manifest(&text) {
            Ok(summary) => info!(
                placed = summary.placed,
                skipped = summary.skipped,
                fallbacks = summary.fallbacks,
                "manifest loaded"
            ),
            Err(err) => {
                error!("manifest not loaded: {err}");
                eprintln!("error: {err}");
            }
        }
    }

    let criteria = SearchCriteria {
        id: args.id.clone(),
        bay: args.bay,
        row: args.row,
        tier: args.tier,
        size: args.size,
    };
    if !criteria.is_empty() {
        plan.search(criteria, &mut ());
    }

    if args.summary {
        print_summary(&plan);
        return Ok(());
    }

    let mut app = TerminalApp::new(plan)?;
    app.run()?;
    Ok(())
}

fn print_summary(plan: &StowagePlan) {
    println!(
        "{:<14} {:>4} {:>4} {:>5} {:>5} {:>6} {:>9} {:>8} {:>8}  {}",
        "id", "bay", "row", "tier", "size", "deck", "x", "y", "z", "state"
    );
    for container in plan.containers() {
        let record = &container.record;
        let position = container.position;
        println!(
            "{:<14} {:>4} {:>4} {:>5} {:>5} {:>6} {:>9.2} {:>8.2} {:>8.2}  {:?}",
            record.id,
            record.bay,
            record.row,
            record.tier,
            record.size.to_string(),
            if container.below_deck { "hold" } else { "deck" },
            position.x,
            position.y,
            position.z,
            container.state
        );
    }

    println!();
    println!("{} placed, {} skipped", plan.containers().len(), plan.skipped().len());
    for skipped in plan.skipped() {
        println!("  entry {}: {}", skipped.index, skipped.reason);
    }
}
