//! Argument parsing and subcommand dispatch.

use std::{io::Write, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use warehouse_grid_core::{CellCode, Item};
use warehouse_grid_system_interaction::Session;
use warehouse_grid_system_mutation::MutationWorkflow;
use warehouse_grid_system_navigator::FilterOutcome;
use warehouse_grid_system_picking::Ray;
use warehouse_grid_world::{query, Warehouse};

use crate::{
    config::AppConfig,
    store::{JsonFileStore, TokenAuth},
};

/// Inspect and edit warehouse cell inventory from the terminal.
#[derive(Debug, Parser)]
#[command(name = "warehouse-grid", version)]
pub(crate) struct Cli {
    /// TOML file describing the warehouse, camera and flash settings.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// JSON file holding persisted cell records.
    #[arg(long, global = true, default_value = "locations.json")]
    pub(crate) store: PathBuf,

    /// Token authorizing inventory edits.
    #[arg(long, global = true, env = "WAREHOUSE_ADMIN_TOKEN", hide_env_values = true)]
    pub(crate) admin_token: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// List every cell with its world position.
    Layout {
        /// Only list cells of this row.
        #[arg(long)]
        row: Option<String>,
    },
    /// Filter cells by row and/or SKU substring.
    Find {
        /// Exact row identifier.
        #[arg(long)]
        row: Option<String>,
        /// Case-insensitive SKU substring.
        #[arg(long)]
        sku: Option<String>,
    },
    /// Print the contents of a cell.
    Show {
        /// Cell code, e.g. `B03-B-L1-R`.
        code: String,
    },
    /// List known SKUs, optionally narrowed by a search term.
    Skus {
        /// Case-insensitive substring.
        term: Option<String>,
    },
    /// Replace the items and notes of a cell.
    Save {
        /// Cell code.
        code: String,
        /// Item as `SKU` or `SKU:QTY`; repeat for several items.
        #[arg(long = "item")]
        items: Vec<String>,
        /// Free-text notes.
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Empty a cell.
    Clear {
        /// Cell code.
        code: String,
    },
    /// Move a cell's contents into another, swapping if the destination is occupied.
    Move {
        /// Source cell code.
        source: String,
        /// Destination cell code.
        destination: String,
    },
    /// Pick the cell under a normalized screen position from the initial camera.
    Pick {
        /// Horizontal position in `-1..=1`.
        #[arg(allow_negative_numbers = true)]
        ndc_x: f32,
        /// Vertical position in `-1..=1`.
        #[arg(allow_negative_numbers = true)]
        ndc_y: f32,
        /// Viewport width divided by height.
        #[arg(long, default_value_t = 16.0 / 9.0)]
        aspect: f32,
    },
    /// Sample the camera fly-to animation toward a cell.
    Fly {
        /// Cell code.
        code: String,
        /// Number of intervals to sample across the animation.
        #[arg(long, default_value_t = 7)]
        frames: u32,
    },
}

type CliSession = Session<TokenAuth, JsonFileStore>;

/// Runs one subcommand, writing its report to `out`.
pub(crate) fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let warehouse = Warehouse::new(&config.warehouse).context("invalid warehouse description")?;
    let auth = TokenAuth::new(cli.admin_token, config.auth.token.clone());
    let store = JsonFileStore::new(cli.store);
    tracing::debug!(store = %store.path().display(), "opening store");

    let mut session = Session::new(
        warehouse,
        config.camera,
        config.flash,
        MutationWorkflow::new(auth, store),
    );
    if session.load().is_err() {
        tracing::warn!(
            store = %session.mutations().sync().path().display(),
            "continuing with an empty warehouse"
        );
    }

    match cli.command {
        Commands::Layout { row } => layout(&session, row.as_deref(), out),
        Commands::Find { row, sku } => find(&mut session, row.as_deref(), sku.as_deref(), out),
        Commands::Show { code } => show(&session, &CellCode::new(code), out),
        Commands::Skus { term } => {
            for sku in session.sku_suggestions(term.as_deref().unwrap_or_default()) {
                writeln!(out, "{sku}")?;
            }
            Ok(())
        }
        Commands::Save { code, items, notes } => {
            let items = parse_items(&items)?;
            let code = select(&mut session, code)?;
            session.save(items, &notes)?;
            report(&session, out)?;
            show(&session, &code, out)
        }
        Commands::Clear { code } => {
            let _ = select(&mut session, code)?;
            session.clear()?;
            report(&session, out)
        }
        Commands::Move {
            source,
            destination,
        } => {
            let _ = select(&mut session, source)?;
            session.set_source()?;
            let _ = select(&mut session, destination)?;
            let _ = session.move_here()?;
            report(&session, out)
        }
        Commands::Pick {
            ndc_x,
            ndc_y,
            aspect,
        } => pick(&mut session, Vec2::new(ndc_x, ndc_y), aspect, out),
        Commands::Fly { code, frames } => fly(&mut session, &CellCode::new(code), frames, out),
    }
}

/// Normalizes free-text filter input the way the filter panel does.
fn normalize_filter(value: Option<&str>, uppercase: bool) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(if uppercase {
        trimmed.to_uppercase()
    } else {
        trimmed.to_owned()
    })
}

/// Parses `SKU` or `SKU:QTY` arguments. Blank SKUs are dropped.
fn parse_items(raw: &[String]) -> Result<Vec<Item>> {
    let mut items = Vec::with_capacity(raw.len());
    for entry in raw {
        let (sku, qty) = match entry.rsplit_once(':') {
            Some((sku, qty)) => {
                let qty = qty
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("invalid quantity in item `{entry}`"))?;
                (sku, Some(qty))
            }
            None => (entry.as_str(), None),
        };
        items.extend(Item::new(sku, qty));
    }
    Ok(items)
}

fn select(session: &mut CliSession, code: String) -> Result<CellCode> {
    let code = CellCode::new(code.trim());
    if !session.select(&code) {
        bail!("unknown cell `{code}`");
    }
    Ok(code)
}

fn report(session: &CliSession, out: &mut impl Write) -> Result<()> {
    if let Some(status) = session.state().status() {
        writeln!(out, "{status}")?;
    }
    Ok(())
}

fn layout(session: &CliSession, row: Option<&str>, out: &mut impl Write) -> Result<()> {
    let row = normalize_filter(row, true);
    for cell in query::cells(session.warehouse()) {
        if row.as_deref().is_some_and(|row| row != cell.row()) {
            continue;
        }
        let position = cell.position();
        writeln!(
            out,
            "{}\t{:.3}\t{:.3}\t{:.3}",
            cell.code(),
            position.x,
            position.y,
            position.z
        )?;
    }
    Ok(())
}

fn find(
    session: &mut CliSession,
    row: Option<&str>,
    sku: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let row = normalize_filter(row, true);
    let sku = normalize_filter(sku, false);
    match session.apply_filter(row.as_deref(), sku.as_deref(), Duration::ZERO) {
        FilterOutcome::NotApplied => writeln!(out, "No filter given.")?,
        FilterOutcome::NoMatches => report(session, out)?,
        FilterOutcome::Matched { codes, .. } => {
            if let Some((current, total)) = session.navigator().matches().progress() {
                writeln!(out, "Match {current} of {total}")?;
            }
            for code in codes {
                writeln!(out, "{code}")?;
            }
        }
    }
    Ok(())
}

fn show(session: &CliSession, code: &CellCode, out: &mut impl Write) -> Result<()> {
    let Some(tooltip) = session.describe(code) else {
        bail!("unknown cell `{code}`");
    };
    writeln!(out, "{}", tooltip.code)?;
    for line in &tooltip.lines {
        writeln!(out, "  {line}")?;
    }
    if let Some(cell) = query::cell(session.warehouse(), code.as_str()) {
        if !cell.notes().is_empty() {
            writeln!(out, "  notes: {}", cell.notes())?;
        }
    }
    Ok(())
}

fn pick(session: &mut CliSession, ndc: Vec2, aspect: f32, out: &mut impl Write) -> Result<()> {
    let pose = session.camera().pose();
    let fov = session.camera().config().fov_y();
    let Some(ray) = Ray::from_screen(ndc, pose.position, pose.target, fov, aspect) else {
        bail!("camera pose cannot produce a picking ray");
    };
    match session.pick(&ray) {
        Some(hit) => writeln!(out, "{}\t{:.3}", hit.code, hit.distance)?,
        None => writeln!(out, "No cell under the pointer.")?,
    }
    Ok(())
}

fn fly(session: &mut CliSession, code: &CellCode, frames: u32, out: &mut impl Write) -> Result<()> {
    let start = Duration::ZERO;
    if !session.fly_to(code, start) {
        bail!("unknown cell `{code}`");
    }
    let duration = session.camera().config().fly_duration();
    let frames = frames.max(1);
    for frame in 0..=frames {
        let now = start + duration.mul_f64(f64::from(frame) / f64::from(frames));
        let pose = session.tick(now);
        writeln!(
            out,
            "{:>5}ms\teye {:.3} {:.3} {:.3}\ttarget {:.3} {:.3} {:.3}",
            now.as_millis(),
            pose.position.x,
            pose.position.y,
            pose.position.z,
            pose.target.x,
            pose.target.y,
            pose.target.z
        )?;
    }
    Ok(())
}
