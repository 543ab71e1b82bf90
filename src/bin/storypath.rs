use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use storypath::{
    AssetResolver, RecordingLoader, RecordingScheduler, Scene, SessionConfig, StorySession,
    SvgGeometry, SyncOptions,
};

#[derive(Parser, Debug)]
#[command(name = "storypath", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Materialize a scene and print anchors, nodes and the stylesheet as JSON.
    Inspect(InspectArgs),
    /// Run scroll ticks in order and print one JSON report per offset.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Scene description JSON.
    #[arg(long)]
    scene: PathBuf,

    /// SVG drawing with one path per avatar.
    #[arg(long)]
    svg: PathBuf,

    /// Viewport width the drawing is rendered at (defaults to its own width).
    #[arg(long)]
    width: Option<f64>,

    /// Base path of the image folders.
    #[arg(long, default_value = "images")]
    assets: String,

    /// Fail on coupling references to unknown avatars.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    #[command(flatten)]
    scene: SceneArgs,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Scroll offsets, evaluated in the given order.
    #[arg(long = "offset", required = true, num_args = 1.., allow_negative_numbers = true)]
    offsets: Vec<f64>,
}

type CliSession = StorySession<SvgGeometry, RecordingScheduler, RecordingLoader>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn open_session(args: &SceneArgs) -> anyhow::Result<CliSession> {
    let scene = Scene::from_path(&args.scene)?;
    let mut geometry = SvgGeometry::from_path(&args.svg)?;
    if let Some(width) = args.width {
        geometry.set_render_width(width)?;
    }
    let config = SessionConfig {
        assets: AssetResolver::new(args.assets.clone()),
        sync: SyncOptions {
            strict_coupling: args.strict,
            ..SyncOptions::default()
        },
    };
    let session = StorySession::new(
        scene,
        geometry,
        config,
        RecordingScheduler::new(),
        RecordingLoader::default(),
    )
    .with_context(|| format!("materialize '{}'", args.scene.display()))?;
    Ok(session)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let session = open_session(&args.scene)?;
    let sync = session.synchronizer();

    let avatars: Vec<_> = sync
        .scene()
        .avatars
        .iter()
        .zip(sync.spans())
        .map(|(a, span)| {
            serde_json::json!({
                "name": a.avatar.name,
                "node": a.node,
                "meta": a.meta,
                "span": span,
                "costumes": a.costumes.iter().map(|c| serde_json::json!({
                    "costume": c.change.new_costume,
                    "position": c.change.position,
                    "anchor": c.anchor,
                })).collect::<Vec<_>>(),
                "elements": a.elements.iter().map(|e| serde_json::json!({
                    "name": e.element.name,
                    "node": e.node,
                    "anchor": e.anchor,
                })).collect::<Vec<_>>(),
                "locations": a.locations.iter().map(|l| serde_json::json!({
                    "title": l.location.title,
                    "node": l.node,
                    "anchor": l.anchor,
                })).collect::<Vec<_>>(),
                "events": a.events.iter().map(|e| serde_json::json!({
                    "title": e.event.title,
                    "date": e.event.date,
                    "node": e.node,
                    "anchor": e.anchor,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    let out = serde_json::json!({
        "render_width": session.geometry().render_width(),
        "scroll_extent": session.scroll_extent(),
        "avatars": avatars,
        "nodes": session.stage().nodes(),
        "prefetched": session.prefetcher().loader().requested,
        "stylesheet": session.stage().stylesheet(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.scene)?;
    for offset in args.offsets {
        let report = session
            .on_scroll(offset)
            .with_context(|| format!("scroll to {offset}"))?;
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}
