use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::json;

use regioncap::Config;
use regioncap::capture::{
    CaptureOrchestrator, FileSaveConfig, NoticeLevel, SessionOutcome, StillImageBackend,
};
use regioncap::config::ColorSpec;
use regioncap::draw::{DrawOperation, RenderOptions, bitmap, render_frame};
use regioncap::input::{Key, Modifiers, PointerId, RawSnapTarget, Tool};
use regioncap::overlay::{CoordinateTransform, OverlayMetadata};
use regioncap::util::{Point, Rect, Size};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("REGIONCAP_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "regioncap")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Region capture and annotation overlay tools")]
struct Cli {
    /// Config file to use instead of ~/.config/regioncap/config.toml
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON list of annotation operations onto an image
    Flatten {
        /// Base PNG image
        #[arg(long, value_name = "PNG")]
        base: PathBuf,
        /// JSON array of operations
        #[arg(long, value_name = "JSON")]
        ops: PathBuf,
        /// Where to write the flattened PNG
        #[arg(long, value_name = "PNG")]
        out: PathBuf,
    },

    /// Run a scripted overlay session against a screenshot
    Replay {
        /// Full-screen PNG standing in for the monitor
        #[arg(long, value_name = "PNG")]
        screen: PathBuf,
        /// JSON session script
        #[arg(long, value_name = "JSON")]
        script: PathBuf,
        /// Monitor scale factor
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        /// Directory for finalized captures
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Print the capture region for an overlay rectangle
    MapRect {
        /// Overlay launch query (origin_x=..&width=..&scale=..)
        #[arg(long)]
        query: String,
        /// Overlay viewport width (defaults to the logical monitor width)
        #[arg(long)]
        viewport_width: Option<f64>,
        /// Overlay viewport height (defaults to the logical monitor height)
        #[arg(long)]
        viewport_height: Option<f64>,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        width: f64,
        height: f64,
    },

    /// Write the documented default config file
    InitConfig,
}

/// A recorded overlay session.
#[derive(Debug, Deserialize)]
struct Script {
    /// Windows offered for snapping, in physical pixels
    #[serde(default)]
    windows: Vec<RawSnapTarget>,
    events: Vec<ScriptEvent>,
}

fn default_pointer() -> PointerId {
    1
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ScriptEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default = "default_pointer")]
        pointer: PointerId,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default = "default_pointer")]
        pointer: PointerId,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default = "default_pointer")]
        pointer: PointerId,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Types each character of `text`
    Text {
        text: String,
    },
    Tool {
        tool: Tool,
    },
    Color {
        color: ColorSpec,
    },
    Edit,
    Confirm,
    Undo,
    Cancel,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Flatten { base, ops, out } => flatten(&config, &base, &ops, &out),
        Command::Replay {
            screen,
            script,
            scale,
            out_dir,
        } => replay(&config, &screen, &script, scale, out_dir),
        Command::MapRect {
            query,
            viewport_width,
            viewport_height,
            x,
            y,
            width,
            height,
        } => map_rect(
            &query,
            Size::new(viewport_width.unwrap_or(0.0), viewport_height.unwrap_or(0.0)),
            Rect::new(x, y, width, height),
        ),
        Command::InitConfig => {
            let path = Config::create_default_file()?;
            println!("Created {}", path.display());
            Ok(())
        }
    }
}

fn flatten(config: &Config, base: &Path, ops: &Path, out: &Path) -> Result<()> {
    let base_png = fs::read(base).with_context(|| format!("Failed to read {}", base.display()))?;
    let base = bitmap::decode_png(&base_png).context("Base image is not a valid PNG")?;

    let ops_json =
        fs::read_to_string(ops).with_context(|| format!("Failed to read {}", ops.display()))?;
    let operations: Vec<DrawOperation> =
        serde_json::from_str(&ops_json).context("Failed to parse operations")?;
    log::info!("Replaying {} operations", operations.len());

    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, base.width(), base.height())?;
    {
        let ctx = cairo::Context::new(&surface)?;
        let options = RenderOptions {
            font_family: config.annotation.font_family.clone(),
        };
        render_frame(&ctx, &base, &operations, None, &options)?;
    }
    surface.flush();

    let png = bitmap::encode_png(&surface)?;
    fs::write(out, png).with_context(|| format!("Failed to write {}", out.display()))?;
    println!("{}", out.display());
    Ok(())
}

fn replay(
    config: &Config,
    screen: &Path,
    script: &Path,
    scale: f64,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let screen_png =
        fs::read(screen).with_context(|| format!("Failed to read {}", screen.display()))?;
    let screen_surface = bitmap::decode_png(&screen_png).context("Screen is not a valid PNG")?;
    let metadata = OverlayMetadata::from_physical(
        0,
        0,
        screen_surface.width() as u32,
        screen_surface.height() as u32,
        scale,
    );
    drop(screen_surface);

    let script_json =
        fs::read_to_string(script).with_context(|| format!("Failed to read {}", script.display()))?;
    let script: Script = serde_json::from_str(&script_json).context("Failed to parse script")?;

    let mut save_config = FileSaveConfig::default();
    if let Some(dir) = out_dir {
        save_config.save_directory = dir;
    }
    let backend = Arc::new(StillImageBackend::new(screen_png, save_config));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let handle = runtime.handle().clone();

    runtime.block_on(async move {
        let mut orchestrator =
            CaptureOrchestrator::new(config, metadata, Size::default(), backend, &handle);
        orchestrator.set_snap_targets(script.windows);

        for event in script.events {
            apply_event(&mut orchestrator, event);
            while orchestrator.phase().is_busy() {
                if !orchestrator.next_completion().await {
                    break;
                }
            }
            for notice in orchestrator.take_notices() {
                match notice.level {
                    NoticeLevel::Info => log::info!("{}", notice.message),
                    NoticeLevel::Warning => log::warn!("{}", notice.message),
                    NoticeLevel::Error => log::error!("{}", notice.message),
                }
                eprintln!("{}", notice.message);
            }
        }

        let report = match orchestrator.take_outcome() {
            Some(SessionOutcome::Finalized(result)) => json!({
                "status": "finalized",
                "path": result.path,
                "width": result.width,
                "height": result.height,
                "logical_width": result.logical_width,
                "logical_height": result.logical_height,
            }),
            Some(SessionOutcome::Cancelled) => json!({ "status": "cancelled" }),
            None => json!({
                "status": "open",
                "phase": orchestrator.phase().to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        anyhow::Ok(())
    })
}

fn apply_event(orchestrator: &mut CaptureOrchestrator, event: ScriptEvent) {
    log::debug!("Script event: {:?}", event);
    let result = match event {
        ScriptEvent::PointerDown { x, y, pointer } => {
            orchestrator.pointer_down(pointer, Point::new(x, y));
            Ok(())
        }
        ScriptEvent::PointerMove { x, y, pointer } => {
            orchestrator.pointer_move(pointer, Point::new(x, y));
            Ok(())
        }
        ScriptEvent::PointerUp { x, y, pointer } => {
            orchestrator.pointer_up(pointer, Point::new(x, y));
            Ok(())
        }
        ScriptEvent::Key { key, modifiers } => {
            orchestrator.key_press(Key::from_name(&key), modifiers);
            Ok(())
        }
        ScriptEvent::Text { text } => {
            for c in text.chars() {
                let key = if c == ' ' { Key::Space } else { Key::Char(c) };
                orchestrator.key_press(key, Modifiers::new());
            }
            Ok(())
        }
        ScriptEvent::Tool { tool } => orchestrator.select_tool(tool),
        ScriptEvent::Color { color } => {
            orchestrator.set_color(color.to_color());
            Ok(())
        }
        ScriptEvent::Edit => orchestrator.edit(),
        ScriptEvent::Confirm => orchestrator.confirm(),
        ScriptEvent::Undo => {
            orchestrator.undo();
            Ok(())
        }
        ScriptEvent::Cancel => {
            orchestrator.cancel();
            Ok(())
        }
    };

    if let Err(err) = result {
        log::warn!("Script event ignored: {}", err);
    }
}

fn map_rect(query: &str, viewport: Size, rect: Rect) -> Result<()> {
    let metadata = OverlayMetadata::from_query(query)?;
    let transform = CoordinateTransform::new(metadata, viewport);
    let region = transform.to_monitor_rect(rect)?;

    let report = json!({
        "region": region,
        "physical": region.physical_rect(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
