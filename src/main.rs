use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use pocketpdf::bookmark::BookmarkStore;
use pocketpdf::event_source::{ButtonSource, ScriptedButtonSource};
use pocketpdf::inputs::ButtonReps;
use pocketpdf::panic_handler;
use pocketpdf::pdf::color::display_rgb;
use pocketpdf::pdf::{MupdfRasterizer, PixelBuffer, Rotation, Session, ViewCommand};
use pocketpdf::settings::{self, Settings};

const BOOKMARKS_FILENAME: &str = "bookmarks.json";

/// Open a PDF on a simulated handheld screen, replay button presses and
/// save the final frame as PNG.
#[derive(Debug, Parser)]
#[command(name = "pocketpdf", about, version)]
struct Cli {
    /// Path to the PDF file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Page to show (1-based). Default: last view, or the first page
    #[arg(long)]
    page: Option<usize>,

    /// Zoom table index (4 is 1.0x)
    #[arg(long)]
    zoom_level: Option<usize>,

    /// Rotation in degrees, a multiple of 90
    #[arg(long, allow_negative_numbers = true)]
    rotation: Option<i32>,

    /// Render whole pages once and pan by copying
    #[arg(long)]
    fast_scroll: bool,

    /// Button script, e.g. "down*3 hold:right:30 r wait:5"
    #[arg(long, default_value = "")]
    script: String,

    /// Where to write the presented frame
    #[arg(long, short, default_value = "frame.png")]
    output: PathBuf,

    /// Log file
    #[arg(long, default_value = "pocketpdf.log")]
    log_file: PathBuf,

    /// Bookmarks file. Default: next to the settings file
    #[arg(long)]
    bookmarks: Option<PathBuf>,

    /// Ignore the settings file
    #[arg(long)]
    no_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create(&cli.log_file)?,
    )?;
    panic_handler::initialize_panic_handler();

    info!("Starting pocketpdf");

    if !cli.no_config {
        settings::load_settings();
    }
    if cli.fast_scroll {
        settings::replace(Settings {
            fast_scroll: true,
            ..settings::snapshot()
        });
    }
    let initial = settings::snapshot();

    let bookmarks_path = cli.bookmarks.clone().or_else(default_bookmarks_path);
    let mut bookmarks = BookmarkStore::load_or_ephemeral(bookmarks_path.as_deref());

    let mut session = Session::open(MupdfRasterizer::new(), &cli.file, &initial, Some(&bookmarks))
        .with_context(|| format!("cannot open {}", cli.file.display()))?;

    if let Some(page) = cli.page {
        session.reload_page(page);
    }
    if let Some(level) = cli.zoom_level {
        session.set_zoom_level(level);
    }
    if let Some(degrees) = cli.rotation {
        session.set_rotation(Rotation::from_degrees(degrees));
    }

    let mut source = ScriptedButtonSource::parse(&cli.script)?;
    while let Some(frame) = source.poll()? {
        step(&mut session, &frame, &settings::snapshot());
    }
    while session.is_loading() {
        step(&mut session, &ButtonReps::default(), &settings::snapshot());
    }

    save_png(session.front_buffer(), &cli.output)?;

    let overlay = session.overlay(&settings::snapshot());
    if let Some(error) = &overlay.error {
        eprintln!("{error}");
    }
    if let Some((banner, _)) = &overlay.banner {
        println!("{banner}");
    }
    let (x, y) = session.offset();
    println!(
        "page {} of {}, {}, offset ({x}, {y}) -> {}",
        session.current_page(),
        session.page_count(),
        session.zoom().label(),
        cli.output.display()
    );

    session.save_last_view(&mut bookmarks);
    info!("Shutting down pocketpdf");
    Ok(())
}

fn step(session: &mut Session<MupdfRasterizer>, frame: &ButtonReps, settings: &Settings) {
    match session.update(frame, settings) {
        ViewCommand::Reload => session.reload(settings),
        ViewCommand::InvokeMenu => info!("Menu requested"),
        ViewCommand::InvokePageChooser => info!("Page chooser requested"),
        ViewCommand::MarkDirty | ViewCommand::None => {}
    }
}

fn default_bookmarks_path() -> Option<PathBuf> {
    settings::preferred_config_path()
        .and_then(|p| p.parent().map(|dir| dir.join(BOOKMARKS_FILENAME)))
}

fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let image = image::RgbImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        image::Rgb(display_rgb(buffer.row(y)[x as usize]))
    });
    image
        .save(path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}
