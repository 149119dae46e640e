use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use thumbsmith::gallery::{FileReferenceStore, FsBlobStore};
use thumbsmith::{
    AppConfig, Assets, CropAspect, EditState, Notice, RasterImage, ThumbnailGallery,
};

const DEFAULT_OUTPUT: &str = "youtube-thumbnail.png";

#[derive(Parser, Debug)]
#[command(name = "thumbsmith", version)]
struct Cli {
    /// Configuration JSON. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a thumbnail to a PNG file.
    Render(RenderArgs),
    /// Upload a PNG to the gallery.
    Save(SaveArgs),
    /// List saved thumbnails, newest first.
    List {
        /// Print the list as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Remove a saved thumbnail from the gallery.
    Delete {
        id: String,
    },
    /// List the built-in text effect presets.
    Presets,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Background photo.
    #[arg(long)]
    background: PathBuf,

    /// Logo image drawn over the thumbnail.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Editing state JSON; unset fields take their defaults.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Title text, overriding the state.
    #[arg(long)]
    title: Option<String>,

    /// Output aspect, overriding the state.
    #[arg(long, value_enum)]
    crop: Option<CropChoice>,

    /// Text effect preset id applied after the state is loaded.
    #[arg(long)]
    preset: Option<String>,

    /// Output PNG path.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    out: PathBuf,

    /// Also upload the result to the gallery.
    #[arg(long)]
    save: bool,
}

#[derive(Parser, Debug)]
struct SaveArgs {
    /// PNG to upload.
    image: PathBuf,

    /// Title recorded with the thumbnail.
    #[arg(long, default_value = "")]
    title: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CropChoice {
    Square,
    Portrait,
    Landscape,
    Widescreen,
}

impl From<CropChoice> for CropAspect {
    fn from(choice: CropChoice) -> Self {
        match choice {
            CropChoice::Square => CropAspect::Square,
            CropChoice::Portrait => CropAspect::Portrait,
            CropChoice::Landscape => CropAspect::Landscape,
            CropChoice::Widescreen => CropAspect::Widescreen,
        }
    }
}

type Gallery = ThumbnailGallery<FsBlobStore, FileReferenceStore>;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Render(args) => cmd_render(&config, args),
        Command::Save(args) => cmd_save(&config, args),
        Command::List { json } => cmd_list(&config, json),
        Command::Delete { id } => cmd_delete(&config, &id),
        Command::Presets => cmd_presets(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("load config '{}'", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn open_gallery(config: &AppConfig) -> Gallery {
    ThumbnailGallery::new(
        FsBlobStore::new(&config.storage.blob_root, &config.storage.public_base_url),
        FileReferenceStore::new(&config.storage.reference_file),
        config.gallery.clone(),
    )
}

fn read_bytes(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

/// Prints a notice and turns errors into a failing exit.
fn report<T>(result: thumbsmith::ThumbResult<T>, notice: Notice) -> anyhow::Result<T> {
    let prefix = if notice.is_error() { "error" } else { "ok" };
    eprintln!("{prefix}: {} - {}", notice.title, notice.description);
    Ok(result?)
}

fn cmd_render(config: &AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    let mut state = match &args.state {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read state '{}'", path.display()))?;
            EditState::from_json(&json).with_context(|| "parse state JSON")?
        }
        None => EditState::default(),
    };
    if let Some(title) = args.title {
        state.title = title;
    }
    if let Some(crop) = args.crop {
        state.crop = crop.into();
    }
    if let Some(id) = &args.preset {
        let preset =
            thumbsmith::find_preset(id).with_context(|| format!("unknown preset '{id}'"))?;
        preset.apply(&mut state);
    }

    let background = read_bytes(&args.background)?;
    let logo = args.logo.as_deref().map(read_bytes).transpose()?;
    let assets = Assets::decode(&background, logo.as_deref())
        .with_context(|| "decode input images")?;

    let fonts = config.font_registry();
    let image = thumbsmith::render(&state, &assets, &fonts)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());

    if args.save {
        let mut gallery = open_gallery(config);
        let result = gallery.save(&image, &state.title);
        let notice = Notice::for_save(&result);
        let saved = report(result, notice)?;
        println!("{}\t{}", saved.id, saved.url);
    }
    Ok(())
}

fn cmd_save(config: &AppConfig, args: SaveArgs) -> anyhow::Result<()> {
    let bytes = read_bytes(&args.image)?;
    let image = RasterImage::decode(&bytes)
        .with_context(|| format!("decode '{}'", args.image.display()))?;

    let mut gallery = open_gallery(config);
    let result = gallery.save(&image, &args.title);
    let notice = Notice::for_save(&result);
    let saved = report(result, notice)?;
    println!("{}\t{}", saved.id, saved.url);
    Ok(())
}

fn cmd_list(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let entries = open_gallery(config).list();
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        eprintln!("no saved thumbnails");
    }
    for entry in entries {
        println!(
            "{}\t{}\t{}\t{}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            Gallery::download_name(&entry),
            entry.url
        );
    }
    Ok(())
}

fn cmd_delete(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let mut gallery = open_gallery(config);
    let result = gallery.delete(id);
    let notice = Notice::for_delete(&result);
    report(result, notice)
}

fn cmd_presets() -> anyhow::Result<()> {
    for preset in thumbsmith::list_presets() {
        println!("{:<14} {:<14} {}", preset.id, preset.name, preset.description);
    }
    Ok(())
}
