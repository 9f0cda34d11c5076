mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use cli::{Cli, Commands, ImageIo};
use snapedit::{
    event_bus, init_logging, log_notices, AiBackgroundParams, AlphaChannelSegmenter,
    BackgroundFill, Config, EditorState, IdPhotoParams, PhotoTemplate, RasterImage, Tool,
};
use std::path::Path;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    debug!("snapedit {} (built {})", snapedit::VERSION, snapedit::BUILD_DATE);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    if let Commands::InitConfig(args) = &cli.command {
        return init_config(&config_path, args.force);
    }

    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let bus = event_bus();
    log_notices(&bus);
    let mut editor = EditorState::with_event_bus(config, bus);

    match cli.command {
        Commands::Info(args) => info_command(&mut editor, args.input.as_deref()).await,
        Commands::Crop(args) => {
            load(&mut editor, &args.io.input).await?;
            editor.activate(Tool::Crop)?;
            editor.set_crop_ratio(args.ratio)?;
            let frame = editor.apply_crop()?;
            info!("Cropped to {:.0}x{:.0}", frame.width, frame.height);
            save(&editor, &args.io).await
        }
        Commands::Rotate(args) => {
            load(&mut editor, &args.io.input).await?;
            editor.rotate(args.angle)?;
            save(&editor, &args.io).await
        }
        Commands::Resize(args) => {
            load(&mut editor, &args.io.input).await?;
            editor.resize(args.width, args.height)?;
            save(&editor, &args.io).await
        }
        Commands::Slice(args) => {
            load(&mut editor, &args.input).await?;
            let archive = editor.grid_slice(args.rows, args.cols).await?;
            let path = args.out_dir.join(&archive.file_name);
            tokio::fs::write(&path, &archive.bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{} ({} slices)", path.display(), archive.entries.len());
            Ok(())
        }
        Commands::IdPhoto(args) => {
            load(&mut editor, &args.io.input).await?;
            let settings = &editor.config().id_photo;
            let template_id = args
                .template
                .unwrap_or_else(|| settings.default_template.clone());
            let Some(template) = PhotoTemplate::find(&template_id) else {
                bail!("unknown template '{}'", template_id);
            };
            let background = args.color.unwrap_or(settings.default_background);

            editor.activate(Tool::IdPhoto)?;
            let params = IdPhotoParams::new(template, background).with_scale(args.scale);
            editor.apply_id_photo(params, &AlphaChannelSegmenter).await?;
            // Leaving the tool merges the layers.
            editor.activate(Tool::Select)?;
            save(&editor, &args.io).await
        }
        Commands::ReplaceBg(args) => {
            load(&mut editor, &args.io.input).await?;
            let fill = match (&args.background, args.color) {
                (Some(path), _) => BackgroundFill::Image(read_image(path).await?),
                (None, Some(color)) => BackgroundFill::Color(color),
                (None, None) => BackgroundFill::default(),
            };

            editor.activate(Tool::AiBackground)?;
            let params = AiBackgroundParams {
                fill,
                foreground_scale: args.scale,
            };
            editor
                .apply_ai_background(params, &AlphaChannelSegmenter)
                .await?;
            editor.activate(Tool::Select)?;
            save(&editor, &args.io).await
        }
        Commands::InitConfig(_) => Ok(()),
    }
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default().save_to_file(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn info_command(editor: &mut EditorState, input: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = input {
        load(editor, path).await?;
        let raster = editor.export_raster()?;
        println!("{}: {}x{}", path.display(), raster.width(), raster.height());
    }
    println!("Photo templates:");
    for template in PhotoTemplate::builtin() {
        println!(
            "  {:<16}{:<14}{}x{}",
            template.id, template.name, template.width, template.height
        );
    }
    Ok(())
}

async fn read_image(path: &Path) -> anyhow::Result<RasterImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(RasterImage::decode(&bytes)?)
}

async fn load(editor: &mut EditorState, path: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    editor.load_image_bytes(&bytes)?;
    Ok(())
}

async fn save(editor: &EditorState, io: &ImageIo) -> anyhow::Result<()> {
    let png = editor.export_png()?;
    tokio::fs::write(&io.output, png)
        .await
        .with_context(|| format!("writing {}", io.output.display()))?;
    println!("{}", io.output.display());
    Ok(())
}
