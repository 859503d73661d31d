//! Compose a strip directly from image files.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use picapica_booth_model::style::parse_hex;
use picapica_booth_model::{Frame, Layout, Sticker};
use picapica_strip_engine::PreviewSurface;

pub async fn run(
    layout: String,
    background: String,
    sticker: Option<PathBuf>,
    out: PathBuf,
    images: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let layout: Layout = layout.parse()?;
    let background = parse_hex(&background).context("background must be a #rrggbb color")?;

    if images.len() != layout.shot_count() {
        tracing::warn!(
            given = images.len(),
            expected = layout.shot_count(),
            "image count does not match the layout; extra slots stay wallpaper"
        );
    }

    let mut frames = Vec::with_capacity(images.len());
    for path in &images {
        let bitmap = image::open(path)
            .with_context(|| format!("cannot load {}", path.display()))?
            .to_rgba8();
        frames.push(Frame::from_image(&bitmap)?);
    }

    let mut preview = PreviewSurface::new(frames, layout, Duration::from_millis(1000));
    preview.set_background(background, Duration::ZERO);
    if let Some(path) = &sticker {
        let bytes =
            std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sticker")
            .to_string();
        preview.set_sticker(Some(Sticker::from_bytes(name, &bytes)?), Duration::ZERO);
    }
    preview.render().await?;

    let png = preview.export_png()?;
    std::fs::write(&out, &png).with_context(|| format!("cannot write {}", out.display()))?;
    println!("Strip written to {} ({} bytes)", out.display(), png.len());

    Ok(())
}
