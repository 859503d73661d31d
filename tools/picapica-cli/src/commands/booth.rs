//! Run a full countdown capture sequence and export the strip.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use picapica_backend_client::{encode_image_data, BoothBackend, HostedBackend};
use picapica_booth_model::style::parse_hex;
use picapica_booth_model::{
    CaptureSession, FilterKind, Layout, NewGeneratedImage, NewSession, Sticker,
};
use picapica_capture_engine::{
    run_capture_sequence, BoothEvent, FrameSource, SequenceTiming, StillSource,
    TestPatternSource,
};
use picapica_common::clock::{Clock, ManualClock, TokioClock};
use picapica_common::config::AppConfig;
use picapica_common::BoothResult;
use picapica_strip_engine::PreviewSurface;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    layout: String,
    filter: String,
    background: String,
    sticker: Option<PathBuf>,
    out: PathBuf,
    source_dir: Option<PathBuf>,
    realtime: bool,
    save: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load();
    let layout: Layout = layout.parse()?;
    let filter: FilterKind = filter.parse()?;
    let background =
        parse_hex(&background).context("background must be a #rrggbb color")?;

    let mut source: Box<dyn FrameSource> = match &source_dir {
        Some(dir) => {
            let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
                .with_context(|| format!("cannot read {}", dir.display()))?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("png" | "jpg" | "jpeg" | "webp")
                    )
                })
                .collect();
            paths.sort();
            anyhow::ensure!(!paths.is_empty(), "no image files in {}", dir.display());
            Box::new(StillSource::from_paths(&paths)?)
        }
        None => Box::new(TestPatternSource::new(1280, 720)),
    };

    // Without --realtime the countdown runs on virtual time.
    let clock: Box<dyn Clock> = if realtime {
        Box::new(TokioClock::new())
    } else {
        Box::new(ManualClock::new())
    };

    let mut session = CaptureSession::new(layout);
    session.set_filter(filter);

    println!(
        "Booth run: {} ({} shots, filter {})",
        layout,
        layout.shot_count(),
        filter
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                BoothEvent::Countdown(0) => {}
                BoothEvent::Countdown(n) => println!("  {n}..."),
                BoothEvent::Captured { index } => println!("  shot {} captured", index + 1),
                BoothEvent::SequenceComplete { captured } => {
                    println!("Sequence complete: {captured} shots");
                }
            }
        }
    });

    let timing = SequenceTiming::from(&config.booth);
    let outcome = run_capture_sequence(
        &mut session,
        source.as_mut(),
        clock.as_ref(),
        &timing,
        Some(&tx),
    )
    .await?;
    drop(tx);
    let _ = printer.await;

    let Some(frames) = outcome else {
        anyhow::bail!("a capture sequence is already running for this session");
    };
    anyhow::ensure!(
        !frames.is_empty(),
        "no shots were captured (is a video source attached?)"
    );

    let mut preview = PreviewSurface::new(
        frames,
        layout,
        Duration::from_millis(config.booth.restyle_debounce_ms),
    );
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
    std::fs::write(&out, &png)
        .with_context(|| format!("cannot write {}", out.display()))?;
    println!("Strip written to {} ({} bytes)", out.display(), png.len());

    if save {
        if !config.backend.is_configured() {
            eprintln!(
                "Backend not configured; strip stays local \
                 (set backend.base_url and backend.api_key in the config)"
            );
        } else {
            // Backend failures never undo the local export.
            match persist_strip(&config, layout, filter, &preview, &png).await {
                Ok(image_id) => println!("Saved to backend (image {image_id})"),
                Err(e) => {
                    tracing::warn!(error = %e, "backend save failed");
                    eprintln!("Could not save to backend: {e}");
                }
            }
        }
    }

    Ok(())
}

async fn persist_strip(
    config: &AppConfig,
    layout: Layout,
    filter: FilterKind,
    preview: &PreviewSurface,
    png: &[u8],
) -> BoothResult<String> {
    let backend = HostedBackend::from_config(&config.backend)?;
    let user_id = backend.get_session().await?.map(|s| s.user.id);

    let session_record = backend
        .create_session(NewSession {
            user_id: user_id.clone(),
            layout,
            filter_applied: filter.to_string(),
        })
        .await?;

    let record = backend
        .save_generated_image(NewGeneratedImage {
            user_id,
            session_id: session_record.id,
            image_data: encode_image_data(png),
            layout,
            background_color: preview.style().background_hex(),
            sticker_applied: preview.style().sticker_name().map(str::to_string),
            file_size: png.len() as u64,
        })
        .await?;

    // The strip was already exported locally, so count the download;
    // a miss here is log-only.
    if let Err(e) = backend.update_image_download_count(&record.id).await {
        tracing::warn!(error = %e, image_id = %record.id, "download count update failed");
    }

    Ok(record.id)
}
