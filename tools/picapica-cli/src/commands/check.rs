//! Check configuration and pipeline health.

use picapica_backend_client::{BoothBackend, HostedBackend};
use picapica_booth_model::{CompositionStyle, FilterKind, Layout};
use picapica_capture_engine::{capture_from_source, TestPatternSource};
use picapica_common::config::AppConfig;
use picapica_strip_engine::compose;

pub async fn run() -> anyhow::Result<()> {
    println!("Picapica System Check");
    println!("{}", "=".repeat(50));

    let config = AppConfig::load();
    match config.booth.layout.parse::<Layout>() {
        Ok(layout) => println!("[OK] Default layout: {layout}"),
        Err(e) => println!("[WARN] Config default layout is invalid: {e}"),
    }
    println!(
        "[OK] Countdown: {} ticks @ {}ms, {}ms between shots",
        config.booth.countdown_from, config.booth.tick_ms, config.booth.shot_delay_ms
    );

    // Capture smoke test against the synthetic source.
    let mut source = TestPatternSource::new(640, 480);
    let shot = capture_from_source(&mut source, Layout::ThreeByTwo, FilterKind::None);
    match &shot {
        Some(frame) => println!(
            "[OK] Capture pipeline: {}x{} shot produced",
            frame.width(),
            frame.height()
        ),
        None => println!("[FAIL] Capture pipeline produced no shot"),
    }

    // Composition smoke test.
    if let Some(frame) = shot {
        let strip = compose(
            std::slice::from_ref(&frame),
            Layout::ThreeByTwo,
            &CompositionStyle::default(),
        )
        .await?;
        println!(
            "[OK] Compositor: {}x{} canvas rendered",
            strip.width(),
            strip.height()
        );
    }

    // Backend wiring.
    if config.backend.is_configured() {
        println!("[OK] Backend configured: {}", config.backend.base_url);
        let backend = HostedBackend::from_config(&config.backend)?;
        match backend.get_session().await? {
            Some(session) => println!("[OK] Persisted session for {}", session.user.email),
            None => println!("[OK] No persisted session (signed out)"),
        }
    } else {
        println!("[WARN] Backend not configured; booth runs stay local");
    }

    Ok(())
}
