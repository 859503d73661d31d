//! Show the layout table.

use picapica_booth_model::{Layout, STRIP_HEIGHT, STRIP_WIDTH};

pub fn run() -> anyhow::Result<()> {
    println!("Picapica layouts (strip canvas {STRIP_WIDTH}x{STRIP_HEIGHT})");
    println!("{}", "=".repeat(60));

    for layout in Layout::ALL {
        let (w, h) = layout.capture_size();
        let grid = match layout {
            Layout::ThreeByTwo => "2 cols x 3 rows, 30px gaps, 80px watermark band",
            Layout::FourByTwo => "2 sub-strips x 4 rows each (same 4 shots twice)",
            Layout::TwoByTwo => "2 cols x 2 rows, 590x732 slots, blank footer",
        };
        println!(
            "  {:<4} {} shots @ {}x{}  {}",
            layout.as_str(),
            layout.shot_count(),
            w,
            h,
            grid
        );
    }

    Ok(())
}
