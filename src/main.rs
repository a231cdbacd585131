//! Compile a world once and show its deduplicated tile atlas.
//!
//! ```bash
//! cargo run --release --bin isostream_rs -- [config.ron] [--metatile]
//! ```

use std::path::PathBuf;

use clap::Parser;
use minifb::{Key, Scale, Window, WindowOptions};

use isostream_rs::{
    config::{EngineConfig, Strategy},
    engine::WorldCompiler,
    world::{Palette, TILE_SIZE, generator},
};

const COLUMNS: usize = 32;
const CELL: usize = TILE_SIZE + 1; // tile plus a one pixel gap
const GAP: u32 = 0xFF20_2020;

#[derive(Parser, Debug)]
#[command(about = "Tile atlas viewer")]
struct Args {
    /// RON engine config.
    config: Option<PathBuf>,

    /// Composite metatiles instead of rasterizing cubes.
    #[arg(long)]
    metatile: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = args.config.as_ref().map(EngineConfig::load).unwrap_or_default();
    if args.metatile {
        cfg.strategy = Strategy::Metatile;
    }
    cfg.validate()?;

    let m = &cfg.map;
    let map = generator::generate(m.cols, m.rows, m.max_height, m.seed)?;
    let mut compiler = WorldCompiler::new(&map, &cfg);
    let stats = compiler.compile_world(&map);
    println!("{stats:#?}");

    let atlas = compiler.atlas();
    let rows = atlas.len().div_ceil(COLUMNS).max(1);
    let (w, h) = (COLUMNS * CELL + 1, rows * CELL + 1);
    let palette = Palette::default();

    // ─────────── lay the tiles out in a grid ────────────
    let mut buffer = vec![GAP; w * h];
    for (i, tile) in atlas.iter().enumerate() {
        let (ox, oy) = (1 + (i % COLUMNS) * CELL, 1 + (i / COLUMNS) * CELL);
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                buffer[(oy + y) * w + ox + x] = palette[tile.pixel(x, y) as usize];
            }
        }
    }

    // ─────────── show window ────────────
    let options = WindowOptions {
        scale: Scale::X2,
        ..WindowOptions::default()
    };
    let title = format!("atlas: {} tiles ({:?})", atlas.len(), cfg.strategy);
    let mut window = Window::new(&title, w, h, options)?;
    window.set_target_fps(30);
    while window.is_open() && !window.is_key_down(Key::Escape) {
        window.update_with_buffer(&buffer, w, h)?;
    }
    Ok(())
}
