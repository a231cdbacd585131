//! Walk around a generated isometric world.
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- --config engine.ron --windowed
//! ```
//!
//! Arrow keys move along the map axes, Escape quits.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use minifb::{Key, Scale, Window, WindowOptions};

use isostream_rs::{
    config::{EngineConfig, Mode, Strategy},
    engine::{Engine, Screen, world_to_screen},
    renderer::{Display, display::draw_marker},
    sim::{InputCmd, TicRunner},
    world::{Camera, Palette, camera::to_pixels},
};

#[derive(Parser, Debug)]
#[command(about = "Isometric tile-streaming viewer")]
struct Args {
    /// RON engine config; defaults are used for anything it leaves out.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the map seed.
    #[arg(long)]
    seed: Option<u32>,

    /// Composite metatiles instead of rasterizing cubes.
    #[arg(long)]
    metatile: bool,

    /// Recompile a camera-centred region instead of the whole world.
    #[arg(long)]
    windowed: bool,
}

fn read_input(win: &Window) -> InputCmd {
    let mut cmd = InputCmd::default();
    if win.is_key_down(Key::Right) {
        cmd.iso_dx += 1;
    }
    if win.is_key_down(Key::Left) {
        cmd.iso_dx -= 1;
    }
    if win.is_key_down(Key::Up) {
        cmd.iso_dy -= 1;
    }
    if win.is_key_down(Key::Down) {
        cmd.iso_dy += 1;
    }
    cmd
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => EngineConfig::load_no_fallback(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.map.seed = seed;
    }
    if args.metatile {
        cfg.strategy = Strategy::Metatile;
    }
    if args.windowed {
        cfg.mode = Mode::Windowed;
    }
    let (w, h) = (cfg.screen.w, cfg.screen.h);
    let screen = Screen::new(w as i32, h as i32);

    let mut engine = Engine::from_config(cfg.clone())?;
    let mut sim = TicRunner::new(engine.extent());
    let start = sim.player_view().context("player was not spawned")?;
    let mut camera = Camera::new(start.pos, *sim.bounds());
    let mut display = Display::new(cfg.mirror, Palette::default());

    let boot = engine.boot(camera.pos_px())?;
    engine.present(&mut display, &boot);
    let stats = engine.stats();
    println!(
        "{:?}/{:?}: {} tiles of {} ({} dropped)",
        cfg.strategy, cfg.mode, stats.tiles, stats.capacity, stats.overflows
    );

    let options = WindowOptions {
        scale: Scale::X4,
        ..WindowOptions::default()
    };
    let mut win = Window::new("isostream", w, h, options)?;
    win.set_target_fps(60);
    let mut fb = vec![0u32; w * h];

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        sim.set_input(read_input(&win));
        let tics = sim.pump();
        let Some(player) = sim.player_view() else {
            break;
        };
        for _ in 0..tics {
            camera.follow(player.pos);
        }

        let frame = engine.frame(camera.pos_px())?;
        engine.present(&mut display, &frame);
        display.compose(&mut fb, w, h);
        let feet = world_to_screen(to_pixels(player.pos), camera.pos_px(), screen);
        draw_marker(&mut fb, w, h, feet, player.frame);

        acc_time += t0.elapsed();
        acc_frames += 1;
        win.update_with_buffer(&fb, w, h)?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            log::info!(
                "avg frame: {avg_ms:.2} ms, camera {}, window at {}",
                camera.pos_px(),
                engine.window().loaded()
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
