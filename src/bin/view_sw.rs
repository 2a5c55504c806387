use clap::Parser;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::{
    f64::consts::FRAC_PI_4,
    path::PathBuf,
    time::{Duration, Instant},
};

use tremor_rs::{
    renderer::{FrameStats, RenderMode, software::Software},
    world::{GridMap, MovementParams, Object},
};

const WALK_SPEED: f64 = 2.0; // cells per second
const RUN_FACTOR: f64 = 2.0;
const TURN_SPEED: f64 = 2.0; // radians per second
const PITCH_SPEED: f64 = 1.0;

/// First-person viewer for grid maps.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// JSON map file; the built-in demo map when omitted
    #[arg(value_name = "MAP")]
    map: Option<PathBuf>,

    #[arg(long, default_value_t = 640)]
    width: usize,

    #[arg(long, default_value_t = 480)]
    height: usize,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    fov: f64,

    /// Nothing farther than this many cells is drawn
    #[arg(long, default_value_t = 64.0)]
    max_dist: f64,

    #[arg(long, default_value_t = 30)]
    fps: usize,

    /// Start with the overhead map shown
    #[arg(long)]
    top_down: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let map = match &opts.map {
        Some(path) => GridMap::from_json_file(path)?,
        None => GridMap::demo()?,
    };
    log::info!("map `{}` ({}x{})", map.name(), map.width(), map.height());

    let spawn = map
        .spawn()
        .with_fov(opts.fov.to_radians())
        .with_max_dist(opts.max_dist);
    let mut player = Object::new(0.3, 0.6, spawn, MovementParams::default());
    // the column projection degrades quickly past these
    player
        .camera_mut()
        .set_pitch_limits(-FRAC_PI_4, FRAC_PI_4)?;

    let cfg = map.render_config(opts.width, opts.height);
    let mut renderer = Software::new(map, cfg);

    let mut win = Window::new(
        "tremor - software raycaster",
        opts.width,
        opts.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(opts.fps);

    let mut mode = RenderMode::Normal;
    let mut top_down = opts.top_down;

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut acc_stats = FrameStats::default();
    let mut last_print = Instant::now();
    let mut last_frame = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        /* --------------- input ------------------------------------------ */
        let run = win.is_key_down(Key::LeftShift) || win.is_key_down(Key::RightShift);
        let step = WALK_SPEED * dt * if run { RUN_FACTOR } else { 1.0 };

        if win.is_key_down(Key::W) {
            player.move_forward(step);
        }
        if win.is_key_down(Key::S) {
            player.move_forward(-step);
        }
        if win.is_key_down(Key::A) {
            player.strafe(-step);
        }
        if win.is_key_down(Key::D) {
            player.strafe(step);
        }
        if win.is_key_down(Key::Left) {
            player.turn(-TURN_SPEED * dt);
        }
        if win.is_key_down(Key::Right) {
            player.turn(TURN_SPEED * dt);
        }
        if win.is_key_down(Key::Up) {
            player.pitch_by(PITCH_SPEED * dt);
        }
        if win.is_key_down(Key::Down) {
            player.pitch_by(-PITCH_SPEED * dt);
        }

        let crouching = win.is_key_down(Key::LeftCtrl) || win.is_key_down(Key::RightCtrl);
        player.crouch(crouching);
        if win.is_key_pressed(Key::Space, KeyRepeat::No) {
            player.jump(now);
        }

        if win.is_key_pressed(Key::Z, KeyRepeat::No) {
            mode = match mode {
                RenderMode::Normal => RenderMode::DepthBuffer,
                RenderMode::DepthBuffer => RenderMode::Normal,
            };
            log::info!("render mode: {mode:?}");
        }
        if win.is_key_pressed(Key::M, KeyRepeat::No) {
            top_down = !top_down;
        }

        player.tick(now);

        /* --------------- draw ------------------------------------------- */
        let t0 = Instant::now();
        let stats = renderer.render(player.camera(), mode);
        if top_down {
            renderer.render_top_down(player.camera());
        }
        acc_time += t0.elapsed();
        acc_frames += 1;
        acc_stats.slices += stats.slices;
        acc_stats.truncated_columns += stats.truncated_columns;
        acc_stats.sprites_drawn += stats.sprites_drawn;
        log::trace!("{stats:?}");

        renderer.end_frame(|fb, w, h| win.update_with_buffer(fb, w, h))?;

        // ─────────── report every ~3 s ─────────────────────────────────────
        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            log::info!(
                "avg render: {:.2} ms  ({:.1} FPS)",
                avg_ms,
                1000.0 / avg_ms
            );
            let n = acc_frames.max(1);
            log::debug!(
                "per frame: {} slices, {} truncated columns, {} sprites",
                acc_stats.slices / n,
                acc_stats.truncated_columns / n,
                acc_stats.sprites_drawn / n
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            acc_stats = FrameStats::default();
            last_print = Instant::now();
        }
    }
    Ok(())
}
