//! Portalcast demo entry point
//!
//! Runs the simulation headless on a scripted input track and prints
//! ASCII frames to the terminal. A real embedder supplies its own window,
//! input polling, and `DrawTarget`; this binary stands in for all three.

use std::env;
use std::error::Error;
use std::process;

use portalcast::consts::SIM_DT;
use portalcast::render::{self, DrawTarget, Rgb};
use portalcast::sim::{Level, Simulation, TickInput};
use portalcast::{Raycaster, RenderConfig};

const COLUMNS: usize = 78;
const ROWS: usize = 22;

/// A terminal-sized character framebuffer
struct AsciiFrame {
    cells: Vec<char>,
}

impl AsciiFrame {
    fn new() -> Self {
        Self {
            cells: vec![' '; COLUMNS * ROWS],
        }
    }

    fn print(&self) {
        for row in self.cells.chunks(COLUMNS) {
            println!("{}", row.iter().collect::<String>());
        }
    }
}

/// Shade characters from bright to dark
fn luminance_char(color: Rgb) -> char {
    let lum = 0.299 * color[0] as f32 + 0.587 * color[1] as f32 + 0.114 * color[2] as f32;
    match lum as u32 {
        200.. => '\u{2588}', // █
        120..=199 => '\u{2593}', // ▓
        60..=119 => '\u{2592}',  // ▒
        1..=59 => '\u{2591}',    // ░
        0 => ' ',
    }
}

impl DrawTarget for AsciiFrame {
    fn draw_column(&mut self, column: usize, top: f32, height: f32, color: Rgb) {
        if column >= COLUMNS {
            return;
        }
        let ch = luminance_char(color);
        let start = top.max(0.0) as usize;
        let end = ((top + height).max(0.0) as usize).min(ROWS - 1);
        for row in start..=end {
            self.cells[row * COLUMNS + column] = ch;
        }
    }

    fn draw_marker(&mut self, screen_x: f32, screen_y: f32, _size: f32, _color: Rgb) {
        let (x, y) = (screen_x.round() as i64, screen_y.round() as i64);
        if (0..COLUMNS as i64).contains(&x) && (0..ROWS as i64).contains(&y) {
            self.cells[y as usize * COLUMNS + x as usize] = 'o';
        }
    }
}

/// A little tour of the demo level: press the button, walk through the
/// opened wall, fire both portals, keep walking.
fn scripted(tick: u32) -> TickInput {
    let mut input = TickInput::default();
    match tick {
        0..=2 => input.interact = true,
        3..=110 => input.forward = true,
        111..=140 => input.turn_right = true,
        141..=160 => input.fire_primary = true,
        161..=220 => input.turn_left = true,
        221..=240 => input.fire_secondary = true,
        _ => input.forward = true,
    }
    input
}

fn run() -> Result<(), Box<dyn Error>> {
    let level = match env::args().nth(1) {
        Some(path) => Level::from_json(&std::fs::read_to_string(path)?)?,
        None => Level::demo(),
    };
    let mut sim = Simulation::new(&level)?;
    let caster = Raycaster::new(RenderConfig {
        columns: COLUMNS,
        screen_height: ROWS as f32,
        ..Default::default()
    });

    for tick in 0..600u32 {
        sim.tick(&scripted(tick), SIM_DT);
        if tick % 120 == 0 {
            let mut frame = AsciiFrame::new();
            render::render(&sim, &caster, &mut frame);
            println!(
                "--- tick {tick} | floor {} | pos ({:.1}, {:.1}) ---",
                sim.player.floor + 1,
                sim.player.pos.x,
                sim.player.pos.y
            );
            frame.print();
        }
    }

    let secs: Vec<String> = sim
        .floor_secs()
        .iter()
        .enumerate()
        .map(|(i, s)| format!("floor {}: {:.1}s", i + 1, s))
        .collect();
    println!("time per floor: {}", secs.join(", "));
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("demo failed: {e}");
        process::exit(1);
    }
}
