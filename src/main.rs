extern crate sdl2;

use std::error::Error;
use std::process;
use std::time::{Duration, Instant};

use chip8::{Chip8, HEIGHT, KEY_COUNT, WIDTH};
use log::{error, info};
use sdl2::event::Event;
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels;

const SCALE: i16 = 10;
const DEFAULT_CYCLES_PER_FRAME: u32 = 10;
const FRAME_TIME: Duration = Duration::from_micros(16_667); // 60 fps
const TIMER_PERIOD: Duration = Duration::from_micros(16_667); // 60Hz

// 1 2 3 C        1 2 3 4
// 4 5 6 D   <-   Q W E R
// 7 8 9 E        A S D F
// A 0 B F        Z X C V
const KEYMAP: [Scancode; KEY_COUNT] = [
    Scancode::X,    // 0
    Scancode::Num1, // 1
    Scancode::Num2, // 2
    Scancode::Num3, // 3
    Scancode::Q,    // 4
    Scancode::W,    // 5
    Scancode::E,    // 6
    Scancode::A,    // 7
    Scancode::S,    // 8
    Scancode::D,    // 9
    Scancode::Z,    // A
    Scancode::C,    // B
    Scancode::Num4, // C
    Scancode::R,    // D
    Scancode::F,    // E
    Scancode::V,    // F
];

struct Config {
    rom: String,
    cycles_per_frame: u32,
    seed: Option<u64>,
}

impl Config {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut rom = None;
        let mut cycles_per_frame = DEFAULT_CYCLES_PER_FRAME;
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--cycles" => {
                    let value = args.next().ok_or("--cycles needs a value")?;
                    cycles_per_frame = value
                        .parse()
                        .map_err(|_| format!("invalid cycle count: {}", value))?;
                }
                "--seed" => {
                    let value = args.next().ok_or("--seed needs a value")?;
                    seed = Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid seed: {}", value))?,
                    );
                }
                _ if rom.is_none() => rom = Some(arg),
                _ => return Err(format!("unexpected argument: {}", arg)),
            }
        }

        Ok(Self {
            rom: rom.ok_or("missing ROM path")?,
            cycles_per_frame,
            seed,
        })
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "chip8".into());
    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!("usage: {} <rom> [--cycles N] [--seed N]", program);
            process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn Error>> {
    let mut emu = match config.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };
    emu.load_program_from_path(&config.rom)?;
    info!(
        "running {} at {} cycles per frame",
        config.rom, config.cycles_per_frame
    );

    let sdl_ctx = sdl2::init()?;
    let video = sdl_ctx.video()?;

    let window = video
        .window(
            "CHIP-8",
            WIDTH as u32 * SCALE as u32,
            HEIGHT as u32 * SCALE as u32,
        )
        .position_centered()
        .build()?;
    let mut canvas = window.into_canvas().build()?;

    let black = pixels::Color::RGB(0, 0, 0);
    let white = pixels::Color::RGB(255, 255, 255);
    canvas.set_draw_color(black);
    canvas.clear();
    canvas.present();

    let mut event_pump = sdl_ctx.event_pump()?;
    let mut last_timer_tick = Instant::now();

    'main: loop {
        let frame_start = Instant::now();

        for e in event_pump.poll_iter() {
            match e {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                _ => {}
            }
        }

        let keyboard = event_pump.keyboard_state();
        for (key, scancode) in KEYMAP.iter().enumerate() {
            emu.set_key(key, keyboard.is_scancode_pressed(*scancode))?;
        }

        let mut redraw = false;
        for _ in 0..config.cycles_per_frame {
            emu.run_cycle();
            redraw |= emu.draw_flag();
        }

        while last_timer_tick.elapsed() >= TIMER_PERIOD {
            emu.tick_timers();
            last_timer_tick += TIMER_PERIOD;
        }

        if redraw {
            canvas.set_draw_color(black);
            canvas.clear();
            for (i, p) in emu.gfx().iter().enumerate() {
                if *p == 0 {
                    continue;
                }
                let x = (i % WIDTH) as i16 * SCALE;
                let y = (i / WIDTH) as i16 * SCALE;
                canvas.box_(x, y, x + SCALE - 1, y + SCALE - 1, white)?;
            }
            canvas.present();
        }

        if let Some(rest) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    let faults = emu.faults();
    info!(
        "stopped at pc {:03X}; faults: {} overflows, {} underflows, {} unknown opcodes",
        emu.pc(),
        faults.stack_overflows,
        faults.stack_underflows,
        faults.unknown_opcodes
    );
    Ok(())
}
