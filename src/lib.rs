//! A CHIP-8 interpreter core.
//!
//! [`Chip8`] owns one complete machine. A host drives it by calling
//! [`Chip8::run_cycle`] as often as it likes, [`Chip8::tick_timers`] at 60Hz,
//! refreshing the keypad with [`Chip8::set_key`] and presenting
//! [`Chip8::gfx`]. No state is global, so any number of machines can run side
//! by side.

pub mod chip8;

pub use crate::chip8::{
    Chip8, Chip8Error, Faults, Instruction, HEIGHT, KEY_COUNT, MAX_ROM_SIZE, MEMORY_SIZE,
    PROGRAM_START, STACK_DEPTH, WIDTH,
};
