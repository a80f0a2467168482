use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;

mod error;
mod font;
mod instruction;

pub use error::Chip8Error;
pub use font::{FONTSET, FONT_ADDR};
pub use instruction::Instruction;

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200; // programs are loaded (and start) here
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;

// every address derived from I or pc stays inside the 4K space
const ADDR_MASK: u16 = 0xFFF;

/// Conditions the interpreter absorbs without stopping the program. Counted so
/// a host can notice a misbehaving ROM; execution never depends on them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Faults {
    pub stack_overflows: u64,  // CALL with all 16 slots used
    pub stack_underflows: u64, // RET with an empty stack
    pub unknown_opcodes: u64,
}

pub struct Chip8 {
    // CHIP-8 VM
    memory: [u8; MEMORY_SIZE], // system memory
    v: [u8; 16],               // registers V0-VE (VF is flag for some instructions)
    i: u16,                    // address register
    pc: u16,                   // program counter
    gfx: [u8; WIDTH * HEIGHT], // pixels state, one byte (0 or 1) per pixel
    delay_timer: u8,
    sound_timer: u8, // timers count down at 60Hz, driven by the host
    stack: [u16; STACK_DEPTH],
    sp: usize,              // stack pointer, 0 is empty
    key: [bool; KEY_COUNT], // hex keypad state

    // emulator resources
    draw_flag: bool,
    rng: StdRng,
    faults: Faults,
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8 {
    /// A freshly initialised machine: zeroed state, font at 0x050, pc at 0x200.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Like `new`, but `RND` draws from a generator seeded with `seed`, so runs
    /// are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font_start = FONT_ADDR as usize;
        memory[font_start..font_start + FONTSET.len()].copy_from_slice(&FONTSET);

        Self {
            memory,
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            gfx: [0; WIDTH * HEIGHT],
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            sp: 0,
            key: [false; KEY_COUNT],

            draw_flag: false,
            rng,
            faults: Faults::default(),
        }
    }

    /// Copies `rom` into memory at 0x200. Oversized ROMs are rejected before
    /// anything is written.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} byte ROM at 0x{:03X}", rom.len(), PROGRAM_START);
        Ok(())
    }

    pub fn load_program_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Chip8Error> {
        let rom = fs::read(path.as_ref())?;
        debug!("read {}", path.as_ref().display());
        self.load_program(&rom)
    }

    /// Executes exactly one instruction.
    pub fn run_cycle(&mut self) {
        let addr = self.pc;
        // two-byte big-endian opcodes
        let opcode = u16::from(self.read(addr)) << 8 | u16::from(self.read(addr.wrapping_add(1)));
        self.pc = self.pc.wrapping_add(2);
        self.draw_flag = false;

        let instruction = Instruction::decode(opcode);
        trace!("{:03X}: {:04X} {}", addr, opcode, instruction);
        self.execute(instruction);
    }

    /// Counts both timers down by one. Call at 60Hz, independently of how
    /// fast `run_cycle` is driven.
    pub fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
    }

    pub fn set_key(&mut self, key: usize, pressed: bool) -> Result<(), Chip8Error> {
        let slot = self.key.get_mut(key).ok_or(Chip8Error::InvalidKey(key))?;
        *slot = pressed;
        Ok(())
    }

    pub fn clear_keys(&mut self) {
        self.key = [false; KEY_COUNT];
    }

    /// Row-major framebuffer, index `y * 64 + x`, every cell 0 or 1.
    pub fn gfx(&self) -> &[u8; WIDTH * HEIGHT] {
        &self.gfx
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.gfx[(y % HEIGHT) * WIDTH + x % WIDTH] == 1
    }

    /// Whether the last cycle touched the framebuffer (CLS or DRW).
    pub fn draw_flag(&self) -> bool {
        self.draw_flag
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn stack_pointer(&self) -> usize {
        self.sp
    }

    /// Return addresses currently on the stack, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    pub fn faults(&self) -> Faults {
        self.faults
    }

    fn read(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDR_MASK) as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.memory[(addr & ADDR_MASK) as usize] = value;
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn execute(&mut self, instruction: Instruction) {
        use Instruction::*;

        match instruction {
            Sys { .. } => {} // machine code routines don't exist here
            Cls => {
                self.gfx = [0; WIDTH * HEIGHT];
                self.draw_flag = true;
            }
            Ret => self.ret(),
            Jp { nnn } => self.pc = nnn,
            Call { nnn } => self.call(nnn),
            SeByte { x, kk } => self.skip_if(self.v[x] == kk),
            SneByte { x, kk } => self.skip_if(self.v[x] != kk),
            SeReg { x, y } => self.skip_if(self.v[x] == self.v[y]),
            LdByte { x, kk } => self.v[x] = kk,
            AddByte { x, kk } => self.v[x] = self.v[x].wrapping_add(kk),
            LdReg { x, y } => self.v[x] = self.v[y],
            Or { x, y } => self.v[x] |= self.v[y],
            And { x, y } => self.v[x] &= self.v[y],
            Xor { x, y } => self.v[x] ^= self.v[y],
            AddReg { x, y } => {
                let sum = u16::from(self.v[x]) + u16::from(self.v[y]);
                self.v[0xF] = (sum > 0xFF) as u8;
                self.v[x] = sum as u8;
            }
            Sub { x, y } => {
                // VF = 1 when there's no borrow; computed before x is touched
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[0xF] = (vx >= vy) as u8;
                self.v[x] = vx.wrapping_sub(vy);
            }
            Shr { x } => {
                let vx = self.v[x];
                self.v[0xF] = vx & 0x1;
                self.v[x] = vx >> 1;
            }
            Subn { x, y } => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[0xF] = (vy >= vx) as u8;
                self.v[x] = vy.wrapping_sub(vx);
            }
            Shl { x } => {
                let vx = self.v[x];
                self.v[0xF] = (vx & 0x80) >> 7;
                self.v[x] = vx << 1;
            }
            SneReg { x, y } => self.skip_if(self.v[x] != self.v[y]),
            LdI { nnn } => self.i = nnn,
            JpV0 { nnn } => self.pc = nnn + u16::from(self.v[0]),
            Rnd { x, kk } => self.v[x] = kk & self.rng.gen::<u8>(),
            Drw { x, y, n } => self.draw(x, y, n),
            Skp { x } => self.skip_if(self.key[usize::from(self.v[x] & 0xF)]),
            Sknp { x } => self.skip_if(!self.key[usize::from(self.v[x] & 0xF)]),
            LdVxDt { x } => self.v[x] = self.delay_timer,
            LdVxK { x } => self.wait_for_key(x),
            LdDtVx { x } => self.delay_timer = self.v[x],
            LdStVx { x } => self.sound_timer = self.v[x],
            AddI { x } => self.i = self.i.wrapping_add(u16::from(self.v[x])),
            LdF { x } => self.i = font::glyph_addr(self.v[x]),
            LdB { x } => {
                // so 193 becomes [1, 9, 3] in memory at I
                let vx = self.v[x];
                self.write(self.i, vx / 100);
                self.write(self.i.wrapping_add(1), (vx / 10) % 10);
                self.write(self.i.wrapping_add(2), vx % 10);
            }
            LdIVx { x } => {
                for offset in 0..=x {
                    self.write(self.i.wrapping_add(offset as u16), self.v[offset]);
                }
            }
            LdVxI { x } => {
                for offset in 0..=x {
                    self.v[offset] = self.read(self.i.wrapping_add(offset as u16));
                }
            }
            Unknown(opcode) => {
                self.faults.unknown_opcodes += 1;
                warn!(
                    "ignoring unknown opcode {:04X} at {:03X}",
                    opcode,
                    self.pc.wrapping_sub(2)
                );
            }
        }
    }

    fn ret(&mut self) {
        if self.sp == 0 {
            self.faults.stack_underflows += 1;
            warn!("RET with empty stack at {:03X}, ignored", self.pc.wrapping_sub(2));
            return;
        }
        self.sp -= 1;
        self.pc = self.stack[self.sp];
    }

    fn call(&mut self, nnn: u16) {
        if self.sp == STACK_DEPTH {
            self.faults.stack_overflows += 1;
            warn!("CALL {:03X} with full stack, ignored", nnn);
            return;
        }
        self.stack[self.sp] = self.pc;
        self.sp += 1;
        self.pc = nnn;
    }

    fn wait_for_key(&mut self, x: usize) {
        match self.key.iter().position(|&pressed| pressed) {
            Some(key) => self.v[x] = key as u8,
            // run this instruction again next cycle
            None => self.pc = self.pc.wrapping_sub(2),
        }
    }

    fn draw(&mut self, x: usize, y: usize, height: u8) {
        // draw a sprite at VX,VY with a width of 8 pixels and a height of N pixels
        // each row of 8 pixels is bit-coded in memory starting at I
        // VF is set to 1 if any currently drawn pixels are unset during this
        let vx = usize::from(self.v[x]) % WIDTH;
        let vy = usize::from(self.v[y]) % HEIGHT;

        self.v[0xF] = 0;
        for row in 0..usize::from(height) {
            let sprite = self.read(self.i.wrapping_add(row as u16));
            for p in 0..8 {
                if sprite & (0x80 >> p) == 0 {
                    continue;
                }
                // wraps per pixel, never clipped
                let offset = WIDTH * ((vy + row) % HEIGHT) + (vx + p) % WIDTH;
                if self.gfx[offset] == 1 {
                    self.v[0xF] = 1;
                }
                self.gfx[offset] ^= 1;
            }
        }

        self.draw_flag = true;
    }
}
