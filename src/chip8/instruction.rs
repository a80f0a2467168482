use std::fmt;

/// One decoded CHIP-8 instruction with its operands already pulled out of the
/// opcode word.
///
/// `x`/`y` are register indices (0-15), `kk` an immediate byte, `nnn` a 12-bit
/// address and `n` the sprite height nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Sys { nnn: u16 },                   // 0NNN
    Cls,                                // 00E0
    Ret,                                // 00EE
    Jp { nnn: u16 },                    // 1NNN
    Call { nnn: u16 },                  // 2NNN
    SeByte { x: usize, kk: u8 },        // 3XKK
    SneByte { x: usize, kk: u8 },       // 4XKK
    SeReg { x: usize, y: usize },       // 5XY0
    LdByte { x: usize, kk: u8 },        // 6XKK
    AddByte { x: usize, kk: u8 },       // 7XKK
    LdReg { x: usize, y: usize },       // 8XY0
    Or { x: usize, y: usize },          // 8XY1
    And { x: usize, y: usize },         // 8XY2
    Xor { x: usize, y: usize },         // 8XY3
    AddReg { x: usize, y: usize },      // 8XY4
    Sub { x: usize, y: usize },         // 8XY5
    Shr { x: usize },                   // 8XY6
    Subn { x: usize, y: usize },        // 8XY7
    Shl { x: usize },                   // 8XYE
    SneReg { x: usize, y: usize },      // 9XY0
    LdI { nnn: u16 },                   // ANNN
    JpV0 { nnn: u16 },                  // BNNN
    Rnd { x: usize, kk: u8 },           // CXKK
    Drw { x: usize, y: usize, n: u8 },  // DXYN
    Skp { x: usize },                   // EX9E
    Sknp { x: usize },                  // EXA1
    LdVxDt { x: usize },                // FX07
    LdVxK { x: usize },                 // FX0A
    LdDtVx { x: usize },                // FX15
    LdStVx { x: usize },                // FX18
    AddI { x: usize },                  // FX1E
    LdF { x: usize },                   // FX29
    LdB { x: usize },                   // FX33
    LdIVx { x: usize },                 // FX55
    LdVxI { x: usize },                 // FX65
    /// Any word that matches no instruction; executed as a no-op.
    Unknown(u16),
}

impl Instruction {
    /// Decodes a raw big-endian opcode word. Never fails; words outside the
    /// instruction set come back as `Unknown`.
    pub fn decode(opcode: u16) -> Self {
        let x = ((opcode & 0xF00) >> 8) as usize;
        let y = ((opcode & 0xF0) >> 4) as usize;
        let kk = (opcode & 0xFF) as u8;
        let nnn = opcode & 0xFFF;
        let n = (opcode & 0xF) as u8;

        match (opcode & 0xF000) >> 12 {
            0x0 => match opcode {
                0x00E0 => Self::Cls,
                0x00EE => Self::Ret,
                _ => Self::Sys { nnn },
            },
            0x1 => Self::Jp { nnn },
            0x2 => Self::Call { nnn },
            0x3 => Self::SeByte { x, kk },
            0x4 => Self::SneByte { x, kk },
            0x5 => Self::SeReg { x, y },
            0x6 => Self::LdByte { x, kk },
            0x7 => Self::AddByte { x, kk },
            0x8 => match n {
                0x0 => Self::LdReg { x, y },
                0x1 => Self::Or { x, y },
                0x2 => Self::And { x, y },
                0x3 => Self::Xor { x, y },
                0x4 => Self::AddReg { x, y },
                0x5 => Self::Sub { x, y },
                0x6 => Self::Shr { x },
                0x7 => Self::Subn { x, y },
                0xE => Self::Shl { x },
                _ => Self::Unknown(opcode),
            },
            0x9 => Self::SneReg { x, y },
            0xA => Self::LdI { nnn },
            0xB => Self::JpV0 { nnn },
            0xC => Self::Rnd { x, kk },
            0xD => Self::Drw { x, y, n },
            0xE => match kk {
                0x9E => Self::Skp { x },
                0xA1 => Self::Sknp { x },
                _ => Self::Unknown(opcode),
            },
            0xF => match kk {
                0x07 => Self::LdVxDt { x },
                0x0A => Self::LdVxK { x },
                0x15 => Self::LdDtVx { x },
                0x18 => Self::LdStVx { x },
                0x1E => Self::AddI { x },
                0x29 => Self::LdF { x },
                0x33 => Self::LdB { x },
                0x55 => Self::LdIVx { x },
                0x65 => Self::LdVxI { x },
                _ => Self::Unknown(opcode),
            },
            _ => Self::Unknown(opcode),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Sys { nnn } => write!(f, "SYS 0x{:03X}", nnn),
            Self::Cls => write!(f, "CLS"),
            Self::Ret => write!(f, "RET"),
            Self::Jp { nnn } => write!(f, "JP 0x{:03X}", nnn),
            Self::Call { nnn } => write!(f, "CALL 0x{:03X}", nnn),
            Self::SeByte { x, kk } => write!(f, "SE V{:X}, 0x{:02X}", x, kk),
            Self::SneByte { x, kk } => write!(f, "SNE V{:X}, 0x{:02X}", x, kk),
            Self::SeReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Self::LdByte { x, kk } => write!(f, "LD V{:X}, 0x{:02X}", x, kk),
            Self::AddByte { x, kk } => write!(f, "ADD V{:X}, 0x{:02X}", x, kk),
            Self::LdReg { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Self::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Self::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Self::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Self::AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Self::Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Self::Shr { x } => write!(f, "SHR V{:X}", x),
            Self::Subn { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Self::Shl { x } => write!(f, "SHL V{:X}", x),
            Self::SneReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Self::LdI { nnn } => write!(f, "LD I, 0x{:03X}", nnn),
            Self::JpV0 { nnn } => write!(f, "JP V0, 0x{:03X}", nnn),
            Self::Rnd { x, kk } => write!(f, "RND V{:X}, 0x{:02X}", x, kk),
            Self::Drw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Self::Skp { x } => write!(f, "SKP V{:X}", x),
            Self::Sknp { x } => write!(f, "SKNP V{:X}", x),
            Self::LdVxDt { x } => write!(f, "LD V{:X}, DT", x),
            Self::LdVxK { x } => write!(f, "LD V{:X}, K", x),
            Self::LdDtVx { x } => write!(f, "LD DT, V{:X}", x),
            Self::LdStVx { x } => write!(f, "LD ST, V{:X}", x),
            Self::AddI { x } => write!(f, "ADD I, V{:X}", x),
            Self::LdF { x } => write!(f, "LD F, V{:X}", x),
            Self::LdB { x } => write!(f, "LD B, V{:X}", x),
            Self::LdIVx { x } => write!(f, "LD [I], V{:X}", x),
            Self::LdVxI { x } => write!(f, "LD V{:X}, [I]", x),
            Self::Unknown(opcode) => write!(f, "??? 0x{:04X}", opcode),
        }
    }
}
