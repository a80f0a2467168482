//! Whole-program tests driving the interpreter through its public API.

use chip8::{Chip8, Chip8Error, HEIGHT, MAX_ROM_SIZE, PROGRAM_START, STACK_DEPTH, WIDTH};

/// Builds a machine with `program` (opcode words) loaded at 0x200.
fn setup(program: &[u16]) -> Chip8 {
    let rom: Vec<u8> = program.iter().flat_map(|op| op.to_be_bytes().to_vec()).collect();
    let mut chip = Chip8::with_seed(0);
    chip.load_program(&rom).unwrap();
    chip
}

fn run(chip: &mut Chip8, cycles: usize) {
    for _ in 0..cycles {
        chip.run_cycle();
    }
}

fn lit_pixels(chip: &Chip8) -> usize {
    chip.gfx().iter().filter(|&&p| p == 1).count()
}

// ========== ROM loading ==========

#[test]
fn test_rom_of_max_size_loads() {
    let mut chip = Chip8::new();
    let rom = vec![0x12; MAX_ROM_SIZE];
    chip.load_program(&rom).unwrap();
    assert_eq!(MAX_ROM_SIZE, 3584);
    assert_eq!(&chip.memory()[0x200..], &rom[..]);
}

#[test]
fn test_rom_one_byte_too_large_is_rejected() {
    let mut chip = Chip8::new();
    let before = chip.memory().to_vec();
    match chip.load_program(&vec![0x12; MAX_ROM_SIZE + 1]) {
        Err(Chip8Error::RomTooLarge { size, max }) => {
            assert_eq!(size, 3585);
            assert_eq!(max, 3584);
        }
        other => panic!("expected RomTooLarge, got {:?}", other),
    }
    assert_eq!(chip.memory().to_vec(), before);
}

#[test]
fn test_rom_too_large_message() {
    let err = Chip8::new()
        .load_program(&vec![0; MAX_ROM_SIZE + 1])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "ROM is too large (3585 bytes), max size is 3584 bytes"
    );
}

#[test]
fn test_program_starts_at_0x200() {
    let chip = Chip8::new();
    assert_eq!(chip.pc(), PROGRAM_START);
    assert_eq!(chip.stack_pointer(), 0);
}

// ========== Arithmetic flags ==========

#[test]
fn test_add_with_carry_for_all_operands() {
    for vx in (0..=255u16).step_by(15) {
        for vy in (0..=255u16).step_by(17) {
            let mut chip = setup(&[0x6000 | vx, 0x6100 | vy, 0x8014]);
            run(&mut chip, 3);
            let sum = vx + vy;
            assert_eq!(chip.registers()[0], sum as u8, "{} + {}", vx, vy);
            assert_eq!(chip.registers()[0xF], (sum > 255) as u8, "{} + {}", vx, vy);
        }
    }
}

#[test]
fn test_sub_and_subn_borrow_flags() {
    for &(vx, vy) in &[(0u16, 0u16), (1, 0), (0, 1), (200, 100), (100, 200), (255, 255)] {
        let mut sub = setup(&[0x6000 | vx, 0x6100 | vy, 0x8015]);
        run(&mut sub, 3);
        assert_eq!(sub.registers()[0], (vx as u8).wrapping_sub(vy as u8));
        assert_eq!(sub.registers()[0xF], (vx >= vy) as u8);

        let mut subn = setup(&[0x6000 | vx, 0x6100 | vy, 0x8017]);
        run(&mut subn, 3);
        assert_eq!(subn.registers()[0], (vy as u8).wrapping_sub(vx as u8));
        assert_eq!(subn.registers()[0xF], (vy >= vx) as u8);
    }
}

#[test]
fn test_shift_flag_is_pre_shift_bit() {
    // SHR on 0x01: result 0, flag 1
    let mut chip = setup(&[0x6001, 0x8006]);
    run(&mut chip, 2);
    assert_eq!(chip.registers()[0], 0);
    assert_eq!(chip.registers()[0xF], 1);

    // SHL on 0x80: result 0, flag 1
    let mut chip = setup(&[0x6080, 0x800E]);
    run(&mut chip, 2);
    assert_eq!(chip.registers()[0], 0);
    assert_eq!(chip.registers()[0xF], 1);

    // SHL on 0x7F: result 0xFE, flag 0
    let mut chip = setup(&[0x607F, 0x800E]);
    run(&mut chip, 2);
    assert_eq!(chip.registers()[0], 0xFE);
    assert_eq!(chip.registers()[0xF], 0);
}

// ========== Display ==========

#[test]
fn test_cls_then_draw_sets_exactly_sprite_pixels() {
    // I = glyph "8" (0xF0 0x90 0xF0 0x90 0xF0): 4+2+4+2+4 pixels
    let mut chip = setup(&[0x6008, 0xF029, 0x00E0, 0x6A05, 0x6B03, 0xDAB5]);
    run(&mut chip, 6);
    assert_eq!(lit_pixels(&chip), 16);
    assert!(chip.pixel(5, 3));
    assert!(chip.pixel(8, 3));
    assert!(!chip.pixel(6, 4));
    assert!(chip.pixel(5, 7));
    assert_eq!(chip.registers()[0xF], 0);
}

#[test]
fn test_drawing_twice_restores_screen() {
    let mut chip = setup(&[0x600A, 0xF029, 0x6A3C, 0x6B1E, 0xDAB5, 0xDAB5]);
    run(&mut chip, 5);
    assert!(lit_pixels(&chip) > 0);
    assert_eq!(chip.registers()[0xF], 0);
    run(&mut chip, 1);
    assert_eq!(lit_pixels(&chip), 0);
    assert_eq!(chip.registers()[0xF], 1);
}

#[test]
fn test_sprite_wraps_horizontally_per_pixel() {
    // I = 0x20A, which holds the sprite row 0b1100_0000; draw it at x = 63
    let mut chip = setup(&[0xA20A, 0x603F, 0x6100, 0xD011, 0x1208, 0xC000]);
    run(&mut chip, 4);
    assert!(chip.pixel(63, 0));
    assert!(chip.pixel(0, 0));
    assert_eq!(lit_pixels(&chip), 2);
}

#[test]
fn test_sprite_wraps_vertically_and_anchor_is_modulo() {
    // glyph "0" anchored at (70, 62) lands at (6, 30) and wraps rows to the top
    let mut chip = setup(&[0xF029, 0x6A46, 0x6B3E, 0xDAB5]);
    run(&mut chip, 4);
    assert!(chip.pixel(6, 30));
    assert!(chip.pixel(6, 31));
    assert!(chip.pixel(6, 0));
    assert!(chip.pixel(9, 2));
    assert_eq!(lit_pixels(&chip), 14);
    assert_eq!(chip.gfx().len(), WIDTH * HEIGHT);
}

// ========== Stack ==========

#[test]
fn test_sixteen_nested_calls_then_overflow_is_dropped() {
    // every CALL targets the next word, so each one nests one level deeper
    let program: Vec<u16> = (0..17u16).map(|n| 0x2000 | (0x202 + n * 2)).collect();
    let mut chip = setup(&program);

    run(&mut chip, STACK_DEPTH);
    assert_eq!(chip.stack_pointer(), 16);
    assert_eq!(chip.pc(), 0x220);
    assert_eq!(chip.stack()[0], 0x202);

    // 17th CALL: only the fetch advance happens
    run(&mut chip, 1);
    assert_eq!(chip.stack_pointer(), 16);
    assert_eq!(chip.pc(), 0x222);
    assert_eq!(chip.faults().stack_overflows, 1);
}

#[test]
fn test_ret_with_empty_stack_is_a_no_op() {
    let mut chip = setup(&[0x00EE, 0x00EE]);
    run(&mut chip, 2);
    assert_eq!(chip.pc(), 0x204);
    assert_eq!(chip.stack_pointer(), 0);
    assert_eq!(chip.faults().stack_underflows, 2);
}

#[test]
fn test_call_and_return() {
    // 0x200 CALL 0x206; 0x202 LD V1, 1; 0x204 JP 0x204; 0x206 LD V2, 2; 0x208 RET
    let mut chip = setup(&[0x2206, 0x6101, 0x1204, 0x6202, 0x00EE]);
    run(&mut chip, 1);
    assert_eq!(chip.pc(), 0x206);
    assert_eq!(chip.stack(), &[0x202]);
    run(&mut chip, 2);
    assert_eq!(chip.pc(), 0x202);
    assert_eq!(chip.stack_pointer(), 0);
    run(&mut chip, 3);
    assert_eq!(chip.registers()[1], 1);
    assert_eq!(chip.registers()[2], 2);
    assert_eq!(chip.pc(), 0x204);
}

// ========== Font, BCD, timers, keys ==========

#[test]
fn test_font_address_bounds() {
    let mut chip = setup(&[0x6000, 0xF029]);
    run(&mut chip, 2);
    assert_eq!(chip.index(), 0x050);

    let mut chip = setup(&[0x600F, 0xF029]);
    run(&mut chip, 2);
    assert_eq!(chip.index(), 0x050 + 75);
}

#[test]
fn test_bcd_of_255() {
    let mut chip = setup(&[0x60FF, 0xA400, 0xF033]);
    run(&mut chip, 3);
    assert_eq!(&chip.memory()[0x400..0x403], &[2, 5, 5]);
    assert_eq!(chip.index(), 0x400);
}

#[test]
fn test_wait_for_key_retries_until_pressed() {
    let mut chip = setup(&[0xF30A, 0x6001]);
    for _ in 0..5 {
        chip.run_cycle();
        assert_eq!(chip.pc(), 0x200);
    }
    chip.set_key(0xB, true).unwrap();
    chip.run_cycle();
    assert_eq!(chip.pc(), 0x202);
    assert_eq!(chip.registers()[3], 0xB);
    chip.run_cycle();
    assert_eq!(chip.registers()[0], 1);
}

#[test]
fn test_timers_are_driven_only_by_tick() {
    let mut chip = setup(&[0x6002, 0xF015, 0xF018, 0x1206]);
    run(&mut chip, 100);
    assert_eq!(chip.delay_timer(), 2);
    assert_eq!(chip.sound_timer(), 2);
    chip.tick_timers();
    chip.tick_timers();
    chip.tick_timers();
    assert_eq!(chip.delay_timer(), 0);
    assert_eq!(chip.sound_timer(), 0);
}

#[test]
fn test_key_skip_reads_keypad() {
    // SKP V0 (key 5) then SKNP V0
    let mut chip = setup(&[0x6005, 0xE09E, 0x0000, 0xE0A1, 0x0000]);
    chip.set_key(5, true).unwrap();
    run(&mut chip, 2);
    assert_eq!(chip.pc(), 0x206);
    run(&mut chip, 1);
    assert_eq!(chip.pc(), 0x208);
}

#[test]
fn test_machines_are_independent() {
    let mut a = setup(&[0x6042]);
    let b = setup(&[0x6042]);
    run(&mut a, 1);
    assert_eq!(a.registers()[0], 0x42);
    assert_eq!(b.registers()[0], 0);
    assert_eq!(b.pc(), 0x200);
}
