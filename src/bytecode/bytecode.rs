use crate::machine::{Register, VmError, INSTRUCTION_LEN};

use super::{Instruction, Opcode};

/// Decode a raw `(op, a, b)` triple.
///
/// Operands that name a register are checked here, so an `Instruction` never
/// holds an index outside of {PC, R1, R2}.
pub fn decode(raw: [u8; INSTRUCTION_LEN]) -> Result<Instruction, VmError> {
    let [op, a, b] = raw;
    Ok(match Opcode::try_from(op)? {
        Opcode::Load => Instruction::Load { dst: Register::try_from(a)?, addr: b },
        Opcode::Store => Instruction::Store { src: Register::try_from(a)?, addr: b },
        Opcode::Add => Instruction::Add {
            dst: Register::try_from(a)?,
            src: Register::try_from(b)?,
        },
        Opcode::Sub => Instruction::Sub {
            dst: Register::try_from(a)?,
            src: Register::try_from(b)?,
        },
        Opcode::Addi => Instruction::Addi { dst: Register::try_from(a)?, imm: b },
        Opcode::Subi => Instruction::Subi { dst: Register::try_from(a)?, imm: b },
        // b is unused by a jump
        Opcode::Jump => Instruction::Jump { target: a },
        Opcode::Beqz => Instruction::Beqz { reg: Register::try_from(a)?, offset: b },
        Opcode::Halt => Instruction::Halt,
    })
}

/// Encode an instruction back into its three bytes, unused operands are zero
pub fn encode(instruction: &Instruction) -> [u8; INSTRUCTION_LEN] {
    let op = instruction.opcode() as u8;
    match *instruction {
        Instruction::Load { dst, addr } => [op, dst as u8, addr],
        Instruction::Store { src, addr } => [op, src as u8, addr],
        Instruction::Add { dst, src } | Instruction::Sub { dst, src } => [op, dst as u8, src as u8],
        Instruction::Addi { dst, imm } | Instruction::Subi { dst, imm } => [op, dst as u8, imm],
        Instruction::Jump { target } => [op, target, 0],
        Instruction::Beqz { reg, offset } => [op, reg as u8, offset],
        Instruction::Halt => [op, 0, 0],
    }
}

/// Linear sweep over memory starting at `start`, one entry per whole instruction.
///
/// This is a static listing: it has no idea where jumps land, so data that
/// happens to sit in the instruction stream shows up as decode errors.
pub fn disassemble(memory: &[u8], start: usize) -> Vec<(usize, Result<Instruction, VmError>)> {
    let mut listing = vec![];
    let mut addr = start;
    while addr + INSTRUCTION_LEN <= memory.len() {
        let raw = [memory[addr], memory[addr + 1], memory[addr + 2]];
        listing.push((addr, decode(raw)));
        addr += INSTRUCTION_LEN;
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_opcode() {
        assert_eq!(
            decode([0x01, 1, 0x04]).unwrap(),
            Instruction::Load { dst: Register::R1, addr: 4 }
        );
        assert_eq!(
            decode([0x02, 2, 0x00]).unwrap(),
            Instruction::Store { src: Register::R2, addr: 0 }
        );
        assert_eq!(
            decode([0x03, 1, 2]).unwrap(),
            Instruction::Add { dst: Register::R1, src: Register::R2 }
        );
        assert_eq!(
            decode([0x04, 2, 1]).unwrap(),
            Instruction::Sub { dst: Register::R2, src: Register::R1 }
        );
        assert_eq!(
            decode([0x05, 1, 7]).unwrap(),
            Instruction::Addi { dst: Register::R1, imm: 7 }
        );
        assert_eq!(
            decode([0x06, 0, 200]).unwrap(),
            Instruction::Subi { dst: Register::Pc, imm: 200 }
        );
        assert_eq!(decode([0x07, 0x20, 0x99]).unwrap(), Instruction::Jump { target: 0x20 });
        assert_eq!(
            decode([0x08, 1, 6]).unwrap(),
            Instruction::Beqz { reg: Register::R1, offset: 6 }
        );
        assert_eq!(decode([0xff, 0x12, 0x34]).unwrap(), Instruction::Halt);
    }

    #[test]
    fn unknown_opcodes_are_rejected() {
        assert_eq!(decode([0x00, 0, 0]), Err(VmError::InvalidOpcode(0x00)));
        assert_eq!(decode([0x09, 1, 1]), Err(VmError::InvalidOpcode(0x09)));
        assert_eq!(decode([0xfe, 1, 1]), Err(VmError::InvalidOpcode(0xfe)));
    }

    #[test]
    fn register_operands_are_checked() {
        assert_eq!(decode([0x01, 3, 0]), Err(VmError::InvalidRegister(3)));
        assert_eq!(decode([0x03, 1, 9]), Err(VmError::InvalidRegister(9)));
        assert_eq!(decode([0x08, 0xff, 0]), Err(VmError::InvalidRegister(0xff)));
        // address and immediate operands may be anything
        assert!(decode([0x01, 1, 0xff]).is_ok());
        assert!(decode([0x05, 2, 0xff]).is_ok());
    }

    #[test]
    fn encode_zeroes_unused_operands() {
        assert_eq!(encode(&Instruction::Jump { target: 0x11 }), [0x07, 0x11, 0]);
        assert_eq!(encode(&Instruction::Halt), [0xff, 0, 0]);
        assert_eq!(
            encode(&Instruction::Beqz { reg: Register::R2, offset: 3 }),
            [0x08, 2, 3]
        );
    }

    #[test]
    fn display_reads_like_assembly() {
        assert_eq!(
            Instruction::Load { dst: Register::R1, addr: 1 }.to_string(),
            "load r1, [0x01]"
        );
        assert_eq!(Instruction::Addi { dst: Register::R2, imm: 7 }.to_string(), "addi r2, 7");
        assert_eq!(Instruction::Jump { target: 8 }.to_string(), "jump 0x08");
        assert_eq!(
            Instruction::Beqz { reg: Register::Pc, offset: 6 }.to_string(),
            "beqz pc, +6"
        );
    }

    #[test]
    fn disassemble_stops_before_a_partial_instruction() {
        let mut memory = [0u8; 256];
        memory[8..11].copy_from_slice(&[0x05, 1, 7]);
        memory[11..14].copy_from_slice(&[0xff, 0, 0]);

        let listing = disassemble(&memory, 8);
        // 8, 11, ..., 251 are whole, 254 would read past the end
        assert_eq!(listing.len(), 82);
        assert_eq!(listing[0], (8, Ok(Instruction::Addi { dst: Register::R1, imm: 7 })));
        assert_eq!(listing[1], (11, Ok(Instruction::Halt)));
        assert_eq!(listing[2], (14, Err(VmError::InvalidOpcode(0))));
        assert_eq!(listing.last().map(|(addr, _)| *addr), Some(251));
    }
}
