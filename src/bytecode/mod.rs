pub mod bytecode;

use std::fmt;

use crate::machine::{Register, VmError};

/// The closed set of opcodes understood by the machine
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Load = 0x01,
    Store = 0x02,
    Add = 0x03,
    Sub = 0x04,
    Addi = 0x05,
    Subi = 0x06,
    Jump = 0x07,
    Beqz = 0x08,
    Halt = 0xff,
}

impl TryFrom<u8> for Opcode {
    type Error = VmError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x01 => Ok(Opcode::Load),
            0x02 => Ok(Opcode::Store),
            0x03 => Ok(Opcode::Add),
            0x04 => Ok(Opcode::Sub),
            0x05 => Ok(Opcode::Addi),
            0x06 => Ok(Opcode::Subi),
            0x07 => Ok(Opcode::Jump),
            0x08 => Ok(Opcode::Beqz),
            0xff => Ok(Opcode::Halt),
            other => Err(VmError::InvalidOpcode(other)),
        }
    }
}

/// A decoded three byte instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `dst = memory[addr]`
    Load { dst: Register, addr: u8 },

    /// `memory[addr] = src`
    Store { src: Register, addr: u8 },

    /// `dst = dst + src` (wrapping)
    Add { dst: Register, src: Register },

    /// `dst = dst - src` (wrapping)
    Sub { dst: Register, src: Register },

    /// `dst = dst + imm` (wrapping)
    Addi { dst: Register, imm: u8 },

    /// `dst = dst - imm` (wrapping)
    Subi { dst: Register, imm: u8 },

    /// Set the PC to an absolute address
    Jump { target: u8 },

    /// Skip `offset` extra bytes when `reg` is zero
    Beqz { reg: Register, offset: u8 },

    /// Stop the machine
    Halt,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Load { .. } => Opcode::Load,
            Instruction::Store { .. } => Opcode::Store,
            Instruction::Add { .. } => Opcode::Add,
            Instruction::Sub { .. } => Opcode::Sub,
            Instruction::Addi { .. } => Opcode::Addi,
            Instruction::Subi { .. } => Opcode::Subi,
            Instruction::Jump { .. } => Opcode::Jump,
            Instruction::Beqz { .. } => Opcode::Beqz,
            Instruction::Halt => Opcode::Halt,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Load { dst, addr } => write!(f, "load {}, [{:#04x}]", dst, addr),
            Instruction::Store { src, addr } => write!(f, "store {}, [{:#04x}]", src, addr),
            Instruction::Add { dst, src } => write!(f, "add {}, {}", dst, src),
            Instruction::Sub { dst, src } => write!(f, "sub {}, {}", dst, src),
            Instruction::Addi { dst, imm } => write!(f, "addi {}, {}", dst, imm),
            Instruction::Subi { dst, imm } => write!(f, "subi {}, {}", dst, imm),
            Instruction::Jump { target } => write!(f, "jump {:#04x}", target),
            Instruction::Beqz { reg, offset } => write!(f, "beqz {}, +{}", reg, offset),
            Instruction::Halt => write!(f, "halt"),
        }
    }
}
