use std::fmt;

use thiserror::Error;

pub mod machine;

/// Total addressable memory, addresses 0..=255
pub const MEMORY_SIZE: usize = 256;

/// By convention 0..8 is data and the instruction stream starts here
pub const PROGRAM_START: u8 = 8;

/// Every instruction is `(opcode, operand1, operand2)`
pub const INSTRUCTION_LEN: usize = 3;

/// Register named by an operand byte
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    Pc = 0,
    R1 = 1,
    R2 = 2,
}

impl TryFrom<u8> for Register {
    type Error = VmError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Register::Pc),
            1 => Ok(Register::R1),
            2 => Ok(Register::R2),
            other => Err(VmError::InvalidRegister(other)),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Pc => write!(f, "pc"),
            Register::R1 => write!(f, "r1"),
            Register::R2 => write!(f, "r2"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Registers {
    pub pc: u8,
    pub r1: u8,
    pub r2: u8,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            pc: PROGRAM_START,
            r1: 0,
            r2: 0,
        }
    }

    pub fn get(&self, reg: Register) -> u8 {
        match reg {
            Register::Pc => self.pc,
            Register::R1 => self.r1,
            Register::R2 => self.r2,
        }
    }

    pub fn set(&mut self, reg: Register, value: u8) {
        match reg {
            Register::Pc => self.pc = value,
            Register::R1 => self.r1 = value,
            Register::R2 => self.r2 = value,
        }
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pc={:#04x} r1={:#04x} r2={:#04x}", self.pc, self.r1, self.r2)
    }
}

/// Running is the only state that can move, the other two are terminal
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Halted,
    Faulted(VmError),
}

impl MachineState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MachineState::Running)
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum VmError {
    #[error("Invalid opcode {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Invalid register index {0} (expected 0, 1 or 2)")]
    InvalidRegister(u8),

    #[error("Program ran off the end of memory at pc {0:#04x} without halting")]
    ProgramRanOff(u8),

    #[error("Memory must be exactly 256 bytes, got {0}")]
    InvalidMemorySize(usize),
}
