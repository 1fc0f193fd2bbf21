use crate::bytecode::{bytecode::decode, Instruction};

use super::{MachineState, Registers, VmError, INSTRUCTION_LEN, MEMORY_SIZE};

/// A stored-program machine running over a caller owned block of memory.
///
/// The memory is borrowed for as long as the machine lives and is mutated in
/// place, there is no other output.
pub struct Machine<'m> {
    memory: &'m mut [u8; MEMORY_SIZE],
    registers: Registers,
    state: MachineState,

    /// Completed cycles, the halting cycle included
    cycles: usize,
}

impl<'m> Machine<'m> {
    pub fn new(memory: &'m mut [u8]) -> Result<Machine<'m>, VmError> {
        let len = memory.len();
        let memory: &mut [u8; MEMORY_SIZE] = memory
            .try_into()
            .map_err(|_| VmError::InvalidMemorySize(len))?;

        Ok(Machine {
            memory,
            registers: Registers::new(),
            state: MachineState::Running,
            cycles: 0,
        })
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory[..]
    }

    /// The raw instruction at the PC
    pub fn fetch(&self) -> Result<[u8; INSTRUCTION_LEN], VmError> {
        let pc = self.registers.pc as usize;
        if pc + INSTRUCTION_LEN > MEMORY_SIZE {
            return Err(VmError::ProgramRanOff(self.registers.pc));
        }
        Ok([self.memory[pc], self.memory[pc + 1], self.memory[pc + 2]])
    }

    /// Run a single fetch-decode-execute cycle.
    ///
    /// A fault leaves memory and registers exactly as they were before the
    /// cycle and parks the machine in `Faulted`. Stepping a halted machine is
    /// a no-op, stepping a faulted one reports the same fault again.
    pub fn step(&mut self) -> Result<MachineState, VmError> {
        match &self.state {
            MachineState::Running => {}
            MachineState::Halted => return Ok(MachineState::Halted),
            MachineState::Faulted(e) => return Err(e.clone()),
        }

        let instruction = match self.fetch().and_then(decode) {
            Ok(instruction) => instruction,
            Err(e) => {
                self.state = MachineState::Faulted(e.clone());
                return Err(e);
            }
        };

        self.cycles += 1;
        self.execute_instruction(instruction);
        Ok(self.state.clone())
    }

    /// Step until halted, or until the first fault
    pub fn run(&mut self) -> Result<(), VmError> {
        while !self.state.is_terminal() {
            self.step()?;
        }
        Ok(())
    }

    /// Decoding already validated every operand so this can't fail
    fn execute_instruction(&mut self, instruction: Instruction) {
        let regs = &mut self.registers;
        let mut pc_incr = INSTRUCTION_LEN as u8;

        match instruction {
            Instruction::Load { dst, addr } => regs.set(dst, self.memory[addr as usize]),
            Instruction::Store { src, addr } => self.memory[addr as usize] = regs.get(src),
            Instruction::Add { dst, src } => regs.set(dst, regs.get(dst).wrapping_add(regs.get(src))),
            Instruction::Sub { dst, src } => regs.set(dst, regs.get(dst).wrapping_sub(regs.get(src))),
            Instruction::Addi { dst, imm } => regs.set(dst, regs.get(dst).wrapping_add(imm)),
            Instruction::Subi { dst, imm } => regs.set(dst, regs.get(dst).wrapping_sub(imm)),
            Instruction::Jump { target } => {
                // the PC is set directly rather than added to
                pc_incr = 0;
                regs.pc = target;
            }
            Instruction::Beqz { reg, offset } => {
                if regs.get(reg) == 0 {
                    pc_incr = pc_incr.wrapping_add(offset);
                }
            }
            Instruction::Halt => {
                // leave the PC pointing at the halt
                self.state = MachineState::Halted;
                return;
            }
        }

        regs.pc = regs.pc.wrapping_add(pc_incr);
    }
}

/// Run the program stored in `memory` to completion, mutating it in place.
///
/// `memory` must be exactly [`MEMORY_SIZE`] bytes, anything else fails with
/// [`VmError::InvalidMemorySize`] before a single instruction runs. Execution
/// starts at [`super::PROGRAM_START`] and ends on a halt or the first fault.
pub fn execute(memory: &mut [u8]) -> Result<(), VmError> {
    Machine::new(memory)?.run()
}
