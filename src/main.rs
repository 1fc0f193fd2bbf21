extern crate clap;

use std::{collections::HashSet, time::Instant};

use clap::{arg, command, Parser, ValueEnum};
use colored::Colorize;

use vonvm::{
    bytecode::bytecode::{decode, disassemble},
    loader::{loader::load_image, ImageFormat},
    machine::{MachineState, PROGRAM_START},
    Machine,
};

/// A tiny stored-program machine: 256 bytes of memory, three registers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The program image to load
    #[arg()]
    file: String,

    #[arg(value_enum)]
    commands: Vec<Commands>,

    #[arg(short, long, value_enum, default_value_t = ImageFormat::Raw)]
    format: ImageFormat,

    /// Where in memory the file is placed
    #[arg(short, long, default_value_t = 0)]
    offset: usize,

    /// Give up after this many cycles (the machine itself never does)
    #[arg(short, long)]
    max_cycles: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Hash, PartialEq, Eq)]
enum Commands {
    /// Output a static listing of the instruction stream
    Disassemble,
    /// Print every cycle as it executes
    Trace,
    /// Run the program and print the final registers
    Run,
    /// Output the final memory
    Dump,
}

fn print_memory(memory: &[u8]) {
    for (row, chunk) in memory.chunks(16).enumerate() {
        print!("{}", format!("{:02x}:", row * 16).dimmed());
        for byte in chunk {
            print!(" {:02x}", byte);
        }
        println!();
    }
}

fn main() -> Result<(), ()> {
    let args = Args::parse();
    let commands: HashSet<Commands> = HashSet::from_iter(args.commands.into_iter());

    println!("Loading {}", args.file);
    let mut memory = load_image(&args.file, args.format, args.offset)
        .map_err(|e| eprintln!("{0:}: {1:}", "Error".red(), e))?;

    if commands.contains(&Commands::Disassemble) {
        for (addr, instruction) in disassemble(&memory, PROGRAM_START as usize) {
            match instruction {
                Ok(instruction) => println!("{:#04x}: {}", addr, instruction),
                Err(e) => println!("{:#04x}: {}", addr, e.to_string().dimmed()),
            }
        }
    }

    if !commands.contains(&Commands::Run) && !commands.contains(&Commands::Trace) {
        if commands.contains(&Commands::Dump) {
            print_memory(&memory);
        }
        return Ok(());
    }

    let trace = commands.contains(&Commands::Trace);
    let mut machine = Machine::new(&mut memory).map_err(|e| eprintln!("{0:}: {1:}", "Error".red(), e))?;

    println!("{}", "Starting execution".blue());
    let now = Instant::now();
    let mut result = Ok(());
    while !machine.state().is_terminal() {
        if let Some(limit) = args.max_cycles {
            if machine.cycles() >= limit {
                eprintln!("{}: gave up after {} cycles", "Error".red(), limit);
                break;
            }
        }

        let pc = machine.registers().pc;
        let fetched = machine.fetch().and_then(decode);
        result = machine.step().map(|_| ());

        if trace {
            if let Ok(instruction) = fetched {
                println!("{:#04x}: {:<20} {}", pc, instruction.to_string(), machine.registers());
            }
        }
    }

    match (result, machine.state()) {
        (Err(e), _) => eprintln!(
            "{0:}: {1:} (pc {2:#04x})",
            "Fault".red(),
            e,
            machine.registers().pc
        ),
        (Ok(()), MachineState::Halted) => println!(
            "{} {} cycles in {:.2?}",
            "Halted after".green(),
            machine.cycles(),
            now.elapsed()
        ),
        _ => {}
    }
    println!("{}", machine.registers());

    if commands.contains(&Commands::Dump) {
        print_memory(machine.memory());
    }

    Ok(())
}
