use tinymips::{
    bytecode,
    emulator::{Emulator, Exit},
    error::AssemblyError,
    instruction::Register,
    symbolic,
};

use clap::{App, Arg, ArgMatches};
use itertools::Itertools;
use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

enum Error {
    Assembly(AssemblyError),
    Io(std::io::Error),
    Argument(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<AssemblyError> for Error {
    fn from(e: AssemblyError) -> Error {
        Error::Assembly(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("tinymips-run")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Assembles and executes programs, then prints the machine state")
        .arg(
            Arg::with_name("source")
                .help("File containing assembly source (.s) or a binary text listing")
                .value_name("SOURCE")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("steps")
                .help("Maximum number of instructions to execute")
                .long("steps")
                .short("s")
                .value_name("COUNT"),
        )
        .arg(
            Arg::with_name("dump")
                .help("Dump the non-zero words among the first WORDS memory words after execution")
                .long("dump-memory")
                .short("d")
                .value_name("WORDS"),
        )
        .arg(
            Arg::with_name("verbose")
                .help("Enables verbose logging")
                .long("verbose")
                .short("v"),
        )
        .get_matches()
}

fn main() {
    let args = parse_arguments();

    match run(&args) {
        Ok(()) => (),
        Err(Error::Io(io)) => {
            eprintln!("IO error: {}", io);
            std::process::exit(1);
        }
        Err(Error::Assembly(error)) => {
            eprintln!("{}", error);
            std::process::exit(1);
        }
        Err(Error::Argument(message)) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }
}

fn logger(args: &ArgMatches) -> Option<Logger> {
    if !args.is_present("verbose") {
        return None;
    }

    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Some(Logger::root(drain, o!()))
}

fn numeric_argument(args: &ArgMatches, name: &str) -> Result<Option<usize>, Error> {
    match args.value_of(name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| Error::Argument(format!("invalid --{} value: {}", name, value))),
    }
}

fn run(args: &ArgMatches) -> Result<(), Error> {
    let file_path = args.value_of("source").unwrap();
    let file = std::fs::read_to_string(file_path)?;
    let logger = logger(args);

    let program = if file_path.ends_with(".s") {
        let symbolic = symbolic::Program::parse(&file)?;

        match logger.clone() {
            Some(logger) => symbolic.assemble_with_logger(logger)?,
            None => symbolic.assemble()?,
        }
    } else {
        bytecode::Program::parse(&file)
    };

    let mut emulator = Emulator::with_logger(program, logger);

    if let Some(steps) = numeric_argument(args, "steps")? {
        emulator = emulator.with_step_budget(steps);
    }

    match emulator.run() {
        Exit::Halted { executed } => {
            println!("halted after {} instructions", executed);
        }
        Exit::StepBudgetExhausted { executed } => {
            println!("stopped after {} instructions without halting", executed);
        }
    }

    print_registers(&emulator);

    if let Some(words) = numeric_argument(args, "dump")? {
        print_memory(&emulator, words);
    }

    Ok(())
}

fn print_registers(emulator: &Emulator) {
    println!("pc = 0x{:08x}", emulator.context.pc);

    let nonzero = (0..32)
        .filter(|index| emulator.registers()[*index] != 0)
        .format_with("\n", |index, f| {
            f(&format_args!(
                "{} = {}",
                Register::from_index(index as u32),
                emulator.registers()[index],
            ))
        });

    println!("{}", nonzero);
}

fn print_memory(emulator: &Emulator, words: usize) {
    let end = (words * 4) as u32;

    for (address, word) in emulator.memory.nonzero_words(0..end) {
        println!("0x{:03x}: 0x{:08x}", address, word);
    }
}
