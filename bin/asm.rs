use tinymips::{error::AssemblyError, symbolic};

use clap::{App, Arg, ArgMatches};
use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

enum Error {
    Assembly(AssemblyError),
    Io(std::io::Error),
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
    App::new("tinymips-asm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Assembles source files into binary text listings")
        .arg(
            Arg::with_name("source")
                .help("File containing assembly source")
                .value_name("SOURCE")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .help("File to write the listing to instead of standard output")
                .long("output")
                .short("o")
                .value_name("FILE"),
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

    match assemble(&args) {
        Ok(()) => (),
        Err(Error::Io(io)) => {
            eprintln!("IO error: {}", io);
            std::process::exit(1);
        }
        Err(Error::Assembly(error)) => {
            eprintln!("{}", error);
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

fn assemble(args: &ArgMatches) -> Result<(), Error> {
    let file_path = args.value_of("source").unwrap();
    let source = std::fs::read_to_string(file_path)?;

    let program = symbolic::Program::parse(&source)?;
    let listing = match logger(args) {
        Some(logger) => program.assemble_with_logger(logger)?,
        None => program.assemble()?,
    }
    .to_listing();

    match args.value_of("output") {
        Some(output) => std::fs::write(output, listing)?,
        None => print!("{}", listing),
    }

    Ok(())
}
