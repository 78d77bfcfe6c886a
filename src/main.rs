use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use tern::ast_printer::AstPrinter;
use tern::interpreter::Interpreter;
use tern::parser::Parser;
use tern::scanner::Scanner;
use tern::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Tern language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses input from a file and prints the canonical AST form
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Tern program
    Run { filename: Option<PathBuf> },
}

/// Memory-maps the source file; tokens borrow directly from the map.
fn map_file(filename: &PathBuf) -> Result<Mmap> {
    info!("Mapping file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;

    // SAFETY: the map is read-only and dropped before the process exits;
    // concurrent truncation of the source file is not supported.
    let mmap = unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    info!("Mapped {} bytes from {:?}", mmap.len(), filename);

    Ok(mmap)
}

/// Scan the whole buffer up front, reporting every lexical error to stderr.
///
/// Returns the token list only when the source lexed cleanly.
fn scan_all<'a>(src: &'a [u8]) -> Option<Vec<Token<'a>>> {
    let mut tokens: Vec<Token<'a>> = Vec::new();
    let mut clean = true;

    for result in Scanner::new(src) {
        match result {
            Ok(token) => tokens.push(token),

            Err(e) => {
                clean = false;

                debug!("Lex error: {}", e);

                eprintln!("{}", e);
            }
        }
    }

    clean.then_some(tokens)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with module path and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'tern::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("tern::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let mmap = map_file(&filename)?;
                let mut tokenized = true;

                for token in Scanner::new(&mmap[..]) {
                    match token {
                        Ok(token) => {
                            debug!("Scanned token: {}", token);

                            println!("{}", token);
                        }

                        Err(e) => {
                            tokenized = false;

                            debug!("Tokenization error: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if !tokenized {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let mmap = map_file(&filename)?;

                let Some(tokens) = scan_all(&mmap[..]) else {
                    std::process::exit(65);
                };

                let mut parser = Parser::new(&tokens);

                match parser.parse() {
                    Ok(statements) => {
                        info!("Parsed {} statements", statements.len());

                        let printer = AstPrinter;
                        println!("{}", printer.print_program(&statements));
                    }

                    Err(errors) => {
                        for e in &errors {
                            debug!("Parse error: {}", e);
                            eprintln!("{}", e);
                        }
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }
            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => {
                info!("Running Evaluate subcommand");

                let mmap = map_file(&filename)?;

                let Some(tokens) = scan_all(&mmap[..]) else {
                    std::process::exit(65);
                };

                let mut parser = Parser::new(&tokens);
                let mut interpreter = Interpreter::new();

                match parser.parse_expression() {
                    Ok(expr) => {
                        info!("Expression parsed successfully");

                        match interpreter.evaluate(&expr) {
                            Ok(value) => {
                                debug!("Evaluated to: {}", value);
                                println!("{}", value);
                            }

                            Err(e) => {
                                debug!("Evaluation error: {}", e);
                                eprintln!("{}", e);
                                std::process::exit(70);
                            }
                        }
                    }

                    Err(e) => {
                        debug!("Parse error: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Evaluate subcommand completed");
            }

            None => {
                info!("No filepath provided for Evaluate");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let mmap = map_file(&filename)?;

                let Some(tokens) = scan_all(&mmap[..]) else {
                    std::process::exit(65);
                };

                let mut parser = Parser::new(&tokens);

                let statements = match parser.parse() {
                    Ok(statements) => statements,

                    Err(errors) => {
                        for e in &errors {
                            debug!("Parse error: {}", e);
                            eprintln!("{}", e);
                        }
                        std::process::exit(65);
                    }
                };

                info!("Parsed {} statements", statements.len());

                let mut interpreter = Interpreter::new();

                match interpreter.interpret(&statements) {
                    Ok(()) => {
                        info!("Program executed successfully");
                    }

                    Err(e) => {
                        debug!("Runtime error: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }
            }

            None => {
                info!("No filepath provided for Run");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },
    }

    Ok(())
}
