//! Command-line interface for bnf-match
//! Loads a grammar file, validates it and checks input text against it.
//!
//! Usage:
//!   bnf-match `<grammar>` [-i `<input>`] [-l] [-a] [-p] [-s `<start>`] [-f `<format>`]
//!   bnf-match `<grammar>` --validate-only
//!   bnf-match --list-formats
//!
//! Input comes from `-i` or stdin. Mismatches are reported but do not change the exit
//! status; unreadable files, malformed or invalid grammars and bad configuration exit with 1.

use bnf_match::bnf::config::{BnfConfig, Loader};
use bnf_match::bnf::formats::{FormatError, FORMATS};
use bnf_match::bnf::loader::{load_grammar_file, LoadError};
use bnf_match::{GrammarError, MatchError};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::fmt;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};

#[derive(Debug)]
enum CliError {
    Config(config::ConfigError),
    Load(LoadError),
    Validation(GrammarError),
    Format(FormatError),
    Match(MatchError),
    Io(io::Error),
    NoInput,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(err) => write!(f, "configuration error: {}", err),
            CliError::Load(err) => write!(f, "parsing error: {}", err),
            CliError::Validation(err) => write!(f, "grammar validation error: {}", err),
            CliError::Format(err) => write!(f, "{}", err),
            CliError::Match(err) => write!(f, "{}", err),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::NoInput => {
                write!(f, "no input provided: use -i <file> or pipe data to stdin")
            }
        }
    }
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err)
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        CliError::Load(err)
    }
}

impl From<FormatError> for CliError {
    fn from(err: FormatError) -> Self {
        CliError::Format(err)
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

fn command() -> Command {
    Command::new("bnf-match")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check text against a BNF grammar")
        .arg_required_else_help(true)
        .arg(
            Arg::new("grammar")
                .help("Path to the grammar file")
                .required_unless_present("list-formats")
                .index(1),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .help("File to check (default: stdin)"),
        )
        .arg(
            Arg::new("line-by-line")
                .long("line-by-line")
                .short('l')
                .help("Check every line separately")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("validate-only")
                .long("validate-only")
                .help("Only load and validate the grammar")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .short('a')
                .help("Print the parse tree of every match")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .short('p')
                .help("Accept input that starts with a match")
                .action(ArgAction::SetTrue)
                .conflicts_with("ast"),
        )
        .arg(
            Arg::new("start")
                .long("start")
                .short('s')
                .help("Start rule (default: the first rule in the grammar)"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Parse tree format for --ast (see --list-formats)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("off, error, warn, info, debug or trace"),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available parse tree formats")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    let matches = command().get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = TermLogger::init(
        config.logging.level.to_level_filter(),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("warning: logging disabled: {}", err);
    }

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = run(&matches, &config, &mut out) {
        let _ = out.flush();
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Embedded defaults, then `--config`, then command-line flags
fn load_config(matches: &ArgMatches) -> Result<BnfConfig, CliError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("line-by-line") {
        loader = loader.set_override("input.line_by_line", true)?;
    }
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.set_override("output.format", format.as_str())?;
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        loader = loader.set_override("logging.level", level.as_str())?;
    }
    Ok(loader.build()?)
}

fn run(matches: &ArgMatches, config: &BnfConfig, out: &mut dyn Write) -> Result<(), CliError> {
    let Some(path) = matches.get_one::<String>("grammar") else {
        return Ok(());
    };
    let parse_as_ast = matches.get_flag("ast");
    if parse_as_ast && !FORMATS.has(&config.output.format) {
        return Err(FormatError::FormatNotFound(config.output.format.clone()).into());
    }

    writeln!(out, "Parsing grammar file: {}", path)?;
    let mut grammar = load_grammar_file(path)?;
    if let Some(start) = matches.get_one::<String>("start") {
        grammar.set_start(start.as_str());
    }
    grammar.validate().map_err(CliError::Validation)?;
    writeln!(out, "Grammar loaded and validated.")?;
    info!(
        "grammar has {} rules, start rule {:?}",
        grammar.rule_names().count(),
        grammar.start()
    );

    if matches.get_flag("validate-only") {
        return Ok(());
    }

    let source = read_input(matches.get_one::<String>("input"))?;
    let chunks = split_input(&source, config);
    debug!("checking {} input chunk(s)", chunks.len());

    for chunk in chunks {
        write!(out, "Checking: {}", chunk)?;
        if parse_as_ast {
            match grammar.parse(chunk) {
                Ok(tree) => {
                    writeln!(out, " -> matched")?;
                    writeln!(out, "AST Tree:")?;
                    let rendered = FORMATS.serialize(&tree, &config.output.format)?;
                    writeln!(out, "{}", rendered.trim_end())?;
                }
                Err(err) => report_mismatch(out, chunk, err, config)?,
            }
        } else {
            let outcome = if matches.get_flag("prefix") {
                grammar.match_prefix(chunk)
            } else {
                grammar.match_input(chunk)
            };
            match outcome {
                Ok(()) => writeln!(out, " -> matched")?,
                Err(err) => report_mismatch(out, chunk, err, config)?,
            }
        }
    }

    Ok(())
}

fn read_input(path: Option<&String>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(CliError::NoInput);
            }
            let mut source = String::new();
            stdin.lock().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn split_input<'a>(source: &'a str, config: &BnfConfig) -> Vec<&'a str> {
    if !config.input.line_by_line {
        return vec![source];
    }
    source
        .lines()
        .map(|line| if config.input.trim_lines { line.trim() } else { line })
        .collect()
}

/// Mismatches are reported on stdout; engine and grammar failures abort the run
fn report_mismatch(
    out: &mut dyn Write,
    chunk: &str,
    err: MatchError,
    config: &BnfConfig,
) -> Result<(), CliError> {
    let MatchError::Parse(parse_error) = err else {
        return Err(CliError::Match(err));
    };
    writeln!(out, " -> not matched")?;
    if config.output.pretty_errors {
        writeln!(out, "\n{}\n", parse_error.pretty(chunk))?;
    } else {
        write!(out, "{}", parse_error)?;
    }
    Ok(())
}

fn handle_list_formats_command() {
    println!("Available parse tree formats:\n");
    for (name, description) in FORMATS.describe_formats() {
        println!("  {}", name);
        println!("    {}", description);
        println!();
    }
}

