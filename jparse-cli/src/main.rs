//! Entrypoint for CLI
use std::{
    env,
    error::Error,
    fs,
    io::{BufReader, BufWriter},
};

use jparse::{
    lex::{self, Lexer},
    parse, token_stream,
    prelude::*,
    IMPL_VERSION,
};
use log::{error, info};

static USAGE: &str = r#"
usage: jparse CMD [FILE...]

commands:
    lex     Scan a source file into a token stream
    parse   Check and translate a token stream into assembly
    run     Scan, check and translate a source file, print the assembly
    tokens  Print the tokens of a source file

examples:
    jparse lex Loop.java
    jparse lex Loop.java loop.tokens
    jparse parse
    jparse parse loop.tokens loop.asm
    jparse run Loop.java
"#;

const SCANNER_OUTPUT: &str = "scanner_output";
const PARSER_OUTPUT: &str = "parser_output";

fn run_lexer(source: &str, output: &str) -> JParseResult<()> {
    info!("scanning {source} into {output}");

    let reader = fs::File::open(source)?;
    let writer = BufWriter::new(fs::File::create(output)?);

    let summary = lex::tokenize(reader, writer, &LexConf::default())?;
    info!(
        "{} lines, {} words, {} malformed",
        summary.lines, summary.words, summary.malformed
    );

    Ok(())
}

fn run_parser(tokens: &str, output: &str) -> JParseResult<()> {
    info!("parsing {tokens} into {output}");

    let reader = BufReader::new(fs::File::open(tokens)?);

    // Format check
    let records = match token_stream::read_records(reader) {
        Ok(records) => records,
        Err(err) => {
            error!("token stream rejected\n{err}");
            return Err(err);
        }
    };

    // Grammar check, then code generation
    match parse::compile(&records, &ParseConf::default()) {
        Ok(instructions) => {
            let mut outfile = BufWriter::new(fs::File::create(output)?);
            parse::write_instructions(&mut outfile, &instructions)?;
            info!("wrote {} instructions", instructions.len());
        }
        Err(err) => {
            error!("parse error\n{err}");
            return Err(err);
        }
    }

    Ok(())
}

fn run_source(source: &str) -> JParseResult<()> {
    let source_code = fs::read_to_string(source)?;

    match jparse::compile_str(&source_code) {
        Ok(instructions) => println!("{}", parse::listing(&instructions)),
        Err(err) => {
            error!("parse error\n{err}");
            return Err(err);
        }
    }

    Ok(())
}

fn print_tokens(source: &str) -> JParseResult<()> {
    let source_code = fs::read_to_string(source)?;
    lex::debug_print_lexer(Lexer::new(&source_code));
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    match parse_args() {
        Some(Cmd::Lex { source, output }) => run_lexer(&source, &output)?,
        Some(Cmd::Parse { tokens, output }) => run_parser(&tokens, &output)?,
        Some(Cmd::Run { source }) => run_source(&source)?,
        Some(Cmd::Tokens { source }) => print_tokens(&source)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    let cmd = match args.next()?.as_str() {
        "lex" => Cmd::Lex {
            source: args.next()?,
            output: args.next().unwrap_or_else(|| SCANNER_OUTPUT.to_string()),
        },
        "parse" => Cmd::Parse {
            tokens: args.next().unwrap_or_else(|| SCANNER_OUTPUT.to_string()),
            output: args.next().unwrap_or_else(|| PARSER_OUTPUT.to_string()),
        },
        "run" => Cmd::Run {
            source: args.next()?,
        },
        "tokens" => Cmd::Tokens {
            source: args.next()?,
        },
        _ => return None,
    };

    // Trailing arguments are a usage error.
    match args.next() {
        Some(_) => None,
        None => Some(cmd),
    }
}

fn print_usage() {
    println!("jparse v{IMPL_VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Scan source into a token stream
    Lex { source: String, output: String },
    /// Translate a token stream
    Parse { tokens: String, output: String },
    /// Both stages, to stdout
    Run { source: String },
    /// Token table
    Tokens { source: String },
}
