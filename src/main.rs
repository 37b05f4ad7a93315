use std::error::Error;
use std::fs;
use std::process;

use clap::{App, Arg, ArgMatches};

use husk::backend::codegen;
use husk::frontend::{lexer::Lexer, parser::Parser};

fn main() {
    let matches = App::new("husk")
        .version("0.1.0")
        .about("Compiles lazy functional programs to Rust graph reduction code")
        .arg(
            Arg::new("FILE")
                .about("Source file to compile")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .about("Print the token stream to stderr"),
        )
        .arg(
            Arg::new("definitions")
                .long("definitions")
                .about("Print the parsed definitions to stderr"),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

/// Compile the given file and write the generated Rust source to stdout.
fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let path = matches.value_of("FILE").unwrap();
    let source = fs::read_to_string(path)?;

    let tokens = Lexer::new(&source).tokenize()?;
    if matches.is_present("tokens") {
        for token in &tokens {
            eprintln!("{}", token);
        }
    }

    let program = Parser::new(tokens).parse()?;
    if matches.is_present("definitions") {
        eprint!("{}", program);
    }

    let generated = codegen::generate(&program)?;
    print!("{}", generated);
    Ok(())
}
