use std::env;
use std::fs;
use std::process;

use anyhow::Context;
use env_logger::Env;

use linker::Linker;

fn main() {
    env_logger::init_from_env(Env::default().filter_or("LINKER_LOG", "warn"));

    let mut args = env::args().skip(1);
    let input_file = match (args.next(), args.next()) {
        (Some(f), None) => f,
        _ => {
            eprintln!("Usage: linker <input_file>");
            process::exit(1);
        }
    };

    let text = match fs::read_to_string(&input_file)
        .with_context(|| format!("error opening file: {}", input_file))
    {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    match Linker::link(&text) {
        Ok((_, report)) => print!("{}", report),
        Err(e) => {
            // parse errors are part of the report contract, not diagnostics
            println!("{}", e);
            process::exit(1);
        }
    }
}
