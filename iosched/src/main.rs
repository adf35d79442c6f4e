use std::env;
use std::fs;
use std::process;

use anyhow::{bail, Context, Result};
use env_logger::Env;

use iosched::{request, DiskPolicy, DiskSimulator, Options};

struct Args {
    algo: char,
    opts: Options,
    input_file: String,
}

fn usage() -> ! {
    eprintln!("Usage: iosched [-v] [-q] [-f] [-s<scheduler>] <input_file>");
    eprintln!("Valid schedulers are: N (FIFO), S (SSTF), L (LOOK), C (CLOOK), F (FLOOK)");
    process::exit(1);
}

fn parse_args() -> Result<Args> {
    let mut algo = 'N';
    let mut opts = Options::default();
    let mut input_file = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-v" => opts.verbose = true,
            "-q" => opts.show_queue = true,
            "-f" => opts.show_flook = true,
            _ => {
                if let Some(rest) = arg.strip_prefix("-s") {
                    let mut chars = rest.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => algo = c,
                        _ => bail!("invalid scheduler option, use -s<algo>"),
                    }
                } else if arg.starts_with('-') {
                    bail!("unexpected argument: {}", arg);
                } else if input_file.is_none() {
                    input_file = Some(arg);
                } else {
                    bail!("unexpected argument: {}", arg);
                }
            }
        }
    }

    Ok(Args {
        algo,
        opts,
        input_file: input_file.context("input file is required")?,
    })
}

fn run(args: &Args) -> Result<()> {
    let policy = DiskPolicy::from_algo(args.algo)?;
    let text = fs::read_to_string(&args.input_file)
        .with_context(|| format!("unable to open input file: {}", args.input_file))?;
    let requests = request::parse(&text)?;

    let mut sim = DiskSimulator::new(policy, requests, args.opts);
    sim.run();
    sim.print_report();
    Ok(())
}

fn main() {
    env_logger::init_from_env(Env::default().filter_or("IOSCHED_LOG", "warn"));

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            usage();
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
