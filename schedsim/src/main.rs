use std::env;
use std::fs;
use std::process;

use anyhow::{bail, Context, Result};
use env_logger::Env;
use randvals::RandStream;
use schedsim::{Policy, Simulation};

struct Args {
    spec: String,
    verbose: bool,
    input_file: String,
    rand_file: String,
}

fn usage() -> ! {
    eprintln!("Usage: sched -s<schedspec> [-v] inputfile randfile");
    eprintln!("  schedspec: F|FCFS, L|LCFS, S|SRTF, R<q>, P<q>[:<maxprio>], E<q>[:<maxprio>]");
    process::exit(1);
}

fn parse_args() -> Result<Args> {
    let mut spec = None;
    let mut verbose = false;
    let mut positional = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "-v" {
            verbose = true;
        } else if arg == "-s" {
            spec = Some(args.next().context("option -s requires a scheduler spec")?);
        } else if let Some(rest) = arg.strip_prefix("-s") {
            spec = Some(rest.to_string());
        } else if arg.starts_with('-') {
            bail!("unknown option: {}", arg);
        } else {
            positional.push(arg);
        }
    }

    let spec = spec.context("scheduler specification required (-s option)")?;
    if positional.len() != 2 {
        bail!("missing input and/or random file");
    }
    let rand_file = positional.pop().unwrap();
    let input_file = positional.pop().unwrap();
    Ok(Args {
        spec,
        verbose,
        input_file,
        rand_file,
    })
}

fn run(args: &Args) -> Result<()> {
    let policy = Policy::from_spec(&args.spec)?;
    let rng = RandStream::from_file(&args.rand_file)?;

    let input = fs::read_to_string(&args.input_file)
        .with_context(|| format!("cannot open input file: {}", args.input_file))?;

    let mut sim = Simulation::new(policy, rng);
    sim.load_processes(&input)?;
    sim.run();
    sim.print_report();
    Ok(())
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            usage();
        }
    };

    let default = if args.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(Env::default().filter_or("SCHED_LOG", default));

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
