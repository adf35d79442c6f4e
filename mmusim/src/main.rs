use std::env;
use std::fs;
use std::process;

use anyhow::{bail, Context, Result};
use env_logger::Env;
use randvals::RandStream;

use mmusim::{input, Mmu, OutputOptions, Pager, MAX_FRAMES};

struct Args {
    num_frames: usize,
    algo: char,
    options: String,
    input_file: String,
    rand_file: String,
}

fn usage() -> ! {
    eprintln!("Usage: mmu -f<num_frames> -a<algo> [-o<options>] inputfile randomfile");
    eprintln!("  algo: f=FIFO r=Random c=Clock e=NRU a=Aging w=WorkingSet");
    eprintln!("  options: O=trace x=page tables f=frame table P/F=final tables S=summary");
    process::exit(1);
}

fn parse_args() -> Result<Args> {
    let mut num_frames = None;
    let mut algo = None;
    let mut options = String::new();
    let mut positional = Vec::new();

    for arg in env::args().skip(1) {
        if let Some(rest) = arg.strip_prefix("-f") {
            num_frames = Some(rest.parse().context("bad -f frame count")?);
        } else if let Some(rest) = arg.strip_prefix("-a") {
            let mut chars = rest.chars();
            algo = chars.next();
            if algo.is_none() || chars.next().is_some() {
                bail!("option -a takes a single algorithm letter");
            }
        } else if let Some(rest) = arg.strip_prefix("-o") {
            options = rest.to_string();
        } else if arg.starts_with('-') {
            bail!("unknown option: {}", arg);
        } else {
            positional.push(arg);
        }
    }

    let num_frames: usize = num_frames.context("number of frames required (-f)")?;
    if num_frames == 0 || num_frames > MAX_FRAMES {
        bail!("invalid number of frames, must be between 1 and {}", MAX_FRAMES);
    }
    let algo = algo.context("replacement algorithm required (-a)")?;
    if positional.len() != 2 {
        bail!("missing input or random file");
    }
    let rand_file = positional.pop().unwrap();
    let input_file = positional.pop().unwrap();
    Ok(Args {
        num_frames,
        algo,
        options,
        input_file,
        rand_file,
    })
}

fn run(args: &Args) -> Result<()> {
    let rng = if args.algo == 'r' {
        Some(RandStream::from_file(&args.rand_file)?)
    } else {
        None
    };
    let pager = Pager::from_algo(args.algo, rng)?;

    let text = fs::read_to_string(&args.input_file)
        .with_context(|| format!("cannot open input file: {}", args.input_file))?;
    let (procs, instructions) = input::parse(&text)?;

    let opts = OutputOptions::from_flags(&args.options);
    let mut mmu = Mmu::new(args.num_frames, pager, procs, opts);
    mmu.run(&instructions);
    Ok(())
}

fn main() {
    env_logger::init_from_env(Env::default().filter_or("MMU_LOG", "warn"));

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
