// input file parsing: process descriptors followed by an instruction stream

use anyhow::{bail, Context, Result};

use crate::mmu::Instr;
use crate::proc::{Proc, Vma, MAX_VPAGES};

/// Lines starting with `#` (and blank lines) are comments throughout.
pub fn parse(input: &str) -> Result<(Vec<Proc>, Vec<Instr>)> {
    let mut lines = input
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'));

    let num_procs: usize = lines
        .next()
        .context("missing process count")?
        .trim()
        .parse()
        .context("bad process count")?;

    let mut procs = Vec::with_capacity(num_procs);
    for pid in 0..num_procs {
        let num_vmas: usize = lines
            .next()
            .with_context(|| format!("missing VMA count for process {}", pid))?
            .trim()
            .parse()
            .context("bad VMA count")?;
        let mut vmas = Vec::with_capacity(num_vmas);
        for _ in 0..num_vmas {
            let line = lines
                .next()
                .with_context(|| format!("missing VMA line for process {}", pid))?;
            vmas.push(parse_vma(line)?);
        }
        procs.push(Proc::new(pid, vmas));
    }

    let mut instructions = Vec::new();
    for line in lines {
        instructions.push(parse_instr(line)?);
    }
    Ok((procs, instructions))
}

fn parse_vma(line: &str) -> Result<Vma> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        bail!("malformed VMA line: {:?}", line);
    }
    let start_vpage: usize = fields[0].parse().context("bad VMA start page")?;
    let end_vpage: usize = fields[1].parse().context("bad VMA end page")?;
    if start_vpage > end_vpage || end_vpage >= MAX_VPAGES {
        bail!("VMA range {}..={} out of bounds", start_vpage, end_vpage);
    }
    Ok(Vma {
        start_vpage,
        end_vpage,
        write_protected: fields[2] != "0",
        file_mapped: fields[3] != "0",
    })
}

fn parse_instr(line: &str) -> Result<Instr> {
    let mut fields = line.split_whitespace();
    let op = fields.next().context("empty instruction line")?;
    let arg: usize = fields
        .next()
        .with_context(|| format!("instruction {:?} lacks an operand", op))?
        .parse()
        .context("bad instruction operand")?;
    Ok(match op {
        "c" => Instr::CtxSwitch(arg),
        "e" => Instr::Exit(arg),
        "r" => Instr::Read(arg),
        "w" => Instr::Write(arg),
        _ => bail!("unknown operation: {}", op),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "\
# a toy process image
1
# one process, two vmas
2
0 7 0 0
# heap
9 9 1 1
r 0
w 1
c 0
e 0
";

    #[test]
    fn parses_procs_and_instructions() {
        let (procs, instrs) = parse(INPUT).unwrap();
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].vmas.len(), 2);
        assert_eq!(procs[0].vma_attrs(9), Some((true, true)));
        assert_eq!(
            instrs,
            vec![
                Instr::Read(0),
                Instr::Write(1),
                Instr::CtxSwitch(0),
                Instr::Exit(0)
            ]
        );
    }

    #[test]
    fn rejects_out_of_range_vma() {
        let bad = "1\n1\n0 64 0 0\nr 0\n";
        assert!(parse(bad).is_err());
    }

    #[test]
    fn rejects_unknown_ops() {
        let bad = "1\n1\n0 7 0 0\nq 3\n";
        assert!(parse(bad).is_err());
    }
}
