// instruction dispatch and the page fault path

use std::collections::VecDeque;

use log::debug;

use crate::frame::Frame;
use crate::pager::Pager;
use crate::proc::{Proc, MAX_VPAGES};
use crate::pte::Pte;

// cost table
const COST_RW: u64 = 1;
const COST_CTX_SWITCH: u64 = 130;
const COST_PROC_EXIT: u64 = 1230;
const COST_MAP: u64 = 350;
const COST_UNMAP: u64 = 410;
const COST_IN: u64 = 3200;
const COST_OUT: u64 = 2750;
const COST_FIN: u64 = 2350;
const COST_FOUT: u64 = 2800;
const COST_ZERO: u64 = 150;
const COST_SEGV: u64 = 440;
const COST_SEGPROT: u64 = 410;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Instr {
    CtxSwitch(usize),
    Exit(usize),
    Read(usize),
    Write(usize),
}

impl Instr {
    pub fn op_char(&self) -> char {
        match self {
            Instr::CtxSwitch(_) => 'c',
            Instr::Exit(_) => 'e',
            Instr::Read(_) => 'r',
            Instr::Write(_) => 'w',
        }
    }

    pub fn arg(&self) -> usize {
        match *self {
            Instr::CtxSwitch(v) | Instr::Exit(v) | Instr::Read(v) | Instr::Write(v) => v,
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct OutputOptions {
    pub trace: bool,          // O
    pub pt_after_each: bool,  // x
    pub ft_after_each: bool,  // f
    pub final_pt: bool,       // P
    pub final_ft: bool,       // F
    pub summary: bool,        // S
}

impl OutputOptions {
    pub fn from_flags(flags: &str) -> Self {
        OutputOptions {
            trace: flags.contains('O'),
            pt_after_each: flags.contains('x'),
            ft_after_each: flags.contains('f'),
            final_pt: flags.contains('P'),
            final_ft: flags.contains('F'),
            summary: flags.contains('S'),
        }
    }
}

pub struct Mmu {
    pub procs: Vec<Proc>,
    pub frames: Vec<Frame>,
    free_list: VecDeque<usize>,
    pager: Pager,
    current: usize,
    opts: OutputOptions,

    pub inst_count: u64,
    pub ctx_switches: u64,
    pub process_exits: u64,
    pub cost: u64,
}

impl Mmu {
    pub fn new(num_frames: usize, pager: Pager, procs: Vec<Proc>, opts: OutputOptions) -> Self {
        Mmu {
            procs,
            frames: vec![Frame::free(); num_frames],
            free_list: (0..num_frames).collect(),
            pager,
            current: 0,
            opts,
            inst_count: 0,
            ctx_switches: 0,
            process_exits: 0,
            cost: 0,
        }
    }

    pub fn run(&mut self, instructions: &[Instr]) {
        for &instr in instructions {
            if self.opts.trace {
                println!("{}: ==> {} {}", self.inst_count, instr.op_char(), instr.arg());
            }
            self.exec(instr);
            if self.opts.pt_after_each {
                self.print_page_tables();
            }
            if self.opts.ft_after_each {
                self.print_frame_table();
            }
        }
        if self.opts.final_pt {
            self.print_page_tables();
        }
        if self.opts.final_ft {
            self.print_frame_table();
        }
        if self.opts.summary {
            self.print_summary();
        }
    }

    pub fn exec(&mut self, instr: Instr) {
        self.inst_count += 1;
        match instr {
            Instr::CtxSwitch(pid) => {
                self.current = pid;
                self.ctx_switches += 1;
                self.cost += COST_CTX_SWITCH;
            }
            Instr::Exit(_) => self.exit_current(),
            Instr::Read(vpage) => self.access(vpage, false),
            Instr::Write(vpage) => self.access(vpage, true),
        }
    }

    fn access(&mut self, vpage: usize, is_write: bool) {
        self.cost += COST_RW;
        let proc = &self.procs[self.current];
        let (write_protected, file_mapped) = match proc.vma_attrs(vpage) {
            Some(attrs) => attrs,
            None => {
                println!(" SEGV");
                self.procs[self.current].stats.segv += 1;
                self.cost += COST_SEGV;
                return;
            }
        };

        if !self.procs[self.current].page_table[vpage].present() {
            self.handle_page_fault(vpage, write_protected, file_mapped);
        }

        self.procs[self.current].page_table[vpage].set_referenced(true);

        if is_write {
            if write_protected {
                println!(" SEGPROT");
                self.procs[self.current].stats.segprot += 1;
                self.cost += COST_SEGPROT;
            } else {
                self.procs[self.current].page_table[vpage].set_modified(true);
            }
        }
    }

    /// Obtain a frame (free list first, victim otherwise), evict whatever
    /// lives there, source the new page, map it.
    fn handle_page_fault(&mut self, vpage: usize, write_protected: bool, file_mapped: bool) {
        let fidx = self.get_frame();

        if self.frames[fidx].in_use() {
            let old_pid = self.frames[fidx].pid as usize;
            let old_vpage = self.frames[fidx].vpage as usize;

            println!(" UNMAP {}:{}", old_pid, old_vpage);
            self.procs[old_pid].stats.unmaps += 1;
            self.cost += COST_UNMAP;

            if self.procs[old_pid].page_table[old_vpage].modified() {
                let (_, old_file_mapped) = self.procs[old_pid]
                    .vma_attrs(old_vpage)
                    .unwrap_or((false, false));
                if old_file_mapped {
                    println!(" FOUT");
                    self.procs[old_pid].stats.fouts += 1;
                    self.cost += COST_FOUT;
                } else {
                    println!(" OUT");
                    self.procs[old_pid].stats.outs += 1;
                    self.cost += COST_OUT;
                    self.procs[old_pid].page_table[old_vpage].set_paged_out(true);
                }
            }
            let old_pte = &mut self.procs[old_pid].page_table[old_vpage];
            old_pte.set_present(false);
            old_pte.set_referenced(false);
        }

        {
            let pte = &mut self.procs[self.current].page_table[vpage];
            pte.set_present(false);
            pte.set_referenced(false);
            pte.set_modified(false);
        }

        // source the contents: swap space beats the backing file beats zeros
        if self.procs[self.current].page_table[vpage].paged_out() {
            println!(" IN");
            self.procs[self.current].stats.ins += 1;
            self.cost += COST_IN;
        } else if file_mapped {
            println!(" FIN");
            self.procs[self.current].stats.fins += 1;
            self.cost += COST_FIN;
        } else {
            println!(" ZERO");
            self.procs[self.current].stats.zeros += 1;
            self.cost += COST_ZERO;
        }

        println!(" MAP {}", fidx);
        self.procs[self.current].stats.maps += 1;
        self.cost += COST_MAP;

        self.frames[fidx].pid = self.current as i32;
        self.frames[fidx].vpage = vpage as i32;

        let pte = &mut self.procs[self.current].page_table[vpage];
        pte.set_frame(fidx);
        pte.set_present(true);
        pte.set_referenced(true);
        if write_protected {
            pte.set_write_protect(true);
        }
        if file_mapped {
            pte.set_file_mapped(true);
        }

        self.pager.reset_age(&mut self.frames[fidx], self.inst_count);
        debug!("fault {}:{} -> frame {}", self.current, vpage, fidx);
    }

    fn exit_current(&mut self) {
        self.process_exits += 1;
        self.cost += COST_PROC_EXIT;
        let pid = self.current;

        for vpage in 0..MAX_VPAGES {
            if self.procs[pid].page_table[vpage].present() {
                let fidx = self.procs[pid].page_table[vpage].frame();

                println!(" UNMAP {}:{}", self.frames[fidx].pid, self.frames[fidx].vpage);
                self.procs[pid].stats.unmaps += 1;
                self.cost += COST_UNMAP;

                let (_, file_mapped) = self.procs[pid].vma_attrs(vpage).unwrap_or((false, false));
                if self.procs[pid].page_table[vpage].modified() && file_mapped {
                    println!(" FOUT");
                    self.procs[pid].stats.fouts += 1;
                    self.cost += COST_FOUT;
                }

                self.frames[fidx].release();
                self.free_list.push_back(fidx);
            }
            let pte = &mut self.procs[pid].page_table[vpage];
            pte.set_present(false);
            pte.set_referenced(false);
            pte.set_modified(false);
            pte.set_paged_out(false);
        }
    }

    fn get_frame(&mut self) -> usize {
        if let Some(fidx) = self.free_list.pop_front() {
            return fidx;
        }
        self.pager
            .select_victim_frame(&mut self.frames, &mut self.procs, self.inst_count)
    }

    pub fn print_page_tables(&self) {
        for proc in &self.procs {
            let cells: Vec<String> = proc
                .page_table
                .iter()
                .enumerate()
                .map(|(v, pte)| pte.display(v))
                .collect();
            println!("PT[{}]: {}", proc.pid, cells.join(" "));
        }
    }

    pub fn print_frame_table(&self) {
        let cells: Vec<String> = self
            .frames
            .iter()
            .map(|f| {
                if f.in_use() {
                    format!("{}:{}", f.pid, f.vpage)
                } else {
                    "*".into()
                }
            })
            .collect();
        println!("FT: {}", cells.join(" "));
    }

    pub fn print_summary(&self) {
        for proc in &self.procs {
            let s = &proc.stats;
            println!(
                "PROC[{}]: U={} M={} I={} O={} FI={} FO={} Z={} SV={} SP={}",
                proc.pid, s.unmaps, s.maps, s.ins, s.outs, s.fins, s.fouts, s.zeros, s.segv, s.segprot
            );
        }
        println!(
            "TOTALCOST {} {} {} {} {}",
            self.inst_count,
            self.ctx_switches,
            self.process_exits,
            self.cost,
            std::mem::size_of::<Pte>()
        );
    }
}
