//! A demand-paging simulator: per-process page tables over a small global
//! frame table, six replacement policies, and a cost model.

pub mod frame;
pub mod input;
pub mod mmu;
pub mod pager;
pub mod proc;
pub mod pte;

pub use frame::{Frame, MAX_FRAMES};
pub use mmu::{Instr, Mmu, OutputOptions};
pub use pager::Pager;
pub use proc::{Proc, ProcStats, Vma, MAX_VPAGES};
pub use pte::Pte;
