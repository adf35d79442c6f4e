// per-process virtual memory state

use crate::pte::Pte;

pub const MAX_VPAGES: usize = 64;

/// A contiguous vpage range with uniform protection attributes. Ranges are
/// closed on both ends and never overlap within one process.
#[derive(Clone, Copy, Debug)]
pub struct Vma {
    pub start_vpage: usize,
    pub end_vpage: usize,
    pub write_protected: bool,
    pub file_mapped: bool,
}

#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct ProcStats {
    pub unmaps: u64,
    pub maps: u64,
    pub ins: u64,
    pub outs: u64,
    pub fins: u64,
    pub fouts: u64,
    pub zeros: u64,
    pub segv: u64,
    pub segprot: u64,
}

pub struct Proc {
    pub pid: usize,
    pub vmas: Vec<Vma>,
    pub page_table: [Pte; MAX_VPAGES],
    pub stats: ProcStats,
}

impl Proc {
    pub fn new(pid: usize, vmas: Vec<Vma>) -> Self {
        Proc {
            pid,
            vmas,
            page_table: [Pte::default(); MAX_VPAGES],
            stats: ProcStats::default(),
        }
    }

    /// `(write_protected, file_mapped)` of the VMA holding `vpage`, or None
    /// when the page lies outside every VMA.
    pub fn vma_attrs(&self, vpage: usize) -> Option<(bool, bool)> {
        self.vmas
            .iter()
            .find(|v| vpage >= v.start_vpage && vpage <= v.end_vpage)
            .map(|v| (v.write_protected, v.file_mapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vma_lookup_is_inclusive() {
        let proc = Proc::new(
            0,
            vec![
                Vma {
                    start_vpage: 0,
                    end_vpage: 3,
                    write_protected: false,
                    file_mapped: false,
                },
                Vma {
                    start_vpage: 10,
                    end_vpage: 10,
                    write_protected: true,
                    file_mapped: true,
                },
            ],
        );
        assert_eq!(proc.vma_attrs(0), Some((false, false)));
        assert_eq!(proc.vma_attrs(3), Some((false, false)));
        assert_eq!(proc.vma_attrs(4), None);
        assert_eq!(proc.vma_attrs(10), Some((true, true)));
        assert_eq!(proc.vma_attrs(11), None);
    }
}
