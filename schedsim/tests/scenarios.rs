use randvals::RandStream;
use schedsim::{Policy, Simulation};

fn zeros(n: usize) -> RandStream {
    RandStream::from_values(vec![0; n])
}

/// Two processes under FCFS with every draw equal to 1 (all-zero random
/// stream). The two interleave perfectly: A runs its six single-unit bursts
/// at even times, B its four at odd times.
#[test]
fn fcfs_two_process_interleave() {
    let mut sim = Simulation::new(Policy::fcfs(), zeros(8));
    sim.add_process(0, 6, 3, 2);
    sim.add_process(1, 4, 2, 2);
    sim.run();

    let a = &sim.processes[0];
    let b = &sim.processes[1];
    assert_eq!(a.finish_time, 11);
    assert_eq!(b.finish_time, 8);
    assert_eq!(a.io_time, 5);
    assert_eq!(b.io_time, 3);
    assert_eq!(a.cpu_waiting_time, 0);
    assert_eq!(b.cpu_waiting_time, 0);

    // every executed cpu unit lands in the busy counter
    assert_eq!(sim.cpu_busy_time(), 10);
    // blocked intervals union to [1, 10)
    assert_eq!(sim.io_busy_time(), 9);

    let s = sim.summary();
    assert_eq!(s.last_finish, 11);
    assert!((s.avg_turnaround - 9.0).abs() < 1e-9);
    assert!((s.avg_cpu_wait - 0.0).abs() < 1e-9);
}

/// Preemptive priority: the higher-priority late arrival snatches the CPU
/// at t=2 and keeps winning it back after every io burst, so it finishes
/// long before the low-priority process despite arriving later.
#[test]
fn preprio_preempts_lower_priority_at_arrival() {
    // draws: prio(P0)=3, prio(P1)=4, first bursts 5 and 5, then all 1s
    let mut values = vec![2, 3, 4, 4];
    values.extend(std::iter::repeat(0).take(40));
    let mut sim = Simulation::new(Policy::prio(5, 4, true), RandStream::from_values(values));
    sim.add_process(0, 20, 5, 2);
    sim.add_process(2, 10, 5, 2);
    sim.run();

    assert_eq!(sim.processes[0].static_priority, 3);
    assert_eq!(sim.processes[1].static_priority, 4);
    assert_eq!(sim.processes[1].finish_time, 17);
    assert_eq!(sim.processes[0].finish_time, 42);
}

/// The same workload under non-preemptive PRIO lets the low-priority
/// process keep the CPU through its full burst, delaying the other.
#[test]
fn preprio_beats_prio_for_the_favored_process() {
    let values: Vec<i32> = vec![2, 3, 4, 4]
        .into_iter()
        .chain(std::iter::repeat(0).take(40))
        .collect();

    let mut pre = Simulation::new(Policy::prio(5, 4, true), RandStream::from_values(values.clone()));
    pre.add_process(0, 20, 5, 2);
    pre.add_process(2, 10, 5, 2);
    pre.run();

    let mut plain = Simulation::new(Policy::prio(5, 4, false), RandStream::from_values(values));
    plain.add_process(0, 20, 5, 2);
    plain.add_process(2, 10, 5, 2);
    plain.run();

    assert!(pre.processes[1].finish_time < plain.processes[1].finish_time);
}

/// RR with quantum 1 preempts on every tick of a multi-unit burst.
#[test]
fn round_robin_quantum_one_slices_every_tick() {
    let mut sim = Simulation::new(Policy::round_robin(1), RandStream::from_values(vec![2; 8]));
    sim.add_process(0, 4, 3, 3);
    sim.run();

    let p = &sim.processes[0];
    assert_eq!(p.finish_time, 7);
    assert_eq!(p.io_time, 3);
    assert_eq!(sim.cpu_busy_time(), 4);
}

/// SRTF resolves equal remaining times by the smaller pid.
#[test]
fn srtf_equal_remaining_prefers_smaller_pid() {
    let mut sim = Simulation::new(Policy::srtf(), zeros(8));
    sim.add_process(0, 2, 2, 2);
    sim.add_process(0, 2, 2, 2);
    sim.run();

    assert_eq!(sim.processes[0].finish_time, 3);
    assert_eq!(sim.processes[1].finish_time, 4);
}

/// Turnaround can never undercut service demand, and the cpu-busy counter
/// accounts for every executed unit.
#[test]
fn accounting_invariants_hold() {
    for spec in ["F", "L", "S", "R3", "P3:5", "E2"] {
        let mut sim = Simulation::new(
            Policy::from_spec(spec).unwrap(),
            RandStream::from_values(vec![3, 1, 4, 1, 5, 9, 2, 6]),
        );
        sim.add_process(0, 30, 7, 4);
        sim.add_process(3, 12, 5, 3);
        sim.add_process(5, 20, 6, 2);
        sim.run();

        let total_tc: i32 = sim.processes.iter().map(|p| p.total_cpu_time).sum();
        let total_tt: i32 = sim.processes.iter().map(|p| p.turnaround()).sum();
        assert!(total_tt >= total_tc, "spec {}", spec);
        assert_eq!(sim.cpu_busy_time(), total_tc, "spec {}", spec);
        for p in &sim.processes {
            assert_eq!(p.cpu_time_remaining, 0, "spec {}", spec);
        }
    }
}

/// Byte-for-byte determinism: identical inputs give identical results.
#[test]
fn reruns_are_deterministic() {
    let run = || {
        let mut sim = Simulation::new(
            Policy::from_spec("E4:6").unwrap(),
            RandStream::from_values(vec![9, 2, 7, 4, 4, 8, 1, 0, 3]),
        );
        sim.add_process(0, 25, 6, 5);
        sim.add_process(1, 18, 4, 3);
        sim.add_process(9, 11, 3, 2);
        sim.run();
        sim.processes
            .iter()
            .map(|p| {
                (
                    p.finish_time,
                    p.turnaround(),
                    p.io_time,
                    p.cpu_waiting_time,
                    p.static_priority,
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
