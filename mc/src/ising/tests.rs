use super::*;
use crate::error::SimError;
use approx::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn params(rows: usize, cols: usize, kt: f64, tmax: usize) -> SimulationParams {
    SimulationParams {
        rows,
        cols,
        kt,
        tmax,
        ..SimulationParams::default()
    }
}

#[test]
fn test_initialize_all_up() {
    let mut rng = StdRng::seed_from_u64(1);
    let lattice = Lattice::initialize(7, 5, 1.0, &mut rng).unwrap();
    assert_eq!(lattice.n_sites(), 35);
    assert_eq!(lattice.magnetization(), 35);
    assert_eq!(lattice.magnetization_per_site(), 1.0);
}

#[test]
fn test_initialize_all_down() {
    let mut rng = StdRng::seed_from_u64(2);
    let lattice = Lattice::initialize(4, 9, 0.0, &mut rng).unwrap();
    assert_eq!(lattice.magnetization(), -36);
    assert_eq!(lattice.magnetization_per_site(), -1.0);
}

#[test]
fn test_initialize_only_produces_unit_spins() {
    let mut rng = StdRng::seed_from_u64(3);
    let lattice = Lattice::initialize(20, 30, 0.5, &mut rng).unwrap();
    assert!(lattice.spins().iter().all(|&s| s == 1 || s == -1));
    assert_eq!(lattice.to_rows().len(), 20);
    assert_eq!(lattice.to_rows()[0].len(), 30);
}

#[test]
fn test_initialize_rejects_bad_parameters() {
    let mut rng = StdRng::seed_from_u64(4);
    assert!(matches!(
        Lattice::initialize(0, 5, 0.5, &mut rng),
        Err(SimError::InvalidParameter { name: "rows", .. })
    ));
    assert!(matches!(
        Lattice::initialize(5, 0, 0.5, &mut rng),
        Err(SimError::InvalidParameter { name: "cols", .. })
    ));
    assert!(Lattice::initialize(5, 5, 1.5, &mut rng).is_err());
    assert!(Lattice::initialize(5, 5, -0.1, &mut rng).is_err());
    assert!(Lattice::initialize(5, 5, f64::NAN, &mut rng).is_err());
}

#[test]
fn test_periodic_boundary_conditions() {
    let lattice = Lattice::from_rows(&[vec![1, -1, 1], vec![-1, -1, 1], vec![1, 1, -1]]).unwrap();

    assert_eq!(lattice.get_periodic(-1, 0), lattice.get(2, 0));
    assert_eq!(lattice.get_periodic(3, 1), lattice.get(0, 1));
    assert_eq!(lattice.get_periodic(1, -1), lattice.get(1, 2));
    assert_eq!(lattice.get_periodic(1, 3), lattice.get(1, 0));
}

#[test]
fn test_energy_delta_on_2x2_lattice() {
    // On a 2x2 torus the up/down and left/right neighbours coincide, so
    // each of them is counted twice.
    let lattice = Lattice::from_rows(&[vec![1, -1], vec![-1, -1]]).unwrap();

    // s = +1, neighbours -1, -1, -1, -1: 2*1*1*(-4) + 2*0.5*2*1 = -6
    assert_relative_eq!(lattice.energy_delta(0, 0, 1.0, 0.5, 2.0), -6.0, epsilon = 1e-12);
    // s = -1, neighbours -1, -1, -1, -1: 2*1*(-1)*(-4) + 2*0.5*2*(-1) = 6
    assert_relative_eq!(lattice.energy_delta(1, 1, 1.0, 0.5, 2.0), 6.0, epsilon = 1e-12);
    // s = -1 at (0, 1), neighbours (1,1)=-1, (0,0)=+1 twice each: sum 0
    assert_relative_eq!(lattice.energy_delta(0, 1, 1.0, 0.0, 1.0), 0.0, epsilon = 1e-12);
}

#[test]
fn test_energy_delta_matches_total_energy_difference() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut lattice = Lattice::initialize(6, 4, 0.5, &mut rng).unwrap();
    let (j, b, mu) = (1.3, 0.4, 0.7);

    for (row, col) in [(0, 0), (5, 3), (2, 1), (3, 0)] {
        let before = lattice.total_energy(j, b, mu);
        let predicted = lattice.energy_delta(row, col, j, b, mu);
        lattice.flip(row, col);
        let after = lattice.total_energy(j, b, mu);
        assert_relative_eq!(after - before, predicted, epsilon = 1e-10);
    }
}

#[test]
fn test_flip_round_trip_restores_lattice() {
    let mut rng = StdRng::seed_from_u64(6);
    let original = Lattice::initialize(5, 5, 0.5, &mut rng).unwrap();
    let mut lattice = original.clone();

    let forward = lattice.energy_delta(2, 3, 1.0, 0.2, 1.0);
    lattice.flip(2, 3);
    let backward = lattice.energy_delta(2, 3, 1.0, 0.2, 1.0);
    lattice.flip(2, 3);

    assert_eq!(lattice, original);
    assert_relative_eq!(forward.abs(), backward.abs(), epsilon = 1e-12);
    assert_relative_eq!(forward, -backward, epsilon = 1e-12);
}

#[test]
fn test_ordered_state_energy() {
    let lattice = Lattice::uniform(5, 5, 1).unwrap();
    assert_eq!(lattice.magnetization_per_site(), 1.0);
    assert_relative_eq!(
        lattice.energy_per_site(1.0, 0.0, 1.0),
        analysis::energy_per_site_at_zero_temp(1.0),
        epsilon = 1e-10
    );
}

#[test]
fn test_single_flip_energy_cost() {
    let mut lattice = Lattice::uniform(3, 3, 1).unwrap();
    let initial_energy = lattice.total_energy(1.0, 0.0, 1.0);

    lattice.flip(1, 1);

    // One spin surrounded by 4 opposite neighbours costs 8J
    assert_relative_eq!(lattice.total_energy(1.0, 0.0, 1.0) - initial_energy, 8.0, epsilon = 1e-10);
}

#[test]
fn test_acceptance_probability() {
    assert_eq!(acceptance_probability(-4.0, 1.0), 1.0);
    assert_eq!(acceptance_probability(0.0, 1.0), 1.0);
    assert_relative_eq!(acceptance_probability(4.0, 2.0), (-2.0f64).exp(), epsilon = 1e-12);
    assert_eq!(acceptance_probability(8.0, 1e-6), 0.0);
}

#[test]
fn test_acceptance_probability_treats_numeric_faults_as_reject() {
    // Overflowing exponent and NaN energies must never be accepted
    assert_eq!(acceptance_probability(1.0, -1e-310), 0.0);
    assert_eq!(acceptance_probability(f64::NAN, 1.0), 0.0);
    assert_eq!(acceptance_probability(f64::INFINITY, 1.0), 0.0);
}

#[test]
fn test_attempt_flip_accepts_favourable_moves() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut lattice = Lattice::uniform(3, 3, 1).unwrap();
    lattice.flip(1, 1);

    // Flipping the lone down spin back lowers the energy
    let p = params(3, 3, 1.0, 10);
    assert!(attempt_flip(&mut lattice, 1, 1, &p, &mut rng));
    assert!(lattice.is_saturated());
}

#[test]
fn test_low_temperature_keeps_order() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut lattice = Lattice::uniform(8, 8, -1).unwrap();
    let p = params(8, 8, 1e-4, 10);

    for _ in 0..50_000 {
        let row = rand::Rng::gen_range(&mut rng, 0..8);
        let col = rand::Rng::gen_range(&mut rng, 0..8);
        attempt_flip(&mut lattice, row, col, &p, &mut rng);
    }

    assert_eq!(lattice.magnetization_per_site(), -1.0);
}

#[test]
fn test_run_stops_early_when_saturated() {
    let p = SimulationParams {
        init_prob: 1.0,
        ..params(10, 10, 0.001, 50)
    };
    let result = run_seeded(&p, 9).unwrap();

    assert_eq!(result.termination, Termination::Saturated { step: 1 });
    assert_eq!(result.steps, 1);
    assert!(result.steps < p.tmax);
    assert_eq!(result.final_magnetization, 1.0);
    assert_eq!(result.accepted_flips, 0);
}

#[test]
fn test_run_uses_exactly_tmax_steps_when_never_saturated() {
    // At very high temperature a 10x10 lattice is essentially never aligned
    let p = params(10, 10, 100.0, 7);
    let result = run_seeded(&p, 10).unwrap();

    assert_eq!(result.termination, Termination::MaxSteps);
    assert_eq!(result.steps, 7);
}

#[test]
fn test_run_with_zero_tmax_does_not_step() {
    let p = params(4, 4, 1.0, 0);
    let result = run_seeded(&p, 11).unwrap();
    assert_eq!(result.steps, 0);
    assert_eq!(result.termination, Termination::MaxSteps);
}

#[test]
fn test_magnetization_bounds() {
    let cases = [
        params(1, 1, 1.0, 20),
        params(2, 3, 0.5, 20),
        params(12, 5, 2.269, 30),
        SimulationParams {
            field: 1.0,
            ..params(8, 8, 3.0, 30)
        },
        SimulationParams {
            coupling: -1.0,
            init_prob: 0.2,
            ..params(6, 6, 0.7, 30)
        },
    ];

    for (seed, p) in cases.iter().enumerate() {
        let result = run_seeded(p, seed as u64).unwrap();
        assert!(result.final_magnetization.abs() <= 1.0);
        assert!(result.steps <= p.tmax);
        assert_eq!(result.final_lattice.n_sites(), p.n_sites());
    }
}

#[test]
fn test_run_rejects_invalid_temperature() {
    for kt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let p = params(5, 5, kt, 10);
        assert!(matches!(
            run_seeded(&p, 0),
            Err(SimError::InvalidParameter { name: "kt", .. })
        ));
    }
}

#[test]
fn test_run_rejects_non_finite_couplings() {
    let p = SimulationParams {
        field: f64::NAN,
        ..params(5, 5, 1.0, 10)
    };
    assert!(matches!(
        run_seeded(&p, 0),
        Err(SimError::InvalidParameter { name: "field", .. })
    ));
}

#[test]
fn test_same_seed_gives_same_run() {
    let p = params(10, 10, 2.0, 25);
    let a = run_seeded(&p, 42).unwrap();
    let b = run_seeded(&p, 42).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_simulation_state_machine() {
    let p = params(6, 6, 50.0, 3);
    let mut sim = Simulation::new(p, StdRng::seed_from_u64(12)).unwrap();
    assert_eq!(sim.state(), RunState::Stepping);

    assert_eq!(sim.step(), RunState::Stepping);
    assert_eq!(sim.step(), RunState::Stepping);
    assert_eq!(sim.step(), RunState::Terminated);

    // Further steps are ignored
    assert_eq!(sim.step(), RunState::Terminated);
    assert_eq!(sim.steps(), 3);
}

#[test]
fn test_with_lattice_checks_dimensions() {
    let lattice = Lattice::uniform(3, 4, 1).unwrap();
    let p = params(4, 3, 1.0, 5);
    assert!(Simulation::with_lattice(p, lattice, StdRng::seed_from_u64(0)).is_err());
}

#[test]
fn test_trajectory_records_every_step() {
    let p = params(10, 10, 100.0, 12);
    let mut trajectory = Trajectory::new(5);
    let result = run_with_observer(&p, StdRng::seed_from_u64(13), &mut trajectory).unwrap();

    assert_eq!(trajectory.magnetization.len(), result.steps + 1);
    assert!(trajectory.magnetization.iter().all(|m| (0.0..=1.0).contains(m)));

    let snapshot_steps: Vec<usize> = trajectory.snapshots.iter().map(|s| s.step).collect();
    assert_eq!(snapshot_steps, vec![0, 5, 10]);
}

#[test]
fn test_critical_temperature() {
    assert_relative_eq!(analysis::critical_temperature(), 2.269, epsilon = 0.001);
    assert_eq!(analysis::spontaneous_magnetization(3.0, 1.0), 0.0);
    assert!(analysis::spontaneous_magnetization(1.0, 1.0) > 0.99);
}
