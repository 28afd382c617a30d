use std::str::FromStr;

use approx::assert_relative_eq;
use ndarray::{array, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::acceleration::{AccelerationBackend, BackendKind, Broadcast, ForceLaw, Mass, NaiveLoop, VectorizedMap};
use crate::assert_allclose;
use crate::initial_conditions::uniform_cube;
use crate::utils::{NBodyError, DEFAULT_ATOL, DEFAULT_RTOL};

fn random_positions(n: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    uniform_cube(&mut rng, n)
}

/// Every backend that can run on this machine; the GPU is skipped when absent.
fn available_backends() -> Vec<Box<dyn AccelerationBackend>> {
    BackendKind::ALL
        .iter()
        .filter_map(|kind| match kind.create() {
            Ok(backend) => Some(backend),
            Err(NBodyError::BackendUnavailable { backend, reason }) => {
                eprintln!("skipping {}: {}", backend, reason);
                None
            }
            Err(e) => panic!("unexpected error creating {}: {}", kind, e),
        })
        .collect()
}

#[test]
fn test_naive_matches_broadcast() {
    let x = random_positions(100, 42);
    let naive = NaiveLoop.acceleration(x.view(), &ForceLaw::unit()).expect("naive failed");
    let broadcast = Broadcast.acceleration(x.view(), &ForceLaw::unit()).expect("broadcast failed");

    let max_abs_error = (&naive - &broadcast).iter().fold(0.0_f64, |m, d| m.max(d.abs()));
    assert!(max_abs_error <= 1e-5, "max abs error {:e}", max_abs_error);
}

#[test]
fn test_every_backend_matches_reference() {
    let x = random_positions(100, 7897);
    let reference = Broadcast.acceleration(x.view(), &ForceLaw::unit()).expect("reference failed");

    for backend in available_backends() {
        let result = backend.acceleration(x.view(), &ForceLaw::unit())
            .unwrap_or_else(|e| panic!("{} failed: {}", backend.name(), e));
        assert_allclose(&result.view(), &reference.view(), DEFAULT_RTOL, DEFAULT_ATOL, Some(backend.name()));
    }
}

#[test]
fn test_every_backend_matches_reference_with_softening_and_masses() {
    let x = random_positions(64, 3);
    let masses: Vec<f64> = (0..64).map(|i| 1.0 + (i % 10) as f64).collect();
    let law = ForceLaw::new(0.1, Mass::PerParticle(masses));
    let reference = Broadcast.acceleration(x.view(), &law).expect("reference failed");

    for backend in available_backends() {
        let result = backend.acceleration(x.view(), &law)
            .unwrap_or_else(|e| panic!("{} failed: {}", backend.name(), e));
        assert_allclose(&result.view(), &reference.view(), DEFAULT_RTOL, DEFAULT_ATOL, Some(backend.name()));
    }
}

#[test]
fn test_every_backend_matches_reference_far_from_origin() {
    let x = random_positions(100, 7897) + 1000.0;
    let reference = Broadcast.acceleration(x.view(), &ForceLaw::unit()).expect("reference failed");

    for backend in available_backends() {
        let result = backend.acceleration(x.view(), &ForceLaw::unit())
            .unwrap_or_else(|e| panic!("{} failed: {}", backend.name(), e));
        assert_allclose(&result.view(), &reference.view(), DEFAULT_RTOL, DEFAULT_ATOL, Some(backend.name()));
    }
}

#[test]
fn test_two_body_attraction() {
    // Unit masses two units apart: |a| = 1 / 2² along the separation, towards each other.
    let x = array![[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
    for backend in available_backends() {
        let a = backend.acceleration(x.view(), &ForceLaw::unit()).expect("acceleration failed");
        assert_relative_eq!(a[[0, 0]], 0.25, max_relative = 1e-6);
        assert_relative_eq!(a[[1, 0]], -0.25, max_relative = 1e-6);
        assert!(a[[0, 1]].abs() < 1e-12 && a[[0, 2]].abs() < 1e-12, "{}", backend.name());
    }
}

#[test]
fn test_per_particle_mass_weighs_sources() {
    // Particle 0 feels m_1 / d², particle 1 feels m_0 / d².
    let x = array![[0.0, 0.0, 0.0], [0.0, 2.0, 0.0]];
    let law = ForceLaw::new(0.0, Mass::PerParticle(vec![2.0, 3.0]));
    let a = NaiveLoop.acceleration(x.view(), &law).expect("acceleration failed");
    assert_relative_eq!(a[[0, 1]], 3.0 / 4.0, epsilon = 1e-12);
    assert_relative_eq!(a[[1, 1]], -2.0 / 4.0, epsilon = 1e-12);
}

#[test]
fn test_uniform_mass_is_a_scalar_factor() {
    let x = random_positions(20, 11);
    let unit = NaiveLoop.acceleration(x.view(), &ForceLaw::unit()).expect("unit failed");
    let scaled = NaiveLoop.acceleration(x.view(), &ForceLaw::new(0.0, Mass::Uniform(0.05))).expect("scaled failed");
    let explicit = NaiveLoop
        .acceleration(x.view(), &ForceLaw::new(0.0, Mass::PerParticle(vec![0.05; 20])))
        .expect("explicit failed");

    assert_allclose(&scaled.view(), &(&unit * 0.05).view(), 1e-12, 1e-12, None);
    assert_allclose(&explicit.view(), &scaled.view(), 1e-12, 1e-12, None);
}

#[test]
fn test_softening_weakens_close_pairs() {
    let x = array![[0.0, 0.0, 0.0], [0.01, 0.0, 0.0]];
    let hard = NaiveLoop.acceleration(x.view(), &ForceLaw::unit()).expect("hard failed");
    let soft = NaiveLoop.acceleration(x.view(), &ForceLaw::new(0.1, Mass::Uniform(1.0))).expect("soft failed");
    assert!(soft[[0, 0]] > 0.0);
    assert!(soft[[0, 0]] < hard[[0, 0]] / 100.0);
}

#[test]
fn test_coincident_particles_contribute_nothing() {
    // Particles 0 and 1 sit on top of each other; only particle 2 pulls on them.
    let x = array![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
    for backend in available_backends() {
        let a = backend.acceleration(x.view(), &ForceLaw::unit()).expect("acceleration failed");
        assert!(a.iter().all(|v| v.is_finite()), "{} produced non-finite values: {:?}", backend.name(), a);
        assert_relative_eq!(a[[0, 0]], 1.0, max_relative = 1e-6);
        assert_relative_eq!(a[[1, 0]], 1.0, max_relative = 1e-6);
        assert_relative_eq!(a[[2, 0]], -2.0, max_relative = 1e-6);
    }
}

#[test]
fn test_vectorized_map_drops_self_term_nan() {
    let x = array![[0.5, 0.5, 0.5]];
    let a = VectorizedMap.acceleration(x.view(), &ForceLaw::unit()).expect("acceleration failed");
    assert_eq!(a, Array2::<f64>::zeros((1, 3)));
}

#[test]
fn test_shape_mismatch_is_rejected() {
    let planar = Array2::<f64>::zeros((4, 2));
    for backend in available_backends() {
        match backend.acceleration(planar.view(), &ForceLaw::unit()) {
            Err(NBodyError::ShapeMismatch { .. }) => (),
            other => panic!("{}: expected ShapeMismatch, got {:?}", backend.name(), other),
        }
    }
}

#[test]
fn test_mass_length_mismatch_is_rejected() {
    let x = random_positions(5, 1);
    let law = ForceLaw::new(0.0, Mass::PerParticle(vec![1.0; 4]));
    assert!(matches!(NaiveLoop.acceleration(x.view(), &law), Err(NBodyError::ShapeMismatch { .. })));
    assert!(matches!(Broadcast.acceleration(x.view(), &law), Err(NBodyError::ShapeMismatch { .. })));
}

#[test]
fn test_negative_softening_is_rejected() {
    let x = random_positions(5, 1);
    let law = ForceLaw::new(-1.0, Mass::Uniform(1.0));
    assert_eq!(NaiveLoop.acceleration(x.view(), &law), Err(NBodyError::InvalidSoftening(-1.0)));
}

#[test]
fn test_broadcast_refuses_oversized_tensor() {
    let x = Array2::zeros((7_000, 3));
    let result = Broadcast.acceleration(x.view(), &ForceLaw::unit());
    assert!(matches!(result, Err(NBodyError::CalculationError(_))));
}

#[test]
fn test_empty_system() {
    let empty = Array2::<f64>::zeros((0, 3));
    for backend in available_backends() {
        let a = backend.acceleration(empty.view(), &ForceLaw::unit()).expect("empty input failed");
        assert_eq!(a.dim(), (0, 3), "{}", backend.name());
    }
}

#[test]
fn test_backend_registry_round_trip() {
    for kind in BackendKind::ALL {
        assert_eq!(BackendKind::from_str(kind.name()), Ok(kind));
        assert_eq!(kind.to_string(), kind.name());
    }
}

#[test]
fn test_unknown_backend_lists_registered_names() {
    match BackendKind::from_str("barnes-hut") {
        Err(NBodyError::UnknownBackend { requested, registered }) => {
            assert_eq!(requested, "barnes-hut");
            assert_eq!(registered.len(), BackendKind::ALL.len());
            assert!(registered.contains(&"naive-loop"));
        }
        other => panic!("expected UnknownBackend, got {:?}", other),
    }
}

#[test]
fn test_warm_up_succeeds() {
    for backend in available_backends() {
        backend.warm_up().unwrap_or_else(|e| panic!("{} warm-up failed: {}", backend.name(), e));
    }
}
