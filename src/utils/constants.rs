use crate::acceleration::BackendKind;
use crate::utils;

/// Relative tolerance used when comparing backends. The GPU and vectorized-map
/// kernels run in f32, the others in f64.
pub const DEFAULT_RTOL: f64 = 1e-3;
/// Absolute tolerance used when comparing backends.
pub const DEFAULT_ATOL: f64 = 1e-5;

/// Number of timed runs per benchmark invocation.
pub const BENCHMARK_REPETITIONS: usize = 3;

/// Particle count used for the warm-up pass of backends with a first-call cost.
pub const WARM_UP_PARTICLES: usize = 64;

/// Largest (N, N, 3) f64 difference tensor the broadcast backend will allocate, in bytes.
pub const BROADCAST_MAX_BYTES: usize = 1 << 30;

/// Invocations per workgroup in the acceleration compute shader. Must match `@workgroup_size`.
pub const GPU_WORKGROUP_SIZE: u32 = 256;

/// Seed used when a session is not given one.
pub const DEFAULT_SEED: u64 = 7897;

pub const DEFAULT_SIMULATION_CONFIG: utils::SimulationConfig = utils::SimulationConfig {
    particle_count: 20_000,
    dt: 0.001,
    softening: 1e-3,
    seed: DEFAULT_SEED,
    backend: BackendKind::ParallelJit,
    max_rejection_rounds: 1_000,
};
