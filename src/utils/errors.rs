use std::fmt;
use std::error::Error;

/// Represents errors that can occur while sampling, evaluating or integrating an N-body system.
#[derive(Debug, Clone, PartialEq)]
pub enum NBodyError {
    /// An array did not have the expected shape, e.g. positions that are not (N, 3).
    ShapeMismatch {
        expected: String,
        found: String,
    },
    /// Indicates a particle count of zero where at least one particle is required.
    InvalidParticleCount(usize),
    /// Indicates a time step that is zero, NaN or infinite.
    InvalidTimeStep(f64),
    /// Indicates a negative or non-finite softening length.
    InvalidSoftening(f64),
    /// The rejection sampler ran out of rounds before collecting enough samples.
    SamplingExhausted {
        accepted: usize,
        requested: usize,
        rounds: usize,
    },
    /// No backend is registered under the requested name.
    UnknownBackend {
        requested: String,
        registered: Vec<&'static str>,
    },
    /// The backend exists but cannot run here (feature disabled, no GPU adapter, ...).
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },
    /// Two backends disagreed beyond the tolerance band.
    BackendMismatch {
        backend: &'static str,
        index: usize,
        axis: usize,
        actual: f64,
        expected: f64,
        max_abs_delta: f64,
    },
    /// A device-side failure (buffer mapping, device loss, ...).
    Gpu(String),
    /// A general error for calculations that produce invalid results.
    CalculationError(String),
}

impl NBodyError {
    /// Short name of the error kind, printed by the benchmark binary before the message.
    pub fn kind(&self) -> &'static str {
        match self {
            NBodyError::ShapeMismatch { .. } => "ShapeMismatch",
            NBodyError::InvalidParticleCount(_) => "InvalidParticleCount",
            NBodyError::InvalidTimeStep(_) => "InvalidTimeStep",
            NBodyError::InvalidSoftening(_) => "InvalidSoftening",
            NBodyError::SamplingExhausted { .. } => "SamplingExhausted",
            NBodyError::UnknownBackend { .. } => "UnknownBackend",
            NBodyError::BackendUnavailable { .. } => "BackendUnavailable",
            NBodyError::BackendMismatch { .. } => "BackendMismatch",
            NBodyError::Gpu(_) => "GpuError",
            NBodyError::CalculationError(_) => "CalculationError",
        }
    }
}

impl fmt::Display for NBodyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NBodyError::ShapeMismatch { expected, found } => {
                write!(f, "Shape mismatch: expected {}, found {}", expected, found)
            }
            NBodyError::InvalidParticleCount(n) => write!(f, "Invalid particle count: {}", n),
            NBodyError::InvalidTimeStep(dt) => write!(f, "Invalid time step: {}", dt),
            NBodyError::InvalidSoftening(eps) => write!(f, "Invalid softening length: {}", eps),
            NBodyError::SamplingExhausted { accepted, requested, rounds } => write!(
                f,
                "Rejection sampling exhausted after {} rounds ({} of {} samples accepted)",
                rounds, accepted, requested
            ),
            NBodyError::UnknownBackend { requested, registered } => write!(
                f,
                "{} not in backends: [{}]",
                requested,
                registered.join(", ")
            ),
            NBodyError::BackendUnavailable { backend, reason } => {
                write!(f, "Backend {} is unavailable: {}", backend, reason)
            }
            NBodyError::BackendMismatch { backend, index, axis, actual, expected, max_abs_delta } => write!(
                f,
                "Backend {} disagrees with the reference at particle {} axis {}: {} vs {} (max abs delta {:e})",
                backend, index, axis, actual, expected, max_abs_delta
            ),
            NBodyError::Gpu(msg) => write!(f, "GPU error: {}", msg),
            NBodyError::CalculationError(msg) => write!(f, "Calculation error: {}", msg),
        }
    }
}

impl Error for NBodyError {}

impl From<ndarray::ShapeError> for NBodyError {
    fn from(err: ndarray::ShapeError) -> Self {
        NBodyError::CalculationError(err.to_string())
    }
}
