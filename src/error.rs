use thiserror::Error;

/// Errors raised by curve construction, evaluation and refinement.
/// Every variant is raised synchronously by the offending call; nothing is
/// recovered inside the kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("Invalid degree: {0}, the degree must be at least 1")]
    InvalidDegree(usize),

    #[error("Invalid knot vector: {0}")]
    InvalidKnotVector(String),

    #[error("Invalid control points: {0}")]
    InvalidControlPoints(String),

    #[error("Weight length mismatch: {0}")]
    WeightLengthMismatch(String),

    #[error("Parameter {parameter} is out of the domain [{start}, {end}]")]
    ParameterOutOfDomain { parameter: f64, start: f64, end: f64 },

    #[error("Knot multiplicity exceeded: inserting {knot} {times} time(s) over multiplicity {multiplicity} exceeds degree {degree}")]
    KnotMultiplicityExceeded {
        knot: f64,
        times: usize,
        multiplicity: usize,
        degree: usize,
    },

    #[error("Degenerate weight: homogeneous weight {0} must be positive")]
    DegenerateWeight(f64),

    #[error("Lossy conversion: weight {weight} at index {index} is not a unit weight")]
    LossyConversion { index: usize, weight: f64 },

    #[error("Invalid sampling step: {0}, the step must be in (0, 1]")]
    InvalidSamplingStep(f64),
}

pub type Result<T> = std::result::Result<T, CurveError>;
