use thiserror::Error;

/// Parametric direction of a surface (curves only have `U`)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    U,
    V,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::U => write!(f, "u"),
            Direction::V => write!(f, "v"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KnotVectorError {
    #[error("knot vector is empty")]
    Empty,

    #[error("knot {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("all knots are equal, so the vector cannot be normalized")]
    ZeroRange,

    #[error("expected {expected} knots (control points + degree + 1), got {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("knot {index} is smaller than the knot before it")]
    Decreasing { index: usize },

    #[error("evaluation domain [knot[{first}], knot[{last}]] is empty")]
    EmptyDomain { first: usize, last: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("points must have 2 or 3 coordinates, not {0}")]
    UnsupportedDimension(usize),

    #[error("control point {index} has {found} coordinates, expected {expected}")]
    PointDimension {
        index: usize,
        found: usize,
        expected: usize,
    },

    #[error(
        "degree {degree} in the {direction} direction needs at least {required} \
         control points, got {found}"
    )]
    TooFewControlPoints {
        direction: Direction,
        degree: usize,
        required: usize,
        found: usize,
    },

    #[error("a {size_u}x{size_v} control grid needs {expected} points, got {found}")]
    GridSize {
        size_u: usize,
        size_v: usize,
        expected: usize,
        found: usize,
    },

    #[error("expected {expected} control points, got {found}")]
    ControlPointCount { expected: usize, found: usize },

    #[error("invalid knot vector in the {direction} direction: {source}")]
    InvalidKnotVector {
        direction: Direction,
        source: KnotVectorError,
    },

    #[error("evaluation delta must lie strictly between 0 and 1, got {0}")]
    InvalidDelta(f64),

    #[error("parameter {name} = {value} is outside [0, 1]")]
    ParameterOutOfRange { name: Direction, value: f64 },

    #[error("parameter list is empty")]
    EmptyParameterList,

    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,
}

impl Error {
    /// The instance was asked to take on an invalid configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedDimension(..)
                | Error::PointDimension { .. }
                | Error::TooFewControlPoints { .. }
                | Error::GridSize { .. }
                | Error::ControlPointCount { .. }
                | Error::InvalidKnotVector { .. }
                | Error::InvalidDelta(..)
        )
    }

    /// An evaluation was requested outside the parameter domain
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Error::ParameterOutOfRange { .. } | Error::EmptyParameterList
        )
    }

    /// A near-singular evaluation produced a vector that can't be normalized
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Error::DegenerateVector)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Checks that a parameter lies in the closed unit interval
pub(crate) fn check_param(name: Direction, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::ParameterOutOfRange { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_param_bounds() {
        assert!(check_param(Direction::U, 0.0).is_ok());
        assert!(check_param(Direction::U, 1.0).is_ok());
        let e = check_param(Direction::V, 1.5).unwrap_err();
        assert!(e.is_domain());
        assert!(!e.is_configuration());
        assert!(check_param(Direction::U, f64::NAN).is_err());
    }

    #[test]
    fn messages_name_direction() {
        let e = Error::InvalidKnotVector {
            direction: Direction::V,
            source: KnotVectorError::Decreasing { index: 3 },
        };
        assert_eq!(
            e.to_string(),
            "invalid knot vector in the v direction: knot 3 is smaller than the knot before it"
        );
        assert!(e.is_configuration());
        assert!(Error::DegenerateVector.is_degenerate());
    }
}
