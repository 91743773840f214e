#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Evaluation step used until a caller picks another one
pub const DEFAULT_DELTA: f64 = 0.1;

pub(crate) fn check_delta(delta: f64) -> Result<()> {
    if delta > 0.0 && delta < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidDelta(delta))
    }
}

/// Number of samples taken along one parametric direction
pub fn sample_count(delta: f64) -> usize {
    // The epsilon keeps e.g. 1 / 0.1 from landing just below 10
    (1.0 / delta + 1e-9).floor() as usize + 1
}

/// Parameters `0, delta, 2·delta, …` up to and including 1.0 when it's a
/// multiple of `delta`
#[derive(Clone, Debug)]
pub struct Parameters {
    delta: f64,
    next: usize,
    count: usize,
}

impl Parameters {
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            next: 0,
            count: sample_count(delta),
        }
    }
}

impl Iterator for Parameters {
    type Item = f64;
    fn next(&mut self) -> Option<f64> {
        if self.next < self.count {
            let t = (self.next as f64 * self.delta).min(1.0);
            self.next += 1;
            Some(t)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.count - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Parameters {}

/// Evaluated points tagged with the revision of the geometry they came from
#[derive(Clone, Debug)]
pub(crate) struct SampleCache<T> {
    points: Vec<T>,
    revision: Option<u64>,
}

impl<T> SampleCache<T> {
    pub fn new() -> Self {
        Self {
            points: vec![],
            revision: None,
        }
    }

    /// Returns the cached points if they were built at `revision`
    pub fn get(&self, revision: u64) -> Option<&[T]> {
        (self.revision == Some(revision)).then_some(self.points.as_slice())
    }

    pub fn store(&mut self, revision: u64, points: Vec<T>) {
        self.points = points;
        self.revision = Some(revision);
    }

    /// The last stored points, whatever revision they belong to
    pub fn points(&self) -> &[T] {
        &self.points
    }
}

/// Maps `f` over `params`, in parallel when the `rayon` feature is enabled.
/// Output order always matches input order.
#[cfg(feature = "rayon")]
pub(crate) fn map_params<P, T, F>(params: Vec<P>, f: F) -> Vec<T>
where
    P: Send,
    T: Send,
    F: Fn(P) -> T + Sync + Send,
{
    params.into_par_iter().map(f).collect()
}

#[cfg(not(feature = "rayon"))]
pub(crate) fn map_params<P, T, F>(params: Vec<P>, f: F) -> Vec<T>
where
    P: Send,
    T: Send,
    F: Fn(P) -> T + Sync + Send,
{
    params.into_iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts() {
        assert_eq!(sample_count(0.1), 11);
        assert_eq!(sample_count(0.01), 101);
        assert_eq!(sample_count(0.25), 5);
        assert_eq!(sample_count(0.3), 4);
    }

    #[test]
    fn parameters_end_at_one() {
        let p: Vec<f64> = Parameters::new(0.25).collect();
        assert_eq!(p, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let p: Vec<f64> = Parameters::new(0.1).collect();
        assert_eq!(p.len(), 11);
        assert!(p.iter().all(|t| (0.0..=1.0).contains(t)));
        assert_eq!(*p.last().unwrap(), 1.0);
        assert_eq!(Parameters::new(0.3).len(), 4);
    }

    #[test]
    fn delta_bounds() {
        assert!(check_delta(0.5).is_ok());
        for bad in [0.0, 1.0, -0.1, f64::NAN] {
            assert_eq!(
                check_delta(bad).map_err(|e| e.is_configuration()),
                Err(true)
            );
        }
    }

    #[test]
    fn cache_tracks_revision() {
        let mut cache = SampleCache::new();
        assert!(cache.get(0).is_none());
        cache.store(3, vec![1, 2, 3]);
        assert_eq!(cache.get(3), Some(&[1, 2, 3][..]));
        assert!(cache.get(4).is_none());
    }

    #[test]
    fn map_keeps_order() {
        let out = map_params((0..1000).collect(), |i: i32| i * 2);
        assert!(out.iter().enumerate().all(|(i, v)| *v == 2 * i as i32));
    }
}
