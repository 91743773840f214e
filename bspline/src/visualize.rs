use nalgebra_glm as glm;

/// A rendering backend that curves and surfaces can draw themselves into.
///
/// This crate only calls these methods; implementations live with whatever
/// plotting or windowing library the application uses.
pub trait Visualizer<const D: usize> {
    /// Drops everything added since the last render
    fn clear(&mut self);

    /// Queues a point sequence for drawing
    fn add(&mut self, points: &[glm::TVec<f64, D>], label: &str, color: &str);

    fn render(&mut self);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every call, for checking what a `render` method sent
    #[derive(Default)]
    pub struct Recorder<const D: usize> {
        pub layers: Vec<(String, String, usize)>,
        pub renders: usize,
    }

    impl<const D: usize> Visualizer<D> for Recorder<D> {
        fn clear(&mut self) {
            self.layers.clear();
        }
        fn add(&mut self, points: &[glm::TVec<f64, D>], label: &str, color: &str) {
            self.layers
                .push((label.to_owned(), color.to_owned(), points.len()));
        }
        fn render(&mut self) {
            self.renders += 1;
        }
    }
}
