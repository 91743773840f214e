use std::time::SystemTime;

use bspline::{BsplineCurve, Visualizer};
use nalgebra_glm as glm;
use nalgebra_glm::DVec3;

/// Prints every layer as CSV rows on stdout
#[derive(Default)]
struct CsvPrinter {
    layers: Vec<(String, String, Vec<DVec3>)>,
}

impl Visualizer<3> for CsvPrinter {
    fn clear(&mut self) {
        self.layers.clear();
    }

    fn add(&mut self, points: &[glm::TVec<f64, 3>], label: &str, color: &str) {
        self.layers
            .push((label.to_owned(), color.to_owned(), points.to_vec()));
    }

    fn render(&mut self) {
        println!("layer,color,x,y,z");
        for (label, color, points) in &self.layers {
            for p in points {
                println!("{},{},{},{},{}", label, color, p.x, p.y, p.z);
            }
        }
    }
}

fn main() {
    let start = SystemTime::now();
    env_logger::init();

    let matches = clap::App::new("sample_curve")
        .about("Samples a clamped B-spline through a helix-shaped control polygon")
        .arg(
            clap::Arg::with_name("degree")
                .long("degree")
                .takes_value(true)
                .default_value("3"),
        )
        .arg(
            clap::Arg::with_name("points")
                .long("points")
                .help("Number of control points")
                .takes_value(true)
                .default_value("8"),
        )
        .arg(
            clap::Arg::with_name("delta")
                .long("delta")
                .help("Evaluation step, in (0, 1)")
                .takes_value(true)
                .default_value("0.05"),
        )
        .arg(
            clap::Arg::with_name("insert")
                .long("insert")
                .help("Knot to insert once before sampling")
                .takes_value(true),
        )
        .get_matches();

    let degree: usize = matches
        .value_of("degree")
        .and_then(|s| s.parse().ok())
        .expect("Could not parse degree");
    let count: usize = matches
        .value_of("points")
        .and_then(|s| s.parse().ok())
        .expect("Could not parse point count");
    let delta: f64 = matches
        .value_of("delta")
        .and_then(|s| s.parse().ok())
        .expect("Could not parse delta");

    let polygon = (0..count)
        .map(|i| {
            let t = i as f64 * 0.8;
            DVec3::new(t.cos(), t.sin(), i as f64 * 0.25)
        })
        .collect();
    let mut curve = BsplineCurve::clamped(degree, polygon)
        .and_then(|c| c.with_delta(delta))
        .expect("Could not build curve");

    if let Some(u) = matches.value_of("insert") {
        let u: f64 = u.parse().expect("Could not parse knot");
        match curve.insert_knot(u, 1).expect("Knot out of range") {
            bspline::Insertion::Inserted { .. } => {
                eprintln!("Inserted knot {}, knots are now {:?}", u, curve.knots().as_slice())
            }
            bspline::Insertion::Rejected { available, .. } => {
                eprintln!("Could not insert knot {} ({} more allowed)", u, available)
            }
        }
    }

    let mut printer = CsvPrinter::default();
    curve.render(&mut printer, "red", "black");

    let end = SystemTime::now();
    let elapsed = end.duration_since(start).expect("Time went backwards");
    eprintln!("Sampled in {:?}", elapsed);
}
