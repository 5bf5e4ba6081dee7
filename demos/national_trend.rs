use faer::Mat;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use smallarea_posterior::{
    DesignMatrix, DrawMatrix, EffectGroup, PredictionInputs, PredictionOptions, Transform,
    predict, render_summary_table,
};

fn main() {
    env_logger::init();

    let years: Vec<i32> = (2005..=2020).collect();
    let centre = 2012.5;
    let design = DesignMatrix::new(
        vec!["(Intercept)".to_string(), "year_std".to_string()],
        Mat::from_fn(years.len(), 2, |i, j| {
            if j == 0 {
                1.0
            } else {
                (f64::from(years[i]) - centre) / 4.76
            }
        }),
    )
    .expect("design");

    // Draws columns are deliberately in the opposite order to the design.
    let mut rng = StdRng::seed_from_u64(2024);
    let rows: Vec<Vec<f64>> = (0..1_000)
        .map(|_| {
            let slope = 0.02f64.mul_add(rng.random::<f64>() - 0.5, -0.12);
            let intercept = 0.1f64.mul_add(rng.random::<f64>() - 0.5, -3.4);
            vec![slope, intercept]
        })
        .collect();
    let draws = DrawMatrix::from_rows(["year_std", "(Intercept)"], &rows).expect("draws");

    let inputs = PredictionInputs::new(EffectGroup::fixed(design, draws));
    let options = PredictionOptions {
        transform: Transform::Log,
        ..PredictionOptions::default()
    };
    let summary = predict(&inputs, &options).expect("prediction");

    let labels: Vec<String> = years.iter().map(ToString::to_string).collect();
    println!(
        "National under-five mortality rate (posterior mean and 95% interval)\n\n{}",
        render_summary_table(&labels, &summary)
    );
}
