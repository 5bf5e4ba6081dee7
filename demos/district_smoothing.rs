use std::io;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use smallarea_posterior::{
    CovariateRecord, DrawMatrix, Factor, FixedDesignSpec, PosteriorDraws, PredictionInputs,
    PredictionOptions, RandomEffectSpec, build_fixed_design, build_random_design,
    merge_with_covariates, predict, write_prediction_csv,
};

const DISTRICTS: [(&str, &str); 4] = [
    ("Dhaka", "Gazipur"),
    ("Dhaka", "Narsingdi"),
    ("Khulna", "Jessore"),
    ("Khulna", "Satkhira"),
];
const CAUSES: [&str; 2] = ["Infection", "Injury"];

fn main() {
    env_logger::init();

    let records = covariates();
    let fixed_design = build_fixed_design(
        &records,
        FixedDesignSpec {
            division: true,
            cause: true,
            cause_by_year: true,
            ..FixedDesignSpec::default()
        },
    )
    .expect("fixed design");
    let district_design = build_random_design(&records, &[Factor::District]).expect("district");
    let cause_district_design =
        build_random_design(&records, &[Factor::Cause, Factor::District]).expect("cause-district");

    let mut rng = StdRng::seed_from_u64(7);
    let draws = 500;
    let posterior = PosteriorDraws::new()
        .with_effect("fixed", simulate(&mut rng, fixed_design.labels(), draws, -3.5, 0.3))
        .with_effect(
            "district_structured",
            simulate(&mut rng, district_design.labels(), draws, 0.0, 0.2),
        )
        .with_effect(
            "district_unstructured",
            simulate(&mut rng, district_design.labels(), draws, 0.0, 0.05),
        )
        .with_effect(
            "cause_district_rw",
            simulate(&mut rng, cause_district_design.labels(), draws, 0.0, 0.1),
        );

    let inputs = PredictionInputs::from_posterior(
        fixed_design,
        "fixed",
        &posterior,
        vec![
            RandomEffectSpec::new(
                "district",
                district_design,
                ["district_structured", "district_unstructured"],
            ),
            RandomEffectSpec::new(
                "cause_district",
                cause_district_design,
                ["cause_district_rw"],
            ),
        ],
    )
    .expect("inputs");

    let options = PredictionOptions::from_toml_str(
        r#"
        interval_level = 0.95
        transform = "log"
        parallel = true

        [retention]
        burn_in = 100
        thin = 2
        "#,
    )
    .expect("options");
    let summary = predict(&inputs, &options).expect("prediction");
    let rows = merge_with_covariates(&records, &summary).expect("merge");
    write_prediction_csv(io::stdout().lock(), &rows).expect("write csv");
}

fn covariates() -> Vec<CovariateRecord> {
    let mut records = Vec::new();
    for year in 2010..=2014 {
        for (division, district) in DISTRICTS {
            for cause in CAUSES {
                records.push(CovariateRecord {
                    year,
                    division: division.to_string(),
                    district: district.to_string(),
                    cause: cause.to_string(),
                });
            }
        }
    }
    records
}

fn simulate(rng: &mut StdRng, labels: &[String], draws: usize, centre: f64, spread: f64) -> DrawMatrix {
    let rows: Vec<Vec<f64>> = (0..draws)
        .map(|_| {
            labels
                .iter()
                .enumerate()
                .map(|(col, _)| {
                    let base = if col == 0 { centre } else { 0.0 };
                    spread.mul_add(2.0f64.mul_add(rng.random::<f64>(), -1.0), base)
                })
                .collect()
        })
        .collect();
    DrawMatrix::from_rows(labels.iter().cloned(), &rows).expect("draws")
}
