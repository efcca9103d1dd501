use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use cultivar_classifiers::evaluation::train_serving_model;
use cultivar_classifiers::inference::{CropFeatures, InferenceService};
use cultivar_classifiers::io::read_crop_csv;

pub fn run(data: &Path, input: Option<&Path>, seed: u64) -> Result<()> {
    let json = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read feature sample from stdin")?;
            buf
        }
    };
    // Validate the request before spending time on training.
    let features = CropFeatures::from_json(&json)?;

    let dataset = read_crop_csv(data)?;
    dataset.log_summary();

    let model = train_serving_model(&dataset, seed)?;
    let mut service = InferenceService::new();
    service.ready(model);

    let prediction = service.predict(&features)?;
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}
