use std::path::Path;

use anyhow::Result;

use cultivar_classifiers::config::EvaluationConfig;
use cultivar_classifiers::evaluation::evaluate_all;
use cultivar_classifiers::io::read_crop_csv;
use cultivar_classifiers::report::{print_table, write_metrics_csv};

pub fn run(data: &Path, output: Option<&Path>, seed: u64) -> Result<()> {
    let dataset = read_crop_csv(data)?;
    dataset.log_summary();

    let config = EvaluationConfig {
        seed,
        ..EvaluationConfig::default()
    };
    let rows = evaluate_all(&dataset, &config)?;

    print_table(std::io::stdout().lock(), &rows)?;
    if let Some(path) = output {
        write_metrics_csv(path, &rows)?;
    }
    Ok(())
}
