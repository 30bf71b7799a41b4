//! Utility to inspect the model artifact and print its feature schema.

use credit_risk_api::classifier::ScorecardModel;
use credit_risk_api::config::Config;

/// Main entry point for the model inspection utility.
///
/// Loads the artifact named by `MODEL_PATH`, verifying `MODEL_SHA256` when set,
/// and lists the features it was trained on together with their terms.
fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let model = ScorecardModel::load(&config.model_path, config.model_sha256.as_deref())?;

    println!("Model: {}", model.model_name);
    println!("Path: {}", config.model_path.display());
    println!("SHA-256: {}", model.fingerprint());
    println!("Intercept: {}", model.intercept);
    println!();
    println!("Features ({}):", model.feature_names.len());

    for (position, name) in model.feature_names.iter().enumerate() {
        let term = if let Some(numeric) = model.numeric.get(name) {
            format!(
                "numeric weight={} center={} scale={}",
                numeric.weight, numeric.center, numeric.scale
            )
        } else if let Some(levels) = model.categorical.get(name) {
            format!("categorical ({} levels)", levels.len())
        } else {
            "unused".to_string()
        };
        println!("  {:>2}. {}: {}", position + 1, name, term);
    }

    Ok(())
}
