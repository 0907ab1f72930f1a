use std::fs;
use std::path::{Path, PathBuf};

use burn::config::Config;
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::backend::Backend;

use crate::error::DemoError;
use crate::model::Mlp;
use crate::train::TrainingConfig;

/// Directory the demo job writes its artifacts to, relative to the working
/// directory.
pub const ARTIFACT_DIR: &str = "models";

pub const MODEL_STEM: &str = "mlp_demo";
pub const CONFIG_FILE: &str = "config.json";

/// Weights are stored at full precision.
pub type WeightsRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

const WEIGHTS_EXTENSION: &str = "mpk";

/// Path of the weights file inside `artifact_dir`.
pub fn weights_path(artifact_dir: &Path) -> PathBuf {
    artifact_dir.join(MODEL_STEM).with_extension(WEIGHTS_EXTENSION)
}

/// Persist a trained model
///
/// ### Params
///
/// * `model` - The model to save
/// * `config` - The config it was trained with, saved alongside
/// * `artifact_dir` - Target directory, created if missing
///
/// ### Returns
///
/// Path of the written weights file
pub fn save_model<B: Backend>(
    model: &Mlp<B>,
    config: &TrainingConfig,
    artifact_dir: &Path,
) -> Result<PathBuf, DemoError> {
    fs::create_dir_all(artifact_dir).map_err(|e| DemoError::io(artifact_dir, e))?;

    let config_path = artifact_dir.join(CONFIG_FILE);
    config
        .save(&config_path)
        .map_err(|e| DemoError::io(&config_path, e))?;

    let stem = artifact_dir.join(MODEL_STEM);
    model
        .clone()
        .save_file(stem.clone(), &WeightsRecorder::new())
        .map_err(|e| DemoError::Record {
            path: stem,
            reason: format!("{e:?}"),
        })?;

    Ok(weights_path(artifact_dir))
}

/// Load a model saved by [`save_model`]
///
/// ### Params
///
/// * `artifact_dir` - Directory holding `config.json` and the weights
/// * `device` - Device to load the parameters onto
///
/// ### Returns
///
/// The restored model
pub fn load_model<B: Backend>(artifact_dir: &Path, device: &B::Device) -> Result<Mlp<B>, DemoError> {
    let config_path = artifact_dir.join(CONFIG_FILE);
    let config = TrainingConfig::load(&config_path).map_err(|e| DemoError::ConfigFile {
        path: config_path.clone(),
        reason: format!("{e:?}"),
    })?;

    let stem = artifact_dir.join(MODEL_STEM);
    let record = WeightsRecorder::new()
        .load(stem.clone(), device)
        .map_err(|e| DemoError::Record {
            path: stem,
            reason: format!("{e:?}"),
        })?;

    Ok(config.model.init::<B>(device).load_record(record))
}

#[cfg(all(test, feature = "ndarray"))]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    #[test]
    fn missing_artifacts_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let device = NdArrayDevice::Cpu;

        let err = load_model::<NdArray>(dir.path(), &device).unwrap_err();
        assert!(matches!(err, DemoError::ConfigFile { .. }));
    }

    #[test]
    fn save_writes_config_and_weights() {
        let dir = tempfile::tempdir().unwrap();
        let device = NdArrayDevice::Cpu;
        let config = TrainingConfig::demo();
        let model: Mlp<NdArray> = config.model.init(&device);

        let weights = save_model(&model, &config, dir.path()).unwrap();

        assert_eq!(weights, dir.path().join("mlp_demo.mpk"));
        assert!(weights.exists());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }
}
