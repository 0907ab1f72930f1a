use std::path::Path;

use burn::config::Config;
use burn::data::dataloader::DataLoaderBuilder;
use burn::data::dataset::Dataset;
use burn::data::dataset::vision::MnistItem;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::train::{ClassificationOutput, TrainOutput, TrainStep, ValidStep};

use crate::batch::*;
use crate::checkpoint::{ARTIFACT_DIR, save_model};
use crate::dataset::*;
use crate::error::DemoError;
use crate::metrics::*;
use crate::model::*;

/// Hyper-parameters of a training run
///
/// ### Fields
///
/// * `model` - Topology of the MLP
/// * `optimizer` - Adam settings
/// * `num_epochs` - Number of passes over the training split
/// * `batch_size` - Items per batch, for training and validation
/// * `num_workers` - Data loader worker threads
/// * `seed` - Seeds the backend RNG before weight init and the training
///   loader's shuffle
/// * `learning_rate` - Adam learning rate
#[derive(Config)]
pub struct TrainingConfig {
    pub model: MlpConfig,
    pub optimizer: AdamConfig,
    #[config(default = 5)]
    pub num_epochs: usize,
    #[config(default = 64)]
    pub batch_size: usize,
    #[config(default = 1)]
    pub num_workers: usize,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = 1.0e-3)]
    pub learning_rate: f64,
}

impl TrainingConfig {
    /// The settings the demo job runs with.
    pub fn demo() -> Self {
        Self::new(MlpConfig::new(), AdamConfig::new())
    }

    pub fn validate(&self) -> Result<(), DemoError> {
        if self.batch_size == 0 {
            return Err(DemoError::InvalidConfig(
                "batch_size must be at least 1".into(),
            ));
        }
        if self.num_epochs == 0 {
            return Err(DemoError::InvalidConfig(
                "num_epochs must be at least 1".into(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(DemoError::InvalidConfig(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

impl<B: AutodiffBackend> TrainStep<MnistBatch<B>, ClassificationOutput<B>> for Mlp<B> {
    fn step(&self, batch: MnistBatch<B>) -> TrainOutput<ClassificationOutput<B>> {
        let item = self.forward_classification(batch.images, batch.targets);

        TrainOutput::new(self, item.loss.backward(), item)
    }
}

impl<B: Backend> ValidStep<MnistBatch<B>, ClassificationOutput<B>> for Mlp<B> {
    fn step(&self, batch: MnistBatch<B>) -> ClassificationOutput<B> {
        self.forward_classification(batch.images, batch.targets)
    }
}

/// Outcome of [`train`]
///
/// ### Fields
///
/// * `model` - The trained model, still on the autodiff backend
/// * `history` - One entry per epoch, in order
pub struct TrainingReport<B: AutodiffBackend> {
    pub model: Mlp<B>,
    pub history: Vec<EpochMetrics>,
}

/// Train the MLP
///
/// Every epoch is a training pass with one Adam step per batch followed by an
/// evaluation pass over `valid_set` without gradients. The epoch line is
/// printed to stdout as soon as the epoch ends.
///
/// ### Params
///
/// * `config` - The training configuration
/// * `train_set` - Items to fit, shuffled every epoch
/// * `valid_set` - Items to evaluate on, in order
/// * `device` - The device to train on
///
/// ### Returns
///
/// The trained model and the per-epoch metrics
pub fn train<B: AutodiffBackend>(
    config: &TrainingConfig,
    train_set: impl Dataset<MnistItem> + 'static,
    valid_set: impl Dataset<MnistItem> + 'static,
    device: &B::Device,
) -> Result<TrainingReport<B>, DemoError> {
    config.validate()?;
    if train_set.is_empty() {
        return Err(DemoError::EmptyDataset("training"));
    }
    if valid_set.is_empty() {
        return Err(DemoError::EmptyDataset("validation"));
    }

    let dataloader_train = DataLoaderBuilder::new(MnistBatcher::new())
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .set_device(device.clone())
        .build(train_set);

    let dataloader_valid = DataLoaderBuilder::new(MnistBatcher::new())
        .batch_size(config.batch_size)
        .num_workers(config.num_workers)
        .set_device(device.clone())
        .build(valid_set);

    B::seed(config.seed);
    let mut model: Mlp<B> = config.model.init(device);
    let mut optim = config.optimizer.init();
    let mut history = Vec::with_capacity(config.num_epochs);

    for epoch in 0..config.num_epochs {
        let mut train_stats = PassStats::default();
        for batch in dataloader_train.iter() {
            let output = TrainStep::step(&model, batch);
            train_stats.update(&output.item);
            model = optim.step(config.learning_rate, model, output.grads);
        }

        // inner backend: no autodiff graph, batch-norm uses running stats
        let model_valid = model.valid();
        let mut valid_stats = PassStats::default();
        for batch in dataloader_valid.iter() {
            let output = ValidStep::step(&model_valid, batch);
            valid_stats.update(&output);
        }

        log::debug!(
            "epoch {epoch}: {} train batches, {} validation batches",
            train_stats.num_batches(),
            valid_stats.num_batches()
        );

        let metrics = EpochMetrics::new(epoch, &train_stats, &valid_stats);
        println!("{metrics}");
        history.push(metrics);
    }

    Ok(TrainingReport { model, history })
}

/// Run the demo job end to end on `device`
///
/// Loads both MNIST splits, trains with `config` and writes the artifacts
/// into [`ARTIFACT_DIR`].
pub fn run<B: AutodiffBackend>(
    config: &TrainingConfig,
    device: B::Device,
) -> Result<Vec<EpochMetrics>, DemoError> {
    log::info!("training config: {config}");

    let splits = MnistSplits::load();
    println!("Datasets loaded");

    let report = train::<B>(config, splits.train, splits.test, &device)?;

    let weights = save_model(&report.model, config, Path::new(ARTIFACT_DIR))?;
    log::info!("model weights written to {}", weights.display());

    Ok(report.history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_config_matches_the_job() {
        let config = TrainingConfig::demo();

        assert_eq!(config.num_epochs, 5);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.learning_rate, 1.0e-3);
        assert_eq!(config.model.input_size, 784);
        assert_eq!(config.model.hidden_size, 16);
        assert_eq!(config.model.num_classes, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_configs() {
        let zero_batch = TrainingConfig::demo().with_batch_size(0);
        assert!(matches!(
            zero_batch.validate(),
            Err(DemoError::InvalidConfig(_))
        ));

        let zero_epochs = TrainingConfig::demo().with_num_epochs(0);
        assert!(zero_epochs.validate().is_err());

        let bad_lr = TrainingConfig::demo().with_learning_rate(f64::NAN);
        assert!(bad_lr.validate().is_err());

        let negative_lr = TrainingConfig::demo().with_learning_rate(-0.1);
        assert!(negative_lr.validate().is_err());
    }

    #[test]
    fn config_renders_as_json_for_the_run_log() {
        let rendered = TrainingConfig::demo().with_num_epochs(7).to_string();

        assert!(rendered.contains("\"num_epochs\": 7"));
        assert!(rendered.contains("\"optimizer\""));
    }
}
