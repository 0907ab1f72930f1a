use std::fmt;

use burn::tensor::{ElementConversion, Int, Tensor, backend::Backend};
use burn::train::ClassificationOutput;

/// Arithmetic mean over a stream of per-batch values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of all values seen so far; `0.0` before the first update.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Fraction of rows in `logits` whose argmax equals the target.
///
/// ### Params
///
/// * `logits` - Model output [batch_size, num_classes]
/// * `targets` - Class indices [batch_size]
///
/// ### Returns
///
/// Accuracy in `[0, 1]`; `0.0` for an empty batch.
pub fn batch_accuracy<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> f64 {
    let batch_size = targets.dims()[0];
    if batch_size == 0 {
        return 0.0;
    }

    let predictions: Tensor<B, 1, Int> = logits.argmax(1).squeeze(1);
    let correct = predictions
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<f64>();

    correct / batch_size as f64
}

/// Loss and accuracy of a single batch, accumulated per epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassStats {
    loss: RunningMean,
    accuracy: RunningMean,
}

impl PassStats {
    pub fn update<B: Backend>(&mut self, output: &ClassificationOutput<B>) {
        let loss = output.loss.clone().into_scalar().elem::<f64>();
        let accuracy = batch_accuracy(output.output.clone(), output.targets.clone());

        self.loss.update(loss);
        self.accuracy.update(accuracy);
    }

    pub fn loss(&self) -> f64 {
        self.loss.mean()
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy.mean()
    }

    pub fn num_batches(&self) -> usize {
        self.loss.count()
    }
}

/// Averaged metrics of one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub valid_loss: f64,
    pub valid_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train: &PassStats, valid: &PassStats) -> Self {
        Self {
            epoch,
            train_loss: train.loss(),
            train_accuracy: train.accuracy(),
            valid_loss: valid.loss(),
            valid_accuracy: valid.accuracy(),
        }
    }
}

impl fmt::Display for EpochMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Epoch: {} | Train Loss: {:.3} | Train accuracy: {:.3} | Validation loss: {:.3} | Validation accuracy: {:.3}",
            self.epoch, self.train_loss, self.train_accuracy, self.valid_loss, self.valid_accuracy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_mean_of_nothing_is_zero() {
        let mean = RunningMean::new();
        assert_eq!(mean.count(), 0);
        assert_eq!(mean.mean(), 0.0);
    }

    #[test]
    fn running_mean_weights_every_update_equally() {
        let mut mean = RunningMean::new();
        for v in [0.5, 1.0, 0.0, 0.5] {
            mean.update(v);
        }
        assert_eq!(mean.count(), 4);
        assert!((mean.mean() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn epoch_line_uses_three_decimals() {
        let metrics = EpochMetrics {
            epoch: 2,
            train_loss: 0.123_456,
            train_accuracy: 0.9,
            valid_loss: 1.0,
            valid_accuracy: 0.987_65,
        };

        assert_eq!(
            metrics.to_string(),
            "Epoch: 2 | Train Loss: 0.123 | Train accuracy: 0.900 | Validation loss: 1.000 | Validation accuracy: 0.988"
        );
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn accuracy_counts_matching_argmax() {
        use burn::backend::NdArray;
        use burn::backend::ndarray::NdArrayDevice;

        let device = NdArrayDevice::Cpu;
        let logits = Tensor::<NdArray, 2>::from_floats(
            [[0.9, 0.1, 0.0], [0.2, 0.7, 0.1], [0.1, 0.2, 0.7], [0.6, 0.3, 0.1]],
            &device,
        );
        let targets = Tensor::<NdArray, 1, Int>::from_ints([0, 1, 0, 0], &device);

        let accuracy = batch_accuracy(logits, targets);
        assert!((accuracy - 0.75).abs() < 1e-12);
    }
}
