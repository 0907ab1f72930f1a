use burn::config::Config;
use burn::module::Module;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::nn::{BatchNorm, BatchNormConfig, Linear, LinearConfig, Relu};
use burn::tensor::{Int, Tensor, backend::Backend};
use burn::train::ClassificationOutput;

/// One hidden stage of the MLP: linear, ReLU, then batch-norm.
#[derive(Module, Debug)]
pub struct HiddenBlock<B: Backend> {
    linear: Linear<B>,
    activation: Relu,
    norm: BatchNorm<B, 0>,
}

impl<B: Backend> HiddenBlock<B> {
    fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear.forward(input);
        let x = self.activation.forward(x);
        self.norm.forward(x)
    }
}

/// Feed-forward digit classifier.
///
/// Images are flattened, passed through `num_hidden` hidden blocks and
/// projected onto the class logits.
///
/// ### Fields
///
/// * `hidden` - The hidden blocks, applied in order
/// * `output` - The final projection onto the classes
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    hidden: Vec<HiddenBlock<B>>,
    output: Linear<B>,
}

/// Config for the MLP
///
/// ### Fields
///
/// * `input_size` - Number of pixels per flattened image
/// * `hidden_size` - Width of every hidden layer
/// * `num_hidden` - Number of hidden blocks
/// * `num_classes` - Number of output classes
#[derive(Config, Debug)]
pub struct MlpConfig {
    #[config(default = 784)]
    pub input_size: usize,
    #[config(default = 16)]
    pub hidden_size: usize,
    #[config(default = 3)]
    pub num_hidden: usize,
    #[config(default = 10)]
    pub num_classes: usize,
}

impl MlpConfig {
    /// Initialise the model
    ///
    /// ### Params
    ///
    /// * `device` - The device on which to run the model
    ///
    /// ### Returns
    ///
    /// Initialised model
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let hidden = (0..self.num_hidden)
            .map(|idx| {
                let d_input = if idx == 0 {
                    self.input_size
                } else {
                    self.hidden_size
                };
                HiddenBlock {
                    linear: LinearConfig::new(d_input, self.hidden_size).init(device),
                    activation: Relu::new(),
                    norm: BatchNormConfig::new(self.hidden_size).init(device),
                }
            })
            .collect();

        let d_last = if self.num_hidden == 0 {
            self.input_size
        } else {
            self.hidden_size
        };

        Mlp {
            hidden,
            output: LinearConfig::new(d_last, self.num_classes).init(device),
        }
    }
}

impl<B: Backend> Mlp<B> {
    /// Forward pass
    ///
    /// ### Params
    ///
    /// * `images` - Images [batch_size, height, width]
    ///
    /// ### Returns
    ///
    /// Class logits [batch_size, num_classes]
    pub fn forward(&self, images: Tensor<B, 3>) -> Tensor<B, 2> {
        let mut x: Tensor<B, 2> = images.flatten(1, 2);

        for block in self.hidden.iter() {
            x = block.forward(x);
        }

        self.output.forward(x)
    }

    /// Forward pass plus the mean cross-entropy loss against `targets`.
    pub fn forward_classification(
        &self,
        images: Tensor<B, 3>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let output = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput::new(loss, output, targets)
    }
}

#[cfg(all(test, feature = "ndarray"))]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    #[test]
    fn default_topology() {
        let device = NdArrayDevice::Cpu;
        let model: Mlp<TestBackend> = MlpConfig::new().init(&device);

        assert_eq!(model.hidden.len(), 3);

        // 784*16+16, 2 * (16*16+16), 16*10+10, then per batch-norm:
        // gamma, beta, running mean and running var (4 * 16) for 3 blocks
        assert_eq!(model.num_params(), 12_560 + 544 + 170 + 192);
    }

    #[test]
    fn forward_produces_one_logit_row_per_image() {
        let device = NdArrayDevice::Cpu;
        let model: Mlp<TestBackend> = MlpConfig::new().init(&device);
        let images = Tensor::<TestBackend, 3>::random([4, 28, 28], Distribution::Default, &device);

        let logits = model.forward(images);
        assert_eq!(logits.dims(), [4, 10]);
    }

    #[test]
    fn classification_loss_is_finite_and_non_negative() {
        let device = NdArrayDevice::Cpu;
        let model: Mlp<TestBackend> = MlpConfig::new().init(&device);
        let images = Tensor::<TestBackend, 3>::random([8, 28, 28], Distribution::Default, &device);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 1, 2, 3, 4, 5, 6, 7], &device);

        let output = model.forward_classification(images, targets);
        let loss: f32 = output.loss.into_scalar();

        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }
}
