use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::vision::MnistItem;
use burn::prelude::*;
use burn::tensor::{Int, TensorData};

/// Side length of an MNIST image in pixels.
pub const IMAGE_SIZE: usize = 28;

const MAX_PIXEL: f32 = 255.0;

#[derive(Clone, Debug)]
pub struct MnistBatch<B: Backend> {
    pub images: Tensor<B, 3>,
    pub targets: Tensor<B, 1, Int>,
}

/// Stacks MNIST items into a batch.
///
/// Pixel intensities are scaled from `0..=255` to `[0, 1]`. No further
/// normalisation is applied.
#[derive(Clone, Debug, Default)]
pub struct MnistBatcher;

impl MnistBatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Batcher<B, MnistItem, MnistBatch<B>> for MnistBatcher {
    fn batch(&self, items: Vec<MnistItem>, device: &B::Device) -> MnistBatch<B> {
        let n = items.len();
        let mut pixels = Vec::with_capacity(n * IMAGE_SIZE * IMAGE_SIZE);
        let mut labels = Vec::with_capacity(n);

        for item in items {
            for row in item.image.iter() {
                pixels.extend(row.iter().map(|p| p / MAX_PIXEL));
            }
            labels.push(item.label as i64);
        }

        let images_data =
            TensorData::new(pixels, [n, IMAGE_SIZE, IMAGE_SIZE]).convert::<B::FloatElem>();
        let targets_data = TensorData::new(labels, [n]).convert::<B::IntElem>();

        MnistBatch {
            images: Tensor::from_data(images_data, device),
            targets: Tensor::from_data(targets_data, device),
        }
    }
}
