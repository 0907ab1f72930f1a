use burn::data::dataset::Dataset;
use burn::data::dataset::vision::MnistDataset;

/// The two standard MNIST splits.
///
/// ### Fields
///
/// * `train` - The 60 000 training images
/// * `test` - The 10 000 test images, used for validation
pub struct MnistSplits {
    pub train: MnistDataset,
    pub test: MnistDataset,
}

impl MnistSplits {
    /// Load both splits
    ///
    /// The first call downloads the archives into burn's dataset cache; later
    /// calls reuse the cached copy.
    ///
    /// ### Returns
    ///
    /// The train and test splits
    pub fn load() -> Self {
        let train = MnistDataset::train();
        let test = MnistDataset::test();

        log::info!(
            "MNIST splits ready: {} train items, {} test items",
            train.len(),
            test.len()
        );

        Self { train, test }
    }
}
