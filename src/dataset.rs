use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::mnist_loader;

pub const LABEL_CLASSES: usize = 10;

/// A grayscale digit, row-major, with every pixel in `[0.0, 1.0]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    rows: usize,
    cols: usize,
    pixels: Vec<f64>,
}

impl Image {
    pub fn new(rows: usize, cols: usize, pixels: Vec<f64>) -> Self {
        debug_assert_eq!(pixels.len(), rows * cols);
        Image { rows, cols, pixels }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn pixels(&self) -> &[f64] {
        &self.pixels
    }

    pub fn pixel(&self, row: usize, col: usize) -> f64 {
        self.pixels()[row * self.cols + col]
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }
}

/// One-hot encoded digit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Label([f64; LABEL_CLASSES]);

impl Label {
    /// Panics if `digit` is not in `0..10`.
    pub fn from_digit(digit: u8) -> Self {
        let mut label_vector = [0.0; LABEL_CLASSES];
        label_vector[digit as usize] = 1.0;
        Label(label_vector)
    }

    pub fn values(&self) -> &[f64; LABEL_CLASSES] {
        &self.0
    }

    pub fn digit(&self) -> usize {
        self.0
            .iter()
            .position(|&v| v == 1.0)
            .unwrap_or_default()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

/// The four decoded MNIST splits. `train_images[i]` pairs with
/// `train_labels[i]`, likewise for the test split.
#[derive(Clone, Debug)]
pub struct MnistData {
    pub train_images: Vec<Image>,
    pub train_labels: Vec<Label>,
    pub test_images: Vec<Image>,
    pub test_labels: Vec<Label>,
}

impl MnistData {
    pub fn into_parts(self) -> (Vec<Image>, Vec<Label>, Vec<Image>, Vec<Label>) {
        (
            self.train_images,
            self.train_labels,
            self.test_images,
            self.test_labels,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    TrainImages,
    TrainLabels,
    TestImages,
    TestLabels,
}

/// Where a single IDX file lives and how many records it must declare.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
    pub expected_count: u32,
}

impl DataSource {
    pub fn new<P: Into<PathBuf>>(path: P, expected_count: u32) -> Self {
        DataSource {
            path: path.into(),
            expected_count,
        }
    }
}

pub const TRAIN_IMAGES_FILE: &str = "train-images.idx3-ubyte";
pub const TRAIN_LABELS_FILE: &str = "train-labels.idx1-ubyte";
pub const TEST_IMAGES_FILE: &str = "t10k-images.idx3-ubyte";
pub const TEST_LABELS_FILE: &str = "t10k-labels.idx1-ubyte";

pub const TRAIN_COUNT: u32 = 60000;
pub const TEST_COUNT: u32 = 10000;

/// Input location and expected record count for every [`Role`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetConfig {
    train_images: DataSource,
    train_labels: DataSource,
    test_images: DataSource,
    test_labels: DataSource,
}

impl DatasetConfig {
    /// Canonical MNIST file names and counts under `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        DatasetConfig {
            train_images: DataSource::new(dir.join(TRAIN_IMAGES_FILE), TRAIN_COUNT),
            train_labels: DataSource::new(dir.join(TRAIN_LABELS_FILE), TRAIN_COUNT),
            test_images: DataSource::new(dir.join(TEST_IMAGES_FILE), TEST_COUNT),
            test_labels: DataSource::new(dir.join(TEST_LABELS_FILE), TEST_COUNT),
        }
    }

    pub fn with_source(mut self, role: Role, source: DataSource) -> Self {
        *self.get_mut(role) = source;
        self
    }

    pub fn get(&self, role: Role) -> &DataSource {
        match role {
            Role::TrainImages => &self.train_images,
            Role::TrainLabels => &self.train_labels,
            Role::TestImages => &self.test_images,
            Role::TestLabels => &self.test_labels,
        }
    }

    fn get_mut(&mut self, role: Role) -> &mut DataSource {
        match role {
            Role::TrainImages => &mut self.train_images,
            Role::TrainLabels => &mut self.train_labels,
            Role::TestImages => &mut self.test_images,
            Role::TestLabels => &mut self.test_labels,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig::from_dir("mnist")
    }
}

/// Decodes all four splits. The first failure aborts the load and nothing
/// decoded so far is returned.
pub fn load_data(config: &DatasetConfig) -> Result<MnistData> {
    let source = config.get(Role::TrainImages);
    let train_images = mnist_loader::read_images(&source.path, source.expected_count)?;
    let source = config.get(Role::TestImages);
    let test_images = mnist_loader::read_images(&source.path, source.expected_count)?;

    let source = config.get(Role::TrainLabels);
    let train_labels = mnist_loader::read_labels(&source.path, source.expected_count)?;
    let source = config.get(Role::TestLabels);
    let test_labels = mnist_loader::read_labels(&source.path, source.expected_count)?;

    info!(
        "loaded {} training and {} test digits",
        train_images.len(),
        test_images.len()
    );

    Ok(MnistData {
        train_images,
        train_labels,
        test_images,
        test_labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, IdxKind};
    use std::fs;

    fn write_images(path: &Path, count: u32, fill: u8) {
        let mut bytes = Vec::new();
        for field in [2051u32, count, 2, 2] {
            bytes.extend_from_slice(&field.to_be_bytes());
        }
        bytes.extend(std::iter::repeat(fill).take(count as usize * 4));
        fs::write(path, bytes).unwrap();
    }

    fn write_labels(path: &Path, digits: &[u8]) {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2049u32.to_be_bytes());
        bytes.extend_from_slice(&(digits.len() as u32).to_be_bytes());
        bytes.extend_from_slice(digits);
        fs::write(path, bytes).unwrap();
    }

    fn small_config(dir: &Path) -> DatasetConfig {
        DatasetConfig::from_dir(dir)
            .with_source(
                Role::TrainImages,
                DataSource::new(dir.join(TRAIN_IMAGES_FILE), 3),
            )
            .with_source(
                Role::TrainLabels,
                DataSource::new(dir.join(TRAIN_LABELS_FILE), 3),
            )
            .with_source(
                Role::TestImages,
                DataSource::new(dir.join(TEST_IMAGES_FILE), 2),
            )
            .with_source(
                Role::TestLabels,
                DataSource::new(dir.join(TEST_LABELS_FILE), 2),
            )
    }

    #[test]
    fn canonical_layout() {
        let config = DatasetConfig::default();

        let train = config.get(Role::TrainImages);
        assert_eq!(train.path, Path::new("mnist").join("train-images.idx3-ubyte"));
        assert_eq!(train.expected_count, 60000);
        assert_eq!(config.get(Role::TrainLabels).expected_count, 60000);
        assert_eq!(config.get(Role::TestImages).expected_count, 10000);
        assert_eq!(
            config.get(Role::TestLabels).path,
            Path::new("mnist").join("t10k-labels.idx1-ubyte")
        );
    }

    #[test]
    fn loads_all_splits() {
        let dir = tempfile::tempdir().unwrap();
        write_images(&dir.path().join(TRAIN_IMAGES_FILE), 3, 255);
        write_labels(&dir.path().join(TRAIN_LABELS_FILE), &[5, 0, 4]);
        write_images(&dir.path().join(TEST_IMAGES_FILE), 2, 0);
        write_labels(&dir.path().join(TEST_LABELS_FILE), &[7, 2]);

        let data = load_data(&small_config(dir.path())).unwrap();

        assert_eq!(data.train_images.len(), data.train_labels.len());
        assert_eq!(data.test_images.len(), data.test_labels.len());
        assert_eq!(data.train_images[0].pixels(), &[1.0; 4]);
        assert_eq!(data.test_images[1].pixels(), &[0.0; 4]);
        assert_eq!(data.train_labels[0].digit(), 5);
        assert_eq!(data.test_labels[1].digit(), 2);

        let (train_images, _, _, test_labels) = data.into_parts();
        assert_eq!(train_images.len(), 3);
        assert_eq!(test_labels.len(), 2);
    }

    #[test]
    fn aborts_on_first_error() {
        let dir = tempfile::tempdir().unwrap();
        write_images(&dir.path().join(TRAIN_IMAGES_FILE), 3, 1);
        write_labels(&dir.path().join(TRAIN_LABELS_FILE), &[5, 0, 4]);
        write_images(&dir.path().join(TEST_IMAGES_FILE), 2, 1);
        // Declares one label where two are expected.
        write_labels(&dir.path().join(TEST_LABELS_FILE), &[7]);

        let err = load_data(&small_config(dir.path())).unwrap_err();

        assert!(matches!(
            err,
            Error::CountMismatch {
                kind: IdxKind::Labels,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn missing_file_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_data(&small_config(dir.path())).unwrap_err();

        assert!(matches!(err, Error::Open { .. }));
    }

    #[test]
    fn label_display_matches_vector() {
        assert_eq!(Label::from_digit(3).to_string(), "[0 0 0 1 0 0 0 0 0 0]");
    }

    #[test]
    fn image_indexing_is_row_major() {
        let image = Image::new(2, 3, vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);

        assert_eq!(image.pixel(1, 0), 0.3);
        assert_eq!(image.pixel(0, 2), 0.2);
    }
}
