use byteorder::BigEndian;
use byteorder::ReadBytesExt;
use flate2::read::GzDecoder;
use log::{debug, info, warn};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use crate::dataset::{Image, Label, LABEL_CLASSES};
use crate::error::{Error, IdxKind, Result};

const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

// Canonical MNIST digit size. Only used to flag unusual files, never enforced.
const MNIST_ROWS: u32 = 28;
const MNIST_COLS: u32 = 28;

/// Opens an IDX file for reading, decompressing it on the fly when the
/// path ends in `.gz`.
pub fn open_idx(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

pub fn read_images(path: &Path, expected_count: u32) -> Result<Vec<Image>> {
    info!("Image file: {}", path.display());
    let mut reader = open_idx(path)?;
    decode_images(&mut reader, expected_count)
}

pub fn read_labels(path: &Path, expected_count: u32) -> Result<Vec<Label>> {
    info!("Label file: {}", path.display());
    let mut reader = open_idx(path)?;
    decode_labels(&mut reader, expected_count)
}

/// Decodes an IDX3 image stream: a 16 byte big-endian header
/// `[magic][count][rows][cols]` followed by `count * rows * cols` pixel bytes.
///
/// Pixels are normalized from `0..=255` to `0.0..=1.0`. The declared
/// dimensions are trusted; they only determine the record length.
pub fn decode_images<R: Read>(reader: &mut R, expected_count: u32) -> Result<Vec<Image>> {
    let kind = IdxKind::Images;
    let header = read_header::<_, IMAGE_HEADER_LEN>(reader, kind)?;
    let mut r = &header[..];

    let magic_number = r.read_u32::<BigEndian>()?;
    let num_images = r.read_u32::<BigEndian>()?;
    let num_rows = r.read_u32::<BigEndian>()?;
    let num_cols = r.read_u32::<BigEndian>()?;

    info!(
        "Magic number: {} Images: {} Rows: {} Columns: {}",
        magic_number, num_images, num_rows, num_cols
    );

    check_header(kind, magic_number, num_images, expected_count)?;

    if num_rows != MNIST_ROWS || num_cols != MNIST_COLS {
        warn!(
            "image dimensions {}x{} differ from the usual {}x{}, trusting the header",
            num_rows, num_cols, MNIST_ROWS, MNIST_COLS
        );
    }

    // Sized from the header but only grown as bytes arrive, so a lying header
    // ends in `TruncatedInput` rather than a huge allocation.
    let image_len = num_rows as u64 * num_cols as u64;
    let payload_len = image_len.saturating_mul(num_images as u64);

    let mut images = Vec::with_capacity(num_images as usize);
    let mut raw = Vec::new();
    let mut consumed = 0u64;
    for _ in 0..num_images {
        raw.clear();
        let got = reader.by_ref().take(image_len).read_to_end(&mut raw)? as u64;
        consumed += got;
        if got < image_len {
            return Err(Error::TruncatedInput {
                kind,
                expected: payload_len,
                got: consumed,
            });
        }

        let pixels = raw.iter().map(|&byte| byte as f64 / 255.0).collect();
        images.push(Image::new(num_rows as usize, num_cols as usize, pixels));
    }

    debug!("decoded {} images of {} pixels", images.len(), image_len);
    Ok(images)
}

/// Decodes an IDX1 label stream: an 8 byte big-endian header
/// `[magic][count]` followed by one digit byte per label. Each digit becomes a
/// one-hot vector of length 10. A byte of 10 or more is rejected with
/// [`Error::LabelOutOfRange`].
pub fn decode_labels<R: Read>(reader: &mut R, expected_count: u32) -> Result<Vec<Label>> {
    let kind = IdxKind::Labels;
    let header = read_header::<_, LABEL_HEADER_LEN>(reader, kind)?;
    let mut r = &header[..];

    let magic_number = r.read_u32::<BigEndian>()?;
    let num_labels = r.read_u32::<BigEndian>()?;

    info!("Magic number: {} Labels: {}", magic_number, num_labels);

    check_header(kind, magic_number, num_labels, expected_count)?;

    let mut raw = Vec::new();
    let got = reader.by_ref().take(num_labels as u64).read_to_end(&mut raw)? as u64;
    if got < num_labels as u64 {
        return Err(Error::TruncatedInput {
            kind,
            expected: num_labels as u64,
            got,
        });
    }

    let labels = raw
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if (value as usize) < LABEL_CLASSES {
                Ok(Label::from_digit(value))
            } else {
                Err(Error::LabelOutOfRange { index, value })
            }
        })
        .collect::<Result<Vec<Label>>>()?;

    debug!("decoded {} labels", labels.len());
    Ok(labels)
}

fn check_header(kind: IdxKind, magic_number: u32, count: u32, expected_count: u32) -> Result<()> {
    if magic_number != kind.magic_number() {
        return Err(Error::Format {
            kind,
            expected: kind.magic_number(),
            found: magic_number,
        });
    }
    if count != expected_count {
        return Err(Error::CountMismatch {
            kind,
            expected: expected_count,
            found: count,
        });
    }
    Ok(())
}

fn read_header<R: Read, const N: usize>(reader: &mut R, kind: IdxKind) -> Result<[u8; N]> {
    let mut raw = Vec::with_capacity(N);
    let got = reader.by_ref().take(N as u64).read_to_end(&mut raw)?;
    let header: [u8; N] = raw.try_into().map_err(|_| Error::TruncatedInput {
        kind,
        expected: N as u64,
        got: got as u64,
    })?;
    Ok(header)
}
