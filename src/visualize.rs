use rand::seq::index;
use rand::Rng;

use crate::dataset::Image;

fn glyph(pixel: f64) -> &'static str {
    match pixel {
        p if p > 0.7 => "██",
        p if p > 0.4 => "▓▓",
        p if p > 0.1 => "░░",
        _ => "  ",
    }
}

/// Renders a digit as text, two glyphs per pixel so the grid keeps its aspect ratio.
pub fn render_digit(image: &Image) -> String {
    let mut out = String::with_capacity(image.len() * 6 + image.rows());
    for row in 0..image.rows() {
        for col in 0..image.cols() {
            out.push_str(glyph(image.pixel(row, col)));
        }
        out.push('\n');
    }
    out
}

fn print_digit(number: usize, image: &Image) {
    let separator = "-".repeat(image.cols() * 2);
    println!("\nDigit #{}:", number);
    println!("{}", separator);
    print!("{}", render_digit(image));
    println!("{}", separator);
}

/// Prints the first `count` digits, or all of them if there are fewer.
pub fn print_digits(images: &[Image], count: usize) {
    for (i, image) in images.iter().take(count).enumerate() {
        print_digit(i + 1, image);
    }
}

/// Prints the digits at `indices`, numbered by their position in `images`.
pub fn print_samples(images: &[Image], indices: &[usize]) {
    for &i in indices {
        if let Some(image) = images.get(i) {
            print_digit(i + 1, image);
        }
    }
}

/// Picks up to `count` distinct indices below `len`.
pub fn sample_indices<R: Rng + ?Sized>(len: usize, count: usize, rng: &mut R) -> Vec<usize> {
    index::sample(rng, len, count.min(len)).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn glyph_thresholds() {
        assert_eq!(glyph(1.0), "██");
        assert_eq!(glyph(0.71), "██");
        assert_eq!(glyph(0.7), "▓▓");
        assert_eq!(glyph(0.41), "▓▓");
        assert_eq!(glyph(0.4), "░░");
        assert_eq!(glyph(0.11), "░░");
        assert_eq!(glyph(0.1), "  ");
        assert_eq!(glyph(0.0), "  ");
    }

    #[test]
    fn renders_grid_rows() {
        let image = Image::new(2, 2, vec![1.0, 0.0, 0.5, 0.2]);

        assert_eq!(render_digit(&image), "██  \n▓▓░░\n");
    }

    #[test]
    fn renders_full_digit() {
        let image = Image::new(28, 28, vec![0.0; 784]);

        let rendered = render_digit(&image);

        assert_eq!(rendered.lines().count(), 28);
        assert!(rendered.lines().all(|line| line.len() == 56));
    }

    #[test]
    fn samples_distinct_indices_in_range() {
        let mut rng = StdRng::seed_from_u64(7);

        let mut indices = sample_indices(100, 10, &mut rng);

        assert_eq!(indices.len(), 10);
        assert!(indices.iter().all(|&i| i < 100));
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 10);
    }

    #[test]
    fn sample_is_clamped_to_len() {
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(sample_indices(3, 10, &mut rng).len(), 3);
        assert!(sample_indices(0, 5, &mut rng).is_empty());
    }
}
