//! Raster preview artifacts.
//!
//! Both sinks interpret a [`RasterBlock`] as 8-bit grayscale samples in
//! row-major order, which is what windowed single-band reads produce.

use std::io::{self, Write};

use geofetch_raster::RasterBlock;

/// Brightness ramp for ASCII previews, darkest first.
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// Writes a block as a binary PGM (P5) image.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_pgm<W: Write>(writer: &mut W, block: &RasterBlock) -> io::Result<()> {
    writeln!(writer, "P5")?;
    writeln!(writer, "{} {}", block.width, block.height)?;
    writeln!(writer, "255")?;
    writer.write_all(&block.samples)
}

/// Renders a block as an ASCII art preview, one character per pixel.
///
/// Samples are stretched to the block's own min/max before mapping onto the
/// brightness ramp, so low-contrast data stays visible.
#[must_use]
pub fn ascii_preview(block: &RasterBlock) -> String {
    let (min, max) = block
        .samples
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    let span = f64::from(max.saturating_sub(min)).max(1.0);

    let width = block.width as usize;
    let mut out = String::with_capacity(block.samples.len() + block.height as usize);
    for row in block.samples.chunks(width) {
        for &sample in row {
            let norm = f64::from(sample - min) / span;
            let idx = (norm * (ASCII_RAMP.len() - 1) as f64).round() as usize;
            out.push(ASCII_RAMP[idx] as char);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_block() -> RasterBlock {
        RasterBlock {
            width: 4,
            height: 2,
            samples: vec![0, 64, 128, 255, 255, 128, 64, 0],
        }
    }

    #[test]
    fn test_write_pgm_header_and_payload() {
        let mut buffer = Vec::new();
        write_pgm(&mut buffer, &gradient_block()).unwrap();
        assert!(buffer.starts_with(b"P5\n4 2\n255\n"));
        assert_eq!(&buffer[buffer.len() - 8..], &[0, 64, 128, 255, 255, 128, 64, 0]);
    }

    #[test]
    fn test_ascii_preview_shape() {
        let preview = ascii_preview(&gradient_block());
        let lines: Vec<&str> = preview.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 4);
        // Darkest and brightest pixels land at the ramp ends.
        assert!(lines[0].starts_with(' '));
        assert!(lines[0].ends_with('@'));
    }

    #[test]
    fn test_ascii_preview_flat_block() {
        let flat = RasterBlock {
            width: 2,
            height: 1,
            samples: vec![9, 9],
        };
        // A constant block must not divide by zero.
        let preview = ascii_preview(&flat);
        assert_eq!(preview, "  \n");
    }
}
