//! # Animation
//!
//! Turns an occupancy grid into a scan through its z slices and encodes the
//! slices as a looping GIF.

use crate::voxel::OccupancyGrid;
use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, DynamicImage, Frame, GrayImage, ImageError, Luma,
};
use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Playback rate of the scan
pub const FRAMES_PER_SECOND: u32 = 100;

// NeuQuant speed, only used when a frame has more than 256 colors
const QUANTIZE_SPEED: i32 = 10;

#[derive(Error, Debug)]
pub enum AnimationError {
    #[error("occupancy grid produced no frames")]
    NoFrames,
    #[error("frame size {0}x{1} is too large for a gif")]
    FrameSize(usize, usize),
    #[error("Couldn't encode animation")]
    Encode(#[from] ImageError),
    #[error("Couldn't write animation")]
    IO(#[from] std::io::Error),
}

/// Slice the grid along z, frame `i` is `grid[:, :, i]` with `x` as the row
/// and `y` as the column. Filled cells are 255, empty cells 0.
///
/// # Examples
///
/// ```
/// use stl_inspect::{animation::extract_frames, voxel::OccupancyGrid};
/// let grid = OccupancyGrid::from_fn([3, 2, 5], |x, y, z| x + y == z);
/// let frames = extract_frames(&grid);
/// assert_eq!(frames.len(), 3);
/// assert_eq!(frames[1].dimensions(), (2, 3));
/// assert_eq!(frames[1].get_pixel(1, 0).0, [255]);
/// assert_eq!(frames[1].get_pixel(0, 0).0, [0]);
/// ```
pub fn extract_frames(grid: &OccupancyGrid) -> Vec<GrayImage> {
    let [nx, ny, nz] = grid.shape();
    if grid.is_empty() {
        // a slice with no pixels is not a frame
        return Vec::new();
    }
    (0..nx.min(nz))
        .map(|z| {
            GrayImage::from_fn(ny as u32, nx as u32, |col, row| {
                Luma([grid.get(row as usize, col as usize, z) as u8 * 255])
            })
        })
        .collect()
}

/// Encode frames as an infinitely looping GIF and write it to `path`
pub fn write_animation<P: AsRef<Path>>(frames: &[GrayImage], path: P) -> Result<(), AnimationError> {
    let first = frames.first().ok_or(AnimationError::NoFrames)?;
    let (width, height) = first.dimensions();
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(AnimationError::FrameSize(width as usize, height as usize));
    }

    let delay = Delay::from_numer_denom_ms(1000, FRAMES_PER_SECOND);
    let mut buffer = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut buffer, QUANTIZE_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(frames.iter().map(|frame| {
            let rgba = DynamicImage::ImageLuma8(frame.clone()).into_rgba8();
            Frame::from_parts(rgba, 0, 0, delay)
        }))?;
    }
    debug!("encoded {} frames into {} bytes", frames.len(), buffer.len());
    fs::write(path, &buffer)?;
    Ok(())
}

/// Write the scan animation for `filename` into the report folder
pub fn create_voxel_animation<P: AsRef<Path>>(
    grid: &OccupancyGrid,
    filename: &str,
    report_folder: P,
) -> Result<PathBuf, AnimationError> {
    let frames = extract_frames(grid);
    let gif_path = report_folder.as_ref().join(format!("{}.gif", filename));
    write_animation(&frames, &gif_path)?;
    info!("wrote {} frame animation to {}", frames.len(), gif_path.display());
    Ok(gif_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn frame_count_and_pixels() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let shape = [rng.gen_range(1..12), rng.gen_range(1..12), rng.gen_range(1..12)];
            let cells: Vec<bool> = (0..shape[0] * shape[1] * shape[2]).map(|_| rng.gen()).collect();
            let grid = OccupancyGrid::from_fn(shape, |x, y, z| cells[(x * shape[1] + y) * shape[2] + z]);
            let frames = extract_frames(&grid);
            assert_eq!(frames.len(), shape[0].min(shape[2]));
            for (z, frame) in frames.iter().enumerate() {
                assert_eq!(frame.dimensions(), (shape[1] as u32, shape[0] as u32));
                for (col, row, pixel) in frame.enumerate_pixels() {
                    let expected = if grid.get(row as usize, col as usize, z) { 255 } else { 0 };
                    assert_eq!(pixel.0[0], expected);
                }
            }
        }
    }

    #[test]
    fn frames_follow_slice_order() {
        // only slice z has cell (z, 0) filled
        let grid = OccupancyGrid::from_fn([4, 1, 6], |x, _, z| x == z);
        let frames = extract_frames(&grid);
        assert_eq!(frames.len(), 4);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.get_pixel(0, i as u32).0, [255]);
            assert_eq!(frame.pixels().filter(|p| p.0[0] == 255).count(), 1);
        }
    }

    #[test]
    fn flat_grid_has_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let grid = OccupancyGrid::new([50, 0, 50], false);
        assert!(extract_frames(&grid).is_empty());
        let result = create_voxel_animation(&grid, "flat", dir.path());
        assert!(matches!(result, Err(AnimationError::NoFrames)));
        assert!(!dir.path().join("flat.gif").exists());
    }

    #[test]
    fn writes_looping_gif() {
        let dir = tempfile::tempdir().unwrap();
        let grid = OccupancyGrid::from_fn([5, 4, 5], |x, y, _| x > y);
        let path = create_voxel_animation(&grid, "scan", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("scan.gif"));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..6], b"GIF89a");
        // NETSCAPE2.0 application extension carries the loop count
        assert!(bytes.windows(11).any(|w| w == b"NETSCAPE2.0"));
    }
}
