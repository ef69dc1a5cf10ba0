//! PNG export of the world map and raw noise channels
//!
//! Authoring-time tooling: paints the effective sector of every coordinate
//! into an image, or dumps one noise channel as grayscale for inspecting
//! seeds and octave parameters. Neither is on any game-loop path.

use image::{ImageBuffer, Rgb, RgbImage};
use rayon::prelude::*;

use crate::terrain::{Field, TerrainPipeline};
use crate::sector::Sector;
use crate::world::Wilderness;

/// Export the sector map of a `width` x `height` window centered on the
/// origin. High mountains are shaded by elevation instead of flat color so
/// ridgelines stay readable.
pub fn export_map(world: &Wilderness, width: u32, height: u32, path: &str) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(width, height);

    let half_w = width as i32 / 2;
    let half_h = height as i32 / 2;

    for py in 0..height {
        for px in 0..width {
            // Image rows grow southward; world y grows northward.
            let x = px as i32 - half_w;
            let y = half_h - py as i32;

            let sector = world.sector_at(x, y);
            let color = if sector == Sector::HighMountain {
                let e = world.terrain().elevation(x, y).clamp(0, 255) as u8;
                [e, e, e]
            } else {
                sector.color()
            };
            img.put_pixel(px, py, Rgb(color));
        }
    }

    img.save(path)
}

/// Export one noise channel as grayscale, using the field's configured
/// fractal parameters. `zoom` of 0 uses the base framing; higher values
/// magnify. Rows are sampled in parallel; the pipeline is immutable.
pub fn export_noise(
    terrain: &TerrainPipeline,
    field: Field,
    width: u32,
    height: u32,
    zoom: u32,
    path: &str,
) -> Result<(), image::ImageError> {
    let channel = terrain.channel(field);
    let params = terrain.fractal_params(field);

    let x_scale = (width as f64 / 4.0) * if zoom == 0 { 1.0 } else { 0.5 * zoom as f64 };
    let y_scale = (height as f64 / 4.0) * if zoom == 0 { 1.0 } else { 0.5 * zoom as f64 };

    let rows: Vec<Vec<u8>> = (0..height)
        .into_par_iter()
        .map(|py| {
            (0..width)
                .map(|px| {
                    let tx = px as f64 / x_scale;
                    let ty = py as f64 / y_scale;
                    let v = channel.fractal2(tx, ty, params.persistence, params.lacunarity, params.octaves);
                    (255.0 * ((v + 1.0) / 2.0)).clamp(0.0, 255.0) as u8
                })
                .collect()
        })
        .collect();

    let mut img: RgbImage = ImageBuffer::new(width, height);
    for (py, row) in rows.iter().enumerate() {
        for (px, &g) in row.iter().enumerate() {
            img.put_pixel(px as u32, py as u32, Rgb([g, g, g]));
        }
    }

    img.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    #[test]
    fn test_noise_rows_are_deterministic() {
        // The parallel row sampling must not perturb determinism.
        let terrain = TerrainPipeline::new(&WorldConfig::default());
        let channel = terrain.channel(Field::Elevation);
        let p = terrain.fractal_params(Field::Elevation);

        let sample = |px: u32, py: u32| {
            let tx = px as f64 / 64.0;
            let ty = py as f64 / 64.0;
            channel.fractal2(tx, ty, p.persistence, p.lacunarity, p.octaves)
        };
        assert_eq!(sample(10, 20), sample(10, 20));
    }
}
