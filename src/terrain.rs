//! Terrain pipeline: elevation, moisture, temperature and weather fields
//!
//! Combines the per-channel noise engine with a continent mask and a
//! latitude gradient. Samples are pure functions of (coordinate, seeds);
//! nothing here is cached or stored.

use crate::config::{ClassifierBands, ContinentBox, FractalParams, TemperatureParams, WorldConfig};
use crate::noise::NoiseChannel;
use crate::sector::Sector;

/// Logical noise field, for tools that sample raw channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Elevation,
    ElevationDistortion,
    Moisture,
    Weather,
}

/// One terrain sample. Always recomputed, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainSample {
    /// 0..=255, waterline-relative
    pub elevation: i32,
    /// Signed degrees
    pub temperature: i32,
    /// 0..=255
    pub moisture: i32,
}

/// Owns one noise channel per logical field plus the shaping parameters.
/// Construct once at startup and share by reference.
pub struct TerrainPipeline {
    elevation_ch: NoiseChannel,
    distortion_ch: NoiseChannel,
    moisture_ch: NoiseChannel,
    weather_ch: NoiseChannel,
    half_x: f64,
    half_y: f64,
    temperature: TemperatureParams,
    waterline: i32,
    continents: Vec<ContinentBox>,
    elevation_params: FractalParams,
    distortion_params: FractalParams,
    moisture_params: FractalParams,
    weather_params: FractalParams,
}

impl TerrainPipeline {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            elevation_ch: NoiseChannel::new(config.seeds.elevation),
            distortion_ch: NoiseChannel::new(config.seeds.elevation_distortion),
            moisture_ch: NoiseChannel::new(config.seeds.moisture),
            weather_ch: NoiseChannel::new(config.seeds.weather),
            half_x: config.half_x as f64,
            half_y: config.half_y as f64,
            temperature: config.temperature,
            waterline: config.bands.waterline,
            continents: config.continents.clone(),
            elevation_params: config.noise.elevation,
            distortion_params: config.noise.elevation_distortion,
            moisture_params: config.noise.moisture,
            weather_params: config.noise.weather,
        }
    }

    /// Continent mask in [0, 1] from the authored bounding boxes: 0 outside
    /// every box, attenuated near box edges and past the radial falloff from
    /// the box center, with a 1D noise perturbation so coastlines don't come
    /// out circular. Falloff scales follow the box width, as authored.
    pub fn continent_mask(&self, x: i32, y: i32) -> f64 {
        for bbox in &self.continents {
            if !bbox.contains(x, y) {
                continue;
            }
            let xsize = bbox.width();

            // Distance to the nearest box edge, inverted so the outer
            // eighth of the box fades out.
            let xdist = (x - bbox.ll_x).min(bbox.ur_x - x);
            let ydist = (y - bbox.ll_y).min(bbox.ur_y - y);
            let edge = (xsize / 8 - xdist.min(ydist)).max(0);
            let edge_falloff = edge as f64 / (xsize as f64 / 8.0);

            // Radial falloff from the box center, active past
            // width/2 - width/16.
            let cx = (bbox.ll_x + bbox.ur_x) / 2;
            let cy = (bbox.ll_y + bbox.ur_y) / 2;
            let mut radial =
                (((x - cx).pow(2) + (y - cy).pow(2)) as f64).sqrt() - (xsize as f64 / 2.0 - xsize as f64 / 16.0);
            if radial < 0.0 {
                radial = 0.0;
            }

            // Perturb the radius so the coastline meanders.
            radial *= (self.elevation_ch.fractal1(radial / 256.0, 2.0, 2.0, 1) + 1.0) / 2.0;
            radial /= xsize as f64 / 16.0;

            return 1.0 - (radial + 2.0 * edge_falloff) / 3.0;
        }
        0.0
    }

    /// Elevation in 0..=255. Ridged 16-octave fractal blended with a
    /// distortion field at 4x frequency, attenuated by the continent mask.
    pub fn elevation(&self, x: i32, y: i32) -> i32 {
        let p = self.elevation_params;
        let trans_x = x as f64 / (self.half_x / 2.0);
        let trans_y = y as f64 / (self.half_y / 2.0);

        let mut result =
            self.elevation_ch.fractal2(trans_x, trans_y, p.persistence, p.lacunarity, p.octaves);

        // Compress, then renormalize to [-1, 1]; makes better mountains.
        result = result.clamp(-0.8, 0.8) / 0.8;

        // Ridge transform: fold around zero and sharpen twice.
        result = 1.0 - result.abs();
        result *= result;
        result *= result;

        let d = self.distortion_params;
        let trans_x = x as f64 / (self.half_x / 8.0);
        let trans_y = y as f64 / (self.half_y / 8.0);
        let distortion =
            self.distortion_ch.fractal2(trans_x, trans_y, d.persistence, d.lacunarity, d.octaves);

        // Weighted average over [0, 1], then shape by the continent mask.
        result = (result + distortion + 1.0) / 3.0;
        result *= self.continent_mask(x, y);

        ((255.0 * result) as i32).clamp(0, 255)
    }

    /// Moisture in 0..=255.
    pub fn moisture(&self, x: i32, y: i32) -> i32 {
        let p = self.moisture_params;
        let trans_x = x as f64 / (self.half_x / 8.0);
        let trans_y = y as f64 / (self.half_y / 8.0);

        let result =
            self.moisture_ch.fractal2(trans_x, trans_y, p.persistence, p.lacunarity, p.octaves);

        ((255.0 * ((result + 1.0) / 2.0)) as i32).clamp(0, 255)
    }

    /// Temperature: a linear gradient in y away from the equator row,
    /// cooled by elevation above the waterline.
    pub fn temperature(&self, x: i32, y: i32) -> i32 {
        let t = self.temperature;
        let dist = (y - t.equator).abs();
        let pct = dist as f64 / (self.half_y - t.equator as f64);

        let gradient = t.max_temp as f64 - (t.max_temp - t.min_temp) as f64 * pct;
        let cooling = (1.5 * self.elevation(x, y) as f64 - self.waterline as f64).max(0.0) / 10.0;

        (gradient - cooling) as i32
    }

    /// Weather intensity in 0..=255 at a point in time. `time_base` is a
    /// phase in [0, 1); callers derive it from the wall clock so fronts
    /// drift as time passes.
    pub fn weather(&self, x: i32, y: i32, time_base: f64) -> i32 {
        let p = self.weather_params;
        let trans_x = x as f64 / self.half_x;
        let trans_y = y as f64 / self.half_y;

        let result = self.weather_ch.fractal3(
            trans_x * 50.0,
            trans_y * 50.0,
            time_base * 100.0,
            p.persistence,
            p.lacunarity,
            p.octaves,
        );

        ((255.0 * ((result + 1.0) / 2.0)) as i32).clamp(0, 255)
    }

    /// Sample all three classifier inputs at once.
    pub fn sample(&self, x: i32, y: i32) -> TerrainSample {
        TerrainSample {
            elevation: self.elevation(x, y),
            temperature: self.temperature(x, y),
            moisture: self.moisture(x, y),
        }
    }

    /// Convenience: classify the generated sector at a coordinate.
    pub fn sector(&self, x: i32, y: i32, bands: &ClassifierBands) -> Sector {
        let s = self.sample(x, y);
        Sector::classify(s.elevation, s.temperature, s.moisture, bands)
    }

    /// Raw channel access for diagnostic dumps.
    pub fn channel(&self, field: Field) -> &NoiseChannel {
        match field {
            Field::Elevation => &self.elevation_ch,
            Field::ElevationDistortion => &self.distortion_ch,
            Field::Moisture => &self.moisture_ch,
            Field::Weather => &self.weather_ch,
        }
    }

    /// Fractal parameters configured for a field.
    pub fn fractal_params(&self, field: Field) -> FractalParams {
        match field {
            Field::Elevation => self.elevation_params,
            Field::ElevationDistortion => self.distortion_params,
            Field::Moisture => self.moisture_params,
            Field::Weather => self.weather_params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    fn pipeline() -> TerrainPipeline {
        TerrainPipeline::new(&WorldConfig::default())
    }

    #[test]
    fn test_fields_are_deterministic() {
        let a = pipeline();
        let b = pipeline();
        for (x, y) in [(0, 0), (17, -230), (-512, 511), (1024, -1024), (3, 999)] {
            assert_eq!(a.elevation(x, y), b.elevation(x, y));
            assert_eq!(a.moisture(x, y), b.moisture(x, y));
            assert_eq!(a.temperature(x, y), b.temperature(x, y));
            assert_eq!(a.weather(x, y, 0.25), b.weather(x, y, 0.25));
        }
    }

    #[test]
    fn test_byte_range_bounds() {
        let p = pipeline();
        for y in (-1024..=1024).step_by(97) {
            for x in (-1024..=1024).step_by(89) {
                let e = p.elevation(x, y);
                let m = p.moisture(x, y);
                assert!((0..=255).contains(&e), "elevation {e} at ({x},{y})");
                assert!((0..=255).contains(&m), "moisture {m} at ({x},{y})");
            }
        }
    }

    #[test]
    fn test_mask_zero_outside_boxes() {
        let mut cfg = WorldConfig::default();
        cfg.continents =
            vec![crate::config::ContinentBox { ll_x: -100, ll_y: -100, ur_x: 100, ur_y: 100 }];
        let p = TerrainPipeline::new(&cfg);
        assert_eq!(p.continent_mask(500, 500), 0.0);
        // Outside the box, elevation collapses to the ocean floor.
        assert_eq!(p.elevation(500, 500), 0);
    }

    #[test]
    fn test_equator_warmer_than_poles() {
        let p = pipeline();
        // Compare latitude bands along a fixed meridian; elevation cooling
        // applies to both samples.
        let equator = p.temperature(10, 0);
        let pole = p.temperature(10, 1000);
        assert!(equator > pole, "equator {equator} should exceed pole {pole}");
    }

    #[test]
    fn test_weather_varies_with_time() {
        let p = pipeline();
        // Same places, different phase; some front should have moved.
        let moved = (0..20)
            .any(|i| p.weather(i * 37, i * 11, 0.1) != p.weather(i * 37, i * 11, 0.9));
        assert!(moved);
    }
}
