//! Scene-level properties of the DSWE pipeline.

use dswe_algorithms::classification::{recode, ConfidenceClass, MaskBits, QualityEncoding, RawCode};
use dswe_algorithms::pipeline::{run, BandScale, BandSet, DsweParams};
use dswe_algorithms::terrain::{percent_slope, SlopeAlgorithm, SlopeParams, SunGeometry};
use dswe_core::io::{read_geotiff_from_buffer, write_geotiff_to_buffer};
use dswe_core::{GeoTransform, Raster};

const ROWS: usize = 6;
const COLS: usize = 7;
const FILL: i16 = -9999;

/// Six reflectance bands, quality and elevation of a small synthetic scene
struct Scene {
    reflectance: [Raster<i16>; 6],
    quality: Raster<u16>,
    elevation: Raster<i16>,
}

fn georef<T: dswe_core::RasterElement>(mut raster: Raster<T>) -> Raster<T> {
    raster.set_transform(GeoTransform::new(300_000.0, 5_000_000.0, 30.0, -30.0));
    raster
}

impl Scene {
    /// Columns alternate between open water, vegetation and bright soil
    fn mixed() -> Self {
        let pixel = |col: usize| -> [i16; 6] {
            match col % 3 {
                0 => [300, 800, 500, 200, 100, 50],
                1 => [400, 700, 500, 3500, 1800, 900],
                _ => [2500, 2800, 3100, 3500, 4200, 3900],
            }
        };
        let reflectance = std::array::from_fn(|band| {
            let data = (0..ROWS * COLS).map(|i| pixel(i % COLS)[band]).collect();
            let mut r = georef(Raster::from_vec(data, ROWS, COLS).unwrap());
            r.set_nodata(Some(FILL));
            r
        });
        let mut quality = georef(Raster::filled(ROWS, COLS, 0u16));
        quality.set_nodata(Some(1));
        let elevation = georef(Raster::filled(ROWS, COLS, 1200i16));
        Self {
            reflectance,
            quality,
            elevation,
        }
    }

    fn bands(&self) -> BandSet<'_, i16, i16> {
        let [blue, green, red, nir, swir1, swir2] = &self.reflectance;
        BandSet {
            blue,
            green,
            red,
            nir,
            swir1,
            swir2,
            quality: &self.quality,
            elevation: &self.elevation,
            scale: BandScale::default(),
        }
    }
}

fn params() -> DsweParams {
    DsweParams {
        sun: SunGeometry::from_zenith_degrees(35.0, 140.0),
        hillshade_edge: 255,
        include_diagnostic: true,
        ..Default::default()
    }
}

#[test]
fn mixed_scene_classes() {
    let scene = Scene::mixed();
    let out = run(&scene.bands(), &params()).unwrap();

    for row in 0..ROWS {
        for col in 0..COLS {
            let code = out.diagnostic.as_ref().unwrap().get(row, col).unwrap();
            let expected = recode(RawCode::new(code as u16)).as_u8();
            assert_eq!(out.interpreted.get(row, col).unwrap(), expected);
            // Flat, lit and clear: nothing is masked
            assert_eq!(out.filtered.get(row, col).unwrap(), expected);
            assert_eq!(out.mask.get(row, col).unwrap(), 0);
        }
    }
    assert_eq!(out.interpreted.get(0, 0).unwrap(), ConfidenceClass::WaterHighConfidence.as_u8());
    assert_eq!(out.interpreted.get(0, 1).unwrap(), ConfidenceClass::NotWater.as_u8());
}

#[test]
fn fill_in_each_band_short_circuits() {
    for band in 0..8 {
        let mut scene = Scene::mixed();
        match band {
            0..=5 => scene.reflectance[band].set(2, 3, FILL).unwrap(),
            6 => scene.quality.set(2, 3, 1).unwrap(),
            _ => {
                scene.elevation.set_nodata(Some(-32768));
                scene.elevation.set(2, 3, -32768).unwrap();
            }
        }
        let out = run(&scene.bands(), &params()).unwrap();
        assert_eq!(out.interpreted.get(2, 3).unwrap(), 255, "band {}", band);
        assert_eq!(out.filtered.get(2, 3).unwrap(), 255, "band {}", band);
        assert_eq!(out.mask.get(2, 3).unwrap(), 255, "band {}", band);
        assert_eq!(out.diagnostic.as_ref().unwrap().get(2, 3).unwrap(), -9999);
        assert_ne!(out.mask.get(2, 2).unwrap(), 255, "band {}", band);
    }
}

#[test]
fn all_bands_fill() {
    let mut scene = Scene::mixed();
    for band in scene.reflectance.iter_mut() {
        band.set(4, 4, FILL).unwrap();
    }
    scene.quality.set(4, 4, 1).unwrap();
    let out = run(&scene.bands(), &params()).unwrap();
    let triple = (
        out.interpreted.get(4, 4).unwrap(),
        out.filtered.get(4, 4).unwrap(),
        out.mask.get(4, 4).unwrap(),
    );
    assert_eq!(triple, (255, 255, 255));
}

#[test]
fn runs_are_deterministic() {
    let mut scene = Scene::mixed();
    for (i, v) in scene.elevation.data_mut().iter_mut().enumerate() {
        *v = ((i * 37) % 50) as i16 * 10;
    }
    let mut p = params();
    p.include_percent_slope = true;
    p.include_hillshade = true;

    let a = run(&scene.bands(), &p).unwrap();
    let b = run(&scene.bands(), &p).unwrap();
    assert_eq!(a.interpreted.data(), b.interpreted.data());
    assert_eq!(a.filtered.data(), b.filtered.data());
    assert_eq!(a.mask.data(), b.mask.data());
    assert_eq!(a.percent_slope.unwrap().data(), b.percent_slope.unwrap().data());
    assert_eq!(a.hillshade.unwrap().data(), b.hillshade.unwrap().data());
}

#[test]
fn quality_flags_always_win() {
    let mut scene = Scene::mixed();
    // Steep terrain everywhere
    for (i, v) in scene.elevation.data_mut().iter_mut().enumerate() {
        *v = (i % COLS) as i16 * 40;
    }
    for col in 0..COLS {
        scene.quality.set(1, col, 1 << 4).unwrap();
    }
    let out = run(&scene.bands(), &params()).unwrap();
    for col in 0..COLS {
        assert_eq!(out.filtered.get(1, col).unwrap(), 9);
        assert!(MaskBits::from_bits_truncate(out.mask.get(1, col).unwrap()).contains(MaskBits::SNOW));
    }
}

#[test]
fn steep_water_is_masked_by_slope() {
    let mut scene = Scene::mixed();
    // 12 m per 30 m pixel eastward: 40% slope
    for (i, v) in scene.elevation.data_mut().iter_mut().enumerate() {
        *v = (i % COLS) as i16 * 12;
    }
    let mut p = params();
    // Only a fully dark pixel would trip the hillshade mask
    p.thresholds.hillshade = 0;
    let out = run(&scene.bands(), &p).unwrap();

    // Interior water column
    assert_eq!(out.interpreted.get(2, 3).unwrap(), 1);
    assert_eq!(out.filtered.get(2, 3).unwrap(), 0);
    assert!(MaskBits::from_bits_truncate(out.mask.get(2, 3).unwrap()).contains(MaskBits::PERCENT_SLOPE));

    // Edge pixels have slope 0 and keep their class
    assert_eq!(out.filtered.get(0, 3).unwrap(), 1);
    assert_eq!(out.filtered.get(2, 0).unwrap(), 1);
}

#[test]
fn slope_edges_are_zero_on_rugged_dem() {
    let data: Vec<i16> = (0..ROWS * COLS).map(|i| ((i * 7919) % 997) as i16).collect();
    let dem = georef(Raster::from_vec(data, ROWS, COLS).unwrap());
    for algorithm in [SlopeAlgorithm::Horn, SlopeAlgorithm::ZevenbergenThorne] {
        let slope = percent_slope(&dem, SlopeParams { algorithm }).unwrap();
        for row in 0..ROWS {
            for col in 0..COLS {
                let edge = row == 0 || row == ROWS - 1 || col == 0 || col == COLS - 1;
                if edge {
                    assert_eq!(slope.get(row, col).unwrap(), 0.0);
                }
            }
        }
        assert!(slope.get(2, 2).unwrap() > 0.0);
    }
}

#[test]
fn cfmask_quality_encoding() {
    let mut scene = Scene::mixed();
    scene.quality.set_nodata(Some(255));
    scene.quality.set(3, 0, 2).unwrap();
    scene.quality.set(3, 1, 4).unwrap();
    let mut p = params();
    p.quality_encoding = QualityEncoding::Cfmask;
    let out = run(&scene.bands(), &p).unwrap();
    assert_eq!(out.mask.get(3, 0).unwrap(), MaskBits::SHADOW.bits());
    assert_eq!(out.mask.get(3, 1).unwrap(), MaskBits::CLOUD.bits());
    assert_eq!(out.filtered.get(3, 0).unwrap(), 9);
    assert_eq!(out.filtered.get(3, 2).unwrap(), out.interpreted.get(3, 2).unwrap());
}

#[test]
fn outputs_survive_geotiff_round_trip() {
    let mut scene = Scene::mixed();
    scene.reflectance[0].set(0, 0, FILL).unwrap();
    let out = run(&scene.bands(), &params()).unwrap();

    let bytes = write_geotiff_to_buffer(&out.filtered).unwrap();
    let back: Raster<u8> = read_geotiff_from_buffer(&bytes).unwrap();
    assert_eq!(back.data(), out.filtered.data());
    assert_eq!(back.nodata(), Some(255));
    assert_eq!(back.resolution(), (30.0, 30.0));

    let diag = out.diagnostic.unwrap();
    let bytes = write_geotiff_to_buffer(&diag).unwrap();
    let back: Raster<i16> = read_geotiff_from_buffer(&bytes).unwrap();
    assert_eq!(back.get(0, 0).unwrap(), -9999);
    assert_eq!(back.nodata(), Some(-9999));
}
