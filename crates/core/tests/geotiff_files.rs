//! GeoTIFF band files on disk.

use dswe_core::io::{read_geotiff, write_geotiff};
use dswe_core::{GeoTransform, Raster};

fn georef<T: dswe_core::RasterElement>(mut raster: Raster<T>) -> Raster<T> {
    raster.set_transform(GeoTransform::new(199_785.0, 4_300_215.0, 30.0, -30.0));
    raster
}

#[test]
fn reflectance_band_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sr_band3.tif");

    let data: Vec<i16> = (0..40 * 30).map(|i| (i % 5000) as i16 - 100).collect();
    let mut band = georef(Raster::from_vec(data, 40, 30).unwrap());
    band.set_nodata(Some(-9999));
    band.set(0, 0, -9999).unwrap();

    write_geotiff(&band, &path).unwrap();
    let back: Raster<i16> = read_geotiff(&path).unwrap();

    assert_eq!(back.shape(), (40, 30));
    assert_eq!(back.data(), band.data());
    assert_eq!(back.nodata(), Some(-9999));
    assert!(back.is_nodata_at(0, 0).unwrap());
    assert_eq!(back.transform(), band.transform());
}

#[test]
fn quality_band_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixel_qa.tif");

    let data: Vec<u16> = (0..64).map(|i| if i % 3 == 0 { 1 << 5 } else { 66 }).collect();
    let mut qa = georef(Raster::from_vec(data, 8, 8).unwrap());
    qa.set_nodata(Some(1));

    write_geotiff(&qa, &path).unwrap();
    let back: Raster<u16> = read_geotiff(&path).unwrap();
    assert_eq!(back.data(), qa.data());
    assert_eq!(back.nodata(), Some(1));
}

#[test]
fn band_without_fill_reads_back_without_fill() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dem.tif");

    let dem = georef(Raster::filled(5, 5, 1500.5f32));
    write_geotiff(&dem, &path).unwrap();

    // Widening on read
    let back: Raster<f64> = read_geotiff(&path).unwrap();
    assert_eq!(back.nodata(), None);
    assert_eq!(back.get(4, 4).unwrap(), 1500.5);
    assert_eq!(back.resolution(), (30.0, 30.0));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_geotiff::<i16, _>(dir.path().join("absent.tif")).unwrap_err();
    assert!(matches!(err, dswe_core::Error::Io(_)));
}
