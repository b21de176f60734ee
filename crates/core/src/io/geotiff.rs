//! Single-band GeoTIFF reading/writing
//!
//! Uses the `tiff` crate for TIFF I/O. Only the georeferencing needed by the
//! classifier is carried: pixel scale, tie point and the GDAL fill tag.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement, SampleFormat};
use num_traits::NumCast;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

/// Known codes decode to named variants, never `Tag::Unknown`
fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Read the first image of a GeoTIFF file into a Raster
///
/// Samples are converted to `T`; a sample that does not fit in `T` is an
/// error rather than a silent clamp.
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(BufReader::new(file))
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data))
}

fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    let data: Vec<T> = match decoder.read_image()? {
        DecodingResult::U8(buf) => cast_samples(&buf)?,
        DecodingResult::U16(buf) => cast_samples(&buf)?,
        DecodingResult::U32(buf) => cast_samples(&buf)?,
        DecodingResult::I8(buf) => cast_samples(&buf)?,
        DecodingResult::I16(buf) => cast_samples(&buf)?,
        DecodingResult::I32(buf) => cast_samples(&buf)?,
        DecodingResult::F32(buf) => cast_samples(&buf)?,
        DecodingResult::F64(buf) => cast_samples(&buf)?,
        _ => {
            return Err(Error::UnsupportedDataType(
                "unsupported TIFF sample format".to_string(),
            ))
        }
    };

    // Multi-sample images decode interleaved; only single-band files are accepted
    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_nodata(read_nodata(&mut decoder));

    Ok(raster)
}

fn cast_samples<S, T>(buf: &[S]) -> Result<Vec<T>>
where
    S: NumCast + Copy + std::fmt::Debug,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| {
            num_traits::cast(v).ok_or_else(|| {
                Error::UnsupportedDataType(format!("sample {:?} does not fit the target type", v))
            })
        })
        .collect()
}

/// GeoTransform from ModelPixelScale + ModelTiepoint, if both are present
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(tag(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(tag(MODEL_TIEPOINT)).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// Fill value from the GDAL_NODATA ASCII tag
fn read_nodata<T, R>(decoder: &mut Decoder<R>) -> Option<T>
where
    T: RasterElement,
    R: Read + Seek,
{
    let text = decoder.get_tag_ascii_string(tag(GDAL_NODATA)).ok()?;
    let value: f64 = text.trim_matches(char::from(0)).trim().parse().ok()?;
    num_traits::cast(value)
}

/// Write a Raster to a GeoTIFF file in its native sample type
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_geotiff(raster, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer)?;

    match T::sample_format() {
        SampleFormat::U8 => write_image::<colortype::Gray8, _, _>(&mut encoder, raster),
        SampleFormat::U16 => write_image::<colortype::Gray16, _, _>(&mut encoder, raster),
        SampleFormat::I16 => write_image::<colortype::GrayI16, _, _>(&mut encoder, raster),
        SampleFormat::I32 => write_image::<colortype::GrayI32, _, _>(&mut encoder, raster),
        SampleFormat::F32 => write_image::<colortype::Gray32Float, _, _>(&mut encoder, raster),
        SampleFormat::F64 => write_image::<colortype::Gray64Float, _, _>(&mut encoder, raster),
    }
}

fn write_image<C, T, W>(encoder: &mut TiffEncoder<W>, raster: &Raster<T>) -> Result<()>
where
    C: ColorType,
    C::Inner: NumCast + Copy,
    [C::Inner]: tiff::encoder::TiffValue,
    T: RasterElement,
    W: Write + Seek,
{
    let (rows, cols) = raster.shape();
    let data: Vec<C::Inner> = raster
        .data()
        .iter()
        .map(|&v| {
            num_traits::cast(v).ok_or_else(|| {
                Error::UnsupportedDataType(format!("sample {:?} does not fit the output type", v))
            })
        })
        .collect::<Result<_>>()?;

    let mut image = encoder.new_image::<C>(cols as u32, rows as u32)?;

    let gt = raster.transform();
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(tag(MODEL_PIXEL_SCALE), &scale[..])?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(tag(MODEL_TIEPOINT), &tiepoint[..])?;

    // Version 1.1.0, 2 keys: GTModelTypeGeoKey = Projected,
    // GTRasterTypeGeoKey = RasterPixelIsArea
    let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1];
    image
        .encoder()
        .write_tag(tag(GEO_KEY_DIRECTORY), &geokeys[..])?;

    if let Some(nodata) = raster.nodata().and_then(|v| v.to_f64()) {
        let text = format!("{}", nodata);
        image
            .encoder()
            .write_tag(tag(GDAL_NODATA), text.as_str())?;
    }

    image.write_data(&data)?;
    Ok(())
}
