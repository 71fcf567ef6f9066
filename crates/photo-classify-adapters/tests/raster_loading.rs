//! Integration tests for raster image acquisition.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use photo_classify_adapters::{decode_raw_image, read_orientation, FsImageSource};
use photo_classify_core::{ImageSource, Orientation, RawImage};

fn sample_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        #[allow(clippy::cast_possible_truncation)]
        Rgb([(x * 20) as u8, (y * 20) as u8, 128])
    }))
}

fn write_fixtures(dir: &Path) -> Vec<PathBuf> {
    ["test.jpg", "test.png", "test.tiff", "test.bmp", "test.gif", "test.webp"]
        .iter()
        .map(|name| {
            let path = dir.join(name);
            sample_image(8, 8).save(&path).unwrap();
            path
        })
        .collect()
}

/// Inserts an EXIF APP1 segment with the given orientation after the JPEG SOI marker.
fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");

    let mut tiff = vec![b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08];
    tiff.extend_from_slice(&[0x00, 0x01]); // one IFD entry
    tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0x00, 0x00]);
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // no next IFD

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);
    let len = u16::try_from(payload.len() + 2).unwrap();

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn load_single(path: PathBuf) -> RawImage {
    let source = FsImageSource::new(vec![path], false);
    let images: Vec<_> = source.images().collect();
    assert_eq!(images.len(), 1);
    images.into_iter().next().unwrap().expect("should load")
}

#[test]
fn test_load_each_format() {
    let dir = tempfile::tempdir().unwrap();

    for path in write_fixtures(dir.path()) {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let raw = load_single(path);
        assert_eq!((raw.width, raw.height), (8, 8), "{name}");
        assert_eq!(raw.orientation, Orientation::Up, "{name}");
        assert!(raw.source.ends_with(&name));
    }
}

#[test]
fn test_load_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let source = FsImageSource::new(vec![dir.path().to_path_buf()], false);
    assert_eq!(source.count_hint(), Some(6));

    for result in source.images() {
        let raw = result.expect("all fixtures should load");
        assert!(!raw.is_empty());
    }
}

#[test]
fn test_recursive_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested");
    std::fs::create_dir(&nested).unwrap();
    sample_image(4, 4).save(dir.path().join("top.png")).unwrap();
    sample_image(4, 4).save(nested.join("inner.png")).unwrap();

    let flat = FsImageSource::new(vec![dir.path().to_path_buf()], false);
    assert_eq!(flat.count_hint(), Some(1));

    let recursive = FsImageSource::new(vec![dir.path().to_path_buf()], true);
    assert_eq!(recursive.count_hint(), Some(2));
}

#[test]
fn test_missing_path_is_skipped() {
    let source = FsImageSource::new(vec![PathBuf::from("/nonexistent/photo.jpg")], false);
    assert_eq!(source.count_hint(), Some(0));
    assert_eq!(source.images().count(), 0);
}

#[test]
fn test_corrupt_file_yields_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"\xFF\xD8 truncated").unwrap();

    let source = FsImageSource::new(vec![path], false);
    let results: Vec<_> = source.images().collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[test]
fn test_exif_orientation_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain.jpg");
    sample_image(8, 4).save(&plain).unwrap();

    let tagged = with_exif_orientation(&std::fs::read(&plain).unwrap(), 6);
    assert_eq!(read_orientation(&tagged), Orientation::Right);

    let raw = decode_raw_image("tagged.jpg", &tagged).unwrap();
    assert_eq!(raw.orientation, Orientation::Right);
    // Stored pixels are not rotated during decoding.
    assert_eq!((raw.width, raw.height), (8, 4));
}

#[test]
fn test_exif_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain.jpg");
    sample_image(8, 4).save(&plain).unwrap();

    let tagged_path = dir.path().join("tagged.jpg");
    let tagged = with_exif_orientation(&std::fs::read(&plain).unwrap(), 8);
    std::fs::write(&tagged_path, tagged).unwrap();

    assert_eq!(load_single(tagged_path).orientation, Orientation::Left);
}
