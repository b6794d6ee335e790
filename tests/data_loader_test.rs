use image::{Rgb, RgbImage};
use marker_pose::MarkerError;
use marker_pose::data_loader::{FrameSource, ImageFolderSource, InMemorySource};
use tempfile::TempDir;

fn write_frames(dir: &TempDir, names: &[&str]) {
    for (i, name) in names.iter().enumerate() {
        let img = RgbImage::from_pixel(4, 3, Rgb([i as u8 * 10, 0, 0]));
        img.save(dir.path().join(name)).unwrap();
    }
}

#[test]
fn test_folder_source_order_and_timestamps() {
    let dir = TempDir::new().unwrap();
    write_frames(&dir, &["3000.png", "1000.png", "2000.png"]);
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let mut source = ImageFolderSource::open(dir.path().to_str().unwrap(), 0, 1).unwrap();
    assert_eq!(source.remaining(), Some(3));
    let times: Vec<i64> = std::iter::from_fn(|| source.next_frame())
        .map(|f| f.time_ns)
        .collect();
    assert_eq!(times, vec![1000, 2000, 3000]);
    assert_eq!(source.remaining(), Some(0));
}

#[test]
fn test_folder_source_start_and_step() {
    let dir = TempDir::new().unwrap();
    write_frames(&dir, &["1000.png", "2000.png", "3000.png", "4000.png"]);
    let root = dir.path().to_str().unwrap();

    let mut source = ImageFolderSource::open(root, 1, 2).unwrap();
    let frames: Vec<_> = std::iter::from_fn(|| source.next_frame()).collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].time_ns, 2000);
    assert_eq!(frames[1].time_ns, 4000);
    assert_eq!(frames[1].idx, 1);
    assert_eq!(frames[0].image.dimensions(), (4, 3));
}

#[test]
fn test_folder_source_skips_undecodable() {
    let dir = TempDir::new().unwrap();
    write_frames(&dir, &["1000.png"]);
    std::fs::write(dir.path().join("broken.png"), b"garbage").unwrap();
    let mut source = ImageFolderSource::open(dir.path().to_str().unwrap(), 0, 1).unwrap();
    assert_eq!(source.remaining(), Some(2));
    assert!(source.next_frame().is_some());
    assert!(source.next_frame().is_none());
}

#[test]
fn test_synthesised_timestamps() {
    let dir = TempDir::new().unwrap();
    write_frames(&dir, &["a.png", "b.png"]);
    let mut source = ImageFolderSource::open(dir.path().to_str().unwrap(), 0, 1).unwrap();
    assert_eq!(source.next_frame().unwrap().time_ns, 0);
    assert_eq!(source.next_frame().unwrap().time_ns, 100_000_000);
}

#[test]
fn test_folder_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");
    assert!(matches!(
        ImageFolderSource::open(missing.to_str().unwrap(), 0, 1),
        Err(MarkerError::Io(_))
    ));
    assert!(matches!(
        ImageFolderSource::open(dir.path().to_str().unwrap(), 0, 1),
        Err(MarkerError::NoFrames(_))
    ));
}

#[test]
fn test_in_memory_source() {
    let frames = vec![RgbImage::new(2, 2), RgbImage::new(3, 3)];
    let mut source = InMemorySource::new(frames);
    assert_eq!(source.remaining(), Some(2));
    let first = source.next_frame().unwrap();
    assert_eq!((first.idx, first.image.width()), (0, 2));
    let second = source.next_frame().unwrap();
    assert_eq!((second.idx, second.time_ns), (1, 100_000_000));
    assert!(source.next_frame().is_none());
}
