use super::*;
use image::{GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use tempfile::TempDir;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 120])
    })
    .save(path)
    .unwrap();
}

fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 5 % 256) as u8, 40, (y * 11 % 256) as u8, 255])
    })
    .save(path)
    .unwrap();
}

/// Decoded from content so extensionless outputs work too
fn dimensions(path: &Path) -> (u32, u32) {
    image::load_from_memory(&fs::read(path).unwrap())
        .unwrap()
        .dimensions()
}

fn maker_in(temp_dir: &TempDir, workers: usize) -> (ThumbnailMaker, broadcast::Receiver<Event>) {
    let (event_tx, event_rx) = broadcast::channel(1000);
    let maker = ThumbnailMaker::new(
        temp_dir.path().join("incoming"),
        temp_dir.path().join("outgoing"),
        &[32, 64, 200],
        workers,
        event_tx,
    );
    (maker, event_rx)
}

fn staged_names(maker: &ThumbnailMaker) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(maker.staging_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

fn output_names(maker: &ThumbnailMaker) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(maker.output_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn produces_every_width_and_drains_staging() {
    for workers in [1, 4] {
        let temp_dir = tempfile::tempdir().unwrap();
        let (maker, _rx) = maker_in(&temp_dir, workers);
        fs::create_dir_all(maker.staging_dir()).unwrap();
        write_jpeg(&maker.staging_dir().join("a.jpg"), 200, 100);
        write_png(&maker.staging_dir().join("b.png"), 50, 50);

        let report = maker.resize_all().await.unwrap();

        assert!(report.is_complete(), "failures: {:?}", report.failures);
        assert_eq!(report.thumbnail_count(), 6);
        assert!(staged_names(&maker).is_empty(), "staging should end empty");

        let out = maker.output_dir();
        let expected = [
            ("a_32.jpg", (32, 16)),
            ("a_64.jpg", (64, 32)),
            ("a_200.jpg", (200, 100)),
            ("b_32.png", (32, 32)),
            ("b_64.png", (64, 64)),
            ("b_200.png", (200, 200)),
        ];
        for (name, dims) in expected {
            assert_eq!(dimensions(&out.join(name)), dims, "{name} with {workers} workers");
        }
        assert_eq!(output_names(&maker).len(), 6, "no stray temporaries");

        assert_eq!(report.processed[0].source, "a.jpg");
        assert_eq!(
            report.processed[0].outputs,
            vec![out.join("a_32.jpg"), out.join("a_64.jpg"), out.join("a_200.jpg")]
        );
        assert_eq!(report.processed[1].source, "b.png");
    }
}

#[tokio::test]
async fn output_format_matches_source_extension() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, _rx) = maker_in(&temp_dir, 2);
    fs::create_dir_all(maker.staging_dir()).unwrap();
    write_jpeg(&maker.staging_dir().join("a.jpg"), 200, 100);
    write_png(&maker.staging_dir().join("b.png"), 50, 50);

    maker.resize_all().await.unwrap();

    let jpeg = fs::read(maker.output_dir().join("a_64.jpg")).unwrap();
    let png = fs::read(maker.output_dir().join("b_64.png")).unwrap();
    assert_eq!(image::guess_format(&jpeg).unwrap(), image::ImageFormat::Jpeg);
    assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);
}

#[tokio::test]
async fn empty_staging_creates_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, _rx) = maker_in(&temp_dir, 2);
    fs::create_dir_all(maker.staging_dir()).unwrap();

    let report = maker.resize_all().await.unwrap();

    assert!(report.processed.is_empty() && report.failures.is_empty());
    assert!(!maker.output_dir().exists(), "output dir must not be created");
}

#[tokio::test]
async fn missing_staging_is_treated_as_empty() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, _rx) = maker_in(&temp_dir, 2);

    let report = maker.resize_all().await.unwrap();

    assert!(report.processed.is_empty());
    assert!(!maker.output_dir().exists());
}

#[tokio::test]
async fn corrupt_file_is_kept_and_does_not_block_others() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, _rx) = maker_in(&temp_dir, 2);
    fs::create_dir_all(maker.staging_dir()).unwrap();
    fs::write(maker.staging_dir().join("corrupt.jpg"), b"not really a jpeg").unwrap();
    write_png(&maker.staging_dir().join("good.png"), 64, 32);
    write_jpeg(&maker.staging_dir().join("other.jpg"), 100, 100);

    let report = maker.resize_all().await.unwrap();

    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].filename, "corrupt.jpg");
    assert!(matches!(
        report.failures[0].error,
        TransformError::Decode { .. }
    ));
    assert_eq!(
        staged_names(&maker),
        vec!["corrupt.jpg".to_string()],
        "only the failed source stays staged"
    );
    assert!(
        output_names(&maker).iter().all(|n| !n.starts_with("corrupt")),
        "no output for the corrupt file"
    );
    assert_eq!(output_names(&maker).len(), 6);
}

#[tokio::test]
async fn zero_height_thumbnail_fails_without_partial_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, _rx) = maker_in(&temp_dir, 1);
    fs::create_dir_all(maker.staging_dir()).unwrap();
    // 1000x20 at width 32 has height floor(0.64) = 0
    write_png(&maker.staging_dir().join("banner.png"), 1000, 20);

    let report = maker.resize_all().await.unwrap();

    match &report.failures[0].error {
        TransformError::InvalidDimensions {
            width,
            height,
            target_width,
            ..
        } => assert_eq!((*width, *height, *target_width), (1000, 20, 32)),
        other => panic!("expected InvalidDimensions, got {other:?}"),
    }
    assert_eq!(staged_names(&maker), vec!["banner.png".to_string()]);
    assert!(output_names(&maker).is_empty(), "no thumbnails or temporaries left");
}

#[tokio::test]
async fn rerun_on_same_sources_is_byte_identical() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, _rx) = maker_in(&temp_dir, 2);
    let originals = temp_dir.path().join("originals");
    fs::create_dir_all(&originals).unwrap();
    fs::create_dir_all(maker.staging_dir()).unwrap();
    write_jpeg(&originals.join("a.jpg"), 200, 100);
    write_png(&originals.join("b.png"), 50, 50);

    let restage = || {
        for name in ["a.jpg", "b.png"] {
            fs::copy(originals.join(name), maker.staging_dir().join(name)).unwrap();
        }
    };
    let snapshot = || -> Vec<(String, Vec<u8>)> {
        output_names(&maker)
            .into_iter()
            .map(|n| {
                let bytes = fs::read(maker.output_dir().join(&n)).unwrap();
                (n, bytes)
            })
            .collect()
    };

    restage();
    maker.resize_all().await.unwrap();
    let first = snapshot();

    restage();
    maker.resize_all().await.unwrap();
    let second = snapshot();

    assert_eq!(first.len(), 6);
    assert_eq!(first, second, "resize must be deterministic");
}

#[tokio::test]
async fn subdirectories_in_staging_are_ignored() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, _rx) = maker_in(&temp_dir, 2);
    fs::create_dir_all(maker.staging_dir().join("nested")).unwrap();
    write_png(&maker.staging_dir().join("nested").join("inner.png"), 40, 40);

    let report = maker.resize_all().await.unwrap();

    assert!(report.processed.is_empty() && report.failures.is_empty());
    assert!(maker.staging_dir().join("nested").join("inner.png").exists());
}

#[tokio::test]
async fn extensionless_source_keeps_sniffed_format() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, _rx) = maker_in(&temp_dir, 1);
    fs::create_dir_all(maker.staging_dir()).unwrap();
    let raw = temp_dir.path().join("raw.png");
    write_png(&raw, 80, 40);
    fs::rename(&raw, maker.staging_dir().join("scan")).unwrap();

    maker.resize_all().await.unwrap();

    assert_eq!(
        output_names(&maker),
        vec!["scan_200".to_string(), "scan_32".to_string(), "scan_64".to_string()]
    );
    let scan_64 = maker.output_dir().join("scan_64");
    assert_eq!(dimensions(&scan_64), (64, 32));
    assert_eq!(
        image::guess_format(&fs::read(&scan_64).unwrap()).unwrap(),
        image::ImageFormat::Png
    );
}

#[tokio::test]
async fn failed_publish_leaves_no_thumbnails_behind() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, _rx) = maker_in(&temp_dir, 1);
    fs::create_dir_all(maker.staging_dir()).unwrap();
    write_jpeg(&maker.staging_dir().join("a.jpg"), 200, 100);
    // A directory in the way makes renaming the second width fail
    fs::create_dir_all(maker.output_dir().join("a_64.jpg")).unwrap();

    let report = maker.resize_all().await.unwrap();

    assert!(report.processed.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        TransformError::Io { .. }
    ));
    assert_eq!(
        output_names(&maker),
        vec!["a_64.jpg".to_string()],
        "only the blocking directory may remain"
    );
    assert!(maker.output_dir().join("a_64.jpg").is_dir());
    assert_eq!(staged_names(&maker), vec!["a.jpg".to_string()]);
}

#[tokio::test]
async fn emits_created_and_removed_events() {
    let temp_dir = tempfile::tempdir().unwrap();
    let (maker, mut rx) = maker_in(&temp_dir, 2);
    fs::create_dir_all(maker.staging_dir()).unwrap();
    write_jpeg(&maker.staging_dir().join("a.jpg"), 200, 100);
    fs::write(maker.staging_dir().join("bad.png"), b"garbage").unwrap();

    maker.resize_all().await.unwrap();

    let mut created = Vec::new();
    let mut removed = Vec::new();
    let mut failed = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::ThumbnailCreated { width, height, .. } => created.push((width, height)),
            Event::SourceRemoved { source } => removed.push(source),
            Event::ResizeFailed { source, .. } => failed.push(source),
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert_eq!(created, vec![(32, 16), (64, 32), (200, 100)]);
    assert_eq!(removed, vec!["a.jpg".to_string()]);
    assert_eq!(failed, vec!["bad.png".to_string()]);
}

#[test]
fn target_sizes_are_sorted_and_deduplicated() {
    let (event_tx, _rx) = broadcast::channel(1);
    let maker = ThumbnailMaker::new(
        PathBuf::from("in"),
        PathBuf::from("out"),
        &[200, 32, 64, 32],
        0,
        event_tx,
    );

    assert_eq!(maker.target_sizes(), &[32, 64, 200]);
}

#[test]
fn from_config_uses_home_layout_and_ordered_sizes() {
    let (event_tx, _rx) = broadcast::channel(1);
    let config = Config {
        target_sizes: vec![128, 16, 128],
        ..Config::with_home_dir("/srv/thumbs")
    };

    let maker = ThumbnailMaker::from_config(&config, event_tx);

    assert_eq!(maker.staging_dir(), Path::new("/srv/thumbs/incoming"));
    assert_eq!(maker.output_dir(), Path::new("/srv/thumbs/outgoing"));
    assert_eq!(maker.target_sizes(), &[16, 128]);
}
