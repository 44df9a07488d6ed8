//! Filesystem assertions for integration tests

use std::path::Path;

/// Sorted names of the entries in `dir` (empty if it does not exist)
pub fn dir_names(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

/// Assert that `path` decodes to an image of `width` x `height`
pub fn assert_image_dimensions(path: &Path, width: u32, height: u32) {
    let (w, h) = image::image_dimensions(path)
        .unwrap_or_else(|e| panic!("{} is not a readable image: {e}", path.display()));
    assert_eq!(
        (w, h),
        (width, height),
        "{} has the wrong dimensions",
        path.display()
    );
}

/// Assert that the files in `dir` are exactly `expected` (any order)
pub fn assert_dir_contents(dir: &Path, expected: &[&str]) {
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(
        dir_names(dir),
        expected,
        "unexpected contents of {}",
        dir.display()
    );
}
