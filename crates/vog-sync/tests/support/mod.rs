#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;

/// Every file in `dir` with its content, for byte-level comparisons.
pub fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().into_string().unwrap(),
                std::fs::read(entry.path()).unwrap(),
            )
        })
        .collect()
}

pub fn file_names(dir: &Path) -> Vec<String> {
    snapshot(dir).into_keys().collect()
}

pub fn modified(path: &Path) -> SystemTime {
    std::fs::metadata(path).unwrap().modified().unwrap()
}
