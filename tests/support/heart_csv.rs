use std::path::Path;

use heartwise::patient::{FEATURE_NAMES, TARGET_COLUMN};

/// Write a separable synthetic heart dataset with `rows` distinct rows, one
/// exact duplicate, and one row with a missing value.
pub fn write_heart_csv(path: &Path, rows: usize) {
    let mut text = FEATURE_NAMES.join(",");
    text.push(',');
    text.push_str(TARGET_COLUMN);
    text.push('\n');
    for i in 0..rows {
        text.push_str(&synthetic_row(i));
        text.push('\n');
    }
    text.push_str(&synthetic_row(0));
    text.push('\n');
    text.push_str("54,1,NA,130,250,0,1,150,0,1.0,1,0,2,1\n");
    std::fs::write(path, text).expect("write csv");
}

fn synthetic_row(i: usize) -> String {
    let target = i % 2;
    let cp = if target == 1 { 2 + i % 2 } else { (i / 2) % 2 };
    let thalach = if target == 1 { 160 + i % 20 } else { 120 + i % 20 };
    format!(
        "{},{},{},{},{},{},{},{},{},{:.1},{},{},{},{}",
        40 + (i * 7) % 30,
        (i / 3) % 2,
        cp,
        110 + (i * 13) % 50,
        180 + (i * 17) % 120,
        (i / 5) % 2,
        i % 3,
        thalach,
        1 - target,
        (i % 25) as f64 / 10.0,
        i % 3,
        i % 4,
        1 + i % 3,
        target
    )
}
