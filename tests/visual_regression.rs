//! # Visual Regression Tests
//!
//! Renders PDF documents to PNG via `pdftoppm` (from Poppler), then compares
//! pixel-by-pixel against stored reference images. Skips gracefully when
//! `pdftoppm` is not installed.
//!
//! Feature-gated behind `visual-tests`:
//! ```bash
//! cargo test --features visual-tests
//! ```
//!
//! To update reference images:
//! ```bash
//! PLATEN_UPDATE_REFERENCES=1 cargo test --features visual-tests
//! ```

#![cfg(feature = "visual-tests")]

use image::GenericImageView;
use std::path::PathBuf;
use std::process::Command;

// ── Helpers ────────────────────────────────────────────────────

/// Check if pdftoppm is available.
fn pdftoppm_available() -> bool {
    Command::new("pdftoppm")
        .arg("-v")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Render PDF bytes to PNG images (one per page) using pdftoppm.
fn pdf_to_pngs(pdf_bytes: &[u8], dpi: u32) -> Vec<Vec<u8>> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_dir = std::env::temp_dir().join(format!("platen_visual_tests_{}", id));
    std::fs::create_dir_all(&tmp_dir).unwrap();

    let pdf_path = tmp_dir.join("test.pdf");
    std::fs::write(&pdf_path, pdf_bytes).unwrap();

    let output_prefix = tmp_dir.join("page");

    let status = Command::new("pdftoppm")
        .args([
            "-r",
            &dpi.to_string(),
            "-png",
            pdf_path.to_str().unwrap(),
            output_prefix.to_str().unwrap(),
        ])
        .status()
        .expect("Failed to run pdftoppm");
    assert!(status.success(), "pdftoppm failed");

    // Collect output PNGs (named page-1.png, page-2.png, etc.)
    let mut pages = Vec::new();
    for i in 1..=100 {
        // pdftoppm can pad with different digit counts
        let candidates = [
            tmp_dir.join(format!("page-{}.png", i)),
            tmp_dir.join(format!("page-{:02}.png", i)),
            tmp_dir.join(format!("page-{:03}.png", i)),
        ];
        if let Some(path) = candidates.iter().find(|p| p.exists()) {
            pages.push(std::fs::read(path).unwrap());
        } else {
            break;
        }
    }

    // Cleanup temp files
    let _ = std::fs::remove_dir_all(&tmp_dir);

    pages
}

/// Compare two PNG images pixel-by-pixel. Returns the ratio of differing pixels.
fn compare_images(actual: &[u8], reference: &[u8]) -> f64 {
    let actual_img = image::load_from_memory(actual).expect("Failed to load actual PNG");
    let ref_img = image::load_from_memory(reference).expect("Failed to load reference PNG");

    let (w1, h1) = actual_img.dimensions();
    let (w2, h2) = ref_img.dimensions();

    if w1 != w2 || h1 != h2 {
        return 1.0; // Different dimensions = 100% different
    }

    let total_pixels = (w1 * h1) as f64;
    if total_pixels == 0.0 {
        return 0.0;
    }

    let actual_rgba = actual_img.to_rgba8();
    let ref_rgba = ref_img.to_rgba8();

    let mut diff_pixels = 0u64;
    for (a, b) in actual_rgba.pixels().zip(ref_rgba.pixels()) {
        // Allow small tolerance per channel (anti-aliasing can differ)
        let differs =
            a.0.iter()
                .zip(b.0.iter())
                .any(|(c1, c2)| (*c1 as i32 - *c2 as i32).unsigned_abs() > 2);
        if differs {
            diff_pixels += 1;
        }
    }

    diff_pixels as f64 / total_pixels
}

/// Get the references directory path for a test.
fn references_dir(test_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("references")
        .join(test_name)
}

/// Assert visual match against reference images, or save new references.
fn assert_visual_match(pdf_bytes: &[u8], test_name: &str, threshold: f64) {
    if !pdftoppm_available() {
        eprintln!(
            "SKIPPING visual test '{}': pdftoppm not installed (install poppler-utils)",
            test_name
        );
        return;
    }

    let actual_pages = pdf_to_pngs(pdf_bytes, 150);
    let ref_dir = references_dir(test_name);
    let update = std::env::var("PLATEN_UPDATE_REFERENCES").is_ok();

    if update {
        // Save/overwrite reference images
        std::fs::create_dir_all(&ref_dir).unwrap();
        for (i, page) in actual_pages.iter().enumerate() {
            let path = ref_dir.join(format!("page-{}.png", i + 1));
            std::fs::write(&path, page).unwrap();
            eprintln!("Updated reference: {}", path.display());
        }
        return;
    }

    // Compare against references
    for (i, actual) in actual_pages.iter().enumerate() {
        let ref_path = ref_dir.join(format!("page-{}.png", i + 1));
        if !ref_path.exists() {
            panic!(
                "No reference image for '{}' page {}. Run with PLATEN_UPDATE_REFERENCES=1 to create.",
                test_name,
                i + 1
            );
        }

        let reference = std::fs::read(&ref_path).unwrap();
        let diff_ratio = compare_images(actual, &reference);
        assert!(
            diff_ratio <= threshold,
            "Visual regression in '{}' page {}: {:.2}% pixels differ (threshold: {:.2}%)",
            test_name,
            i + 1,
            diff_ratio * 100.0,
            threshold * 100.0
        );
    }
}

// ── Helpers to build test requests ─────────────────────────────

fn report_request_json() -> &'static str {
    r#"{
        "metadata": { "title": "Development Report", "author": "Visual Suite" },
        "payload": {
            "identity": { "fullName": "Jordan Reyes", "dateLabel": "March 2026" },
            "bands": { "Openness": 7, "Resilience": 9, "Drive": 6 },
            "text": {
                "exec_summary": "Strong start to the quarter with visible momentum on the platform work.\n\nThe pace occasionally outruns the team; slowing down at decision points would bring more people along.",
                "exec_summary_q1": "Which recent decision most needed another voice?",
                "exec_summary_q2": "Where does speed serve you, and where does it cost you?",
                "ctrl_overview": "Scores cluster in the upper band. Resilience stands out. Under pressure the default is to absorb more rather than redistribute.",
                "ctrl_overview_q1": "What would you hand off first if you had to?",
                "adapt_with_colleagues": "Narrate the thinking, not only the conclusion. Colleagues read silence as distance.",
                "adapt_with_leaders": "Name the risk you are carrying before you are asked about it.",
                "actions1": "Book the quarterly review with a written agenda.",
                "actions2": "Pick one meeting per week to only listen.",
                "actions3": "Write the handoff list before the next crunch."
            }
        }
    }"#
}

// ── Visual regression test cases ──────────────────────────────

#[test]
fn visual_full_report() {
    let pdf = platen::render_json(report_request_json()).unwrap();
    assert_visual_match(&pdf, "visual_full_report", 0.01);
}

#[test]
fn visual_override_moves_name_box() {
    let json = r#"{
        "payload": { "fullName": "Jordan Reyes", "dateLbl": "March 2026" },
        "overrides": [
            { "label": "moved", "pairs": {
                "L_p1_fullName_y": 200,
                "L_p1_fullName_align": "center",
                "L_p1_fullName_size": 30
            } }
        ],
        "pageCount": 1
    }"#;
    let pdf = platen::render_json(json).unwrap();
    assert_visual_match(&pdf, "visual_override_moves_name_box", 0.01);
}

#[test]
fn visual_render_is_deterministic() {
    // Proves byte-level and pixel-level stability across runs
    let first = platen::render_json(report_request_json()).unwrap();
    let second = platen::render_json(report_request_json()).unwrap();
    assert_eq!(first, second, "same request must yield identical bytes");

    if !pdftoppm_available() {
        eprintln!("SKIPPING visual_render_is_deterministic: pdftoppm not installed");
        return;
    }

    let pages_first = pdf_to_pngs(&first, 150);
    let pages_second = pdf_to_pngs(&second, 150);

    assert_eq!(pages_first.len(), pages_second.len());
    for (i, (a, b)) in pages_first.iter().zip(pages_second.iter()).enumerate() {
        let diff = compare_images(a, b);
        assert!(
            diff <= 0.001,
            "Re-render differs on page {}: {:.4}% pixels",
            i + 1,
            diff * 100.0
        );
    }
}
