//! The compiled default layout for the seven-page coaching report template.
//!
//! Page keys are groups, not page numbers: `p5` and `p5Themes` both target
//! physical page 4, and the work-with columns and their questions split
//! across `p6WorkWith`/`p6Q` on page 5, so each group stays independently
//! overridable. Coordinates are authoring-space points on the template's
//! 612 x 1100 artwork.

use std::collections::BTreeMap;

use crate::model::{Align, BoxSpec, LayoutTable, PageEntry};

fn text_box(x: f64, y: f64, w: f64, h: f64, size: f64, max_lines: u32) -> BoxSpec {
    BoxSpec {
        x,
        y,
        w,
        h,
        size,
        line_gap: 2.0,
        align: Align::Left,
        max_lines: Some(max_lines),
        pad: 0.0,
        auto_expand: true,
    }
}

fn centered(mut spec: BoxSpec) -> BoxSpec {
    spec.align = Align::Center;
    spec
}

fn page(index: usize, boxes: Vec<(&str, BoxSpec)>) -> PageEntry {
    let boxes: BTreeMap<String, BoxSpec> = boxes
        .into_iter()
        .map(|(key, spec)| (key.to_string(), spec))
        .collect();
    PageEntry { index, boxes }
}

/// Builds a fresh copy of the built-in table.
pub fn default_layout() -> LayoutTable {
    let mut pages = BTreeMap::new();

    pages.insert(
        "p1".to_string(),
        page(
            0,
            vec![
                ("fullName", centered(text_box(40.0, 140.0, 532.0, 60.0, 32.0, 2))),
                ("dateLabel", centered(text_box(40.0, 210.0, 532.0, 30.0, 14.0, 1))),
            ],
        ),
    );

    pages.insert(
        "p2Chart".to_string(),
        page(1, vec![("spiderChart", text_box(106.0, 260.0, 400.0, 400.0, 12.0, 1))]),
    );

    pages.insert(
        "p3".to_string(),
        page(
            2,
            vec![
                ("domDesc", text_box(40.0, 120.0, 532.0, 60.0, 15.0, 3)),
                ("execP1", text_box(40.0, 200.0, 532.0, 220.0, 13.0, 11)),
                ("execP2", text_box(40.0, 430.0, 532.0, 220.0, 13.0, 11)),
                ("execQ1", text_box(40.0, 870.0, 532.0, 40.0, 13.0, 2)),
                ("execQ2", text_box(40.0, 920.0, 532.0, 40.0, 13.0, 2)),
                ("execQ3", text_box(40.0, 970.0, 532.0, 40.0, 13.0, 2)),
                ("execQ4", text_box(40.0, 1020.0, 532.0, 40.0, 13.0, 2)),
            ],
        ),
    );

    pages.insert(
        "p4".to_string(),
        page(
            3,
            vec![
                ("ovP1", text_box(40.0, 160.0, 532.0, 240.0, 13.0, 12)),
                ("ovP2", text_box(40.0, 410.0, 532.0, 240.0, 13.0, 12)),
                ("ovQ1", text_box(40.0, 940.0, 532.0, 40.0, 13.0, 2)),
                ("ovQ2", text_box(40.0, 990.0, 532.0, 40.0, 13.0, 2)),
            ],
        ),
    );

    pages.insert(
        "p5".to_string(),
        page(
            4,
            vec![
                ("ddP1", text_box(40.0, 150.0, 532.0, 230.0, 13.0, 11)),
                ("ddP2", text_box(40.0, 390.0, 532.0, 230.0, 13.0, 11)),
                ("ddQ1", text_box(40.0, 640.0, 532.0, 40.0, 13.0, 2)),
                ("ddQ2", text_box(40.0, 690.0, 532.0, 40.0, 13.0, 2)),
            ],
        ),
    );

    pages.insert(
        "p5Themes".to_string(),
        page(
            4,
            vec![
                ("thP1", text_box(40.0, 760.0, 532.0, 120.0, 12.0, 6)),
                ("thP2", text_box(40.0, 890.0, 532.0, 120.0, 12.0, 6)),
                ("thQ1", text_box(40.0, 1010.0, 532.0, 35.0, 12.0, 2)),
                ("thQ2", text_box(40.0, 1050.0, 532.0, 35.0, 12.0, 2)),
            ],
        ),
    );

    pages.insert(
        "p6WorkWith".to_string(),
        page(
            5,
            vec![
                ("collabC", text_box(30.0, 300.0, 270.0, 420.0, 14.0, 14)),
                ("collabT", text_box(320.0, 300.0, 260.0, 420.0, 14.0, 14)),
            ],
        ),
    );

    pages.insert(
        "p6Q".to_string(),
        page(
            5,
            vec![
                ("workwith_colleagues_q", text_box(40.0, 990.0, 520.0, 40.0, 13.0, 2)),
                ("workwith_leaders_q", text_box(40.0, 1040.0, 520.0, 40.0, 13.0, 2)),
            ],
        ),
    );

    pages.insert(
        "p7Actions".to_string(),
        page(
            6,
            vec![
                ("act1", text_box(40.0, 200.0, 532.0, 240.0, 13.0, 12)),
                ("act2", text_box(40.0, 460.0, 532.0, 240.0, 13.0, 12)),
                ("act3", text_box(40.0, 720.0, 532.0, 240.0, 13.0, 12)),
            ],
        ),
    );

    LayoutTable { pages }
}
