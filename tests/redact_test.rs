//! End-to-end tests for the redaction pipeline.

mod common;

use common::{build_pdf, media_boxes, visit_summary, TestPage};
use pdfredact::{
    extract, redact, scan, Category, ErrorKind, RedactOptions, RedactionRenderer,
    RedactionStrategy, Redactor, RuleSet, StampConfig,
};

fn baseline_redactor() -> Redactor {
    Redactor::new(RuleSet::baseline().unwrap(), StampConfig::default()).unwrap()
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn test_page_count_and_sizes_preserved() {
    let input = build_pdf(&[
        TestPage::letter().line(72.0, 700.0, 12.0, "Jane Doe"),
        TestPage::a4().line(72.0, 700.0, 12.0, "nothing here"),
        TestPage::sized(300.0, 400.0),
    ]);

    let output = redact(&input, &RuleSet::baseline().unwrap(), &StampConfig::default()).unwrap();

    assert_eq!(media_boxes(&output), media_boxes(&input));
    assert_eq!(extract(&output).unwrap().page_count(), 3);
}

#[test]
fn test_one_mark_per_matching_run() {
    let input = visit_summary();
    let redactor = baseline_redactor();

    let scanned = redactor.scan(&input).unwrap();
    let (_, report) = redactor.redact_with_report(&input).unwrap();

    assert_eq!(scanned.matches.len(), 3);
    assert_eq!(report.marks.len(), scanned.matches.len());
    for (mark, m) in report.marks.iter().zip(&scanned.matches) {
        assert_eq!(mark.page, m.page);
        assert!(mark.rect.contains(&m.run.user_space_bbox(792.0)));
        assert_eq!(mark.opacity, 1.0);
    }
}

#[test]
fn test_mark_geometry() {
    let input = build_pdf(&[TestPage::letter().line(72.0, 690.0, 12.0, "Dr. Alice Morgan")]);
    let (_, report) = baseline_redactor().redact_with_report(&input).unwrap();

    assert_eq!(report.marks.len(), 1);
    let rect = report.marks[0].rect;
    // Baseline 690, descent 0.2 em, height inflated 1.2x around the center
    assert!(approx(rect.x, 72.0));
    assert!(approx(rect.width, 89.352));
    assert!(approx(rect.y, 686.4));
    assert!(approx(rect.height, 14.4));
}

#[test]
fn test_mark_covers_wide_standard_font_glyphs() {
    // Helvetica referenced without a Widths array; capitals are far wider
    // than half an em
    let input = build_pdf(&[TestPage::letter().line(72.0, 700.0, 12.0, "WILLOW MEDICAL CENTER")]);
    let (_, report) = baseline_redactor().redact_with_report(&input).unwrap();

    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].rule, "institution_terms");
    let rect = report.marks[0].rect;
    // 13168/1000 em at 12pt
    let painted_right = 72.0 + 158.016;
    assert!(approx(rect.x, 72.0));
    assert!(
        rect.right() >= painted_right - 0.01,
        "mark ends at {} but text paints to {}",
        rect.right(),
        painted_right
    );
}

#[test]
fn test_overlay_placed_despite_unbalanced_saves() {
    // The page leaves a scaled CTM and two saves open at the end of its content
    let input = build_pdf(&[TestPage::letter()
        .prefix("q 0.5 0 0 0.5 0 0 cm q")
        .line(100.0, 1000.0, 12.0, "Jane Doe")]);

    let (output, report) = baseline_redactor().redact_with_report(&input).unwrap();

    assert_eq!(report.marks.len(), 1);
    let rect = report.marks[0].rect;
    assert!(approx(rect.x, 50.0));
    assert!(approx(rect.width, 25.68));

    let doc = extract(&output).unwrap();
    let stamp = doc.pages[0]
        .runs
        .iter()
        .find(|r| r.text == "HIPAA COMPLIANT")
        .expect("stamp missing");
    assert!(approx(stamp.x, 226.0), "stamp drawn at x={}", stamp.x);
    assert!(approx(stamp.baseline, 30.0), "stamp baseline at {}", stamp.baseline);
    assert!(approx(stamp.height, 20.0));

    let name = doc.pages[0].runs.iter().find(|r| r.text == "Jane Doe").unwrap();
    assert!(approx(name.x, 50.0));
}

#[test]
fn test_non_matching_runs_untouched() {
    let input = build_pdf(&[TestPage::letter()
        .line(72.0, 700.0, 12.0, "follow up in two weeks")
        .line(72.0, 680.0, 12.0, "VISIT SUMMARY")]);

    let (_, report) = baseline_redactor().redact_with_report(&input).unwrap();

    assert_eq!(report.runs_scanned, 2);
    assert!(report.matches.is_empty());
    assert!(report.marks.is_empty());
}

#[test]
fn test_stamp_on_every_page() {
    let input = visit_summary();
    let (output, report) = baseline_redactor().redact_with_report(&input).unwrap();

    assert_eq!(report.stamps.len(), 2);
    for (i, stamp) in report.stamps.iter().enumerate() {
        assert_eq!(stamp.page, i as u32 + 1);
        assert!(approx(stamp.x, 612.0 / 2.0 - 80.0));
        assert!(approx(stamp.y, 30.0));
    }

    let doc = extract(&output).unwrap();
    for page in &doc.pages {
        assert!(
            page.runs.iter().any(|r| r.text == "HIPAA COMPLIANT"),
            "no stamp on page {}",
            page.number
        );
    }
}

#[test]
fn test_zero_match_page_still_stamped() {
    let input = build_pdf(&[
        TestPage::letter().line(72.0, 700.0, 12.0, "Jane Doe"),
        TestPage::letter(),
    ]);
    let (_, report) = baseline_redactor().redact_with_report(&input).unwrap();

    assert_eq!(report.page_count, 2);
    assert!(report.marks.iter().all(|m| m.page == 1));
    assert_eq!(report.stamps.len(), 2);
}

#[test]
fn test_deterministic_output() {
    let input = visit_summary();
    let redactor = baseline_redactor();

    let (first, first_report) = redactor.redact_with_report(&input).unwrap();
    let (second, second_report) = redactor.redact_with_report(&input).unwrap();

    assert_eq!(first_report, second_report);
    assert_eq!(first, second);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let input = visit_summary();
    let rules = RuleSet::baseline().unwrap();

    let parallel = Redactor::with_options(
        rules.clone(),
        StampConfig::default(),
        RedactOptions::new().with_threads(2),
    )
    .unwrap();
    let sequential =
        Redactor::with_options(rules, StampConfig::default(), RedactOptions::new().sequential())
            .unwrap();

    let (_, a) = parallel.redact_with_report(&input).unwrap();
    let (_, b) = sequential.redact_with_report(&input).unwrap();
    assert_eq!(a.marks, b.marks);
}

#[test]
fn test_first_rule_wins() {
    let input = visit_summary();
    let report = scan(&input, &RuleSet::baseline().unwrap()).unwrap();

    let rules: Vec<(&str, &Category)> = report
        .matches
        .iter()
        .map(|m| (m.rule.as_str(), &m.category))
        .collect();
    assert_eq!(
        rules,
        vec![
            ("honorific_name", &Category::Name),
            ("slash_date", &Category::Date),
            ("institution_terms", &Category::Institution),
        ]
    );
}

#[test]
fn test_empty_rule_set_only_stamps() {
    let input = visit_summary();
    let redactor = Redactor::new(RuleSet::empty(), StampConfig::default()).unwrap();
    let (_, report) = redactor.redact_with_report(&input).unwrap();

    assert!(report.marks.is_empty());
    assert_eq!(report.stamps.len(), 2);
}

#[test]
fn test_rotated_page_uses_unrotated_space() {
    let upright = build_pdf(&[TestPage::letter().line(72.0, 700.0, 12.0, "Jane Doe")]);
    let rotated = build_pdf(&[TestPage::letter()
        .rotated(90)
        .line(72.0, 700.0, 12.0, "Jane Doe")]);

    let (_, a) = baseline_redactor().redact_with_report(&upright).unwrap();
    let (_, b) = baseline_redactor().redact_with_report(&rotated).unwrap();

    assert_eq!(a.marks, b.marks);
    assert!(extract(&rotated).unwrap().pages[0].is_rotated());
}

#[test]
fn test_overlay_guarantee_reported() {
    let (output, report) = baseline_redactor().redact_with_report(&visit_summary()).unwrap();

    assert_eq!(report.strategy, RedactionStrategy::VisualOverlay);
    assert!(report.guarantee.contains("remains"));
    assert_eq!(report.operators_removed, 0);

    // The text is covered, not removed
    assert_eq!(scan(&output, &RuleSet::baseline().unwrap()).unwrap().matches.len(), 3);
}

#[test]
fn test_content_removal_strips_matched_text() {
    let input = visit_summary();
    let redactor = Redactor::with_options(
        RuleSet::baseline().unwrap(),
        StampConfig::default(),
        RedactOptions::new().with_strategy(RedactionStrategy::ContentRemoval),
    )
    .unwrap();

    let (output, report) = redactor.redact_with_report(&input).unwrap();
    assert_eq!(report.operators_removed, 3);
    assert_eq!(report.marks.len(), 3);

    let rescan = scan(&output, &RuleSet::baseline().unwrap()).unwrap();
    assert!(rescan.matches.is_empty());

    let texts: Vec<String> = extract(&output)
        .unwrap()
        .runs()
        .map(|(_, run)| run.text.clone())
        .collect();
    assert!(texts.contains(&"follow up in two weeks".to_string()));
    assert!(texts.contains(&"no further notes".to_string()));
    assert!(!texts.iter().any(|t| t.contains("Morgan")));
}

#[test]
fn test_custom_stamp_text() {
    let input = build_pdf(&[TestPage::letter()]);
    let redactor = Redactor::new(RuleSet::baseline().unwrap(), StampConfig::new("REDACTED")).unwrap();
    let output = redactor.redact(&input).unwrap();

    let doc = extract(&output).unwrap();
    assert!(doc.pages[0].runs.iter().any(|r| r.text == "REDACTED"));
}

#[test]
fn test_input_not_modified() {
    let input = visit_summary();
    let copy = input.clone();
    let _ = baseline_redactor().redact(&input).unwrap();
    assert_eq!(input, copy);
}

#[test]
fn test_error_kinds() {
    let redactor = baseline_redactor();

    let err = redactor.redact(b"<html></html>").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = redactor.redact(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = Redactor::new(RuleSet::baseline().unwrap(), StampConfig::new("")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationError);
}

#[test]
fn test_encrypted_input_rejected() {
    use lopdf::dictionary;
    let mut doc = lopdf::Document::load_mem(&visit_summary()).unwrap();
    let encrypt_id = doc.add_object(lopdf::dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => lopdf::Object::string_literal(vec![0u8; 32]),
        "U" => lopdf::Object::string_literal(vec![0u8; 32]),
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();

    let err = baseline_redactor().redact(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_geometry_outside_page_is_render_failure() {
    let input = build_pdf(&[TestPage::letter().line(900.0, 700.0, 12.0, "Jane Doe")]);
    let err = baseline_redactor().redact(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RenderFailure);
}

#[test]
fn test_renderer_rejects_foreign_page() {
    let input = visit_summary();
    let mut matches = scan(&input, &RuleSet::baseline().unwrap()).unwrap().matches;
    matches[0].page = 9;

    let err = RedactionRenderer::default().render(&input, &matches).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RenderFailure);
}
