//! Integration tests for plan building, from extracted attachments through
//! to the finished plan.

use itinera_core::plan::highlights;
use itinera_core::plan::recommendations::{FAMILY_GUIDE, SPA_RITUALS};
use itinera_core::{RecommendationCategory, TripRequest, build, extract};
use itinera_test_utils::{date, text_upload, trip_request};

#[test]
fn day_count_matches_inclusive_range() {
    let cases = [
        ("2024-03-01", "2024-03-01", 1),
        ("2024-03-01", "2024-03-03", 3),
        ("2024-02-20", "2024-03-05", 15),
        ("2023-12-30", "2024-01-02", 4),
    ];
    for (start, end, expected) in cases {
        let plan = build(&trip_request("Ana", start, end), "", Vec::new());
        assert_eq!(plan.days.len(), expected, "{start}..{end}");
        assert_eq!(plan.trip.nights as usize, expected, "{start}..{end}");
    }
}

#[test]
fn every_category_is_non_empty() {
    let texts = [
        "",
        "familia negocio gastronomía",
        "aventura por la montaña",
        "corporativo",
    ];
    for style in ["Premium", "Aventura", "mochilero", ""] {
        for text in texts {
            let req = trip_request("Ana", "2024-05-01", "2024-05-02").travel_style(style);
            let plan = build(&req, text, Vec::new());
            for category in RecommendationCategory::ALL {
                assert!(
                    !plan.recommendations.get(category).is_empty(),
                    "{category} empty for style {style:?} text {text:?}"
                );
            }
        }
    }
}

#[test]
fn single_adventure_theme_repeats_every_day() {
    let adventure = highlights::by_key("adventure").unwrap();
    let req = trip_request("Ana", "2024-06-01", "2024-06-05");
    let plan = build(&req, "Queremos aventura en la naturaleza", Vec::new());
    assert_eq!(plan.days.len(), 5);
    for (i, day) in plan.days.iter().enumerate() {
        assert_eq!(day.title, format!("Día {} - {}", i + 1, adventure.title));
        assert_eq!(day.summary, adventure.summary);
        assert_eq!(day.morning, adventure.morning);
        assert_eq!(day.afternoon, adventure.afternoon);
        assert_eq!(day.evening, adventure.evening);
    }
}

#[test]
fn adventure_style_schedules_adventure_first() {
    let req = trip_request("Ana", "2024-06-01", "2024-06-04").travel_style("aventura");
    let plan = build(&req, "arte cultura aventura historia", Vec::new());
    assert!(plan.days[0].title.contains("Aventura"), "{}", plan.days[0].title);
    assert!(!plan.days[1].title.contains("Aventura"));
}

#[test]
fn family_text_attachment_adds_family_guide() {
    let mut uploads = vec![text_upload("notes.txt", "family trip to Paris")];
    let (text, summaries) = extract(&mut uploads);
    let req = trip_request("Ana", "2024-07-01", "2024-07-03");
    let plan = build(&req, &text, summaries);

    assert!(plan.recommendations.insider.iter().any(|s| s == FAMILY_GUIDE));
    assert_eq!(plan.attachments.len(), 1);
    assert_eq!(plan.attachments[0].filename, "notes.txt");
}

#[test]
fn ana_in_roma_end_to_end() {
    let req = TripRequest::new("Ana", date("2024-03-01"), date("2024-03-03"))
        .unwrap()
        .destination("Roma")
        .travel_style("Premium")
        .special_requests("");
    let plan = build(&req, "", Vec::new());

    assert_eq!(plan.trip.nights, 3);
    assert_eq!(plan.days.len(), 3);
    assert!(plan.recommendations.wellness.iter().any(|s| s == SPA_RITUALS));
    assert!(plan.attachments.is_empty());
    assert_eq!(plan.days[0].title, "Día 1 - Bienvenida y aclimatación");
}

#[test]
fn building_is_deterministic() {
    let req = trip_request("Ana", "2024-03-01", "2024-03-09").travel_style("Lujo");
    let text = "historia relax gastronomía arte";
    assert_eq!(build(&req, text, Vec::new()), build(&req, text, Vec::new()));
}
