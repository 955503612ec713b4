//! Plan building: keyword extraction, highlight selection, the daily
//! schedule and recommendations.

pub mod dates;
pub mod highlights;
pub mod keywords;
pub mod recommendations;

use chrono::Days;

use crate::model::{AttachmentSummary, ClientInfo, DayEntry, Plan, TripInfo, TripRequest};

pub use highlights::Highlight;
pub use keywords::extract_keywords;
pub use recommendations::build_recommendations;

/// Build a plan from a validated request and the text extracted from its
/// attachments.
pub fn build(
    request: &TripRequest,
    extracted_text: &str,
    attachments: Vec<AttachmentSummary>,
) -> Plan {
    let keywords = extract_keywords(extracted_text, request.destination_name());
    let selected = highlights::select(&keywords, request.style());
    let days = build_schedule(request, &selected);
    let recommendations = build_recommendations(request, &keywords);

    tracing::info!(
        client = request.client_name(),
        destination = request.destination_name(),
        days = days.len(),
        highlights = selected.len(),
        attachments = attachments.len(),
        "built plan"
    );

    Plan {
        client: ClientInfo {
            name: request.client_name().to_owned(),
            style: request.style().to_owned(),
            special_requests: request.requests().to_owned(),
        },
        trip: TripInfo {
            destination: request.destination_name().to_owned(),
            start_date: dates::trip_label(request.start_date()),
            end_date: dates::trip_label(request.end_date()),
            nights: request.total_days(),
        },
        days,
        recommendations,
        attachments,
    }
}

/// One entry per calendar day, cycling through `selected`.
fn build_schedule(request: &TripRequest, selected: &[&Highlight]) -> Vec<DayEntry> {
    let placeholder = Highlight::free_exploration();

    (0..request.total_days())
        .map(|offset| {
            let date = request.start_date() + Days::new(u64::from(offset));
            let highlight = if selected.is_empty() {
                &placeholder
            } else {
                selected[offset as usize % selected.len()]
            };
            DayEntry {
                date: dates::day_label(date),
                title: format!("Día {} - {}", offset + 1, highlight.title),
                summary: highlight.summary.clone(),
                morning: highlight.morning.clone(),
                afternoon: highlight.afternoon.clone(),
                evening: highlight.evening.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn request(start: (i32, u32, u32), end: (i32, u32, u32)) -> TripRequest {
        let start = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
        let end = NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap();
        TripRequest::new("Ana", start, end).unwrap().destination("Roma")
    }

    #[test]
    fn schedule_cycles_through_highlights() {
        let req = request((2024, 1, 1), (2024, 1, 6));
        let plan = build(&req, "", Vec::new());
        let titles: Vec<_> = plan.days.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Día 1 - Bienvenida y aclimatación",
                "Día 2 - Cultura y patrimonio",
                "Día 3 - Sabores locales",
                "Día 4 - Bienestar y desconexión",
                "Día 5 - Bienvenida y aclimatación",
                "Día 6 - Cultura y patrimonio",
            ]
        );
    }

    #[test]
    fn empty_selection_uses_free_exploration() {
        let req = request((2024, 1, 1), (2024, 1, 2));
        let days = build_schedule(&req, &[]);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].title, "Día 1 - Exploración libre");
        assert!(days[0].morning.is_empty());
        assert!(days[1].evening.is_empty());
    }

    #[test]
    fn schedule_crosses_month_boundaries() {
        let req = request((2024, 1, 30), (2024, 2, 2));
        let plan = build(&req, "", Vec::new());
        assert_eq!(plan.days.len(), 4);
        assert_eq!(plan.trip.nights, 4);
    }

    #[test]
    fn client_and_trip_info_are_copied() {
        let req = request((2024, 3, 1), (2024, 3, 3))
            .travel_style("Lujo")
            .special_requests("sin gluten");
        let plan = build(&req, "", Vec::new());
        assert_eq!(plan.client.name, "Ana");
        assert_eq!(plan.client.style, "Lujo");
        assert_eq!(plan.client.special_requests, "sin gluten");
        assert_eq!(plan.trip.destination, "Roma");
        assert!(plan.trip.start_date.contains("2024"));
    }
}
