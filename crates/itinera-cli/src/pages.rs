//! HTML pages rendered with minijinja.
//!
//! Templates are embedded at compile time and autoescaped (every name ends
//! in `.html`).

use std::sync::LazyLock;

use minijinja::{Environment, context};
use serde::Serialize;

use itinera_core::flash::FlashMessage;
use itinera_core::{Plan, PlanId};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("itinerary.html", include_str!("../templates/itinerary.html")),
    ("error.html", include_str!("../templates/error.html")),
];

static ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!(template = name, error = %e, "failed to load template");
        }
    }
    env
});

#[derive(Serialize)]
struct FlashView<'a> {
    level: String,
    message: &'a str,
}

#[derive(Serialize)]
struct CategoryView<'a> {
    label: &'static str,
    items: &'a [String],
}

/// The request form, optionally with a pending flash message.
pub fn index(flash: Option<&FlashMessage>) -> Result<String, minijinja::Error> {
    let flash = flash.map(|f| FlashView {
        level: f.level.to_string(),
        message: &f.message,
    });
    ENV.get_template("index.html")?.render(context! { flash })
}

/// The generated plan with a link to its PDF download.
pub fn itinerary(plan: &Plan, id: &PlanId) -> Result<String, minijinja::Error> {
    let recommendations: Vec<CategoryView<'_>> = plan
        .recommendations
        .iter()
        .map(|(category, items)| CategoryView {
            label: category.label(),
            items,
        })
        .collect();
    ENV.get_template("itinerary.html")?.render(context! {
        plan,
        recommendations,
        itinerary_id => id.to_string(),
    })
}

/// Error page for `status`. Falls back to plain markup if the template
/// itself cannot be rendered.
pub fn error(status: u16, message: &str) -> String {
    ENV.get_template("error.html")
        .and_then(|t| t.render(context! { status, error_message => message }))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to render error page");
            format!("<!DOCTYPE html><html><body><h1>Error {status}</h1></body></html>")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use itinera_core::{AttachmentSummary, TripRequest, build};

    fn sample_plan(client: &str) -> Plan {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let request = TripRequest::new(client, start, end).unwrap().destination("Roma");
        let attachments = vec![AttachmentSummary {
            filename: "notas.txt".into(),
            content_type: "text/plain".into(),
            notes: "Texto leído correctamente.".into(),
        }];
        build(&request, "", attachments)
    }

    #[test]
    fn all_templates_load() {
        for (name, _) in TEMPLATES {
            assert!(ENV.get_template(name).is_ok(), "template {name} failed to load");
        }
    }

    #[test]
    fn index_without_flash_has_form() {
        let html = index(None).unwrap();
        assert!(html.contains("action=\"/generate\""));
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(!html.contains("class=\"flash"));
    }

    #[test]
    fn index_shows_flash() {
        let flash = FlashMessage::error("La fecha de fin debe ser posterior a la fecha de inicio.");
        let html = index(Some(&flash)).unwrap();
        assert!(html.contains("flash-error"));
        assert!(html.contains("La fecha de fin debe ser posterior"));
    }

    #[test]
    fn itinerary_lists_days_and_download_link() {
        let plan = sample_plan("Ana");
        let id = PlanId::new_random();
        let html = itinerary(&plan, &id).unwrap();

        assert!(html.contains(&format!("/itinerary/{id}/pdf")));
        assert_eq!(html.matches("<article>").count(), plan.days.len());
        assert!(html.contains("Gastronomy"));
        assert!(html.contains("Documentos recibidos"));
        assert!(html.contains("notas.txt"));
    }

    #[test]
    fn user_text_is_escaped() {
        let plan = sample_plan("<script>alert(1)</script>");
        let html = itinerary(&plan, &PlanId::new_random()).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn error_page_shows_message() {
        let html = error(404, "Página no encontrada");
        assert!(html.contains("Página no encontrada"));
        assert!(html.contains("Error 404"));
    }
}
