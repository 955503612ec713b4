//! Recommendation rules.
//!
//! Rules run first, all of them, in a fixed order. Any category still empty
//! afterwards receives its default, so every category ends up non-empty.

use std::collections::BTreeSet;

use crate::model::{RecommendationCategory, Recommendations, TripRequest};

const FAMILY_KEYWORDS: &[&str] = &["family", "familia"];
const BUSINESS_KEYWORDS: &[&str] = &["negocio", "corporativo"];
const GASTRONOMY_STEM: &str = "gastronom";
const LUXURY_STYLES: &[&str] = &["premium", "lujo", "luxury"];

pub const FAMILY_GUIDE: &str = "Reservar actividades con guía privado enfocado en familias para maximizar seguridad y aprendizaje.";
pub const FLEXIBLE_TRANSFERS: &str =
    "Incluir tiempos de traslado flexibles y salas de reuniones en cada hotel seleccionado.";
pub const CULINARY_EXPERIENCES: &str = "Coordinar experiencias culinarias con chefs locales y reservas anticipadas en restaurantes icónicos.";
pub const SPA_RITUALS: &str = "Añadir tratamientos de spa o rituales de bienestar exclusivos en los hoteles boutique seleccionados.";

/// Fallback for a category that no rule filled.
pub fn default_for(category: RecommendationCategory) -> &'static str {
    match category {
        RecommendationCategory::Gastronomy => {
            "Programar una cena de bienvenida con degustación regional y maridaje de vinos locales."
        }
        RecommendationCategory::Logistics => {
            "Gestionar traslados privados puerta a puerta con asistencia multilingüe."
        }
        RecommendationCategory::Wellness => {
            "Bloquear espacios de tiempo para actividades regenerativas como yoga al amanecer o masajes signature."
        }
        RecommendationCategory::Insider => {
            "Ofrecer un concierge 24/7 para ajustes de último minuto y acceso a experiencias exclusivas."
        }
    }
}

fn contains_any(keywords: &BTreeSet<String>, candidates: &[&str]) -> bool {
    candidates.iter().any(|c| keywords.contains(*c))
}

/// Build the recommendation bundle for a request and its keyword set.
pub fn build_recommendations(
    request: &TripRequest,
    keywords: &BTreeSet<String>,
) -> Recommendations {
    use RecommendationCategory::*;

    let mut recs = Recommendations::default();

    if contains_any(keywords, FAMILY_KEYWORDS) {
        recs.list_mut(Insider).push(FAMILY_GUIDE.to_owned());
    }
    if contains_any(keywords, BUSINESS_KEYWORDS) {
        recs.list_mut(Logistics).push(FLEXIBLE_TRANSFERS.to_owned());
    }
    if keywords.iter().any(|kw| kw.contains(GASTRONOMY_STEM)) {
        recs.list_mut(Gastronomy).push(CULINARY_EXPERIENCES.to_owned());
    }
    if LUXURY_STYLES.contains(&request.style().to_lowercase().as_str()) {
        recs.list_mut(Wellness).push(SPA_RITUALS.to_owned());
    }
    if !request.requests().is_empty() {
        recs.list_mut(Insider).push(format!(
            "Considerar peticiones especiales: {}.",
            request.requests()
        ));
    }

    for category in RecommendationCategory::ALL {
        let list = recs.list_mut(category);
        if list.is_empty() {
            list.push(default_for(category).to_owned());
        }
    }

    recs
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::plan::keywords::extract_keywords;

    fn request(style: &str, special: &str) -> TripRequest {
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        TripRequest::new("Ana", day, day)
            .unwrap()
            .destination("Roma")
            .travel_style(style)
            .special_requests(special)
    }

    #[test]
    fn defaults_fill_every_category() {
        let req = request("Mochilero", "");
        let recs = build_recommendations(&req, &extract_keywords("", "Roma"));
        for (category, items) in recs.iter() {
            assert_eq!(items, [default_for(category)], "category {category}");
        }
    }

    #[test]
    fn luxury_style_adds_spa() {
        for style in ["Premium", "LUJO", "luxury"] {
            let req = request(style, "");
            let recs = build_recommendations(&req, &extract_keywords("", "Roma"));
            assert_eq!(recs.wellness, [SPA_RITUALS], "style {style}");
        }
    }

    #[test]
    fn family_and_special_requests_share_insider_in_rule_order() {
        let req = request("Premium", "habitaciones contiguas");
        let recs = build_recommendations(&req, &extract_keywords("viaje en familia", "Roma"));
        assert_eq!(
            recs.insider,
            [
                FAMILY_GUIDE.to_owned(),
                "Considerar peticiones especiales: habitaciones contiguas.".to_owned(),
            ]
        );
    }

    #[test]
    fn business_keywords_add_logistics() {
        let req = request("Premium", "");
        let recs = build_recommendations(&req, &extract_keywords("viaje corporativo", "Roma"));
        assert_eq!(recs.logistics, [FLEXIBLE_TRANSFERS]);
    }

    #[test]
    fn gastronomy_matches_substring() {
        let req = request("Premium", "");
        let recs =
            build_recommendations(&req, &extract_keywords("ruta gastronómica", "Roma"));
        assert_eq!(recs.gastronomy, [CULINARY_EXPERIENCES]);
    }
}
