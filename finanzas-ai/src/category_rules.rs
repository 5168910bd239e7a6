//! Deterministic keyword rules mapping bank concepts to category/subcategory.
//!
//! Works offline; good enough for the usual Spanish bank-export concepts
//! (supermarkets, payroll, rent, utilities, streaming).

use tracing::debug;

use crate::error::Result;
use crate::service::{CategorizationRequest, CategorizationService, Suggestion};

pub const FALLBACK_CATEGORY: &str = "Other";
pub const FALLBACK_SUBCATEGORY: &str = "Misc";

/// Keywords this short only match a whole word of the concept
const SHORT_KEYWORD_CHARS: usize = 4;

/// Categorize a single concept. First matching rule wins; unmatched concepts
/// get the fallback pair.
pub fn categorize(concept: &str) -> Suggestion {
    let c = concept.to_uppercase();
    let words: Vec<&str> = c
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |keywords: &[&str]| {
        keywords.iter().any(|k| {
            if k.chars().count() <= SHORT_KEYWORD_CHARS {
                words.contains(k)
            } else {
                c.contains(k)
            }
        })
    };

    // Income
    if has(&["NOMINA", "NÓMINA", "SALARY", "PAYROLL", "BONUS"]) {
        return cat("Income", "Salary");
    }
    if has(&["DEVOLUCION", "DEVOLUCIÓN", "REFUND", "REEMBOLSO", "REIMBURSEMENT", "BIZUM RECIBIDO"]) {
        return cat("Income", "Other");
    }

    // Housing
    if has(&["ALQUILER", "RENT", "FIANZA", "DEPOSIT"]) {
        return cat("Housing", "Rent");
    }
    if has(&["IBERDROLA", "ENDESA", "NATURGY", "ELECTRIC", "AGUA", "WATER", "INTERNET", "MOVISTAR", "VODAFONE", "ORANGE", "DIGI"]) {
        return cat("Housing", "Utilities");
    }
    if has(&["LEROY MERLIN", "IKEA", "FONTANERO", "REPAIR", "CLEANING", "LIMPIEZA", "FURNITURE"]) {
        return cat("Housing", "Maintenance");
    }

    // Subscriptions
    if has(&["NETFLIX", "SPOTIFY", "HBO", "DISNEY", "PRIME VIDEO", "DAZN"]) {
        return cat("Subscriptions", "Streaming");
    }
    if has(&["ADOBE", "MICROSOFT", "ICLOUD", "APPLE.COM/BILL", "GOOGLE STORAGE", "DROPBOX", "GITHUB", "OPENAI"]) {
        return cat("Subscriptions", "Software");
    }

    // Food; takeaway first so UBER EATS is not read as a taxi ride
    if has(&["GLOVO", "UBER EATS", "JUST EAT", "DELIVEROO"]) {
        return cat("Food", "Takeaway");
    }
    if has(&["MERCADONA", "CARREFOUR", "LIDL", "ALDI", "DIA", "EROSKI", "CONSUM", "ALCAMPO", "SUPERMERCADO"]) {
        return cat("Food", "Supermarket");
    }
    if has(&["RESTAURANT", "RESTAURANTE", "BAR", "CAFE", "CAFETERIA", "TABERNA"]) {
        return cat("Food", "Restaurants");
    }

    // Transport
    if has(&["METRO", "EMT", "RENFE", "BUS", "TAXI", "CABIFY", "UBER", "BICING"]) {
        return cat("Transport", "Public");
    }
    if has(&["REPSOL", "CEPSA", "GASOLINERA", "PARKING", "APARCAMIENTO", "TALLER", "ITV"]) {
        return cat("Transport", "Private");
    }

    // Leisure
    if has(&["CINE", "CINEMA", "TEATRO", "THEATER", "CONCIERTO", "TICKETMASTER"]) {
        return cat("Leisure", "Entertainment");
    }
    if has(&["GYM", "GIMNASIO", "DECATHLON", "FITNESS"]) {
        return cat("Leisure", "Sports");
    }
    if has(&["RYANAIR", "VUELING", "IBERIA", "BOOKING", "AIRBNB", "HOTEL"]) {
        return cat("Leisure", "Travel");
    }

    cat(FALLBACK_CATEGORY, FALLBACK_SUBCATEGORY)
}

fn cat(category: &str, subcategory: &str) -> Suggestion {
    Suggestion::new(category, subcategory)
}

/// Offline categorizer backed by [`categorize`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleCategorizer;

impl RuleCategorizer {
    pub fn new() -> Self {
        Self
    }
}

impl CategorizationService for RuleCategorizer {
    fn name(&self) -> &str {
        "rules"
    }

    fn suggest(&self, request: &CategorizationRequest<'_>) -> Result<Vec<Suggestion>> {
        Ok(request
            .items
            .iter()
            .map(|item| {
                let s = categorize(&item.concept);
                if request.restrict_to_vocabulary && !s.in_vocabulary(request.vocabulary) {
                    debug!(concept = %item.concept, category = %s.category, "rule outside vocabulary, leaving empty");
                    Suggestion::default()
                } else {
                    s
                }
            })
            .collect())
    }
}
