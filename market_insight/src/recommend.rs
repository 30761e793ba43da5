//! Rule-based crop suggestions from soil and climate readings

use serde::{Deserialize, Serialize};

/// Field conditions; nitrogen, phosphorus and potassium are recorded but no
/// rule reads them yet
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SoilConditions {
    #[serde(default)]
    pub n: f64,
    #[serde(default)]
    pub p: f64,
    #[serde(default)]
    pub k: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropSuggestion {
    pub crop: String,
    pub confidence: f64,
    pub reason: String,
}

struct Rule {
    crop: &'static str,
    confidence: f64,
    reason: &'static str,
    matches: fn(&SoilConditions) -> bool,
}

const RULES: [Rule; 4] = [
    Rule {
        crop: "Rice",
        confidence: 0.85,
        reason: "High temperature and rainfall suitable for rice",
        matches: |s| s.temperature > 25.0 && s.rainfall > 200.0,
    },
    Rule {
        crop: "Wheat",
        confidence: 0.80,
        reason: "Moderate temperature and neutral pH suitable for wheat",
        matches: |s| s.temperature > 20.0 && s.ph > 6.5,
    },
    Rule {
        crop: "Corn",
        confidence: 0.75,
        reason: "Warm temperature and high humidity suitable for corn",
        matches: |s| s.temperature > 22.0 && s.humidity > 70.0,
    },
    Rule {
        crop: "Soybean",
        confidence: 0.70,
        reason: "Neutral pH and adequate rainfall suitable for soybean",
        matches: |s| s.ph > 6.0 && s.rainfall > 150.0,
    },
];

const FALLBACK: Rule = Rule {
    crop: "Barley",
    confidence: 0.60,
    reason: "General conditions suitable for barley",
    matches: |_| true,
};

impl Rule {
    fn suggestion(&self) -> CropSuggestion {
        CropSuggestion {
            crop: self.crop.to_string(),
            confidence: self.confidence,
            reason: self.reason.to_string(),
        }
    }
}

/// Every matching crop, in rule order; barley when nothing matches
pub fn recommend_crops(conditions: &SoilConditions) -> Vec<CropSuggestion> {
    let suggestions: Vec<CropSuggestion> = RULES
        .iter()
        .filter(|rule| (rule.matches)(conditions))
        .map(Rule::suggestion)
        .collect();

    if suggestions.is_empty() {
        vec![FALLBACK.suggestion()]
    } else {
        suggestions
    }
}
