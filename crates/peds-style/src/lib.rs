//! peds-style
//!
//! Resolves the four communication knobs (tone, detail level, empathy,
//! professional register) against a closed catalog and renders the
//! instruction blocks handed to the answer generator.

pub mod catalog;

pub use catalog::{DetailLevel, Empathy, ProfessionalStyle, StyleEntry, Tone};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use peds_core::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleCategory {
    Tone,
    DetailLevel,
    Empathy,
    ProfessionalStyle,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 4] = [StyleCategory::Tone, StyleCategory::DetailLevel, StyleCategory::Empathy, StyleCategory::ProfessionalStyle];

    pub fn name(self) -> &'static str {
        match self {
            StyleCategory::Tone => "tone",
            StyleCategory::DetailLevel => "detailLevel",
            StyleCategory::Empathy => "empathy",
            StyleCategory::ProfessionalStyle => "professionalStyle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn variant_names(self) -> Vec<&'static str> {
        match self {
            StyleCategory::Tone => Tone::ALL.iter().map(|v| v.name()).collect(),
            StyleCategory::DetailLevel => DetailLevel::ALL.iter().map(|v| v.name()).collect(),
            StyleCategory::Empathy => Empathy::ALL.iter().map(|v| v.name()).collect(),
            StyleCategory::ProfessionalStyle => ProfessionalStyle::ALL.iter().map(|v| v.name()).collect(),
        }
    }
}

/// One selected catalog variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSelection {
    Tone(Tone),
    DetailLevel(DetailLevel),
    Empathy(Empathy),
    ProfessionalStyle(ProfessionalStyle),
}

impl StyleSelection {
    pub fn parse(category: &str, variant: &str) -> Result<Self> {
        let cat = StyleCategory::from_name(category)
            .ok_or_else(|| Error::Configuration(format!("unknown style category '{category}'")))?;
        let selection = match cat {
            StyleCategory::Tone => Tone::from_name(variant).map(StyleSelection::Tone),
            StyleCategory::DetailLevel => DetailLevel::from_name(variant).map(StyleSelection::DetailLevel),
            StyleCategory::Empathy => Empathy::from_name(variant).map(StyleSelection::Empathy),
            StyleCategory::ProfessionalStyle => ProfessionalStyle::from_name(variant).map(StyleSelection::ProfessionalStyle),
        };
        selection.ok_or_else(|| {
            Error::Configuration(format!("unknown {category} variant '{variant}' (expected one of {})", cat.variant_names().join(", ")))
        })
    }

    pub fn category(self) -> StyleCategory {
        match self {
            StyleSelection::Tone(_) => StyleCategory::Tone,
            StyleSelection::DetailLevel(_) => StyleCategory::DetailLevel,
            StyleSelection::Empathy(_) => StyleCategory::Empathy,
            StyleSelection::ProfessionalStyle(_) => StyleCategory::ProfessionalStyle,
        }
    }

    pub fn variant_name(self) -> &'static str {
        match self {
            StyleSelection::Tone(v) => v.name(),
            StyleSelection::DetailLevel(v) => v.name(),
            StyleSelection::Empathy(v) => v.name(),
            StyleSelection::ProfessionalStyle(v) => v.name(),
        }
    }

    pub fn entry(self) -> &'static StyleEntry {
        match self {
            StyleSelection::Tone(v) => v.entry(),
            StyleSelection::DetailLevel(v) => v.entry(),
            StyleSelection::Empathy(v) => v.entry(),
            StyleSelection::ProfessionalStyle(v) => v.entry(),
        }
    }

    /// `{CATEGORY} REQUIREMENTS:` followed by the description, the markers
    /// and the reference example, one per line.
    pub fn instruction_block(self) -> String {
        let entry = self.entry();
        let mut lines = Vec::with_capacity(entry.markers.len() + 4);
        lines.push(format!("{} REQUIREMENTS:", self.category().name().to_uppercase()));
        lines.push(format!("- Follow this style: {}", entry.description));
        lines.push("Required language patterns:".to_string());
        lines.extend(entry.markers.iter().map(|m| format!("- {m}")));
        lines.push(format!("Reference example: {}", entry.example));
        lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleProfile {
    selections: Vec<StyleSelection>,
}

impl StyleProfile {
    pub fn selections(&self) -> &[StyleSelection] {
        &self.selections
    }

    /// Instruction blocks in the order the categories were supplied.
    pub fn blocks(&self) -> Vec<String> {
        self.selections.iter().map(|s| s.instruction_block()).collect()
    }

    pub fn render(&self) -> String {
        self.blocks().join("\n\n")
    }

    /// `(category, variant)` pairs as supplied, for reporting.
    pub fn parameters(&self) -> Vec<(String, String)> {
        self.selections.iter().map(|s| (s.category().name().to_string(), s.variant_name().to_string())).collect()
    }
}

/// Resolve ordered `(category, variant)` pairs against the catalog.
///
/// Unknown names and repeated categories are configuration errors; nothing
/// is defaulted here.
pub fn resolve<C: AsRef<str>, V: AsRef<str>>(parameters: &[(C, V)]) -> Result<StyleProfile> {
    let mut seen = HashSet::new();
    let mut selections = Vec::with_capacity(parameters.len());
    for (category, variant) in parameters {
        let selection = StyleSelection::parse(category.as_ref(), variant.as_ref())?;
        if !seen.insert(selection.category()) {
            return Err(Error::Configuration(format!("style category '{}' supplied more than once", category.as_ref())));
        }
        selections.push(selection);
    }
    tracing::debug!(n = selections.len(), "style profile resolved");
    Ok(StyleProfile { selections })
}

/// Caller-facing knob values, with the defaults applied when a request
/// leaves them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleParameters {
    pub tone: String,
    pub detail_level: String,
    pub empathy: String,
    pub professional_style: String,
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            tone: Tone::Balanced.name().into(),
            detail_level: DetailLevel::Moderate.name().into(),
            empathy: Empathy::Moderate.name().into(),
            professional_style: ProfessionalStyle::ClinicallyBalanced.name().into(),
        }
    }
}

impl StyleParameters {
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        vec![
            (StyleCategory::Tone.name(), self.tone.as_str()),
            (StyleCategory::DetailLevel.name(), self.detail_level.as_str()),
            (StyleCategory::Empathy.name(), self.empathy.as_str()),
            (StyleCategory::ProfessionalStyle.name(), self.professional_style.as_str()),
        ]
    }

    pub fn resolve(&self) -> Result<StyleProfile> {
        resolve(&self.pairs())
    }
}
