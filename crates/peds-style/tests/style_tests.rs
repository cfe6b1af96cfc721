use peds_core::error::Error;
use peds_style::{resolve, StyleCategory, StyleParameters, StyleSelection, Tone};
use proptest::prelude::*;

#[test]
fn every_catalog_member_resolves() {
    for category in StyleCategory::ALL {
        for variant in category.variant_names() {
            let profile = resolve(&[(category.name(), variant)]).unwrap();
            assert_eq!(profile.parameters(), vec![(category.name().to_string(), variant.to_string())]);
            let block = &profile.blocks()[0];
            assert!(block.starts_with(&format!("{} REQUIREMENTS:", category.name().to_uppercase())));
            assert_eq!(block.lines().filter(|l| l.starts_with("- ")).count(), 6);
        }
    }
}

#[test]
fn unknown_names_are_configuration_errors() {
    assert!(matches!(resolve(&[("tone", "sarcastic")]), Err(Error::Configuration(_))));
    assert!(matches!(resolve(&[("humor", "high")]), Err(Error::Configuration(_))));
    // variant names are not shared across categories
    assert!(matches!(resolve(&[("tone", "technical")]), Err(Error::Configuration(_))));
    assert!(matches!(resolve(&[("tone", "formal"), ("tone", "friendly")]), Err(Error::Configuration(_))));
}

#[test]
fn blocks_follow_supplied_order() {
    let profile = resolve(&[("empathy", "high"), ("tone", "friendly")]).unwrap();
    let blocks = profile.blocks();
    assert!(blocks[0].starts_with("EMPATHY REQUIREMENTS:"));
    assert!(blocks[1].starts_with("TONE REQUIREMENTS:"));
    assert_eq!(profile.selections()[1], StyleSelection::Tone(Tone::Friendly));
}

#[test]
fn block_layout() {
    let block = StyleSelection::parse("detailLevel", "brief").unwrap().instruction_block();
    let lines: Vec<&str> = block.lines().collect();
    assert_eq!(lines[0], "DETAILLEVEL REQUIREMENTS:");
    assert!(lines[1].starts_with("- Follow this style: Provide concise answers"));
    assert_eq!(lines[2], "Required language patterns:");
    assert_eq!(lines[3], "- Quick, essential overviews only");
    assert!(lines[8].starts_with("Reference example: To support your child's health"));
    assert_eq!(lines.len(), 9);
}

#[test]
fn defaults_resolve_in_canonical_order() {
    let profile = StyleParameters::default().resolve().unwrap();
    let names: Vec<String> = profile.parameters().into_iter().map(|(_, v)| v).collect();
    assert_eq!(names, vec!["balanced", "moderate", "moderate", "clinicallyBalanced"]);
}

#[test]
fn parameters_deserialize_with_defaults() {
    let params: StyleParameters = serde_json::from_str(r#"{"tone":"formal","professionalStyle":"technical"}"#).unwrap();
    assert_eq!(params.tone, "formal");
    assert_eq!(params.detail_level, "moderate");
    assert_eq!(params.professional_style, "technical");
}

proptest! {
    #[test]
    fn resolution_is_deterministic(tone in 0usize..3, detail in 0usize..3) {
        let t = StyleCategory::Tone.variant_names()[tone];
        let d = StyleCategory::DetailLevel.variant_names()[detail];
        let a = resolve(&[("tone", t), ("detailLevel", d)]).unwrap();
        let b = resolve(&[("tone", t), ("detailLevel", d)]).unwrap();
        prop_assert_eq!(a.render(), b.render());
    }
}
