//! Built-in photography reference tables.
//!
//! The tables are built once on first use and shared as `&'static` for the
//! life of the process. Nothing mutates them after construction.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Camera-setting preset for a shooting scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraSettings {
    pub aperture: &'static str,
    pub shutter: &'static str,
    pub iso: &'static str,
    pub tips: &'static str,
}

/// Lighting description plus general tips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightingGuide {
    pub analysis: &'static str,
    pub tips: &'static [&'static str],
}

/// How-to guide for a composition technique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionGuide {
    pub description: &'static str,
    pub tips: &'static [&'static str],
}

const LIGHTING_TIPS: &[&str] = &[
    "Use reflectors to bounce light",
    "Consider time of day for natural light",
    "Experiment with artificial light angles",
];

/// Read-only lookup tables.
#[derive(Debug)]
pub struct KnowledgeBase {
    settings: BTreeMap<&'static str, CameraSettings>,
    lighting: BTreeMap<&'static str, &'static str>,
    composition: Vec<&'static str>,
    techniques: BTreeMap<&'static str, CompositionGuide>,
}

impl KnowledgeBase {
    /// The process-wide built-in tables.
    pub fn builtin() -> &'static KnowledgeBase {
        static KB: OnceLock<KnowledgeBase> = OnceLock::new();
        KB.get_or_init(Self::build)
    }

    fn build() -> Self {
        let settings = BTreeMap::from([
            (
                "portrait",
                CameraSettings {
                    aperture: "f/1.8-f/2.8",
                    shutter: "1/125s",
                    iso: "100-400",
                    tips: "Use single-point AF, focus on eyes",
                },
            ),
            (
                "landscape",
                CameraSettings {
                    aperture: "f/8-f/16",
                    shutter: "1/60s",
                    iso: "100-200",
                    tips: "Use manual focus, shoot during golden hour",
                },
            ),
            (
                "macro",
                CameraSettings {
                    aperture: "f/8-f/16",
                    shutter: "1/200s or faster",
                    iso: "100-400",
                    tips: "Use manual focus, tripod essential, consider focus stacking",
                },
            ),
        ]);

        let lighting = BTreeMap::from([
            (
                "golden_hour",
                "Warm, soft light perfect for portraits and landscapes",
            ),
            (
                "blue_hour",
                "Cool tones great for cityscapes and moody shots",
            ),
            (
                "midday",
                "Harsh light - use diffusers or find shaded areas",
            ),
        ]);

        let composition = vec![
            "Rule of thirds",
            "Leading lines",
            "Frame within a frame",
            "Color theory: Use complementary colors for visual impact",
            "Depth of field: Control what's in focus to guide viewer attention",
        ];

        let techniques = BTreeMap::from([(
            "rule_of_thirds",
            CompositionGuide {
                description:
                    "Divide image into 9 equal parts using 2 horizontal and 2 vertical lines",
                tips: &[
                    "Place important elements along the lines or intersections",
                    "Align horizon with top or bottom line",
                    "Put eyes on top line for portraits",
                ],
            },
        )]);

        Self {
            settings,
            lighting,
            composition,
            techniques,
        }
    }

    /// Camera settings for a scenario (case-insensitive).
    pub fn settings(&self, scenario: &str) -> Option<&CameraSettings> {
        self.settings.get(scenario.to_lowercase().as_str())
    }

    /// Lighting guide for an exact scenario name.
    pub fn lighting(&self, scenario: &str) -> Option<LightingGuide> {
        self.lighting.get(scenario).map(|&analysis| LightingGuide {
            analysis,
            tips: LIGHTING_TIPS,
        })
    }

    /// Guide for a composition technique.
    pub fn technique(&self, technique: &str) -> Option<&CompositionGuide> {
        self.techniques.get(technique)
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.settings.keys().copied()
    }

    pub fn lighting_scenarios(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.lighting.keys().copied()
    }

    pub fn lighting_descriptions(&self) -> Vec<&'static str> {
        self.lighting.values().copied().collect()
    }

    pub fn composition_tips(&self) -> &[&'static str] {
        &self.composition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_lookup_is_case_insensitive() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.settings("Portrait").unwrap().aperture, "f/1.8-f/2.8");
        assert_eq!(kb.settings("MACRO").unwrap().iso, "100-400");
        assert!(kb.settings("astro").is_none());
    }

    #[test]
    fn test_lighting_lookup() {
        let kb = KnowledgeBase::builtin();
        let guide = kb.lighting("golden_hour").unwrap();
        assert!(guide.analysis.starts_with("Warm"));
        assert_eq!(guide.tips.len(), 3);
        assert!(kb.lighting("Golden_Hour").is_none());
    }

    #[test]
    fn test_scenario_names() {
        let kb = KnowledgeBase::builtin();
        let names: Vec<_> = kb.scenarios().collect();
        assert_eq!(names, vec!["landscape", "macro", "portrait"]);
        assert_eq!(kb.lighting_scenarios().count(), 3);
    }

    #[test]
    fn test_builtin_is_shared() {
        assert!(std::ptr::eq(KnowledgeBase::builtin(), KnowledgeBase::builtin()));
    }

    #[test]
    fn test_technique_lookup() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.technique("rule_of_thirds").unwrap().tips.len(), 3);
        assert!(kb.technique("golden_ratio").is_none());
    }
}
