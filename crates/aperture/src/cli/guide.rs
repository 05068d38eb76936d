//! Reference commands backed by the built-in knowledge base, plus `advise`.

use aperture_core::{AdviceRequest, Advisor, KnowledgeBase, SimulatedAdvisor};
use clap::Args;
use serde::Serialize;

/// Arguments for the `settings` command.
#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Shooting scenario (portrait, landscape, macro)
    pub scenario: String,
}

/// Arguments for the `lighting` command.
#[derive(Args, Debug)]
pub struct LightingArgs {
    /// Lighting scenario (golden_hour, blue_hour, midday)
    pub scenario: String,
}

/// Arguments for the `composition` command.
#[derive(Args, Debug)]
pub struct CompositionArgs {
    /// Composition technique (e.g. rule_of_thirds)
    pub technique: String,
}

/// Arguments for the `advise` command.
#[derive(Args, Debug)]
pub struct AdviseArgs {
    /// What to ask about the photo
    pub prompt: Option<String>,

    /// Storage key or URL of the photo
    #[arg(long)]
    pub image: Option<String>,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn known(names: impl Iterator<Item = &'static str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// `aperture settings <SCENARIO>`. An unknown scenario prints `{}`.
pub fn settings(args: SettingsArgs) -> anyhow::Result<()> {
    let kb = KnowledgeBase::builtin();
    match kb.settings(&args.scenario) {
        Some(settings) => print_json(settings),
        None => {
            tracing::warn!(
                "Unknown scenario {:?} (known: {})",
                args.scenario,
                known(kb.scenarios())
            );
            print_json(&serde_json::json!({}))
        }
    }
}

/// `aperture lighting <SCENARIO>`.
pub fn lighting(args: LightingArgs) -> anyhow::Result<()> {
    let kb = KnowledgeBase::builtin();
    let Some(guide) = kb.lighting(&args.scenario) else {
        anyhow::bail!(
            "Scenario not found: {} (known: {})",
            args.scenario,
            known(kb.lighting_scenarios())
        );
    };
    print_json(&guide)
}

/// `aperture composition <TECHNIQUE>`.
pub fn composition(args: CompositionArgs) -> anyhow::Result<()> {
    let kb = KnowledgeBase::builtin();
    match kb.technique(&args.technique) {
        Some(guide) => print_json(guide),
        None => anyhow::bail!("Technique not found: {}", args.technique),
    }
}

/// `aperture advise [PROMPT]`.
pub async fn advise(args: AdviseArgs) -> anyhow::Result<()> {
    let advisor: Box<dyn Advisor> = Box::new(SimulatedAdvisor::default());
    let mut request = AdviceRequest::default();
    if let Some(prompt) = args.prompt {
        request.prompt = prompt;
    }
    request.image_ref = args.image;

    let advice = advisor.advise(&request).await?;
    tracing::info!("Advice from {} provider (no image inference)", advisor.name());
    print_json(&advice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_settings_is_not_an_error() {
        let args = SettingsArgs {
            scenario: "underwater".to_string(),
        };
        assert!(settings(args).is_ok());
    }

    #[test]
    fn test_unknown_lighting_names_the_scenario() {
        let args = LightingArgs {
            scenario: "Golden_Hour".to_string(),
        };
        let err = lighting(args).unwrap_err().to_string();
        assert!(err.contains("Scenario not found: Golden_Hour"));
        assert!(err.contains("golden_hour"));
    }

    #[test]
    fn test_known_lookups_succeed() {
        assert!(lighting(LightingArgs {
            scenario: "blue_hour".to_string()
        })
        .is_ok());
        assert!(composition(CompositionArgs {
            technique: "rule_of_thirds".to_string()
        })
        .is_ok());
        assert!(composition(CompositionArgs {
            technique: "golden_spiral".to_string()
        })
        .is_err());
    }

    #[tokio::test]
    async fn test_advise_with_default_prompt() {
        let args = AdviseArgs {
            prompt: None,
            image: Some("abc_photo.jpg".to_string()),
        };
        assert!(advise(args).await.is_ok());
    }
}
