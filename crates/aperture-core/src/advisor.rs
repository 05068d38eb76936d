//! Photo critique behind a provider seam.
//!
//! Only a simulated provider exists: it draws from the built-in knowledge base
//! at random and performs no image inference. A real service would implement
//! [`Advisor`] and slot in where the simulated one is used.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::Result;
use crate::knowledge::KnowledgeBase;

/// What the caller wants critiqued.
#[derive(Debug, Clone)]
pub struct AdviceRequest {
    pub prompt: String,
    /// Storage key or URL of the image, if any
    pub image_ref: Option<String>,
}

impl Default for AdviceRequest {
    fn default() -> Self {
        Self {
            prompt: "Analyze this photo".to_string(),
            image_ref: None,
        }
    }
}

/// Critique returned by an advisor.
#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub composition: String,
    pub lighting: String,
    pub improvements: Vec<String>,
    /// 5-10
    pub aesthetic_score: u8,
    /// 5-10
    pub technical_score: u8,
    /// True when the advice was not derived from the image
    pub simulated: bool,
}

/// Trait all advice providers implement.
///
/// Uses `async_trait` so providers can be held as `Box<dyn Advisor>`.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Produce advice for the request.
    async fn advise(&self, request: &AdviceRequest) -> Result<Advice>;
}

/// Placeholder advisor picking random entries from the knowledge base.
pub struct SimulatedAdvisor {
    kb: &'static KnowledgeBase,
}

impl SimulatedAdvisor {
    pub fn new(kb: &'static KnowledgeBase) -> Self {
        Self { kb }
    }

    fn pick(&self) -> Advice {
        let mut rng = rand::thread_rng();
        let composition = self
            .kb
            .composition_tips()
            .choose(&mut rng)
            .copied()
            .unwrap_or_default();
        let lighting = self
            .kb
            .lighting_descriptions()
            .choose(&mut rng)
            .copied()
            .unwrap_or_default();

        Advice {
            composition: composition.to_string(),
            lighting: lighting.to_string(),
            improvements: vec![
                "Try a lower angle for more dramatic perspective".to_string(),
                "Consider cropping to emphasize the main subject".to_string(),
            ],
            aesthetic_score: rng.gen_range(5..=10),
            technical_score: rng.gen_range(5..=10),
            simulated: true,
        }
    }
}

impl Default for SimulatedAdvisor {
    fn default() -> Self {
        Self::new(KnowledgeBase::builtin())
    }
}

#[async_trait]
impl Advisor for SimulatedAdvisor {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn advise(&self, request: &AdviceRequest) -> Result<Advice> {
        tracing::debug!(
            "Simulated advice for {:?} (image: {:?})",
            request.prompt,
            request.image_ref
        );
        Ok(self.pick())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_advice_draws_from_tables() {
        let advisor: Box<dyn Advisor> = Box::new(SimulatedAdvisor::default());
        let kb = KnowledgeBase::builtin();

        for _ in 0..20 {
            let advice = advisor.advise(&AdviceRequest::default()).await.unwrap();
            assert!(advice.simulated);
            assert!(kb.composition_tips().contains(&advice.composition.as_str()));
            assert!(kb
                .lighting_descriptions()
                .contains(&advice.lighting.as_str()));
            assert!((5..=10).contains(&advice.aesthetic_score));
            assert!((5..=10).contains(&advice.technical_score));
        }
        assert_eq!(advisor.name(), "simulated");
    }
}
