//! Built-in PCOS care personas
//!
//! The three agents registered when configuration does not supply its own
//! `[[agents]]` list.

use crate::error::Result;
use crate::registry::{AgentProfile, AgentRegistry};

/// Name of the PCOS specialist agent
pub const SPECIALIST: &str = "PCOS_Specialist";
/// Name of the nutritionist agent
pub const NUTRITIONIST: &str = "PCOS_Nutritionist";
/// Name of the fitness coach agent
pub const FITNESS_COACH: &str = "PCOS_Fitness_Coach";

const SPECIALIST_PROMPT: &str = "\
You are a PCOS Specialist with deep knowledge of Polycystic Ovary Syndrome.
Your expertise includes:
- Symptoms and diagnosis of PCOS
- Treatment options and management strategies
- Lifestyle modifications and dietary recommendations
- Hormonal imbalances and their effects
- Fertility issues related to PCOS
- Latest research and treatment options

When providing information, be empathetic, evidence-based, and clear.
Always ask for clarification if the user's question is unclear.";

const NUTRITIONIST_PROMPT: &str = "\
You are a Nutritionist specializing in PCOS management.
Your expertise includes:
- PCOS-friendly diets and meal planning
- Blood sugar regulation through nutrition
- Anti-inflammatory foods
- Managing insulin resistance with diet
- Supplement recommendations for PCOS
- Weight management strategies

Provide practical, evidence-based dietary advice. Consider cultural preferences
and budget constraints when making recommendations.";

const FITNESS_COACH_PROMPT: &str = "\
You are a Fitness Coach specializing in PCOS management.
Your expertise includes:
- Exercise routines for insulin sensitivity
- Strength training for hormonal balance
- Stress-reducing activities
- Managing exercise with PCOS symptoms
- Creating sustainable fitness plans
- Modifications for different fitness levels

Provide safe, effective, and personalized exercise recommendations.
Consider the user's current fitness level and any physical limitations.";

/// The default profiles, in round-robin order
#[must_use]
pub fn default_profiles() -> [AgentProfile; 3] {
    [
        AgentProfile::new(
            SPECIALIST,
            "Symptoms, diagnosis, treatment options, hormones and fertility",
            SPECIALIST_PROMPT,
        ),
        AgentProfile::new(
            NUTRITIONIST,
            "PCOS-friendly diets, blood sugar, insulin resistance and supplements",
            NUTRITIONIST_PROMPT,
        ),
        AgentProfile::new(
            FITNESS_COACH,
            "Exercise for insulin sensitivity, strength training and stress reduction",
            FITNESS_COACH_PROMPT,
        ),
    ]
}

/// Register the default profiles into `registry`
pub fn register_defaults(registry: &AgentRegistry) -> Result<()> {
    for profile in default_profiles() {
        registry.register(profile)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_order() {
        let registry = AgentRegistry::new();
        register_defaults(&registry).unwrap();

        let names: Vec<_> = registry.list().map(|p| p.name).collect();
        assert_eq!(names, vec![SPECIALIST, NUTRITIONIST, FITNESS_COACH]);
    }

    #[test]
    fn test_register_defaults_twice_fails() {
        let registry = AgentRegistry::new();
        register_defaults(&registry).unwrap();
        assert!(matches!(
            register_defaults(&registry),
            Err(Error::DuplicateName(_))
        ));
    }

    #[test]
    fn test_prompts_describe_role() {
        let [specialist, nutritionist, coach] = default_profiles();
        assert!(specialist.system_prompt.contains("PCOS Specialist"));
        assert!(nutritionist.system_prompt.contains("insulin resistance"));
        assert!(coach.system_prompt.contains("fitness level"));
    }
}
