use serde::Serialize;
use std::fmt;

use super::transitions::{handled_events, GLOBAL_EVENTS};
use super::types::{AssemblerHubStep, DesignWithAiStep, IntroStep, Step, WizardEvent};

/// Renderable unit bound to a step. Rendering itself happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Screen {
    Intro,
    DesignWithAi,
    AssemblerHub,
    Transitional,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Intro => "Intro",
            Screen::DesignWithAi => "DesignWithAi",
            Screen::AssemblerHub => "AssemblerHub",
            Screen::Transitional => "Transitional",
        };
        f.write_str(name)
    }
}

/// Static lookups from a step to what it shows and what it listens to
#[derive(Debug, Default, Clone, Copy)]
pub struct StepRegistry;

impl StepRegistry {
    pub fn screen(&self, step: Step) -> Option<Screen> {
        match step {
            Step::Intro(IntroStep::Intro) => Some(Screen::Intro),
            Step::DesignWithAi(DesignWithAiStep::DesignWithAi) => Some(Screen::DesignWithAi),
            Step::AssemblerHub(AssemblerHubStep::AssemblerHub) => Some(Screen::AssemblerHub),
            Step::TransitionalScreen => Some(Screen::Transitional),
            _ => None,
        }
    }

    /// Every event name the step reacts to, machine-wide ones included
    pub fn accepted_events(&self, step: Step) -> Vec<&'static str> {
        handled_events(step)
            .iter()
            .chain(GLOBAL_EVENTS.iter())
            .copied()
            .collect()
    }

    pub fn accepts(&self, step: Step, event: &WizardEvent) -> bool {
        let name = event.name();
        GLOBAL_EVENTS.contains(&name) || handled_events(step).contains(&name)
    }

    /// Container class the admin page puts around the current screen
    pub fn css_class(&self, step: Step) -> String {
        format!("woocommerce-profile-wizard__step-{}", step.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_settled_steps_have_screens() {
        let registry = StepRegistry;
        assert_eq!(registry.screen(Step::Intro(IntroStep::Intro)), Some(Screen::Intro));
        assert_eq!(registry.screen(Step::INTRO), None);
        assert_eq!(registry.screen(Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview)), None);
        assert_eq!(registry.screen(Step::TransitionalScreen), Some(Screen::Transitional));
        assert_eq!(registry.screen(Step::BackToHomescreen), None);
    }

    #[test]
    fn test_css_class_uses_top_level_label() {
        let class = StepRegistry.css_class(Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub));
        assert_eq!(class, "woocommerce-profile-wizard__step-assemblerHub");
    }

    #[test]
    fn test_terminal_steps_accept_only_global_events() {
        let registry = StepRegistry;
        assert_eq!(registry.accepted_events(Step::AppearanceTask), GLOBAL_EVENTS.to_vec());
        assert!(registry.accepts(Step::AppearanceTask, &WizardEvent::ExternalUrlUpdate));
        assert!(!registry.accepts(Step::AppearanceTask, &WizardEvent::GoBackToHome));
    }
}
