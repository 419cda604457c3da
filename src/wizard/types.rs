use serde::{Deserialize, Serialize};
use std::fmt;

/// Sub-steps of the intro step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntroStep {
    PreIntro,
    Intro,
}

/// Sub-steps of the design-with-AI step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignWithAiStep {
    PreDesignWithAi,
    DesignWithAi,
}

/// Sub-steps of the assembler hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssemblerHubStep {
    AssemblerHub,
    PostAssemblerHub,
    WaitForSitePreview,
}

/// A node of the customize-store wizard.
///
/// Top-level variants are the wizard steps; nested enums are their sub-steps. `Navigate` and
/// `DesignWithAi(PreDesignWithAi)` are transient and never current once a dispatch returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Navigate,
    Intro(IntroStep),
    DesignWithAi(DesignWithAiStep),
    AssemblerHub(AssemblerHubStep),
    TransitionalScreen,
    BackToHomescreen,
    AppearanceTask,
}

impl Step {
    pub const ALL: [Step; 11] = [
        Step::Navigate,
        Step::Intro(IntroStep::PreIntro),
        Step::Intro(IntroStep::Intro),
        Step::DesignWithAi(DesignWithAiStep::PreDesignWithAi),
        Step::DesignWithAi(DesignWithAiStep::DesignWithAi),
        Step::AssemblerHub(AssemblerHubStep::AssemblerHub),
        Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub),
        Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview),
        Step::TransitionalScreen,
        Step::BackToHomescreen,
        Step::AppearanceTask,
    ];

    /// Entering `intro` starts in `preIntro`
    pub const INTRO: Step = Step::Intro(IntroStep::PreIntro);
    /// Entering `designWithAi` starts in `preDesignWithAi`
    pub const DESIGN_WITH_AI: Step = Step::DesignWithAi(DesignWithAiStep::PreDesignWithAi);
    /// Entering `assemblerHub` starts in `assemblerHub.assemblerHub`
    pub const ASSEMBLER_HUB: Step = Step::AssemblerHub(AssemblerHubStep::AssemblerHub);

    /// Machine label of the top-level step
    pub fn label(&self) -> &'static str {
        match self {
            Step::Navigate => "navigate",
            Step::Intro(_) => "intro",
            Step::DesignWithAi(_) => "designWithAi",
            Step::AssemblerHub(_) => "assemblerHub",
            Step::TransitionalScreen => "transitionalScreen",
            Step::BackToHomescreen => "backToHomescreen",
            Step::AppearanceTask => "appearanceTask",
        }
    }

    /// Label of the sub-step, if the step is compound
    pub fn sub_label(&self) -> Option<&'static str> {
        match self {
            Step::Intro(IntroStep::PreIntro) => Some("preIntro"),
            Step::Intro(IntroStep::Intro) => Some("intro"),
            Step::DesignWithAi(DesignWithAiStep::PreDesignWithAi) => Some("preDesignWithAi"),
            Step::DesignWithAi(DesignWithAiStep::DesignWithAi) => Some("designWithAi"),
            Step::AssemblerHub(AssemblerHubStep::AssemblerHub) => Some("assemblerHub"),
            Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub) => Some("postAssemblerHub"),
            Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview) => Some("waitForSitePreview"),
            _ => None,
        }
    }

    /// URL slug written to path segment 2, for steps that own one
    pub fn slug(&self) -> Option<&'static str> {
        match self {
            Step::Intro(_) => Some("intro"),
            Step::DesignWithAi(_) => Some("design-with-ai"),
            Step::AssemblerHub(_) => Some("assembler-hub"),
            Step::TransitionalScreen => Some("transitional"),
            _ => None,
        }
    }

    pub fn same_top_level(&self, other: &Step) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Steps that only move on when a service or the timer reports back
    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            Step::Intro(IntroStep::PreIntro)
                | Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub)
                | Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview)
        )
    }

    /// The wizard hands control back to the host once it lands here
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::BackToHomescreen | Step::AppearanceTask)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_label() {
            Some(sub) => write!(f, "{}.{}", self.label(), sub),
            None => f.write_str(self.label()),
        }
    }
}

/// Identifies one invocation of an asynchronous service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(pub u64);

/// Identifies one arming of the delayed-transition timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(pub u64);

/// Everything the wizard reacts to.
///
/// The first group comes from screens and the host page; the second is produced by the
/// controller's own services and timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardEvent {
    ExternalUrlUpdate,
    AiWizardClosedBeforeCompletion { step: String },
    DesignWithAi,
    SelectedActiveTheme,
    ClickedOnBreadcrumb,
    SelectedNewTheme { theme: String },
    SelectedBrowseAllThemes,
    ThemeSuggested,
    FinishCustomization,
    GoBackToDesignWithAi,
    GoBackToHome,

    ThemeCardsFetched { invocation: InvocationId, theme_cards: Vec<ThemeCard> },
    ThemeCardsFetchFailed { invocation: InvocationId, reason: String },
    TaskCompleted { invocation: InvocationId },
    TaskCompletionFailed { invocation: InvocationId, reason: String },
    SitePreviewDelayElapsed { timer: TimerId },
}

impl WizardEvent {
    /// Wire name, as used by the admin panel and the CLI
    pub fn name(&self) -> &'static str {
        match self {
            WizardEvent::ExternalUrlUpdate => "EXTERNAL_URL_UPDATE",
            WizardEvent::AiWizardClosedBeforeCompletion { .. } => "AI_WIZARD_CLOSED_BEFORE_COMPLETION",
            WizardEvent::DesignWithAi => "DESIGN_WITH_AI",
            WizardEvent::SelectedActiveTheme => "SELECTED_ACTIVE_THEME",
            WizardEvent::ClickedOnBreadcrumb => "CLICKED_ON_BREADCRUMB",
            WizardEvent::SelectedNewTheme { .. } => "SELECTED_NEW_THEME",
            WizardEvent::SelectedBrowseAllThemes => "SELECTED_BROWSE_ALL_THEMES",
            WizardEvent::ThemeSuggested => "THEME_SUGGESTED",
            WizardEvent::FinishCustomization => "FINISH_CUSTOMIZATION",
            WizardEvent::GoBackToDesignWithAi => "GO_BACK_TO_DESIGN_WITH_AI",
            WizardEvent::GoBackToHome => "GO_BACK_TO_HOME",
            WizardEvent::ThemeCardsFetched { .. } => "THEME_CARDS_FETCHED",
            WizardEvent::ThemeCardsFetchFailed { .. } => "THEME_CARDS_FETCH_FAILED",
            WizardEvent::TaskCompleted { .. } => "TASK_COMPLETED",
            WizardEvent::TaskCompletionFailed { .. } => "TASK_COMPLETION_FAILED",
            WizardEvent::SitePreviewDelayElapsed { .. } => "SITE_PREVIEW_DELAY_ELAPSED",
        }
    }

    /// Parse a payload-free event from its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        let event = match name {
            "EXTERNAL_URL_UPDATE" => WizardEvent::ExternalUrlUpdate,
            "DESIGN_WITH_AI" => WizardEvent::DesignWithAi,
            "SELECTED_ACTIVE_THEME" => WizardEvent::SelectedActiveTheme,
            "CLICKED_ON_BREADCRUMB" => WizardEvent::ClickedOnBreadcrumb,
            "SELECTED_BROWSE_ALL_THEMES" => WizardEvent::SelectedBrowseAllThemes,
            "THEME_SUGGESTED" => WizardEvent::ThemeSuggested,
            "FINISH_CUSTOMIZATION" => WizardEvent::FinishCustomization,
            "GO_BACK_TO_DESIGN_WITH_AI" => WizardEvent::GoBackToDesignWithAi,
            "GO_BACK_TO_HOME" => WizardEvent::GoBackToHome,
            _ => return None,
        };
        Some(event)
    }
}

/// A theme offered on the intro screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCard {
    pub slug: String,
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroContext {
    pub theme_cards: Vec<ThemeCard>,
    pub active_theme: String,
    pub selected_theme: Option<String>,
}

/// Data accumulated across steps. Only transitions produce new values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardContext {
    pub intro: IntroContext,
}

/// Asynchronous services the wizard invokes on entering a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    FetchThemeCards,
    MarkTaskComplete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_display_uses_dotted_labels() {
        assert_eq!(Step::ASSEMBLER_HUB.to_string(), "assemblerHub.assemblerHub");
        assert_eq!(
            Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview).to_string(),
            "assemblerHub.waitForSitePreview"
        );
        assert_eq!(Step::TransitionalScreen.to_string(), "transitionalScreen");
    }

    #[test]
    fn test_event_wire_format() {
        let event: WizardEvent = serde_json::from_str(
            r#"{"type":"AI_WIZARD_CLOSED_BEFORE_COMPLETION","step":"design-with-ai"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            WizardEvent::AiWizardClosedBeforeCompletion {
                step: "design-with-ai".to_string()
            }
        );

        let json = serde_json::to_value(WizardEvent::FinishCustomization).unwrap();
        assert_eq!(json["type"], "FINISH_CUSTOMIZATION");
    }

    #[test]
    fn test_from_name_matches_name() {
        for name in ["DESIGN_WITH_AI", "GO_BACK_TO_HOME", "FINISH_CUSTOMIZATION"] {
            assert_eq!(WizardEvent::from_name(name).unwrap().name(), name);
        }
        assert!(WizardEvent::from_name("SELECTED_NEW_THEME").is_none());
    }
}
