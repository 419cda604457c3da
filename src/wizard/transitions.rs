//! The customize-store transition table.
//!
//! Everything here is pure: given the current step, an event, the context and the location
//! as read at dispatch time, [`transition`] says where the wizard goes, what the context becomes
//! and which effects the controller has to run, in order (exit, transition, entry).

use crate::navigation::{has_step_in_url, Query};

use super::types::{
    AssemblerHubStep, DesignWithAiStep, IntroStep, Service, Step, ThemeCard, WizardContext,
    WizardEvent,
};

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the step slug back into the location
    UpdateQueryStep(&'static str),
    /// Start an asynchronous service; its completion comes back as an event
    Invoke(Service),
    /// Forget the running invocation of a service; its completion will be ignored
    CancelInvocation(Service),
    /// Fire-and-forget warm-up of the site preview image
    PrefetchSitePreview,
    /// Start the delayed transition out of `waitForSitePreview`
    ArmSitePreviewTimer,
    /// Stop the delayed transition
    CancelSitePreviewTimer,
}

/// Outcome of a matched event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Stable step reached after eventless transitions
    pub target: Step,
    pub context: WizardContext,
    pub effects: Vec<Effect>,
}

/// Events handled directly by a step (global ones excluded)
pub fn handled_events(step: Step) -> &'static [&'static str] {
    match step {
        Step::Intro(IntroStep::PreIntro) => &[
            "THEME_CARDS_FETCHED",
            "THEME_CARDS_FETCH_FAILED",
            "DESIGN_WITH_AI",
            "SELECTED_ACTIVE_THEME",
            "CLICKED_ON_BREADCRUMB",
            "SELECTED_NEW_THEME",
            "SELECTED_BROWSE_ALL_THEMES",
        ],
        Step::Intro(IntroStep::Intro) => &[
            "DESIGN_WITH_AI",
            "SELECTED_ACTIVE_THEME",
            "CLICKED_ON_BREADCRUMB",
            "SELECTED_NEW_THEME",
            "SELECTED_BROWSE_ALL_THEMES",
        ],
        Step::DesignWithAi(_) => &["THEME_SUGGESTED"],
        Step::AssemblerHub(AssemblerHubStep::AssemblerHub) => {
            &["FINISH_CUSTOMIZATION", "GO_BACK_TO_DESIGN_WITH_AI"]
        }
        Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub) => &[
            "TASK_COMPLETED",
            "TASK_COMPLETION_FAILED",
            "FINISH_CUSTOMIZATION",
            "GO_BACK_TO_DESIGN_WITH_AI",
        ],
        Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview) => &[
            "SITE_PREVIEW_DELAY_ELAPSED",
            "FINISH_CUSTOMIZATION",
            "GO_BACK_TO_DESIGN_WITH_AI",
        ],
        Step::TransitionalScreen => &["GO_BACK_TO_HOME"],
        Step::Navigate | Step::BackToHomescreen | Step::AppearanceTask => &[],
    }
}

/// Events every step accepts
pub const GLOBAL_EVENTS: [&str; 2] = ["EXTERNAL_URL_UPDATE", "AI_WIZARD_CLOSED_BEFORE_COMPLETION"];

/// Where the `navigate` step sends the wizard for the given location
pub fn resolve_navigation(query: &Query) -> Step {
    if has_step_in_url(query, "intro") {
        Step::INTRO
    } else if has_step_in_url(query, "design-with-ai") {
        Step::DESIGN_WITH_AI
    } else if has_step_in_url(query, "assembler-hub") {
        Step::ASSEMBLER_HUB
    } else if has_step_in_url(query, "transitional") {
        Step::TransitionalScreen
    } else {
        Step::INTRO
    }
}

/// Eventless ("always") transition out of a transient step
pub fn eventless(step: Step, query: &Query) -> Option<Step> {
    match step {
        Step::Navigate => Some(resolve_navigation(query)),
        Step::DesignWithAi(DesignWithAiStep::PreDesignWithAi) => {
            Some(Step::DesignWithAi(DesignWithAiStep::DesignWithAi))
        }
        _ => None,
    }
}

/// Actions run when entering a step
pub fn entry_effects(step: Step) -> Vec<Effect> {
    match step {
        Step::Intro(IntroStep::PreIntro) => vec![Effect::Invoke(Service::FetchThemeCards)],
        Step::DesignWithAi(DesignWithAiStep::DesignWithAi) => {
            vec![Effect::UpdateQueryStep("design-with-ai")]
        }
        Step::AssemblerHub(AssemblerHubStep::AssemblerHub) => {
            vec![Effect::UpdateQueryStep("assembler-hub")]
        }
        Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub) => {
            vec![Effect::Invoke(Service::MarkTaskComplete)]
        }
        Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview) => {
            vec![Effect::ArmSitePreviewTimer]
        }
        Step::TransitionalScreen => vec![Effect::UpdateQueryStep("transitional")],
        _ => Vec::new(),
    }
}

/// Actions run when leaving a step
pub fn exit_effects(step: Step) -> Vec<Effect> {
    match step {
        Step::Intro(IntroStep::PreIntro) => vec![Effect::CancelInvocation(Service::FetchThemeCards)],
        Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub) => {
            vec![Effect::CancelInvocation(Service::MarkTaskComplete)]
        }
        Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview) => {
            vec![Effect::CancelSitePreviewTimer]
        }
        _ => Vec::new(),
    }
}

/// Entering the root: resolve `navigate` from the location
pub fn initial(context: &WizardContext, query: &Query) -> Transition {
    settle(Step::Navigate, context.clone(), entry_effects(Step::Navigate), query)
}

/// Look up `(step, event)`. `None` means the event is ignored in this step.
pub fn transition(
    step: Step,
    event: &WizardEvent,
    context: &WizardContext,
    query: &Query,
) -> Option<Transition> {
    let (target, actions, context) = select(step, event, context)?;

    let mut effects = exit_effects(step);
    effects.extend(actions);
    effects.extend(entry_effects(target));

    Some(settle(target, context, effects, query))
}

/// Follow eventless transitions until the step is stable
fn settle(mut step: Step, context: WizardContext, mut effects: Vec<Effect>, query: &Query) -> Transition {
    while let Some(next) = eventless(step, query) {
        effects.extend(exit_effects(step));
        effects.extend(entry_effects(next));
        step = next;
    }
    Transition {
        target: step,
        context,
        effects,
    }
}

type Selected = (Step, Vec<Effect>, WizardContext);

fn select(step: Step, event: &WizardEvent, context: &WizardContext) -> Option<Selected> {
    // Innermost handlers first, then the step's, then the machine-wide ones
    own_transition(step, event, context).or_else(|| global_transition(event, context))
}

fn own_transition(step: Step, event: &WizardEvent, context: &WizardContext) -> Option<Selected> {
    let unchanged = || context.clone();

    let selected = match (step, event) {
        (Step::Intro(IntroStep::PreIntro), WizardEvent::ThemeCardsFetched { theme_cards, .. }) => (
            Step::Intro(IntroStep::Intro),
            Vec::new(),
            assign_theme_cards(context, theme_cards),
        ),
        (Step::Intro(IntroStep::PreIntro), WizardEvent::ThemeCardsFetchFailed { .. }) => (
            Step::Intro(IntroStep::Intro),
            Vec::new(),
            assign_theme_cards(context, &[]),
        ),
        (Step::Intro(_), WizardEvent::DesignWithAi) => (Step::DESIGN_WITH_AI, Vec::new(), unchanged()),
        (Step::Intro(_), WizardEvent::SelectedActiveTheme) => {
            (Step::ASSEMBLER_HUB, Vec::new(), unchanged())
        }
        (Step::Intro(_), WizardEvent::ClickedOnBreadcrumb) => {
            (Step::BackToHomescreen, Vec::new(), unchanged())
        }
        (Step::Intro(_), WizardEvent::SelectedNewTheme { theme }) => (
            Step::AppearanceTask,
            Vec::new(),
            assign_selected_theme(context, theme),
        ),
        (Step::Intro(_), WizardEvent::SelectedBrowseAllThemes) => {
            (Step::AppearanceTask, Vec::new(), unchanged())
        }

        (Step::DesignWithAi(_), WizardEvent::ThemeSuggested) => {
            (Step::ASSEMBLER_HUB, Vec::new(), unchanged())
        }

        (Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub), WizardEvent::TaskCompleted { .. }) => (
            Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview),
            Vec::new(),
            unchanged(),
        ),
        (
            Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub),
            WizardEvent::TaskCompletionFailed { .. },
        ) => (Step::ASSEMBLER_HUB, Vec::new(), unchanged()),
        (
            Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview),
            WizardEvent::SitePreviewDelayElapsed { .. },
        ) => (Step::TransitionalScreen, Vec::new(), unchanged()),
        (Step::AssemblerHub(_), WizardEvent::FinishCustomization) => (
            Step::AssemblerHub(AssemblerHubStep::PostAssemblerHub),
            vec![Effect::PrefetchSitePreview],
            unchanged(),
        ),
        (Step::AssemblerHub(_), WizardEvent::GoBackToDesignWithAi) => {
            (Step::DESIGN_WITH_AI, Vec::new(), unchanged())
        }

        (Step::TransitionalScreen, WizardEvent::GoBackToHome) => {
            (Step::BackToHomescreen, Vec::new(), unchanged())
        }

        _ => return None,
    };
    Some(selected)
}

fn global_transition(event: &WizardEvent, context: &WizardContext) -> Option<Selected> {
    match event {
        WizardEvent::ExternalUrlUpdate => Some((Step::Navigate, Vec::new(), context.clone())),
        WizardEvent::AiWizardClosedBeforeCompletion { .. } => Some((
            Step::INTRO,
            vec![Effect::UpdateQueryStep("intro")],
            context.clone(),
        )),
        _ => None,
    }
}

fn assign_theme_cards(context: &WizardContext, theme_cards: &[ThemeCard]) -> WizardContext {
    let mut next = context.clone();
    next.intro.theme_cards = theme_cards.to_vec();
    if let Some(active) = theme_cards.iter().find(|card| card.is_active) {
        next.intro.active_theme = active.slug.clone();
    }
    next
}

fn assign_selected_theme(context: &WizardContext, theme: &str) -> WizardContext {
    let mut next = context.clone();
    next.intro.selected_theme = Some(theme.to_string());
    next
}
