// Property-based tests for the customize-store transition table
// Any (step, event) pair the step does not list must leave the wizard where it is

use proptest::prelude::*;
use wc_admin::navigation::Query;
use wc_admin::wizard::transitions::{self, Effect};
use wc_admin::wizard::{
    AssemblerHubStep, DesignWithAiStep, InvocationId, Step, StepRegistry, TimerId, WizardContext,
    WizardEvent,
};

fn step_strategy() -> impl Strategy<Value = Step> {
    prop::sample::select(Step::ALL.to_vec())
}

fn theme_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

fn event_strategy() -> impl Strategy<Value = WizardEvent> {
    prop_oneof![
        Just(WizardEvent::ExternalUrlUpdate),
        theme_strategy().prop_map(|step| WizardEvent::AiWizardClosedBeforeCompletion { step }),
        Just(WizardEvent::DesignWithAi),
        Just(WizardEvent::SelectedActiveTheme),
        Just(WizardEvent::ClickedOnBreadcrumb),
        theme_strategy().prop_map(|theme| WizardEvent::SelectedNewTheme { theme }),
        Just(WizardEvent::SelectedBrowseAllThemes),
        Just(WizardEvent::ThemeSuggested),
        Just(WizardEvent::FinishCustomization),
        Just(WizardEvent::GoBackToDesignWithAi),
        Just(WizardEvent::GoBackToHome),
        any::<u64>().prop_map(|id| WizardEvent::ThemeCardsFetched {
            invocation: InvocationId(id),
            theme_cards: Vec::new(),
        }),
        any::<u64>().prop_map(|id| WizardEvent::ThemeCardsFetchFailed {
            invocation: InvocationId(id),
            reason: "timeout".to_string(),
        }),
        any::<u64>().prop_map(|id| WizardEvent::TaskCompleted { invocation: InvocationId(id) }),
        any::<u64>().prop_map(|id| WizardEvent::TaskCompletionFailed {
            invocation: InvocationId(id),
            reason: "forbidden".to_string(),
        }),
        any::<u64>().prop_map(|id| WizardEvent::SitePreviewDelayElapsed { timer: TimerId(id) }),
    ]
}

fn path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/customize-store".to_string()),
        Just("/customize-store/intro".to_string()),
        Just("/customize-store/design-with-ai".to_string()),
        Just("/customize-store/assembler-hub".to_string()),
        Just("/customize-store/assembler-hub/logo".to_string()),
        Just("/customize-store/transitional".to_string()),
        "/customize-store/[a-z-]{1,12}",
        "/[a-z-]{1,12}",
    ]
}

proptest! {
    #[test]
    fn prop_unlisted_events_are_no_ops(
        step in step_strategy(),
        event in event_strategy(),
        path in path_strategy(),
    ) {
        let registry = StepRegistry;
        let result = transitions::transition(step, &event, &WizardContext::default(), &Query::for_path(&path));

        if registry.accepts(step, &event) {
            prop_assert!(result.is_some(), "{} should handle {}", step, event.name());
        } else {
            prop_assert!(result.is_none(), "{} should ignore {}", step, event.name());
        }
    }

    #[test]
    fn prop_transitions_never_stop_on_transient_steps(
        step in step_strategy(),
        event in event_strategy(),
        path in path_strategy(),
    ) {
        if let Some(result) = transitions::transition(step, &event, &WizardContext::default(), &Query::for_path(&path)) {
            prop_assert_ne!(result.target, Step::Navigate);
            prop_assert_ne!(result.target, Step::DesignWithAi(DesignWithAiStep::PreDesignWithAi));
        }
    }

    #[test]
    fn prop_leaving_wait_for_site_preview_cancels_the_timer(
        event in event_strategy(),
        path in path_strategy(),
    ) {
        let waiting = Step::AssemblerHub(AssemblerHubStep::WaitForSitePreview);
        if let Some(result) = transitions::transition(waiting, &event, &WizardContext::default(), &Query::for_path(&path)) {
            prop_assert_eq!(result.effects.first(), Some(&Effect::CancelSitePreviewTimer));
        }
    }

    #[test]
    fn prop_navigation_resolves_every_path(path in path_strategy()) {
        let result = transitions::initial(&WizardContext::default(), &Query::for_path(&path));
        prop_assert!(matches!(
            result.target,
            Step::Intro(_) | Step::DesignWithAi(_) | Step::AssemblerHub(_) | Step::TransitionalScreen
        ));
    }
}
