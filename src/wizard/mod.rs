// Customize-store wizard: step graph, screens, services and the controller driving them

pub mod controller;
pub mod registry;
pub mod services;
pub mod transitions;
pub mod types;

pub use controller::{TransitionRecord, WizardController, WizardEventSender};
pub use registry::{Screen, StepRegistry};
pub use services::{OfflineWizardServices, RestWizardServices, ServiceError, WizardServices, TASK_COMPLETED_OPTION};
pub use transitions::{Effect, Transition};
pub use types::{
    AssemblerHubStep, DesignWithAiStep, IntroStep, InvocationId, Service, Step, ThemeCard,
    TimerId, WizardContext, WizardEvent,
};
