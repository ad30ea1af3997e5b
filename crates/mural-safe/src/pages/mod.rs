//! Screen renderers. Each page draws from its own state slice and reports
//! anything that needs the app shell (navigation, wallet prompts) upward.

use mural_safe_core::{OnboardingAction, Route};

pub mod safe_details;
pub mod safes;
pub mod wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Navigate(Route),
    Onboard(OnboardingAction),
}
