use alloy::primitives::Address;

pub const ONBOARD_TEXT: &str = "Click here to install MetaMask!";
pub const CONNECT_TEXT: &str = "Connect Wallet";
pub const CONNECTED_TEXT: &str = "Connected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnboardingPhase {
    #[default]
    Idle,
    /// The install page was opened; waiting for a wallet to show up.
    InProgress,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingAction {
    StartOnboarding,
    RequestAccounts,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnboardingButton {
    pub label: &'static str,
    pub enabled: bool,
    pub action: OnboardingAction,
}

impl OnboardingButton {
    pub fn derive(provider_available: bool, accounts: &[Address]) -> Self {
        if !provider_available {
            Self {
                label: ONBOARD_TEXT,
                enabled: true,
                action: OnboardingAction::StartOnboarding,
            }
        } else if accounts.is_empty() {
            Self {
                label: CONNECT_TEXT,
                enabled: true,
                action: OnboardingAction::RequestAccounts,
            }
        } else {
            Self {
                label: CONNECTED_TEXT,
                enabled: false,
                action: OnboardingAction::Nothing,
            }
        }
    }
}

impl OnboardingPhase {
    pub fn on_click(self, action: OnboardingAction) -> Self {
        match (self, action) {
            (OnboardingPhase::Idle, OnboardingAction::StartOnboarding) => {
                OnboardingPhase::InProgress
            }
            (phase, _) => phase,
        }
    }

    /// A connected wallet ends onboarding for good.
    pub fn on_accounts(self, provider_available: bool, accounts: &[Address]) -> Self {
        if provider_available && !accounts.is_empty() {
            OnboardingPhase::Stopped
        } else {
            self
        }
    }
}
