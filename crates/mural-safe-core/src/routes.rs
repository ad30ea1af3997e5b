use alloy::primitives::Address;

use crate::forms::parse_address;
use crate::ports::PortError;

/// A screen of the application, addressable by a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Wallet,
    Safes,
    SafeDetails(Address),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Wallet => "/".to_owned(),
            Route::Safes => "/safes".to_owned(),
            Route::SafeDetails(address) => format!("/safes/{address}"),
        }
    }

    pub fn parse(path: &str) -> Result<Route, PortError> {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match trimmed {
            "" | "/" => Ok(Route::Wallet),
            "/safes" => Ok(Route::Safes),
            other => match other.strip_prefix("/safes/") {
                Some(raw) if !raw.contains('/') => Ok(Route::SafeDetails(parse_address(raw)?)),
                _ => Err(PortError::NotFound(format!("no route for {other}"))),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavRoute {
    pub href: &'static str,
    pub label: &'static str,
}

pub const NAV_ROUTES: &[NavRoute] = &[
    NavRoute {
        href: "/",
        label: "Wallet",
    },
    NavRoute {
        href: "/safes",
        label: "Safes",
    },
];

/// The root entry only matches itself; every other entry matches its subtree.
pub fn is_selected(href: &str, current_path: &str) -> bool {
    if href == "/" {
        current_path == "/"
    } else {
        current_path.starts_with(href)
    }
}
