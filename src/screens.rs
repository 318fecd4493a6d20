use std::{fmt, str::FromStr};

use crate::config::{FieldConfig, GlowConfig, ValueRange};
use crate::error::Error;

/// Host screens that carry a particle field backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    SignIn,
    SignUp,
    ForgotPassword,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::SignIn, Screen::SignUp, Screen::ForgotPassword];

    pub fn title(self) -> &'static str {
        match self {
            Screen::SignIn => "Sign in",
            Screen::SignUp => "Sign up",
            Screen::ForgotPassword => "Forgot password",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Screen::SignIn => "sign-in",
            Screen::SignUp => "sign-up",
            Screen::ForgotPassword => "forgot-password",
        }
    }

    pub fn config(self) -> FieldConfig {
        match self {
            Screen::SignIn => FieldConfig::default(),
            Screen::ForgotPassword => FieldConfig {
                count: 200,
                ..FieldConfig::default()
            },
            // Denser and livelier than the other two.
            Screen::SignUp => FieldConfig {
                count: 300,
                speed: 0.5,
                radius: ValueRange::new(0.6, 2.6),
                opacity: ValueRange::new(0.4, 1.0),
                influence_radius: 180.0,
                influence_strength: 0.03,
                damping: 0.99,
                glow: GlowConfig {
                    extent: 2.5,
                    falloff: 0.15,
                },
                ..FieldConfig::default()
            },
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Screen {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownScreen(s.to_owned()))
    }
}
