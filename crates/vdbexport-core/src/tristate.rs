// ABOUTME: Defines TriState, a three-valued flag (false, true, unset) for optional permission attributes.
// ABOUTME: Keeps "explicitly denied" distinct from "not specified" without leaning on Option<bool>.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when the boolean value of an unset flag is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tri-state flag is unset and has no boolean value")]
pub struct InvalidTriStateAccess;

/// A flag that is explicitly false, explicitly true, or not specified at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    False,
    True,
    #[default]
    Unset,
}

impl TriState {
    /// Convert an optional boolean: `None` is unset.
    pub fn from_nullable_boolean(value: Option<bool>) -> Self {
        match value {
            None => TriState::Unset,
            Some(true) => TriState::True,
            Some(false) => TriState::False,
        }
    }

    /// Convert optional text. `None` is unset; anything else is true when it
    /// equals "true" ignoring case, and false otherwise.
    pub fn from_optional_str(value: Option<&str>) -> Self {
        match value {
            None => TriState::Unset,
            Some(text) if text.eq_ignore_ascii_case("true") => TriState::True,
            Some(_) => TriState::False,
        }
    }

    pub fn is_unset(self) -> bool {
        self == TriState::Unset
    }

    pub fn is_true(self) -> bool {
        self == TriState::True
    }

    pub fn is_false(self) -> bool {
        self == TriState::False
    }

    /// The boolean held by this flag. Callers must check `is_unset()` first;
    /// an unset flag yields `InvalidTriStateAccess`.
    pub fn boolean_value(self) -> Result<bool, InvalidTriStateAccess> {
        match self {
            TriState::False => Ok(false),
            TriState::True => Ok(true),
            TriState::Unset => Err(InvalidTriStateAccess),
        }
    }

    /// Literal text for a set flag, `None` when unset.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            TriState::False => Some("false"),
            TriState::True => Some("true"),
            TriState::Unset => None,
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        TriState::from_nullable_boolean(value)
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        TriState::from_nullable_boolean(Some(value))
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("unset"))
    }
}
