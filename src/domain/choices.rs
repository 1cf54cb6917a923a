//! Closed choice sets offered to the user and their model encodings.
//!
//! Each set is declared exactly once through [`closed_set!`]; parsing,
//! encoding, decoding and the CLI's accepted values are all generated from
//! that single declaration. The codes are an external contract with the
//! training pipeline and are not ordinal.

use crate::utils::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => ($label:literal, $code:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $vis enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Accepted labels, in the order they are offered to the user.
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            /// `(label, value, code)` rows of the mapping table.
            pub const CHOICES: &'static [(&'static str, $name, u8)] =
                &[$(($label, $name::$variant, $code)),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Exact, case-sensitive lookup of a user-entered label.
            pub fn parse(field: &str, raw: &str) -> Result<Self> {
                Self::CHOICES
                    .iter()
                    .find(|(label, _, _)| *label == raw)
                    .map(|(_, value, _)| *value)
                    .ok_or_else(|| RiskError::EncodingError {
                        field: field.to_string(),
                        value: raw.to_string(),
                        expected: Self::LABELS.join(", "),
                    })
            }

            /// Inverse of [`Self::code`] for a numeric feature column.
            pub fn from_code(field: &str, code: f64) -> Result<Self> {
                Self::CHOICES
                    .iter()
                    .find(|(_, _, c)| f64::from(*c) == code)
                    .map(|(_, value, _)| *value)
                    .ok_or_else(|| RiskError::EncodingError {
                        field: field.to_string(),
                        value: code.to_string(),
                        expected: Self::CHOICES
                            .iter()
                            .map(|(_, _, c)| c.to_string())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

closed_set! {
    /// Answer to the alcohol and tobacco questions.
    pub enum YesNo {
        No => ("No", 0),
        Yes => ("Yes", 1),
    }
}

closed_set! {
    /// Family history of breast cancer (`nrelbc` in the training data).
    pub enum FamilyHistory {
        Other => ("Other", 0),
        None => ("None", 1),
        Multiple => ("Multiple", 2),
    }
}
