//! Derivation of display units from solver dimension vectors.
//!
//! A dimension vector is seven comma-separated integers, one per SI base
//! quantity, in the order mass, length, time, current, temperature,
//! amount of substance, luminous intensity.
//!
//! Each component `e` selects a scale for its base unit:
//!
//! | `e`   | meaning                          |
//! |-------|----------------------------------|
//! | `0`   | base absent                      |
//! | `1`   | base, unscaled                   |
//! | other | base scaled by `10^e` (SI prefix) |
//!
//! Mass uses the gram as its base so that `3` renders as `kg`.

use std::error::Error;
use std::fmt;

/// Base unit symbols, in dimension-vector order.
const BASES: [&str; 7] = ["g", "m", "s", "A", "°C", "mol", "cd"];

/// A derived display unit, e.g. `ms` or `mV`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Unit {
    symbol: String,
}

impl Unit {
    /// The dimensionless unit, rendered `1`.
    pub fn dimensionless() -> Self {
        Self {
            symbol: "1".to_string(),
        }
    }

    /// A unit with an explicit symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    /// Parse a dimension vector into a unit.
    ///
    /// ```
    /// use watchtree_core::Unit;
    ///
    /// assert_eq!(Unit::from_dimension("0,1,0,0,0,0,0").unwrap().symbol(), "m");
    /// assert_eq!(Unit::from_dimension("0,0,-3,0,0,0,0").unwrap().symbol(), "ms");
    /// ```
    pub fn from_dimension(dimension: &str) -> Result<Self, UnitError> {
        let parts: Vec<&str> = dimension.split(',').map(str::trim).collect();
        if parts.len() != BASES.len() {
            return Err(UnitError::WrongArity { found: parts.len() });
        }

        let mut components = Vec::new();
        for (index, (text, base)) in parts.iter().zip(BASES).enumerate() {
            let exponent: i32 = text.parse().map_err(|_| UnitError::InvalidComponent {
                index,
                text: (*text).to_string(),
            })?;
            match exponent {
                0 => {}
                1 => components.push(base.to_string()),
                e => match si_prefix(e) {
                    Some(prefix) => components.push(format!("{prefix}{base}")),
                    None => components.push(format!("{base}·1e{e}")),
                },
            }
        }

        if components.is_empty() {
            return Ok(Self::dimensionless());
        }
        Ok(Self {
            symbol: components.join("·"),
        })
    }

    /// The rendered symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether this is the dimensionless unit.
    pub fn is_dimensionless(&self) -> bool {
        self.symbol == "1"
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

fn si_prefix(exponent: i32) -> Option<&'static str> {
    match exponent {
        -12 => Some("p"),
        -9 => Some("n"),
        -6 => Some("µ"),
        -3 => Some("m"),
        -2 => Some("c"),
        -1 => Some("d"),
        2 => Some("h"),
        3 => Some("k"),
        6 => Some("M"),
        12 => Some("T"),
        _ => None,
    }
}

/// Errors from [`Unit::from_dimension`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitError {
    /// The vector does not have exactly seven components.
    WrongArity {
        /// Number of components found.
        found: usize,
    },
    /// A component is not an integer.
    InvalidComponent {
        /// Zero-based component position.
        index: usize,
        /// The offending text.
        text: String,
    },
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongArity { found } => {
                write!(f, "dimension vector has {found} components, expected 7")
            }
            Self::InvalidComponent { index, text } => {
                write!(f, "dimension component {index} is not an integer: '{text}'")
            }
        }
    }
}

impl Error for UnitError {}
