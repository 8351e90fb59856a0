use std::{fmt, str::FromStr, sync::LazyLock};

use asdf_astro_plugin::{astro_object, Node};
use indexmap::IndexMap;
use itertools::Itertools;
use regex::Regex;
use thiserror::Error;

/// A unit formatting error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UnitFormatError {
    /// The unit string could not be parsed.
    #[error("unable to parse unit {_0:?}")]
    Parse(String),
    /// The unit has no VOUnit representation.
    #[error("unit {unit} is not representable as a VOUnit: {symbol} is not a VOUnit symbol")]
    NotVoUnit {
        /// The unit.
        unit: String,
        /// The offending symbol.
        symbol: String,
    },
}

static COMPONENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_]+)(?:(?:\*\*|\^)?\(?(-?[0-9]+(?:\.[0-9]+)?)\)?)?")
        .expect("valid regex")
});

const VOUNIT_PREFIXES: &[&str] = &[
    "da", "y", "z", "a", "f", "p", "n", "u", "m", "c", "d", "h", "k", "M", "G", "T", "P", "E",
    "Z", "Y",
];

const VOUNIT_PREFIXABLE: &[&str] = &[
    "m", "s", "A", "K", "mol", "cd", "g", "rad", "sr", "Hz", "N", "Pa", "J", "W", "C", "V", "S",
    "F", "Wb", "T", "H", "lm", "lx", "Ohm", "eV", "Jy", "R", "G", "bit", "byte", "B", "a", "yr",
    "pc", "mag", "erg", "barn", "D", "ct", "ph", "photon", "pix", "pixel", "adu", "u", "au", "Ry",
    "lyr",
];

const VOUNIT_PLAIN: &[&str] = &[
    "deg", "arcmin", "arcsec", "mas", "d", "h", "min", "solMass", "solLum", "solRad", "AU",
    "beam", "bin", "chan", "voxel", "Angstrom", "angstrom", "electron", "Sun",
];

fn is_vounit_symbol(symbol: &str) -> bool {
    VOUNIT_PLAIN.contains(&symbol)
        || VOUNIT_PREFIXABLE.contains(&symbol)
        || VOUNIT_PREFIXES.iter().any(|prefix| {
            symbol
                .strip_prefix(prefix)
                .is_some_and(|base| VOUNIT_PREFIXABLE.contains(&base))
        })
}

fn format_power(power: f64) -> String {
    if power.fract() == 0.0 {
        #[allow(clippy::cast_possible_truncation)]
        let power = power as i64;
        power.to_string()
    } else {
        power.to_string()
    }
}

/// A physical unit.
///
/// A unit is parsed into `(symbol, power)` components, and two units are equal if their components are.
/// The text a unit was parsed from is kept as its generic representation.
#[derive(Clone, Debug)]
pub struct Unit {
    text: String,
    components: Vec<(String, f64)>,
}

astro_object!(Unit, "astropy.units.core.Unit", ["astropy.units.core.UnitBase"]);

impl Unit {
    /// Parse a unit string.
    ///
    /// Components are separated by whitespace, `.` or `*`, with powers written as `m2`, `s-1`, `m**2` or `m^2`.
    /// Every component after a `/` is inverted, as is a parenthesised group following a `/`.
    ///
    /// # Errors
    /// Returns [`UnitFormatError::Parse`] if `text` is not a valid unit string.
    pub fn parse(text: &str) -> Result<Self, UnitFormatError> {
        let trimmed = text.trim();
        let mut components: IndexMap<String, f64> = IndexMap::new();
        if !matches!(trimmed, "" | "dimensionless" | "dimensionless_unscaled") {
            for (index, part) in trimmed.split('/').enumerate() {
                let sign = if index == 0 { 1.0 } else { -1.0 };
                let mut consumed = 0;
                let mut found = false;
                for captures in COMPONENT_REGEX.captures_iter(part) {
                    let Some(whole) = captures.get(0) else {
                        continue;
                    };
                    if !part[consumed..whole.start()]
                        .chars()
                        .all(|c| c.is_whitespace() || matches!(c, '.' | '*' | '(' | ')'))
                    {
                        return Err(UnitFormatError::Parse(text.to_string()));
                    }
                    consumed = whole.end();
                    let power = match captures.get(2) {
                        Some(power) => power
                            .as_str()
                            .parse::<f64>()
                            .map_err(|_| UnitFormatError::Parse(text.to_string()))?,
                        None => 1.0,
                    };
                    *components.entry(captures[1].to_string()).or_default() += sign * power;
                    found = true;
                }
                let rest_is_separator = part[consumed..]
                    .chars()
                    .all(|c| c.is_whitespace() || matches!(c, '(' | ')'));
                if !found || !rest_is_separator {
                    return Err(UnitFormatError::Parse(text.to_string()));
                }
            }
        }
        Ok(Self {
            text: trimmed.to_string(),
            components: components
                .into_iter()
                .filter(|(_, power)| *power != 0.0)
                .collect(),
        })
    }

    /// The dimensionless unit.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self {
            text: String::new(),
            components: Vec::new(),
        }
    }

    /// Returns true if the unit is dimensionless.
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the `(symbol, power)` components.
    #[must_use]
    pub fn components(&self) -> &[(String, f64)] {
        &self.components
    }

    /// Format the unit in the VOUnit format, e.g. `km.s**-1`.
    ///
    /// # Errors
    /// Returns [`UnitFormatError::NotVoUnit`] if a component is not a VOUnit symbol.
    pub fn to_vounit(&self) -> Result<String, UnitFormatError> {
        if let Some((symbol, _)) = self
            .components
            .iter()
            .find(|(symbol, _)| !is_vounit_symbol(symbol))
        {
            return Err(UnitFormatError::NotVoUnit {
                unit: self.text.clone(),
                symbol: symbol.clone(),
            });
        }
        Ok(self
            .components
            .iter()
            .map(|(symbol, power)| {
                if *power == 1.0 {
                    symbol.clone()
                } else {
                    format!("{symbol}**{}", format_power(*power))
                }
            })
            .join("."))
    }

    fn canonical(&self) -> Vec<(&str, f64)> {
        self.components
            .iter()
            .map(|(symbol, power)| (symbol.as_str(), *power))
            .sorted_by(|a, b| a.0.cmp(b.0))
            .collect()
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Unit {
    type Err = UnitFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Unit> for Node {
    fn from(unit: Unit) -> Self {
        Node::Object(asdf_astro_plugin::ObjectRef::new(unit))
    }
}

/// A logarithmic magnitude unit, e.g. `mag(ct / s)`.
#[derive(Clone, Debug, PartialEq)]
pub struct MagUnit {
    /// The physical unit.
    pub physical_unit: Unit,
    /// The function unit, usually `mag`.
    pub function_unit: Unit,
}

astro_object!(MagUnit, "astropy.units.function.logarithmic.MagUnit");

/// One named member of an [`Equivalency`].
#[derive(Clone, Debug, PartialEq)]
pub struct EquivalencyComponent {
    /// The equivalency name, e.g. `spectral`.
    pub name: String,
    /// The keyword arguments the equivalency was created with.
    pub kwargs: IndexMap<String, Node>,
}

/// A list of unit equivalencies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Equivalency {
    /// The members.
    pub components: Vec<EquivalencyComponent>,
}

astro_object!(Equivalency, "astropy.units.equivalencies.Equivalency");

impl Equivalency {
    /// Create an equivalency with a single member without arguments.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            components: vec![EquivalencyComponent {
                name: name.into(),
                kwargs: IndexMap::new(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_parse_equality() {
        let a = Unit::parse("km / s").unwrap();
        let b = Unit::parse("km s-1").unwrap();
        let c = Unit::parse("s**-1 km").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.to_string(), "km / s");
        assert_ne!(a, Unit::parse("km").unwrap());
        assert_eq!(
            Unit::parse("erg / (cm2 s)").unwrap(),
            Unit::parse("erg cm-2 s-1").unwrap()
        );
        assert!(Unit::parse("").unwrap().is_dimensionless());
        assert!(Unit::parse("m / s").unwrap() != Unit::parse("m / s / s").unwrap());
    }

    #[test]
    fn unit_parse_invalid() {
        assert!(matches!(Unit::parse("m + s"), Err(UnitFormatError::Parse(_))));
        assert!(Unit::parse("km /").is_err());
        assert!("10 m".parse::<Unit>().is_err());
    }

    #[test]
    fn unit_vounit() {
        assert_eq!(Unit::parse("km / s").unwrap().to_vounit().unwrap(), "km.s**-1");
        assert_eq!(Unit::parse("deg").unwrap().to_vounit().unwrap(), "deg");
        assert_eq!(Unit::parse("m**0.5").unwrap().to_vounit().unwrap(), "m**0.5");
        assert_eq!(Unit::parse("Jy").unwrap().to_vounit().unwrap(), "Jy");
        for unit in ["deg_C", "littleh", "cycle", "Mpc / littleh"] {
            assert!(matches!(
                Unit::parse(unit).unwrap().to_vounit(),
                Err(UnitFormatError::NotVoUnit { .. })
            ));
        }
    }
}
