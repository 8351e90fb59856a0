use std::sync::LazyLock;

use asdf_astro_plugin::{astro_object, ConvertError, Node};
use regex::Regex;

use super::{EarthLocation, Numeric};

/// Formats that can be inferred from a bare value.
pub const GUESSABLE_FORMATS: &[&str] = &["iso", "byear", "jyear", "yday"];

static FORMAT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("isot", r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2}(\.\d*)?)?$"),
        ("iso", r"^\d{4}-\d{2}-\d{2}( \d{2}:\d{2}(:\d{2}(\.\d*)?)?)?$"),
        ("yday", r"^\d{4}:\d{3}(:\d{2}:\d{2}(:\d{2}(\.\d*)?)?)?$"),
        ("byear_str", r"^B\d+(\.\d*)?$"),
        ("jyear_str", r"^J\d+(\.\d*)?$"),
    ]
    .into_iter()
    .map(|(format, pattern)| (format, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Map a time format to the name written in documents.
#[must_use]
pub fn asdf_format(format: &str) -> &str {
    match format {
        "isot" => "iso",
        "byear_str" => "byear",
        "jyear_str" => "jyear",
        format => format,
    }
}

/// Returns true if `format` can be inferred from a bare value.
#[must_use]
pub fn is_guessable_format(format: &str) -> bool {
    GUESSABLE_FORMATS.contains(&asdf_format(format))
}

/// The value of a [`Time`].
#[derive(Clone, Debug, PartialEq)]
pub enum TimeValue {
    /// A string, e.g. `2000-01-01T00:00:00`.
    Text(String),
    /// A number, e.g. a modified Julian date.
    Number(f64),
    /// An array of values.
    Sequence(Vec<TimeValue>),
}

impl TimeValue {
    /// Returns true if the value is not an array.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Sequence(_))
    }

    /// Convert the value to a node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        match self {
            Self::Text(text) => Node::String(text.clone()),
            Self::Number(number) => Node::Float(*number),
            Self::Sequence(values) => Node::Sequence(values.iter().map(Self::to_node).collect()),
        }
    }

    /// Convert a string, number or sequence node.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] for any other node.
    pub fn from_node(node: &Node) -> Result<Self, ConvertError> {
        match node {
            Node::String(text) => Ok(Self::Text(text.clone())),
            Node::Int(_) | Node::Float(_) => Ok(Self::Number(node.to_f64()?)),
            Node::Sequence(values) => values
                .iter()
                .map(Self::from_node)
                .collect::<Result<_, _>>()
                .map(Self::Sequence),
            node => Err(ConvertError::InvalidNode(format!(
                "expected a time value, got {}",
                node.kind()
            ))),
        }
    }

    /// Infer the format of the value.
    ///
    /// Only string values in a guessable format can be inferred.
    /// All elements of an array must share a format.
    #[must_use]
    pub fn guess_format(&self) -> Option<&'static str> {
        match self {
            Self::Text(text) => FORMAT_PATTERNS
                .iter()
                .find(|(_, regex)| regex.is_match(text))
                .map(|(format, _)| *format),
            Self::Number(_) => None,
            Self::Sequence(values) => {
                let mut formats = values.iter().map(Self::guess_format);
                let first = formats.next()??;
                formats.all(|format| format == Some(first)).then_some(first)
            }
        }
    }

    fn map_numbers(&self, f: &impl Fn(f64) -> String) -> Self {
        match self {
            Self::Number(number) => Self::Text(f(*number)),
            Self::Sequence(values) => {
                Self::Sequence(values.iter().map(|value| value.map_numbers(f)).collect())
            }
            Self::Text(_) => self.clone(),
        }
    }
}

/// An instant in time.
#[derive(Clone, Debug, PartialEq)]
pub struct Time {
    /// The value.
    pub value: TimeValue,
    /// The format, e.g. `isot`, `mjd` or `byear`.
    pub format: String,
    /// The time scale, e.g. `utc` or `tai`.
    pub scale: String,
    /// The observatory location.
    pub location: Option<EarthLocation>,
}

astro_object!(Time, "astropy.time.core.Time");

impl Time {
    /// Create a UTC time.
    #[must_use]
    pub fn new(value: TimeValue, format: impl Into<String>) -> Self {
        Self {
            value,
            format: format.into(),
            scale: "utc".to_string(),
            location: None,
        }
    }

    /// Create a UTC time from a string, inferring the format.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if `text` is not in a guessable format.
    pub fn parse(text: &str) -> Result<Self, ConvertError> {
        let value = TimeValue::Text(text.to_string());
        let format = value.guess_format().ok_or_else(|| {
            ConvertError::InvalidNode(format!(
                "time {text:?} is not one of the recognized implicit formats"
            ))
        })?;
        Ok(Self::new(value, format))
    }

    /// Return the time with `scale`.
    #[must_use]
    pub fn with_scale(mut self, scale: impl Into<String>) -> Self {
        self.scale = scale.into();
        self
    }

    /// Return the time with `location`.
    #[must_use]
    pub fn with_location(mut self, location: EarthLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Return an equivalent time in a format that can be written to a document.
    ///
    /// Besselian and Julian epochs become their string forms, and `fits` becomes `isot`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let (value, format) = match self.format.as_str() {
            "byear" => (
                self.value.map_numbers(&|number| format!("B{number:.3}")),
                "byear_str",
            ),
            "jyear" => (
                self.value.map_numbers(&|number| format!("J{number:.3}")),
                "jyear_str",
            ),
            "fits" => (self.value.clone(), "isot"),
            _ => return self.clone(),
        };
        Self {
            value,
            format: format.to_string(),
            ..self.clone()
        }
    }
}

/// A time interval, stored as a two-part Julian date.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeDelta {
    /// The first part of the interval in days.
    pub jd1: Numeric,
    /// The second part of the interval in days.
    pub jd2: Numeric,
    /// The format, e.g. `jd` or `sec`.
    pub format: String,
    /// The time scale.
    pub scale: String,
}

astro_object!(TimeDelta, "astropy.time.core.TimeDelta");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_guess_format() {
        assert_eq!(Time::parse("2000-01-01T00:00:00.000").unwrap().format, "isot");
        assert_eq!(Time::parse("2000-01-01 00:00:00").unwrap().format, "iso");
        assert_eq!(Time::parse("2000:001:00:00:00").unwrap().format, "yday");
        assert_eq!(Time::parse("B1950.000").unwrap().format, "byear_str");
        assert_eq!(Time::parse("J2000").unwrap().format, "jyear_str");
        assert!(Time::parse("yesterday").is_err());
        assert_eq!(TimeValue::Number(51544.0).guess_format(), None);
        let mixed = TimeValue::Sequence(vec![
            TimeValue::Text("2000-01-01".to_string()),
            TimeValue::Text("J2000".to_string()),
        ]);
        assert_eq!(mixed.guess_format(), None);
    }

    #[test]
    fn time_normalized() {
        let time = Time::new(TimeValue::Number(1950.0), "byear").normalized();
        assert_eq!(time.format, "byear_str");
        assert_eq!(time.value, TimeValue::Text("B1950.000".to_string()));
        assert!(is_guessable_format(&time.format));
        assert!(!is_guessable_format("mjd"));
        assert_eq!(asdf_format("isot"), "iso");
    }
}
