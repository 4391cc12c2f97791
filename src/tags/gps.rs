//! GPS value encodings
//!
//! XMP stores coordinates as comma-separated sexagesimal terms followed by
//! a reference letter (`"48,51,29.5N"`), and altitudes and directions as
//! rationals (`"1234/10"`).

use crate::core::error::{XmpError, XmpResult};

/// Which coordinate a sexagesimal value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateAxis {
    Latitude,
    Longitude,
}

impl CoordinateAxis {
    /// Reference letter for non-negative values
    pub fn positive_ref(self) -> char {
        match self {
            CoordinateAxis::Latitude => 'N',
            CoordinateAxis::Longitude => 'E',
        }
    }

    /// Reference letter for negative values
    pub fn negative_ref(self) -> char {
        match self {
            CoordinateAxis::Latitude => 'S',
            CoordinateAxis::Longitude => 'W',
        }
    }

    fn reference(self, negative: bool) -> char {
        if negative {
            self.negative_ref()
        } else {
            self.positive_ref()
        }
    }
}

/// Decode `D,M,S<ref>` into decimal degrees
///
/// Terms decrease in significance by a factor of 60; any number of terms
/// is accepted. The reference letter is not applied, so the result is
/// the magnitude as written.
pub fn parse_sexagesimal(raw: &str) -> XmpResult<f64> {
    let terms: Vec<&str> = raw.trim().split(',').collect();
    let last = terms.len() - 1;

    let mut value = 0.0;
    let mut scale = 1.0;
    for (i, term) in terms.iter().enumerate() {
        let mut term = term.trim();
        if i == last {
            term = term.trim_end_matches(|c: char| !(c.is_ascii_digit() || c == '.'));
        }
        let number: f64 = term
            .parse()
            .map_err(|_| XmpError::bad_value("Malformed sexagesimal coordinate", raw))?;
        value += number / scale;
        scale *= 60.0;
    }
    Ok(value)
}

/// Encode decimal degrees as `D,M,S<ref>`
pub fn format_sexagesimal(value: f64, axis: CoordinateAxis) -> String {
    let v = value.abs();
    let degrees = v.trunc();
    let remainder = (v - degrees) * 3600.0;
    let minutes = (remainder / 60.0).trunc();
    let seconds = remainder - minutes * 60.0;

    format!(
        "{},{},{}{}",
        degrees,
        minutes,
        seconds,
        axis.reference(value.is_sign_negative())
    )
}

/// Encode a coordinate given as text
///
/// Plain decimals are converted with [`format_sexagesimal`]. Input with a
/// comma is taken as already sexagesimal: a leading `-` is dropped and
/// turns the reference letter into the negative one, and a missing letter
/// is added from the sign.
pub fn encode_coordinate(input: &str, axis: CoordinateAxis) -> XmpResult<String> {
    let input = input.trim();
    if !input.contains(',') {
        let value: f64 = input
            .parse()
            .map_err(|_| XmpError::bad_value("Malformed coordinate", input))?;
        if !value.is_finite() {
            return Err(XmpError::bad_value("Malformed coordinate", input));
        }
        return Ok(format_sexagesimal(value, axis));
    }

    let (negative, unsigned) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let has_reference = unsigned.ends_with(axis.positive_ref()) || unsigned.ends_with(axis.negative_ref());
    parse_sexagesimal(unsigned)?;

    let encoded = match (has_reference, negative) {
        (true, false) => unsigned.to_string(),
        (true, true) => {
            let mut terms = unsigned[..unsigned.len() - 1].to_string();
            terms.push(axis.negative_ref());
            terms
        }
        (false, negative) => format!("{}{}", unsigned, axis.reference(negative)),
    };
    Ok(encoded)
}

/// The reference letter at the end of a stored coordinate
pub fn reference_letter(raw: &str) -> Option<char> {
    raw.trim().chars().last()
}

/// Decode `num/den` (or a plain number) into a decimal
///
/// A zero denominator yields the numerator.
pub fn parse_rational(raw: &str) -> XmpResult<f64> {
    let raw = raw.trim();
    let malformed = || XmpError::bad_value("Malformed rational", raw);

    match raw.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().map_err(|_| malformed())?;
            let denominator: f64 = denominator.trim().parse().map_err(|_| malformed())?;
            if denominator == 0.0 {
                Ok(numerator)
            } else {
                Ok(numerator / denominator)
            }
        }
        None => raw.parse().map_err(|_| malformed()),
    }
}

/// Append `/1` unless the text is already a rational
pub fn to_rational(raw: &str) -> String {
    if raw.contains('/') {
        raw.to_string()
    } else {
        format!("{}/1", raw)
    }
}

/// Reduce an angle into `[0, 360)`
pub fn normalize_direction(degrees: f64) -> f64 {
    let reduced = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative angles up to exactly 360
    if reduced >= 360.0 {
        0.0
    } else {
        reduced
    }
}

/// Encode an image direction given as decimal or rational text
pub fn encode_direction(input: &str) -> XmpResult<String> {
    let degrees = parse_rational(input)?;
    if !degrees.is_finite() {
        return Err(XmpError::bad_value("Malformed direction", input));
    }
    Ok(format!("{}/1", normalize_direction(degrees)))
}

/// Stored form of an altitude: the unsigned rational and its reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAltitude {
    pub value: String,
    /// `"1"` below sea level, `"0"` otherwise
    pub reference: &'static str,
}

/// Encode an altitude given as decimal or rational text
pub fn encode_altitude(input: &str) -> XmpResult<EncodedAltitude> {
    let input = input.trim();
    if !parse_rational(input)?.is_finite() {
        return Err(XmpError::bad_value("Malformed altitude", input));
    }

    let altitude = to_rational(input);
    let encoded = match altitude.strip_prefix('-') {
        Some(unsigned) => EncodedAltitude {
            value: unsigned.to_string(),
            reference: "1",
        },
        None => EncodedAltitude {
            value: altitude,
            reference: "0",
        },
    };
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sexagesimal() {
        let value = parse_sexagesimal("48,51,29.5N").unwrap();
        assert!((value - (48.0 + 51.0 / 60.0 + 29.5 / 3600.0)).abs() < 1e-9);
        assert_eq!(parse_sexagesimal("12.5S").unwrap(), 12.5);
        assert_eq!(parse_sexagesimal("10,30W").unwrap(), 10.5);
        // multi-digit final terms keep their digits
        assert_eq!(parse_sexagesimal("0,0,36 E").unwrap(), 0.01);
    }

    #[test]
    fn test_parse_sexagesimal_malformed() {
        assert!(parse_sexagesimal("").is_err());
        assert!(parse_sexagesimal("N").is_err());
        assert!(parse_sexagesimal("a,b,cN").is_err());
        assert!(parse_sexagesimal("48,,1N").is_err());
    }

    #[test]
    fn test_format_sexagesimal() {
        assert_eq!(format_sexagesimal(10.5, CoordinateAxis::Latitude), "10,30,0N");
        assert_eq!(format_sexagesimal(-10.5, CoordinateAxis::Longitude), "10,30,0W");
        assert_eq!(format_sexagesimal(0.0, CoordinateAxis::Longitude), "0,0,0E");
    }

    #[test]
    fn test_round_trip_over_range() {
        for axis in [CoordinateAxis::Latitude, CoordinateAxis::Longitude] {
            let limit = if axis == CoordinateAxis::Latitude { 90 } else { 180 };
            for step in -(limit * 4)..=(limit * 4) {
                let value = step as f64 / 4.0 + 0.0123;
                let encoded = format_sexagesimal(value, axis);
                let decoded = parse_sexagesimal(&encoded).unwrap();
                assert!((decoded - value.abs()).abs() < 1e-6, "{} -> {}", value, encoded);

                let expected = if value < 0.0 { axis.negative_ref() } else { axis.positive_ref() };
                assert_eq!(reference_letter(&encoded), Some(expected));
            }
        }
    }

    #[test]
    fn test_encode_coordinate_preformatted() {
        let lat = CoordinateAxis::Latitude;
        assert_eq!(encode_coordinate("-48,51,29N", lat).unwrap(), "48,51,29S");
        assert_eq!(encode_coordinate("48,51,29S", lat).unwrap(), "48,51,29S");
        assert_eq!(encode_coordinate("48,51,29", lat).unwrap(), "48,51,29N");
        assert_eq!(encode_coordinate("-48,51,29", lat).unwrap(), "48,51,29S");
        assert_eq!(encode_coordinate("-2.25", CoordinateAxis::Longitude).unwrap(), "2,15,0W");
        assert!(encode_coordinate("north", lat).is_err());
        assert!(encode_coordinate("abc,def", lat).is_err());
        assert!(encode_coordinate("-48,,29S", lat).is_err());
    }

    #[test]
    fn test_rational() {
        assert_eq!(parse_rational("1234/10").unwrap(), 123.4);
        assert_eq!(parse_rational("5/0").unwrap(), 5.0);
        assert_eq!(parse_rational("7").unwrap(), 7.0);
        assert!(parse_rational("x/2").is_err());
        assert_eq!(to_rational("12"), "12/1");
        assert_eq!(to_rational("12/5"), "12/5");
    }

    #[test]
    fn test_direction() {
        assert_eq!(normalize_direction(-30.0), 330.0);
        assert_eq!(normalize_direction(750.0), 30.0);
        assert_eq!(normalize_direction(-1e-20), 0.0);
        assert_eq!(encode_direction("-30").unwrap(), "330/1");
        assert_eq!(encode_direction("750").unwrap(), "30/1");
        assert_eq!(encode_direction("1500/2").unwrap(), "30/1");
    }

    #[test]
    fn test_altitude() {
        assert_eq!(
            encode_altitude("-12.5").unwrap(),
            EncodedAltitude {
                value: "12.5/1".to_string(),
                reference: "1"
            }
        );
        let rational = encode_altitude("30/2").unwrap();
        assert_eq!((rational.value.as_str(), rational.reference), ("30/2", "0"));
        assert_eq!(encode_altitude("-30/2").unwrap().value, "30/2");
    }

    #[test]
    fn test_altitude_malformed() {
        assert!(encode_altitude("high").is_err());
        assert!(encode_altitude("").is_err());
        assert!(encode_altitude("12/x").is_err());
        assert!(encode_altitude("inf").is_err());
    }
}
