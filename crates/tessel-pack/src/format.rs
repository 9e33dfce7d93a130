use std::fmt;
use std::str::FromStr;

use crate::error::{PackError, Result};

// ── ScalarKind ────────────────────────────────────────────────────────────

/// Numeric family of a format token (`float32x2` → `Float`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Float,
    Sint,
    Uint,
    Snorm,
    Unorm,
}

impl ScalarKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Float => "float",
            ScalarKind::Sint => "sint",
            ScalarKind::Uint => "uint",
            ScalarKind::Snorm => "snorm",
            ScalarKind::Unorm => "unorm",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "float" => Some(ScalarKind::Float),
            "sint" => Some(ScalarKind::Sint),
            "uint" => Some(ScalarKind::Uint),
            "snorm" => Some(ScalarKind::Snorm),
            "unorm" => Some(ScalarKind::Unorm),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FieldDescriptor ───────────────────────────────────────────────────────

/// One parsed attribute format: `kind`, bytes per component, component count.
///
/// Invariant: `byte_width` is one of 1, 2, 4, 8 and `component_count` is 1..=4.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub kind: ScalarKind,
    pub byte_width: usize,
    pub component_count: usize,
}

impl FieldDescriptor {
    pub const MAX_COMPONENTS: usize = 4;

    /// Bytes occupied by the whole field (all components).
    #[inline]
    pub const fn byte_size(&self) -> usize {
        self.byte_width * self.component_count
    }

    #[inline]
    pub const fn bits(&self) -> usize {
        self.byte_width * 8
    }
}

/// Canonical token form; the scalar form is used when `component_count == 1`.
impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.bits())?;
        if self.component_count > 1 {
            write!(f, "x{}", self.component_count)?;
        }
        Ok(())
    }
}

impl FromStr for FieldDescriptor {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self> {
        parse_format(s)
    }
}

// ── parser ────────────────────────────────────────────────────────────────

/// Parses `<kind><bits>[x<count>]` into a [`FieldDescriptor`].
///
/// ```
/// use tessel_pack::{parse_format, ScalarKind};
///
/// let d = parse_format("unorm8x4").unwrap();
/// assert_eq!(d.kind, ScalarKind::Unorm);
/// assert_eq!((d.byte_width, d.component_count), (1, 4));
/// ```
pub fn parse_format(token: &str) -> Result<FieldDescriptor> {
    let malformed = |reason: &'static str| PackError::MalformedFormat {
        token: token.to_string(),
        reason,
    };

    let kind_end = token
        .find(|c: char| !c.is_ascii_lowercase())
        .unwrap_or(token.len());
    let (kind_name, rest) = token.split_at(kind_end);

    let kind = ScalarKind::from_name(kind_name).ok_or_else(|| malformed("unknown scalar kind"))?;

    let bits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let (bits_digits, suffix) = rest.split_at(bits_end);
    if bits_digits.is_empty() {
        return Err(malformed("missing bit width"));
    }
    let bits: u32 = bits_digits
        .parse()
        .map_err(|_| malformed("bit width out of range"))?;

    let component_count = match suffix {
        "" => 1,
        _ => {
            let Some(count_digits) = suffix.strip_prefix('x') else {
                return Err(malformed("unexpected characters after bit width"));
            };
            if count_digits.is_empty() || !count_digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed("component count must be a number"));
            }
            let count: usize = count_digits
                .parse()
                .map_err(|_| malformed("component count out of range"))?;
            if !(1..=FieldDescriptor::MAX_COMPONENTS).contains(&count) {
                return Err(malformed("component count must be 1..=4"));
            }
            count
        }
    };

    if !matches!(bits, 8 | 16 | 32 | 64) {
        return Err(PackError::InvalidWidth {
            token: token.to_string(),
            bits,
        });
    }

    Ok(FieldDescriptor {
        kind,
        byte_width: (bits / 8) as usize,
        component_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: ScalarKind, byte_width: usize, component_count: usize) -> FieldDescriptor {
        FieldDescriptor { kind, byte_width, component_count }
    }

    fn malformed(token: &str) -> bool {
        matches!(parse_format(token), Err(PackError::MalformedFormat { .. }))
    }

    // ── valid tokens ──────────────────────────────────────────────────────

    #[test]
    fn vector_form() {
        assert_eq!(parse_format("float32x4").unwrap(), field(ScalarKind::Float, 4, 4));
        assert_eq!(parse_format("unorm8x2").unwrap(), field(ScalarKind::Unorm, 1, 2));
        assert_eq!(parse_format("sint16x3").unwrap(), field(ScalarKind::Sint, 2, 3));
        assert_eq!(parse_format("float64x1").unwrap(), field(ScalarKind::Float, 8, 1));
    }

    #[test]
    fn scalar_form_defaults_to_one_component() {
        assert_eq!(parse_format("uint8").unwrap(), field(ScalarKind::Uint, 1, 1));
        assert_eq!(parse_format("uint16").unwrap(), field(ScalarKind::Uint, 2, 1));
        assert_eq!(parse_format("snorm32").unwrap(), field(ScalarKind::Snorm, 4, 1));
    }

    #[test]
    fn every_kind_parses() {
        for (name, kind) in [
            ("float", ScalarKind::Float),
            ("sint", ScalarKind::Sint),
            ("uint", ScalarKind::Uint),
            ("snorm", ScalarKind::Snorm),
            ("unorm", ScalarKind::Unorm),
        ] {
            for bits in [8usize, 16, 32, 64] {
                for count in 1..=4usize {
                    let token = format!("{name}{bits}x{count}");
                    assert_eq!(
                        parse_format(&token).unwrap(),
                        field(kind, bits / 8, count),
                        "{token}"
                    );
                }
            }
        }
    }

    #[test]
    fn from_str_matches_parse() {
        let d: FieldDescriptor = "float32x2".parse().unwrap();
        assert_eq!(d, parse_format("float32x2").unwrap());
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(parse_format("float32x2").unwrap().to_string(), "float32x2");
        assert_eq!(parse_format("uint16").unwrap().to_string(), "uint16");
        // `x1` collapses to the scalar form.
        assert_eq!(parse_format("sint8x1").unwrap().to_string(), "sint8");
    }

    // ── malformed tokens ──────────────────────────────────────────────────

    #[test]
    fn unknown_kind() {
        assert!(malformed("abc"));
        assert!(malformed("half16"));
        assert!(malformed("Float32"));
        assert!(malformed(""));
    }

    #[test]
    fn missing_bits() {
        assert!(malformed("float"));
        assert!(malformed("floatx2"));
    }

    #[test]
    fn bad_suffix() {
        assert!(malformed("float32x"));
        assert!(malformed("float32y2"));
        assert!(malformed("float32x2 "));
        assert!(malformed("float32x2x2"));
        assert!(malformed(" float32"));
    }

    #[test]
    fn component_count_out_of_range() {
        assert!(malformed("uint32x0"));
        assert!(malformed("uint32x5"));
        assert!(malformed("uint32x9"));
    }

    #[test]
    fn invalid_widths() {
        for token in ["float7", "uint12x2", "sint24", "float128", "unorm0"] {
            assert!(
                matches!(parse_format(token), Err(PackError::InvalidWidth { .. })),
                "{token}"
            );
        }
    }

    #[test]
    fn failures_are_deterministic() {
        assert_eq!(parse_format("float7"), parse_format("float7"));
        assert_eq!(
            parse_format("float7").unwrap_err(),
            PackError::InvalidWidth { token: "float7".into(), bits: 7 }
        );
    }
}
