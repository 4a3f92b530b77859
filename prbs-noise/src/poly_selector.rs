//! Parsing of polynomial selections from the command line.

use std::fmt;
use std::str::FromStr;

use prbs::Poly;

/// Polynomial chosen on the command line: either an entry from the catalogue (`g8`, `8`) or
/// a raw bit pattern in hex (`0x8e`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PolySelector {
    Catalogue(Poly),
    Raw(u32),
}

impl PolySelector {
    pub fn bits(self) -> u32 {
        match self {
            PolySelector::Catalogue(poly) => poly.bits(),
            PolySelector::Raw(bits) => bits,
        }
    }
}

impl Default for PolySelector {
    fn default() -> Self {
        PolySelector::Catalogue(Poly::G32)
    }
}

impl FromStr for PolySelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return match u32::from_str_radix(hex, 16) {
                Ok(0) => Err("polynomial must be non-zero".to_string()),
                Ok(bits) => Ok(PolySelector::Raw(bits)),
                Err(err) => Err(format!("invalid polynomial {:?}: {}", s, err)),
            };
        }
        let digits = s.strip_prefix(['g', 'G']).unwrap_or(s);
        let degree: u32 = digits
            .parse()
            .map_err(|err| format!("invalid polynomial {:?}: {}", s, err))?;
        Poly::from_degree(degree)
            .map(PolySelector::Catalogue)
            .ok_or_else(|| {
                let known: Vec<String> =
                    Poly::ALL.iter().map(|p| p.degree().to_string()).collect();
                format!(
                    "no catalogued polynomial of degree {} (known: {})",
                    degree,
                    known.join(", ")
                )
            })
    }
}

impl fmt::Display for PolySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolySelector::Catalogue(poly) => write!(f, "g{}", poly.degree()),
            PolySelector::Raw(bits) => write!(f, "{:#x}", bits),
        }
    }
}

/// Parse a number given either in decimal or as `0x` prefixed hex.
pub fn parse_word(s: &str) -> Result<u32, String> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|err| format!("invalid number {:?}: {}", s, err))
}
