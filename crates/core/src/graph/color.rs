//! Deterministic per-function colors and short display names.
//!
//! Colors are spread over the hue circle with golden-ratio increments, so any
//! number of functions gets visually distinct colors without a palette table.
//! For large function counts two hues can still land on neighbouring RGB
//! values; that approximation is accepted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::model::FunctionOverview;

/// The golden ratio, (1 + sqrt(5)) / 2.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Legend key reserved for blocks without a function.
pub const NO_FUNCTION_KEY: &str = "0";

/// Display name of the "no function" bucket.
pub const NO_FUNCTION_LABEL: &str = "No Function";

/// Separator the backend uses between equivalent signatures of one function.
const SIGNATURE_SEPARATOR: &str = " or ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Fractional hue for `index`: `(index * PHI) mod 1`.
pub fn golden_hue(index: usize) -> f64 {
    let scaled = index as f64 * PHI;
    scaled - scaled.floor()
}

/// Convert HSL (hue in degrees, saturation and lightness in percent) to RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let s = s / 100.0;
    let l = l / 100.0;
    let k = |n: f64| (n + h / 30.0) % 12.0;
    let a = s * l.min(1.0 - l);
    let f = |n: f64| l - a * (-1.0_f64).max((k(n) - 3.0).min((9.0 - k(n)).min(1.0)));
    let channel = |v: f64| (255.0 * v).floor().clamp(0.0, 255.0) as u8;

    Rgb { r: channel(f(0.0)), g: channel(f(8.0)), b: channel(f(4.0)) }
}

/// Format an RGB triple as `#rrggbb`.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

/// Color of the function at `index`.
///
/// The hue fraction is scaled by 255 (not 360), so generated colors stay
/// out of the magenta end of the wheel.
pub fn function_color(index: usize) -> String {
    rgb_to_hex(hsl_to_rgb(golden_hue(index) * 255.0, 100.0, 50.0))
}

/// Shortest of the `" or "`-joined alternatives in a function name.
///
/// Ties keep the first alternative encountered.
pub fn pretty_function_name(name: &str) -> &str {
    let mut alternatives = name.split(SIGNATURE_SEPARATOR);
    let first = alternatives.next().unwrap_or(name);
    alternatives.fold(first, |shortest, candidate| {
        if candidate.chars().count() < shortest.chars().count() {
            candidate
        } else {
            shortest
        }
    })
}

/// Short name and color shown for a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionLabel {
    pub name: String,
    pub color: String,
}

impl FunctionLabel {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self { name: name.into(), color: color.into() }
    }
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    /// Raw function name, `None` for the "no function" bucket.
    pub function: Option<String>,
    pub short_name: String,
    /// Full name, present only when it differs from the short name.
    pub full_name: Option<String>,
    pub color: String,
}

/// Mapping from function name to its label, plus the "no function" bucket.
///
/// Function names keep the order in which the backend listed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDict {
    functions: IndexMap<String, FunctionLabel>,
    no_function: FunctionLabel,
}

impl FunctionDict {
    /// An empty dictionary with an explicit "no function" label.
    pub fn new(no_function: FunctionLabel) -> Self {
        Self { functions: IndexMap::new(), no_function }
    }

    /// Assign colors and short names to every listed function.
    ///
    /// The function at position `i` gets color index `i`; the "no function"
    /// bucket uses index `functions.len()`.
    pub fn from_functions(functions: &[FunctionOverview]) -> Self {
        let no_function = FunctionLabel::new(NO_FUNCTION_LABEL, function_color(functions.len()));
        let mut dict = Self::new(no_function);
        for (index, overview) in functions.iter().enumerate() {
            let name = overview.name();
            dict.insert(
                name,
                FunctionLabel::new(pretty_function_name(name), function_color(index)),
            );
        }
        dict
    }

    /// Insert or replace the label of a function.
    pub fn insert(&mut self, function: impl Into<String>, label: FunctionLabel) {
        self.functions.insert(function.into(), label);
    }

    pub fn get(&self, function: &str) -> Option<&FunctionLabel> {
        self.functions.get(function)
    }

    /// Resolve a block's function reference; `None` maps to the "no function" label.
    pub fn lookup(&self, function: Option<&str>) -> Option<&FunctionLabel> {
        match function {
            Some(name) => self.get(name),
            None => Some(&self.no_function),
        }
    }

    pub fn no_function(&self) -> &FunctionLabel {
        &self.no_function
    }

    /// Number of real functions (the "no function" bucket is not counted).
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionLabel)> {
        self.functions.iter().map(|(name, label)| (name.as_str(), label))
    }

    /// Legend rows, "no function" first.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let mut entries = Vec::with_capacity(self.functions.len() + 1);
        entries.push(LegendEntry {
            function: None,
            short_name: self.no_function.name.clone(),
            full_name: None,
            color: self.no_function.color.clone(),
        });
        for (name, label) in &self.functions {
            entries.push(LegendEntry {
                function: Some(name.clone()),
                short_name: label.name.clone(),
                full_name: (*name != label.name).then(|| name.clone()),
                color: label.color.clone(),
            });
        }
        entries
    }

    /// Display mapping keyed by function name, with the "no function" bucket under `"0"`.
    ///
    /// The bucket owns `"0"`: a function with that literal name is left out of
    /// the map (it still appears in [`FunctionDict::legend`]).
    pub fn to_display_map(&self) -> IndexMap<String, FunctionLabel> {
        let mut map = IndexMap::with_capacity(self.functions.len() + 1);
        map.insert(NO_FUNCTION_KEY.to_string(), self.no_function.clone());
        for (name, label) in &self.functions {
            if name == NO_FUNCTION_KEY {
                log::warn!("function named '{name}' clashes with the no-function key, omitted");
                continue;
            }
            map.insert(name.clone(), label.clone());
        }
        map
    }
}

impl Serialize for FunctionDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_display_map().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_index_is_pure_red() {
        assert_eq!(golden_hue(0), 0.0);
        assert_eq!(function_color(0), "#ff0000");
    }

    #[test]
    fn hsl_primary_points() {
        assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), Rgb { r: 0, g: 0, b: 255 });
        assert_eq!(hsl_to_rgb(0.0, 0.0, 100.0), Rgb { r: 255, g: 255, b: 255 });
    }

    #[test]
    fn hex_is_zero_padded() {
        assert_eq!(rgb_to_hex(Rgb { r: 1, g: 2, b: 255 }), "#0102ff");
    }

    #[test]
    fn pretty_name_ties_keep_first() {
        assert_eq!(pretty_function_name("abc() or xyz()"), "abc()");
        assert_eq!(pretty_function_name(""), "");
    }
}
