//! Colour assignment for Tree Signal channels.
//!
//! Every channel gets a monochromatic palette (background, border, normal,
//! highlight) derived from one hue. Hues are spread with a prime rotation
//! step so consecutive assignments land far apart on the wheel; assignment
//! and inheritance policies decide which key a channel is coloured by.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use treesignal_types::{ChannelPath, ColorScheme};

// ── Policy axes ─────────────────────────────────────────────────

/// How a key is mapped to a hue index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    /// First-seen keys get the next counter index.
    #[default]
    Increment,
    /// SHA-256 of the key, first 4 bytes big-endian, mod 1000.
    Hash,
}

/// Which key a channel is coloured by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InheritanceMode {
    /// The full dotted path; every node independently coloured.
    #[default]
    Unique,
    /// The first segment; descendants shift hue by 5° per level.
    Root,
    /// Root hue plus a lightness bump per level, brighter descendants.
    Family,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMode {
    pub axis: &'static str,
    pub value: String,
}

impl fmt::Display for InvalidMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} mode: {}", self.axis, self.value)
    }
}

impl Error for InvalidMode {}

impl AssignmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Hash => "hash",
        }
    }
}

impl FromStr for AssignmentMode {
    type Err = InvalidMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "increment" => Ok(Self::Increment),
            "hash" => Ok(Self::Hash),
            _ => Err(InvalidMode {
                axis: "assignment",
                value: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for AssignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InheritanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::Root => "root",
            Self::Family => "family",
        }
    }
}

impl FromStr for InheritanceMode {
    type Err = InvalidMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "unique" => Ok(Self::Unique),
            "root" => Ok(Self::Root),
            "family" => Ok(Self::Family),
            _ => Err(InvalidMode {
                axis: "inheritance",
                value: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for InheritanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Palette engine ──────────────────────────────────────────────

/// Hue rotation in degrees per assigned index. Prime and coprime to 360,
/// so the full wheel is covered before any hue repeats.
pub const HUE_INCREMENT: u32 = 101;

/// Hue shift per depth level in `root`/`family` inheritance.
const DEPTH_HUE_STEP: u32 = 5;

/// Lightness bump per depth level in `family` inheritance, in percent.
const DEPTH_LIGHTNESS_STEP: f64 = 5.0;

/// Pure palette generator: index or key to a monochromatic [`ColorScheme`].
#[derive(Debug, Clone)]
pub struct PaletteGenerator {
    increment: u32,
    start: u32,
}

impl Default for PaletteGenerator {
    fn default() -> Self {
        Self {
            increment: HUE_INCREMENT,
            start: 0,
        }
    }
}

impl PaletteGenerator {
    pub fn new(increment: u32, start: u32) -> Self {
        Self {
            increment,
            start: start % 360,
        }
    }

    pub fn hue_for_index(&self, index: u32) -> u16 {
        ((self.start + self.increment * index) % 360) as u16
    }

    pub fn scheme_for_index(&self, index: u32) -> ColorScheme {
        self.scheme_for_hue(self.hue_for_index(index))
    }

    /// Deterministic scheme for an arbitrary key: SHA-256, first 4 bytes
    /// big-endian, reduced mod 1000, then the normal index formula.
    pub fn scheme_for_hash(&self, key: &str) -> ColorScheme {
        self.scheme_for_index(hash_index(key))
    }

    /// Dark-mode friendly palette on a fixed lightness/saturation table:
    /// background 15%, border 30%, normal text 65%, highlight 85%.
    pub fn scheme_for_hue(&self, hue: u16) -> ColorScheme {
        ColorScheme {
            hue,
            background: hsl_to_hex(hue as f64, 35.0, 15.0),
            border: hsl_to_hex(hue as f64, 40.0, 30.0),
            normal: hsl_to_hex(hue as f64, 50.0, 65.0),
            highlight: hsl_to_hex(hue as f64, 60.0, 85.0),
        }
    }
}

fn hash_index(key: &str) -> u32 {
    let digest = Sha256::digest(key.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) % 1000
}

/// HSL (degrees, percent, percent) to lowercase `#rrggbb`.
///
/// Channels are floored at `x * 255`, matching the renderer's expectation
/// of stable hex strings for a given hue.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let (r, g, b) = hsl_to_rgb(h / 360.0, s / 100.0, l / 100.0);
    format!(
        "#{:02x}{:02x}{:02x}",
        (r * 255.0) as u8,
        (g * 255.0) as u8,
        (b * 255.0) as u8
    )
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    (
        hue_component(m1, m2, h + 1.0 / 3.0),
        hue_component(m1, m2, h),
        hue_component(m1, m2, h - 1.0 / 3.0),
    )
}

fn hue_component(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

// ── Colour service ──────────────────────────────────────────────

/// Assigns palettes to channel paths under the configured policies.
///
/// A given key always resolves to the same palette for the life of a
/// service instance, so the dashboard's colouring is stable across layout
/// frames. Replacing the service resets all counters.
#[derive(Debug, Clone)]
pub struct ColorService {
    assignment: AssignmentMode,
    inheritance: InheritanceMode,
    generator: PaletteGenerator,
    channel_indices: HashMap<String, u32>,
    root_indices: HashMap<String, u32>,
    next_index: u32,
    next_root_index: u32,
}

impl ColorService {
    pub fn new(assignment: AssignmentMode, inheritance: InheritanceMode) -> Self {
        Self {
            assignment,
            inheritance,
            generator: PaletteGenerator::default(),
            channel_indices: HashMap::new(),
            root_indices: HashMap::new(),
            next_index: 0,
            next_root_index: 0,
        }
    }

    pub fn assignment(&self) -> AssignmentMode {
        self.assignment
    }

    pub fn inheritance(&self) -> InheritanceMode {
        self.inheritance
    }

    pub fn scheme_for_channel(&mut self, path: &ChannelPath) -> ColorScheme {
        match self.inheritance {
            InheritanceMode::Unique => {
                let key = path.to_string();
                match self.assignment {
                    AssignmentMode::Increment => {
                        let index = self.unique_index(key);
                        self.generator.scheme_for_index(index)
                    }
                    AssignmentMode::Hash => self.generator.scheme_for_hash(&key),
                }
            }
            InheritanceMode::Root => {
                let hue = self.inherited_hue(path);
                self.generator.scheme_for_hue(hue)
            }
            InheritanceMode::Family => self.family_scheme(path),
        }
    }

    fn unique_index(&mut self, key: String) -> u32 {
        if let Some(index) = self.channel_indices.get(&key) {
            return *index;
        }
        let index = self.next_index;
        self.next_index += 1;
        self.channel_indices.insert(key, index);
        index
    }

    fn root_index(&mut self, root: &str) -> u32 {
        if let Some(index) = self.root_indices.get(root) {
            return *index;
        }
        let index = match self.assignment {
            AssignmentMode::Increment => {
                let index = self.next_root_index;
                self.next_root_index += 1;
                index
            }
            AssignmentMode::Hash => hash_index(root),
        };
        self.root_indices.insert(root.to_string(), index);
        index
    }

    /// Root-segment hue shifted 5° per level below the root.
    fn inherited_hue(&mut self, path: &ChannelPath) -> u16 {
        let Some(root) = path.first().map(str::to_string) else {
            return self.generator.hue_for_index(0);
        };
        let index = self.root_index(&root);
        let base = self.generator.hue_for_index(index) as u32;
        let offset = DEPTH_HUE_STEP * (path.depth() as u32 - 1);
        ((base + offset) % 360) as u16
    }

    /// Root hue with lightness raised per level, progressively brighter
    /// descendants. Each band is clamped so text stays readable.
    fn family_scheme(&mut self, path: &ChannelPath) -> ColorScheme {
        if path.is_root() {
            return self.generator.scheme_for_index(0);
        }
        let hue = self.inherited_hue(path);
        let bump = DEPTH_LIGHTNESS_STEP * (path.depth() as f64 - 1.0);
        ColorScheme {
            hue,
            background: hsl_to_hex(hue as f64, 35.0, (15.0 + bump).min(25.0)),
            border: hsl_to_hex(hue as f64, 40.0, (30.0 + bump).min(40.0)),
            normal: hsl_to_hex(hue as f64, 50.0, (65.0 + bump).min(80.0)),
            highlight: hsl_to_hex(hue as f64, 60.0, (85.0 + bump).min(95.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> ChannelPath {
        ChannelPath::parse(raw).unwrap()
    }

    #[test]
    fn hue_zero_palette_matches_hsl_table() {
        let scheme = PaletteGenerator::default().scheme_for_hue(0);
        assert_eq!(scheme.background, "#331818");
        assert_eq!(scheme.border, "#6b2d2d");
        assert_eq!(scheme.normal, "#d27979");
        assert_eq!(scheme.highlight, "#efc1c1");
    }

    #[test]
    fn prime_increment_spreads_hues() {
        let generator = PaletteGenerator::default();
        assert_eq!(generator.hue_for_index(0), 0);
        assert_eq!(generator.hue_for_index(1), 101);
        assert_eq!(generator.hue_for_index(2), 202);
        assert_eq!(generator.hue_for_index(3), 303);
        assert_eq!(generator.hue_for_index(4), 44);
    }

    #[test]
    fn first_assignments_get_distinct_hues() {
        let mut service = ColorService::new(AssignmentMode::Increment, InheritanceMode::Unique);
        let mut seen = std::collections::HashSet::new();
        for i in 0..100 {
            let scheme = service.scheme_for_channel(&path(&format!("channel{i}")));
            assert!(seen.insert(scheme.hue), "hue {} repeated", scheme.hue);
        }
    }

    #[test]
    fn increment_mode_is_stable_per_key() {
        let mut service = ColorService::new(AssignmentMode::Increment, InheritanceMode::Unique);
        let first = service.scheme_for_channel(&path("a.b"));
        service.scheme_for_channel(&path("c"));
        let again = service.scheme_for_channel(&path("a.b"));
        assert_eq!(first, again);
    }

    #[test]
    fn hash_mode_agrees_across_instances() {
        let mut one = ColorService::new(AssignmentMode::Hash, InheritanceMode::Unique);
        let mut two = ColorService::new(AssignmentMode::Hash, InheritanceMode::Unique);
        // Interleave unrelated lookups; hash assignment carries no state.
        two.scheme_for_channel(&path("noise"));
        assert_eq!(
            one.scheme_for_channel(&path("prod.api")),
            two.scheme_for_channel(&path("prod.api"))
        );
    }

    #[test]
    fn root_inheritance_shifts_hue_with_depth() {
        let mut service = ColorService::new(AssignmentMode::Increment, InheritanceMode::Root);
        let root = service.scheme_for_channel(&path("prod"));
        let child = service.scheme_for_channel(&path("prod.api"));
        let grandchild = service.scheme_for_channel(&path("prod.api.auth"));
        assert_eq!(child.hue, (root.hue + 5) % 360);
        assert_eq!(grandchild.hue, (root.hue + 10) % 360);
    }

    #[test]
    fn root_inheritance_gives_siblings_the_same_shift() {
        let mut service = ColorService::new(AssignmentMode::Increment, InheritanceMode::Root);
        service.scheme_for_channel(&path("prod"));
        let api = service.scheme_for_channel(&path("prod.api"));
        let db = service.scheme_for_channel(&path("prod.db"));
        assert_eq!(api.hue, db.hue);
        assert_eq!(api, db);
    }

    #[test]
    fn family_inheritance_brightens_descendants() {
        let mut service = ColorService::new(AssignmentMode::Increment, InheritanceMode::Family);
        let root = service.scheme_for_channel(&path("prod"));
        let child = service.scheme_for_channel(&path("prod.api"));
        assert_eq!(child.hue, (root.hue + 5) % 360);
        assert_ne!(root.background, child.background);
        // Depth 1 background is 20% lightness at the root's hue family.
        assert_eq!(child.background, hsl_to_hex(child.hue as f64, 35.0, 20.0));
    }

    #[test]
    fn family_lightness_clamps_at_band_ceilings() {
        let mut service = ColorService::new(AssignmentMode::Increment, InheritanceMode::Family);
        // Depth 9: raw bump of 40% saturates every band ceiling.
        let deep = service.scheme_for_channel(&path("a.b.c.d.e.f.g.h.i"));
        assert_eq!(deep.background, hsl_to_hex(deep.hue as f64, 35.0, 25.0));
        assert_eq!(deep.border, hsl_to_hex(deep.hue as f64, 40.0, 40.0));
        assert_eq!(deep.normal, hsl_to_hex(deep.hue as f64, 50.0, 80.0));
        assert_eq!(deep.highlight, hsl_to_hex(deep.hue as f64, 60.0, 95.0));
    }

    #[test]
    fn modes_round_trip_through_strings() {
        assert_eq!("hash".parse::<AssignmentMode>(), Ok(AssignmentMode::Hash));
        assert_eq!(AssignmentMode::Hash.to_string(), "hash");
        assert_eq!(
            "family".parse::<InheritanceMode>(),
            Ok(InheritanceMode::Family)
        );
        assert!("rainbow".parse::<InheritanceMode>().is_err());
    }
}
