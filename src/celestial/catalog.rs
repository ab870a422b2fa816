//! Static parameters of every body in the system.

use std::collections::HashMap;

use crate::error::OrreryError;

/// Identifies one body of the solar system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CelestialBodyId {
    Sun,
    Mercury,
    Venus,
    Earth,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl CelestialBodyId {
    /// Every body, star first.
    pub const ALL: [CelestialBodyId; 11] = [
        CelestialBodyId::Sun,
        CelestialBodyId::Mercury,
        CelestialBodyId::Venus,
        CelestialBodyId::Earth,
        CelestialBodyId::Moon,
        CelestialBodyId::Mars,
        CelestialBodyId::Jupiter,
        CelestialBodyId::Saturn,
        CelestialBodyId::Uranus,
        CelestialBodyId::Neptune,
        CelestialBodyId::Pluto,
    ];

    /// The star sits at the origin, owns the light and does not revolve.
    pub fn is_star(self) -> bool {
        self == CelestialBodyId::Sun
    }

    pub fn name(self) -> &'static str {
        match self {
            CelestialBodyId::Sun => "Sun",
            CelestialBodyId::Mercury => "Mercury",
            CelestialBodyId::Venus => "Venus",
            CelestialBodyId::Earth => "Earth",
            CelestialBodyId::Moon => "Moon",
            CelestialBodyId::Mars => "Mars",
            CelestialBodyId::Jupiter => "Jupiter",
            CelestialBodyId::Saturn => "Saturn",
            CelestialBodyId::Uranus => "Uranus",
            CelestialBodyId::Neptune => "Neptune",
            CelestialBodyId::Pluto => "Pluto",
        }
    }
}

/// Physical and render parameters of a body.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBodyParams {
    /// Grey level of the ambient term, 0..=1.
    pub ambient_intensity: f32,
    /// Inclination of the spin axis, in degrees.
    pub axial_tilt: f32,
    /// Earth days per full spin.
    pub rotation_days: f32,
    /// Earth days per full orbit. Zero for the star.
    pub revolution_days: f32,
    /// Distance from the orbit centre, in astronomical units.
    pub orbital_distance: f32,
    /// Uniform scale applied to the unit sphere.
    pub scale: f32,
    /// Colour map file name, relative to the texture directory.
    pub texture: &'static str,
}

const fn params(
    ambient_intensity: f32,
    axial_tilt: f32,
    rotation_days: f32,
    revolution_days: f32,
    orbital_distance: f32,
    scale: f32,
    texture: &'static str,
) -> CelestialBodyParams {
    CelestialBodyParams {
        ambient_intensity,
        axial_tilt,
        rotation_days,
        revolution_days,
        orbital_distance,
        scale,
        texture,
    }
}

#[rustfmt::skip]
const BUILTIN_TABLE: [(CelestialBodyId, CelestialBodyParams); 11] = [
    (CelestialBodyId::Sun,     params(1.0, 0.0,    25.375,     0.0,      0.0,   15.0,  "SunColorMap.jpg")),
    (CelestialBodyId::Mercury, params(0.0, 177.43, 58.646,     87.969,   0.389, 0.382, "MercuryColorMap.jpg")),
    (CelestialBodyId::Venus,   params(0.0, 2.64,   243.01,     224.7,    0.723, 0.949, "VenusColorMap.jpg")),
    (CelestialBodyId::Earth,   params(0.0, 23.44,  1.0,        365.256,  1.0,   1.0,   "EarthColorMap.jpg")),
    // Real lunar distance (0.00257 AU) would sit inside the Earth at this scale.
    (CelestialBodyId::Moon,    params(0.0, 6.687,  27.321,     27.321,   0.05,  0.273, "MoonColorMap.jpg")),
    (CelestialBodyId::Mars,    params(0.0, 25.19,  1.024,      686.98,   1.524, 0.532, "MarsColorMap.jpg")),
    (CelestialBodyId::Jupiter, params(0.0, 3.13,   0.4097222,  4328.9,   5.203, 11.19, "JupiterColorMap.jpg")),
    (CelestialBodyId::Saturn,  params(0.0, 26.73,  0.42638922, 10734.65, 9.582, 9.26,  "SaturnColorMap.jpg")),
    (CelestialBodyId::Uranus,  params(0.0, 97.9,   0.7166667,  30674.6,  19.20, 4.01,  "UranusColorMap.jpg")),
    (CelestialBodyId::Neptune, params(0.0, 28.32,  0.67125,    59757.8,  30.05, 3.88,  "NeptuneColorMap.jpg")),
    (CelestialBodyId::Pluto,   params(0.0, 122.0,  6.3874,     90494.45, 39.48, 0.18,  "PlutoColorMap.jpg")),
];

/// Read-only lookup table from body id to parameters.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: HashMap<CelestialBodyId, CelestialBodyParams>,
}

impl Catalog {
    /// The eleven-body table of the solar system.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_TABLE.iter().cloned())
    }

    /// Builds a catalog from arbitrary entries. Later duplicates win.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (CelestialBodyId, CelestialBodyParams)>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, id: CelestialBodyId) -> Result<&CelestialBodyParams, OrreryError> {
        self.entries
            .get(&id)
            .ok_or(OrreryError::CatalogLookup(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
