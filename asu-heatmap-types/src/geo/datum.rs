/// Ellipsoid parameters of a celestial body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    semimajor: f64,
}

impl Datum {
    /// World Geodetic System 1984.
    pub const WGS84: Self = Datum {
        semimajor: 6_378_137.0,
    };

    /// Semimajor axis in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::WGS84
    }
}
