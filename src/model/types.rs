use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bond order string: '{0}'")]
pub struct ParseBondOrderError(String);

/// Per-element data table: symbol, atomic number, standard atomic mass,
/// single-bond covalent radius (Å), van der Waals radius (Å), and the
/// allowed valence states used for implicit hydrogens and valence checks.
macro_rules! elements {
    ($( $variant:ident = $z:literal, $mass:literal, $cov:literal, $vdw:literal, [$($val:literal),*]; )*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Element {
            $( $variant = $z, )*
        }

        impl Element {
            pub fn from_atomic_number(z: u8) -> Option<Self> {
                match z {
                    $( $z => Some(Element::$variant), )*
                    _ => None,
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $( Element::$variant => stringify!($variant), )*
                }
            }

            pub fn atomic_mass(&self) -> f64 {
                match self {
                    $( Element::$variant => $mass, )*
                }
            }

            /// Single-bond covalent radius in Ångströms.
            pub fn covalent_radius(&self) -> f64 {
                match self {
                    $( Element::$variant => $cov, )*
                }
            }

            /// Van der Waals radius in Ångströms.
            pub fn vdw_radius(&self) -> f64 {
                match self {
                    $( Element::$variant => $vdw, )*
                }
            }

            /// Allowed valence states in ascending order. Empty when the
            /// element has no fixed valence rules (metals, noble gases).
            pub fn valences(&self) -> &'static [u8] {
                match self {
                    $( Element::$variant => &[$($val),*], )*
                }
            }
        }

        impl FromStr for Element {
            type Err = ParseElementError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( stringify!($variant) => Ok(Element::$variant), )*
                    _ => Err(ParseElementError(s.to_string())),
                }
            }
        }
    };
}

elements! {
    H = 1, 1.008, 0.31, 1.20, [1];
    He = 2, 4.0026, 0.28, 1.40, [];
    Li = 3, 6.94, 1.28, 1.82, [1];
    Be = 4, 9.0122, 0.96, 1.53, [2];
    B = 5, 10.81, 0.84, 1.92, [3];
    C = 6, 12.011, 0.76, 1.70, [4];
    N = 7, 14.007, 0.71, 1.55, [3, 5];
    O = 8, 15.999, 0.66, 1.52, [2];
    F = 9, 18.998, 0.57, 1.47, [1];
    Ne = 10, 20.18, 0.58, 1.54, [];
    Na = 11, 22.99, 1.66, 2.27, [1];
    Mg = 12, 24.305, 1.41, 1.73, [2];
    Al = 13, 26.982, 1.21, 1.84, [3];
    Si = 14, 28.085, 1.11, 2.10, [4];
    P = 15, 30.974, 1.07, 1.80, [3, 5];
    S = 16, 32.06, 1.05, 1.80, [2, 4, 6];
    Cl = 17, 35.45, 1.02, 1.75, [1];
    Ar = 18, 39.948, 1.06, 1.88, [];
    K = 19, 39.098, 2.03, 2.75, [1];
    Ca = 20, 40.078, 1.76, 2.31, [2];
    Sc = 21, 44.956, 1.70, 2.11, [];
    Ti = 22, 47.867, 1.60, 2.00, [];
    V = 23, 50.942, 1.53, 2.00, [];
    Cr = 24, 51.996, 1.39, 2.00, [];
    Mn = 25, 54.938, 1.39, 2.00, [];
    Fe = 26, 55.845, 1.32, 2.00, [];
    Co = 27, 58.933, 1.26, 2.00, [];
    Ni = 28, 58.693, 1.24, 1.63, [];
    Cu = 29, 63.546, 1.32, 1.40, [];
    Zn = 30, 65.38, 1.22, 1.39, [];
    Ga = 31, 69.723, 1.22, 1.87, [3];
    Ge = 32, 72.63, 1.20, 2.11, [4];
    As = 33, 74.922, 1.19, 1.85, [3, 5];
    Se = 34, 78.971, 1.20, 1.90, [2, 4, 6];
    Br = 35, 79.904, 1.20, 1.85, [1];
    Kr = 36, 83.798, 1.16, 2.02, [];
    Rb = 37, 85.468, 2.20, 3.03, [1];
    Sr = 38, 87.62, 1.95, 2.49, [2];
    Y = 39, 88.906, 1.90, 2.00, [];
    Zr = 40, 91.224, 1.75, 2.00, [];
    Nb = 41, 92.906, 1.64, 2.00, [];
    Mo = 42, 95.96, 1.54, 2.00, [];
    Tc = 43, 98.0, 1.47, 2.00, [];
    Ru = 44, 101.07, 1.46, 2.00, [];
    Rh = 45, 102.91, 1.42, 2.00, [];
    Pd = 46, 106.42, 1.39, 1.63, [];
    Ag = 47, 107.87, 1.45, 1.72, [];
    Cd = 48, 112.41, 1.44, 1.58, [];
    In = 49, 114.82, 1.42, 1.93, [3];
    Sn = 50, 118.71, 1.39, 2.17, [2, 4];
    Sb = 51, 121.76, 1.39, 2.06, [3, 5];
    Te = 52, 127.6, 1.38, 2.06, [2, 4, 6];
    I = 53, 126.9, 1.39, 1.98, [1, 3, 5];
    Xe = 54, 131.29, 1.40, 2.16, [];
}

impl Element {
    #[inline]
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    /// Allowed valences for an atom of this element carrying `charge`.
    ///
    /// Charged atoms take the valence rules of the isoelectronic element
    /// (N+ behaves like C, O- like F). Returns an empty slice when the
    /// shifted element has no rules.
    pub fn valences_with_charge(&self, charge: i8) -> &'static [u8] {
        if charge == 0 {
            return self.valences();
        }
        let shifted = i16::from(self.atomic_number()) - i16::from(charge);
        u8::try_from(shifted)
            .ok()
            .and_then(Element::from_atomic_number)
            .map(|e| e.valences())
            .unwrap_or(&[])
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    pub fn value(&self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }

    /// Number of `CONECT` repeats used for this bond in PDB output.
    pub fn multiplicity(&self) -> usize {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondOrder::Single => write!(f, "Single"),
            BondOrder::Double => write!(f, "Double"),
            BondOrder::Triple => write!(f, "Triple"),
            BondOrder::Aromatic => write!(f, "Aromatic"),
        }
    }
}

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(BondOrder::Single),
            "=" => Ok(BondOrder::Double),
            "#" => Ok(BondOrder::Triple),
            ":" => Ok(BondOrder::Aromatic),
            _ => Err(ParseBondOrderError(s.to_string())),
        }
    }
}

/// Tetrahedral chirality tag as written in SMILES.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    #[default]
    None,
    /// `@`: looking from the first neighbor, the rest run anticlockwise.
    CounterClockwise,
    /// `@@`: looking from the first neighbor, the rest run clockwise.
    Clockwise,
}

impl Chirality {
    /// Sign of the chiral volume `(n1-n0)·((n2-n0)×(n3-n0))` for this tag.
    pub fn volume_sign(&self) -> Option<f64> {
        match self {
            Chirality::None => None,
            Chirality::CounterClockwise => Some(-1.0),
            Chirality::Clockwise => Some(1.0),
        }
    }
}

/// Directional single-bond mark (`/` or `\`) used for double-bond geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondDirection {
    Up,
    Down,
}
