use phf::{Map, phf_map};

/// Tabulated radii of one element, in Å.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRadii {
    pub covalent: f64,
    pub vdw: f64,
    /// Twelve-fold coordinated metallic radius, where one is tabulated.
    pub metallic: Option<f64>,
}

const fn nonmetal(covalent: f64, vdw: f64) -> ElementRadii {
    ElementRadii {
        covalent,
        vdw,
        metallic: None,
    }
}

const fn metal(covalent: f64, vdw: f64, metallic: f64) -> ElementRadii {
    ElementRadii {
        covalent,
        vdw,
        metallic: Some(metallic),
    }
}

// Covalent radii after Cordero et al. (2008), van der Waals radii after Bondi (1964)
// completed with Alvarez (2013), metallic radii for CN12.
static ELEMENT_RADII: Map<&'static str, ElementRadii> = phf_map! {
    "H" => nonmetal(0.31, 1.20),
    "He" => nonmetal(0.28, 1.40),
    "Li" => metal(1.28, 1.82, 1.52),
    "Be" => metal(0.96, 1.53, 1.12),
    "B" => nonmetal(0.84, 1.92),
    "C" => nonmetal(0.76, 1.70),
    "N" => nonmetal(0.71, 1.55),
    "O" => nonmetal(0.66, 1.52),
    "F" => nonmetal(0.57, 1.47),
    "Ne" => nonmetal(0.58, 1.54),
    "Na" => metal(1.66, 2.27, 1.86),
    "Mg" => metal(1.41, 1.73, 1.60),
    "Al" => metal(1.21, 1.84, 1.43),
    "Si" => nonmetal(1.11, 2.10),
    "P" => nonmetal(1.07, 1.80),
    "S" => nonmetal(1.05, 1.80),
    "Cl" => nonmetal(1.02, 1.75),
    "Ar" => nonmetal(1.06, 1.88),
    "K" => metal(2.03, 2.75, 2.27),
    "Ca" => metal(1.76, 2.31, 1.97),
    "Sc" => metal(1.70, 2.15, 1.62),
    "Ti" => metal(1.60, 2.11, 1.47),
    "V" => metal(1.53, 2.07, 1.34),
    "Cr" => metal(1.39, 2.06, 1.28),
    "Mn" => metal(1.39, 2.05, 1.27),
    "Fe" => metal(1.32, 2.04, 1.26),
    "Co" => metal(1.26, 2.00, 1.25),
    "Ni" => metal(1.24, 1.63, 1.24),
    "Cu" => metal(1.32, 1.40, 1.28),
    "Zn" => metal(1.22, 1.39, 1.34),
    "Ga" => metal(1.22, 1.87, 1.35),
    "Ge" => nonmetal(1.20, 2.11),
    "As" => nonmetal(1.19, 1.85),
    "Se" => nonmetal(1.20, 1.90),
    "Br" => nonmetal(1.20, 1.85),
    "Kr" => nonmetal(1.16, 2.02),
    "Rb" => metal(2.20, 3.03, 2.48),
    "Sr" => metal(1.95, 2.49, 2.15),
    "Y" => metal(1.90, 2.32, 1.80),
    "Zr" => metal(1.75, 2.23, 1.60),
    "Nb" => metal(1.64, 2.18, 1.46),
    "Mo" => metal(1.54, 2.17, 1.39),
    "Tc" => metal(1.47, 2.16, 1.36),
    "Ru" => metal(1.46, 2.13, 1.34),
    "Rh" => metal(1.42, 2.10, 1.34),
    "Pd" => metal(1.39, 1.63, 1.37),
    "Ag" => metal(1.45, 1.72, 1.44),
    "Cd" => metal(1.44, 1.58, 1.51),
    "In" => metal(1.42, 1.93, 1.67),
    "Sn" => metal(1.39, 2.17, 1.58),
    "Sb" => nonmetal(1.39, 2.06),
    "Te" => nonmetal(1.38, 2.06),
    "I" => nonmetal(1.39, 1.98),
    "Xe" => nonmetal(1.40, 2.16),
    "Cs" => metal(2.44, 3.43, 2.65),
    "Ba" => metal(2.15, 2.68, 2.22),
    "La" => metal(2.07, 2.43, 1.87),
    "Ce" => metal(2.04, 2.42, 1.82),
    "Hf" => metal(1.75, 2.23, 1.59),
    "Ta" => metal(1.70, 2.22, 1.46),
    "W" => metal(1.62, 2.18, 1.39),
    "Re" => metal(1.51, 2.16, 1.37),
    "Os" => metal(1.44, 2.16, 1.35),
    "Ir" => metal(1.41, 2.13, 1.36),
    "Pt" => metal(1.36, 1.75, 1.39),
    "Au" => metal(1.36, 1.66, 1.44),
    "Hg" => metal(1.32, 1.55, 1.51),
    "Tl" => metal(1.45, 1.96, 1.70),
    "Pb" => metal(1.46, 2.02, 1.75),
    "Bi" => metal(1.48, 2.07, 1.82),
};

pub fn radii(symbol: &str) -> Option<&'static ElementRadii> {
    ELEMENT_RADII.get(symbol)
}

pub fn is_known_element(symbol: &str) -> bool {
    ELEMENT_RADII.contains_key(symbol)
}
