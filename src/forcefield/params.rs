use super::error::Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const DEFAULT_PARAMS_TOML: &str = include_str!("../../resources/uff.params.toml");

static DEFAULT_PARAMS: OnceLock<ForceFieldParams> = OnceLock::new();

#[derive(Debug, Clone, Deserialize)]
pub struct ForceFieldParams {
    #[serde(default)]
    pub global: GlobalParams,
    #[serde(default)]
    pub atoms: HashMap<String, AtomTypeParams>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalParams {
    #[serde(default = "default_bond_k")]
    pub bond_k: f64,
    #[serde(default = "default_bond_order_scale")]
    pub bond_order_scale: f64,
    #[serde(default = "default_sp2_torsion_scale")]
    pub sp2_torsion_scale: f64,
    #[serde(default = "default_sp2_torsion_order_scale")]
    pub sp2_torsion_order_scale: f64,
    #[serde(default = "default_inversion_k")]
    pub inversion_k: f64,
    #[serde(default = "default_inversion_k_carbonyl")]
    pub inversion_k_carbonyl: f64,
}

fn default_bond_k() -> f64 {
    664.12
}
fn default_bond_order_scale() -> f64 {
    0.1332
}
fn default_sp2_torsion_scale() -> f64 {
    5.0
}
fn default_sp2_torsion_order_scale() -> f64 {
    4.18
}
fn default_inversion_k() -> f64 {
    6.0
}
fn default_inversion_k_carbonyl() -> f64 {
    50.0
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            bond_k: default_bond_k(),
            bond_order_scale: default_bond_order_scale(),
            sp2_torsion_scale: default_sp2_torsion_scale(),
            sp2_torsion_order_scale: default_sp2_torsion_order_scale(),
            inversion_k: default_inversion_k(),
            inversion_k_carbonyl: default_inversion_k_carbonyl(),
        }
    }
}

/// Per-type UFF parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AtomTypeParams {
    /// Valence bond radius (Å).
    pub r1: f64,
    /// Natural valence angle (degrees).
    pub theta0: f64,
    /// Van der Waals distance (Å).
    pub x1: f64,
    /// Van der Waals well depth (kcal/mol).
    pub d1: f64,
    #[serde(default = "default_zeta")]
    pub zeta: f64,
    /// Effective charge.
    pub z_star: f64,
    #[serde(default)]
    pub v_i: f64,
    #[serde(default)]
    pub u_j: f64,
    /// GMP electronegativity.
    pub chi: f64,
}

fn default_zeta() -> f64 {
    12.0
}

impl ForceFieldParams {
    pub fn atom(&self, atom_type: &str) -> Result<&AtomTypeParams, Error> {
        self.atoms
            .get(atom_type)
            .ok_or_else(|| Error::MissingParameter {
                atom_type: atom_type.to_string(),
            })
    }

    /// Natural bond length between two typed atoms.
    ///
    /// Sum of the valence radii, shortened by the bond-order correction and
    /// the electronegativity correction.
    pub fn rest_length(&self, a: &AtomTypeParams, b: &AtomTypeParams, bond_order: f64) -> f64 {
        let r_bo = -self.global.bond_order_scale * (a.r1 + b.r1) * bond_order.max(1.0).ln();
        let r_en = a.r1 * b.r1 * (a.chi.sqrt() - b.chi.sqrt()).powi(2) / (a.chi * a.r1 + b.chi * b.r1);
        a.r1 + b.r1 + r_bo - r_en
    }
}

pub fn load_parameters(custom_toml: Option<&str>) -> Result<ForceFieldParams, Error> {
    match custom_toml {
        Some(toml) => {
            let params: ForceFieldParams = toml::from_str(toml)?;
            Ok(params)
        }
        None => Ok(get_default_parameters().clone()),
    }
}

pub fn get_default_parameters() -> &'static ForceFieldParams {
    DEFAULT_PARAMS.get_or_init(|| {
        toml::from_str(DEFAULT_PARAMS_TOML)
            .expect("Failed to parse embedded UFF parameters. This is a library bug.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_parameters_load_common_types() {
        let params = get_default_parameters();
        for label in ["H_", "C_3", "C_R", "C_2", "C_1", "N_3", "O_2", "S_3+2", "P_3+5", "Cl"] {
            assert!(params.atoms.contains_key(label), "missing {label}");
        }
        assert_abs_diff_eq!(params.global.bond_k, 664.12, epsilon = 1e-12);
    }

    #[test]
    fn custom_parameters_parse_valid_toml() {
        let custom = r#"
            [global]
            inversion_k = 8.0

            [atoms.C_3]
            r1 = 0.757
            theta0 = 109.47
            x1 = 3.851
            d1 = 0.105
            z_star = 1.912
            chi = 5.343
        "#;
        let params = load_parameters(Some(custom)).unwrap();
        assert_eq!(params.global.inversion_k, 8.0);
        assert_eq!(params.global.bond_order_scale, 0.1332);
        let c3 = params.atom("C_3").unwrap();
        assert_eq!(c3.zeta, 12.0);
        assert_eq!(c3.v_i, 0.0);
        assert!(matches!(
            params.atom("N_3").unwrap_err(),
            Error::MissingParameter { .. }
        ));
    }

    #[test]
    fn errors_on_invalid_custom_toml() {
        let result = load_parameters(Some("not valid [[[toml"));
        assert!(matches!(result, Err(Error::ParameterParse(_))));
    }

    #[test]
    fn rest_lengths_match_reference_bonds() {
        let params = get_default_parameters();
        let c3 = params.atom("C_3").unwrap();
        let cr = params.atom("C_R").unwrap();
        let h = params.atom("H_").unwrap();
        let o2 = params.atom("O_2").unwrap();

        assert_abs_diff_eq!(params.rest_length(c3, c3, 1.0), 1.514, epsilon = 1e-3);
        assert_abs_diff_eq!(params.rest_length(cr, cr, 1.5), 1.379, epsilon = 2e-3);
        assert_abs_diff_eq!(params.rest_length(c3, h, 1.0), 1.109, epsilon = 2e-3);
        let co = params.rest_length(params.atom("C_2").unwrap(), o2, 2.0);
        assert!(co > 1.15 && co < 1.25, "C=O rest length {co}");
    }
}
