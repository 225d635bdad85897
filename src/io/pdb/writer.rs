use crate::io::error::Error;
use crate::model::molecule::{ConformerId, Molecule};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;

const RESIDUE_NAME: &str = "UNL";
const RESIDUE_SEQ: i32 = 1;
const MAX_CONECT_PARTNERS: usize = 4;

/// Renders one conformer as a PDB block terminated by `END`.
pub fn to_pdb_block(mol: &Molecule, id: ConformerId) -> Result<String, Error> {
    let conformer = mol.conformer(id).ok_or(Error::UnknownConformer(id))?;
    if conformer.positions.len() != mol.atom_count() {
        return Err(Error::CoordinateMismatch {
            id,
            positions: conformer.positions.len(),
            atoms: mol.atom_count(),
        });
    }

    let mut block = String::new();
    let mut counters: HashMap<&str, usize> = HashMap::new();

    for (index, (atom, pos)) in mol.atoms.iter().zip(&conformer.positions).enumerate() {
        let symbol = atom.element.symbol();
        let count = counters.entry(symbol).or_insert(0);
        *count += 1;
        let name = atom_name(symbol, *count);

        block.push_str(&format!(
            "HETATM{:>5} {:<4} {:>3}  {:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}{:<2}\n",
            index + 1,
            name,
            RESIDUE_NAME,
            RESIDUE_SEQ,
            pos[0],
            pos[1],
            pos[2],
            1.0,
            0.0,
            symbol.to_ascii_uppercase(),
            charge_field(atom.formal_charge),
        ));
    }

    let mut partners: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for bond in &mol.bonds {
        for _ in 0..bond.order.multiplicity() {
            partners.entry(bond.i + 1).or_default().push(bond.j + 1);
            partners.entry(bond.j + 1).or_default().push(bond.i + 1);
        }
    }
    for (serial, mut list) in partners {
        list.sort_unstable();
        for chunk in list.chunks(MAX_CONECT_PARTNERS) {
            let mut line = format!("CONECT{:>5}", serial);
            for &n in chunk {
                line.push_str(&format!("{:>5}", n));
            }
            block.push_str(&line);
            block.push('\n');
        }
    }

    block.push_str("END\n");
    Ok(block)
}

/// Writes conformers in order, wrapping each in `MODEL`/`ENDMDL` when there
/// is more than one.
pub fn write_conformers<W: Write>(
    mut writer: W,
    mol: &Molecule,
    ids: &[ConformerId],
) -> Result<(), Error> {
    let wrap = ids.len() > 1;
    for (model, &id) in ids.iter().enumerate() {
        let block = to_pdb_block(mol, id)?;
        if wrap {
            writeln!(writer, "MODEL     {}", model + 1)?;
        }
        writer.write_all(block.as_bytes())?;
        if wrap {
            writeln!(writer, "ENDMDL")?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Element symbol plus per-element counter, in the four-column name field.
///
/// One-letter symbols start in the second column.
fn atom_name(symbol: &str, count: usize) -> String {
    let mut name = format!("{}{}", symbol.to_ascii_uppercase(), count);
    if symbol.len() == 1 && name.len() < 4 {
        name.insert(0, ' ');
    }
    name.truncate(4);
    name
}

fn charge_field(charge: i8) -> String {
    match charge {
        0 => String::new(),
        c if c > 0 => format!("{}+", c),
        c => format!("{}-", -i16::from(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::molecule::Bond;
    use crate::model::types::{BondOrder, Element};

    fn formaldehyde() -> (Molecule, ConformerId) {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(Element::C));
        mol.add_atom(Atom::new(Element::O));
        mol.add_atom(Atom::new(Element::H));
        mol.add_atom(Atom::new(Element::H));
        mol.add_bond(Bond::new(0, 1, BondOrder::Double));
        mol.add_bond(Bond::new(0, 2, BondOrder::Single));
        mol.add_bond(Bond::new(0, 3, BondOrder::Single));
        let id = mol.add_conformer(vec![
            [0.0, 0.0, 0.0],
            [1.21, 0.0, 0.0],
            [-0.55, 0.94, 0.0],
            [-0.55, -0.94, 0.0],
        ]);
        (mol, id)
    }

    #[test]
    fn writes_fixed_column_atom_records() {
        let (mol, id) = formaldehyde();
        let block = to_pdb_block(&mol, id).unwrap();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(
            lines[0],
            "HETATM    1  C1  UNL     1       0.000   0.000   0.000  1.00  0.00           C  "
        );
        assert_eq!(
            lines[2],
            "HETATM    3  H1  UNL     1      -0.550   0.940   0.000  1.00  0.00           H  "
        );
        assert!(lines.iter().take(4).all(|l| l.len() == 80));
        assert_eq!(&lines[1][12..16], " O1 ");
        assert_eq!(&lines[3][12..16], " H2 ");
    }

    #[test]
    fn conect_repeats_multiple_bonds() {
        let (mol, id) = formaldehyde();
        let block = to_pdb_block(&mol, id).unwrap();
        let conect: Vec<&str> = block.lines().filter(|l| l.starts_with("CONECT")).collect();
        assert_eq!(
            conect,
            vec![
                "CONECT    1    2    2    3    4",
                "CONECT    2    1    1",
                "CONECT    3    1",
                "CONECT    4    1",
            ]
        );
        assert_eq!(block.lines().last(), Some("END"));
    }

    #[test]
    fn conect_wraps_after_four_partners() {
        let mut mol = Molecule::new();
        for _ in 0..6 {
            mol.add_atom(Atom::new(Element::C));
        }
        for j in 1..6 {
            mol.add_bond(Bond::new(0, j, BondOrder::Single));
        }
        let id = mol.add_conformer(vec![[0.0; 3]; 6]);
        let block = to_pdb_block(&mol, id).unwrap();
        assert!(block.contains("CONECT    1    2    3    4    5\nCONECT    1    6\n"));
    }

    #[test]
    fn two_letter_elements_and_charges() {
        let mut mol = Molecule::new();
        let mut na = Atom::new(Element::Na);
        na.formal_charge = 1;
        let mut cl = Atom::new(Element::Cl);
        cl.formal_charge = -1;
        mol.add_atom(na);
        mol.add_atom(cl);
        let id = mol.add_conformer(vec![[0.0; 3], [3.0, 0.0, 0.0]]);
        let block = to_pdb_block(&mol, id).unwrap();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(&lines[0][12..16], "NA1 ");
        assert!(lines[0].ends_with("NA1+"));
        assert!(lines[1].ends_with("CL1-"));
        assert!(!block.contains("CONECT"));
    }

    #[test]
    fn single_conformer_is_not_wrapped() {
        let (mol, id) = formaldehyde();
        let mut out = Vec::new();
        write_conformers(&mut out, &mol, &[id]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("MODEL"));
        assert!(!text.contains("ENDMDL"));
        assert_eq!(text, to_pdb_block(&mol, id).unwrap());
    }

    #[test]
    fn multiple_conformers_are_numbered_models() {
        let (mut mol, first) = formaldehyde();
        let second = mol.add_conformer(vec![[1.0; 3]; 4]);
        let mut out = Vec::new();
        write_conformers(&mut out, &mol, &[first, second]).unwrap();
        let text = String::from_utf8(out).unwrap();

        let models: Vec<&str> = text.lines().filter(|l| l.starts_with("MODEL")).collect();
        assert_eq!(models, vec!["MODEL     1", "MODEL     2"]);
        assert_eq!(text.matches("ENDMDL").count(), 2);
        assert_eq!(text.matches("END\n").count(), 2);
        assert!(text.ends_with("END\nENDMDL\n"));
    }

    #[test]
    fn rejects_unknown_conformers() {
        let (mol, _) = formaldehyde();
        assert!(matches!(
            to_pdb_block(&mol, ConformerId(5)),
            Err(Error::UnknownConformer(ConformerId(5)))
        ));
    }
}
