use std::collections::BTreeMap;
use std::io::{self, Write};

use smiles2pdb::Molecule;
use smiles2pdb::forcefield::OptimizeStatus;
use smiles2pdb::pipeline::OptimizationOutcome;

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_molecule_summary(mol: &Molecule) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let stereocenters = mol.atoms.iter().filter(|a| a.is_stereocenter()).count();
    let rows = vec![
        ("Total Atoms", format!("{}", mol.atom_count())),
        ("Heavy Atoms", format!("{}", mol.heavy_atom_count())),
        ("Total Bonds", format!("{}", mol.bond_count())),
        ("Stereocenters", format!("{}", stereocenters)),
        ("Net Charge", format!("{:+}", net_charge(mol))),
    ];
    print_kv_table(&mut out, "Molecule Summary", &rows);

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for atom in &mol.atoms {
        *counts.entry(atom.element.symbol()).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(symbol, count)| (symbol.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    print_distribution_table(&mut out, "Element Distribution", &sorted, mol.atom_count());
}

pub fn print_outcomes(outcomes: &[OptimizationOutcome]) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let _ = writeln!(out, "{}┌─ UFF Optimization ─┐", INDENT);
    let _ = writeln!(out, "{}┌───────────┬────────────────┬──────────────────┐", INDENT);
    let _ = writeln!(out, "{}│ Conformer │ Status         │ Energy (kcal/mol)│", INDENT);
    let _ = writeln!(out, "{}├───────────┼────────────────┼──────────────────┤", INDENT);

    for (index, outcome) in outcomes.iter().enumerate() {
        let status = match outcome.status {
            OptimizeStatus::Converged => "converged",
            OptimizeStatus::MaxIterations => "max iterations",
            OptimizeStatus::SetupFailed => "setup failed",
        };
        let energy = outcome
            .energy
            .map(|e| format!("{:.3}", e))
            .unwrap_or_else(|| "—".to_string());
        let _ = writeln!(
            out,
            "{}│ {:>9} │ {:<14} │ {:>16} │",
            INDENT,
            index + 1,
            status,
            truncate(&energy, 16)
        );
    }

    let _ = writeln!(out, "{}└───────────┴────────────────┴──────────────────┘", INDENT);
}

fn net_charge(mol: &Molecule) -> i32 {
    mol.atoms.iter().map(|a| i32::from(a.formal_charge)).sum()
}

fn print_distribution_table(
    out: &mut impl Write,
    title: &str,
    data: &[(String, usize)],
    total: usize,
) {
    let name_w = 10usize;
    let count_w = 8usize;
    let sep_overhead = 6;
    let dist_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + count_w + sep_overhead);
    let max_bar_width = dist_w.saturating_sub(8).min(20);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{name_line}┬{count_line}┬{dist_line}┐",
        INDENT,
        name_line = "─".repeat(name_w + 2),
        count_line = "─".repeat(count_w + 2),
        dist_line = "─".repeat(dist_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
        INDENT, "Element", "Count", "Distribution",
    );
    let _ = writeln!(
        out,
        "{}├{name_line}┼{count_line}┼{dist_line}┤",
        INDENT,
        name_line = "─".repeat(name_w + 2),
        count_line = "─".repeat(count_w + 2),
        dist_line = "─".repeat(dist_w + 2)
    );

    for (name, count) in data {
        let pct = (*count as f64 / total.max(1) as f64) * 100.0;
        let dist_cell = format!("{}  {:>5.1}%", make_bar(pct, max_bar_width), pct);
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
            INDENT,
            truncate(name, name_w),
            count,
            dist_cell,
        );
    }

    let _ = writeln!(
        out,
        "{}└{name_line}┴{count_line}┴{dist_line}┘",
        INDENT,
        name_line = "─".repeat(name_w + 2),
        count_line = "─".repeat(count_w + 2),
        dist_line = "─".repeat(dist_w + 2)
    );
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<key_w$} │ {:>val_w$} │",
        INDENT, "Metric", "Value",
    );
    let _ = writeln!(
        out,
        "{}├{k_line}┼{v_line}┤",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}

fn make_bar(pct: f64, max_width: usize) -> String {
    let filled = ((pct / 100.0) * max_width as f64).round() as usize;
    let empty = max_width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}
