#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), deny(warnings))] // Forbid warnings in release builds
#![warn(clippy::all, rust_2018_idioms)]

//! Print the eigenvalues (and optionally eigenvectors) of a matrix read from
//! a text file or stdin.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use nalgebra::DMatrix;
use real_eigen::{Complex, DecompositionOptions, EigenvalueDecomposition, SymmetryCheck};

#[derive(Parser)]
#[command(name = "eigen")]
#[command(author, version, about = "Eigenvalues and eigenvectors of a dense real matrix")]
#[command(long_about = "
Reads a square matrix, one row per line, entries separated by whitespace
or commas. Blank lines and lines starting with '#' are ignored.
")]
struct Cli {
    /// Matrix file (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Treat the matrix as symmetric when mirrored entries differ by at most TOL
    #[arg(long, value_name = "TOL", conflicts_with = "general")]
    symmetry_tolerance: Option<f64>,

    /// Always use the general (nonsymmetric) algorithm
    #[arg(long)]
    general: bool,

    /// QL/QR sweeps allowed per eigenvalue
    #[arg(long, value_name = "N", default_value = "30")]
    max_iterations: usize,

    /// Also print the eigenvectors
    #[arg(long)]
    vectors: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the iteration converged.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let text = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };
    let matrix = parse_matrix(&text)?;

    let symmetry = if cli.general {
        SymmetryCheck::Never
    } else if let Some(tolerance) = cli.symmetry_tolerance {
        SymmetryCheck::Tolerance(tolerance)
    } else {
        SymmetryCheck::Exact
    };
    let options = DecompositionOptions::default()
        .with_symmetry(symmetry)
        .with_max_iterations_per_eigenvalue(cli.max_iterations);
    let eig = EigenvalueDecomposition::with_options(&matrix, &options)?;

    println!("algorithm: {:?}", eig.algorithm());
    println!(
        "convergence: {:?} ({} sweeps)",
        eig.convergence(),
        eig.iterations()
    );
    println!("eigenvalues:");
    for value in eig.eigenvalues() {
        println!("  {}", format_value(value));
    }
    if cli.vectors {
        println!("eigenvectors (columns):");
        print!("{}", eig.eigenvectors());
    }
    Ok(eig.is_converged())
}

fn format_value(value: Complex<f64>) -> String {
    if value.im == 0.0 {
        format!("{}", value.re)
    } else if value.im > 0.0 {
        format!("{} + {}i", value.re, value.im)
    } else {
        format!("{} - {}i", value.re, -value.im)
    }
}

fn parse_matrix(text: &str) -> anyhow::Result<DMatrix<f64>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("Line {}: invalid number {:?}", number + 1, field))
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                bail!(
                    "Line {}: expected {} entries, found {}",
                    number + 1,
                    first.len(),
                    row.len()
                );
            }
        }
        rows.push(row);
    }
    let cols = rows.first().map_or(0, Vec::len);
    Ok(DMatrix::from_row_iterator(
        rows.len(),
        cols,
        rows.into_iter().flatten(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commas_comments_and_blank_lines() {
        let text = "# rotation\n0, -1\n\n1 0\n";
        let m = parse_matrix(text).unwrap();
        assert_eq!(m, DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = parse_matrix("1 2\n3\n").unwrap_err();
        assert_eq!(err.to_string(), "Line 2: expected 2 entries, found 1");
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_matrix("1 x\n").unwrap_err();
        assert!(err.to_string().starts_with("Line 1: invalid number"));
    }

    #[test]
    fn empty_input_is_empty_matrix() {
        let m = parse_matrix("# nothing\n").unwrap();
        assert_eq!(m.shape(), (0, 0));
    }

    #[test]
    fn formats_complex_values() {
        assert_eq!(format_value(Complex::new(1.5, 0.0)), "1.5");
        assert_eq!(format_value(Complex::new(0.0, 2.0)), "0 + 2i");
        assert_eq!(format_value(Complex::new(0.0, -2.0)), "0 - 2i");
    }

    #[test]
    fn largest_iteration_limit_is_accepted() {
        let limit = usize::MAX.to_string();
        let cli = Cli::parse_from(["eigen", "--max-iterations", limit.as_str()]);
        assert_eq!(cli.max_iterations, usize::MAX);
        let options =
            DecompositionOptions::default().with_max_iterations_per_eigenvalue(cli.max_iterations);
        let matrix = parse_matrix("2 1\n1 2\n").unwrap();
        let eig = EigenvalueDecomposition::with_options(&matrix, &options).unwrap();
        assert!(eig.is_converged());
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::parse_from(["eigen", "m.txt", "--general", "--vectors"]);
        assert!(cli.general);
        assert!(cli.vectors);
        assert_eq!(cli.max_iterations, 30);
        assert_eq!(cli.input, Some(PathBuf::from("m.txt")));
    }
}
