//! # Beamflex CLI
//!
//! Batch deflection runner: loads the beam library (seeding defaults on
//! first run), solves every beam × load × material-pair combination with a
//! two-segment geometry, and writes the tabulated profiles to CSV.
//!
//! The CSV carries the solver's output arrays only: position in meters,
//! deflection in meters, slope in degrees.
//!
//! ## Usage
//!
//! ```bash
//! beam_cli --library library_data.json --output deflection_results.csv --transition 0.4
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;

use beam_core::{
    BeamError, BeamLibrary, BeamResult, DeflectionSolver, Geometry, LoadSet, Segment,
    DEFAULT_GRID_POINTS,
};

/// Cantilever beam deflection profiles from a shared beam library
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the beam library JSON file (created with defaults if missing)
    #[arg(short, long, default_value = "library_data.json")]
    library: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = "deflection_results.csv")]
    output: PathBuf,

    /// Number of uniform grid points per solve
    #[arg(short = 'n', long, default_value_t = DEFAULT_GRID_POINTS)]
    grid_points: usize,

    /// Fractional position of the material transition along each beam (0..1)
    #[arg(short, long, default_value_t = 0.5)]
    transition: f64,
}

/// One CSV result row. Deflection uses plain decimal notation so the cells
/// read as ordinary floats in a spreadsheet.
fn csv_row(
    beam: &str,
    load: &str,
    material_1: &str,
    material_2: &str,
    x: f64,
    deflection: f64,
    slope_deg: f64,
) -> String {
    format!(
        "{},{},{},{},{:.4},{},{:.6}",
        beam, load, material_1, material_2, x, deflection, slope_deg
    )
}

fn main() -> BeamResult<()> {
    let args = Args::parse();

    if !(args.transition > 0.0 && args.transition < 1.0) {
        return Err(BeamError::invalid_geometry(format!(
            "transition fraction {} must lie strictly between 0 and 1",
            args.transition
        )));
    }

    let library = BeamLibrary::load_or_default(&args.library)?;
    println!("Loaded {} materials.", library.materials.len());
    println!("Loaded {} beams.", library.beams.len());
    println!("Loaded {} loads.", library.loads.len());

    if library.beams.is_empty() || library.loads.is_empty() || library.materials.is_empty() {
        println!("Library needs at least one beam, one load, and one material. Nothing to do.");
        return Ok(());
    }

    let out_path = args.output.display().to_string();
    let file = File::create(&args.output)
        .map_err(|e| BeamError::file_error("create", &out_path, e.to_string()))?;
    let mut csv = BufWriter::new(file);
    writeln!(csv, "beam,load,material_1,material_2,x_m,deflection_m,slope_deg")
        .map_err(|e| BeamError::file_error("write", &out_path, e.to_string()))?;

    for beam in &library.beams {
        let inertia = beam.moment_of_inertia();
        let transition = beam.length * args.transition;

        println!();
        println!("--- Beam: {} (L = {} m, I = {:.3e} m^4) ---", beam.name, beam.length, inertia);

        for entry in &library.loads {
            let load = match entry.to_load(beam.length) {
                Some(load) => load,
                None => {
                    println!(
                        "Skipping load '{}': it falls beyond beam '{}' ({} m).",
                        entry.name, beam.name, beam.length
                    );
                    continue;
                }
            };

            for material_1 in &library.materials {
                for material_2 in &library.materials {
                    let geometry = Geometry::new(vec![
                        Segment::new(0.0, transition, material_1.elastic_modulus, inertia),
                        Segment::new(transition, beam.length, material_2.elastic_modulus, inertia),
                    ])?;
                    let loads = LoadSet::new(vec![load], beam.length)?;

                    let field = DeflectionSolver::new(geometry, loads)?
                        .with_grid_points(args.grid_points)
                        .solve()?;

                    for i in 0..field.len() {
                        let row = csv_row(
                            &beam.name,
                            &entry.name,
                            &material_1.name,
                            &material_2.name,
                            field.positions[i],
                            field.deflection[i],
                            field.slope_deg[i],
                        );
                        writeln!(csv, "{}", row)
                            .map_err(|e| BeamError::file_error("write", &out_path, e.to_string()))?;
                    }

                    println!(
                        "{} + {} [{} | {}]: y_max = {:.5} m at {:.2} m, theta_max = {:.4} deg at {:.2} m",
                        beam.name,
                        entry.name,
                        material_1.name,
                        material_2.name,
                        field.max_deflection,
                        field.max_deflection_position,
                        field.max_slope_deg,
                        field.max_slope_position,
                    );
                }
            }
        }
    }

    csv.flush()
        .map_err(|e| BeamError::file_error("flush", &out_path, e.to_string()))?;

    println!();
    println!("Deflection and slope results written to '{}'.", out_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_row_uses_plain_decimal_deflection() {
        let row = csv_row("Beam1", "Point Load 1", "Steel", "Steel", 2.0, -0.0133335, -0.572939);
        assert_eq!(row, "Beam1,Point Load 1,Steel,Steel,2.0000,-0.0133335,-0.572939");

        let deflection_cell = row.split(',').nth(5).unwrap();
        assert!(
            !deflection_cell.contains('e'),
            "deflection cell drifted into scientific notation: {}",
            deflection_cell
        );
    }
}
