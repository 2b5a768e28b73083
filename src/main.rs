//! Command line front end: `ply2obj <input.ply> <output.obj>`

use std::{error::Error as _, path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Convert a PLY mesh or point cloud into an OBJ file")]
struct Cli {
    /// PLY file to read
    input: PathBuf,
    /// OBJ file to write
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Conversion failed: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  ... caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ply2obj::Error> {
    let total = Instant::now();
    println!(
        "Converting: {} -> {}",
        cli.input.display(),
        cli.output.display()
    );

    let started = Instant::now();
    let mesh = ply2obj::read_ply(&cli.input)?;
    let read_time = started.elapsed();

    println!(
        "Read {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.triangles.len()
    );
    if mesh.has_normals() {
        println!("  File contains normals.");
    }
    if mesh.has_colors() {
        println!("  File contains vertex colors.");
    }
    if mesh.has_tex_coords() {
        println!("  File contains texture coordinates.");
    }
    println!("PLY read took {} ms", read_time.as_millis());

    let started = Instant::now();
    ply2obj::write_obj(&mesh, &cli.output)?;
    println!("OBJ write took {} ms", started.elapsed().as_millis());

    println!("Total time {} ms", total.elapsed().as_millis());
    Ok(())
}
