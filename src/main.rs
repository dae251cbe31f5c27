use std::fs::{self, File};
use std::path::{Path, PathBuf};

use clap::Parser;
use memmap2::Mmap;
use rootcause::Report;

use skinpack::skin::{self, SkinModel};

/// Inspect .SKIN multi-submesh model files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print each decoded model as JSON instead of a summary
    #[clap(long)]
    json: bool,

    /// .skin file(s), or directories to scan for .skin files
    paths: Vec<PathBuf>,
}

fn load_and_decode(path: &Path) -> Result<SkinModel, Report> {
    let file = File::open(path)
        .map_err(|e| rootcause::report!("Failed to open {}: {e}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file) }
        .map_err(|e| rootcause::report!("Failed to map {}: {e}", path.display()))?;

    skin::decode(&mmap).map_err(|e| rootcause::report!("Failed to decode {}: {e}", path.display()))
}

fn main() -> Result<(), Report> {
    let args = Args::parse();

    let mut paths = Vec::with_capacity(args.paths.len());
    for path in args.paths {
        if path.is_dir() {
            let entries = fs::read_dir(&path)
                .map_err(|e| rootcause::report!("Failed to list {}: {e}", path.display()))?;
            for entry in entries {
                let entry =
                    entry.map_err(|e| rootcause::report!("Failed to list {}: {e}", path.display()))?;
                let entry_path = entry.path();
                let is_skin = entry_path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("skin"));
                if is_skin {
                    paths.push(entry_path);
                }
            }
        } else {
            paths.push(path);
        }
    }

    for path in paths {
        let model = load_and_decode(&path)?;
        if args.json {
            let json = serde_json::to_string_pretty(&model)
                .map_err(|e| rootcause::report!("Failed to serialize model: {e}"))?;
            println!("{json}");
        } else {
            print_summary(&path, &model);
        }
    }

    Ok(())
}

fn print_summary(path: &Path, model: &SkinModel) {
    println!("{}: {} submesh(es)", path.display(), model.submeshes.len());
    for (i, sub) in model.submeshes.iter().enumerate() {
        let name = display_name(&sub.name);
        println!(
            "  [{i}] {name}: {} vertices, {} triangles, {} uvs, {} normals, {} material id(s)",
            sub.vertices.len(),
            sub.face_indices.len() / 3,
            sub.uvs.len(),
            sub.normals.len(),
            sub.material_ids.len(),
        );
        for (mi, mat) in sub.materials.iter().enumerate() {
            let textures: Vec<&str> = [&mat.texture1_name, &mat.texture2_name, &mat.texture3_name]
                .into_iter()
                .filter(|t| !t.is_empty())
                .map(|t| t.as_str())
                .collect();
            println!(
                "      material {mi}: {} [{}]",
                display_name(&mat.material_name),
                textures.join(", ")
            );
        }
    }
}

/// Placeholder for empty names, display only. Empty names are valid in the
/// format and preserved verbatim in the model.
fn display_name(name: &str) -> &str {
    if name.is_empty() { "<unnamed>" } else { name }
}
