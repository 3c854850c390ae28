use crate::cli::ExportArgs;
use crate::config::PartialFoamConfig;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use crate::utils::format;
use foamify::{
    core::{elements::standardize_radii_to_atomic, io::obj::ObjFile, models::bubble::Bubble},
    engine::progress::ProgressReporter,
    workflows,
};
use tokio::sync::mpsc;
use tracing::info;

const MESH_OBJECT_NAME: &str = "struts";

/// Snaps radii to tabulated element radii and fills in missing element symbols.
fn standardize_radii(bubbles: &mut [Bubble]) {
    let radii: Vec<f64> = bubbles.iter().map(|b| b.radius).collect();
    let (snapped, symbols) = standardize_radii_to_atomic(&radii);
    for ((bubble, radius), symbol) in bubbles.iter_mut().zip(snapped).zip(symbols) {
        bubble.radius = radius;
        if bubble.label.element.is_empty() {
            bubble.label.element = symbol.to_string();
        }
    }
}

pub async fn run(args: ExportArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    format::BubbleFormat::from_path(&args.output)?;

    let partial_config = PartialFoamConfig::load(args.foam.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_cli(&args.foam)?;

    info!("Loading input bubbles from {:?}", &args.input);
    let mut bubbles = format::read_bubbles(&args.input)?;
    if args.standardize_radii {
        info!("Snapping {} radii to element radii.", bubbles.len());
        standardize_radii(&mut bubbles);
    }

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the core export workflow...");
    let export = tokio::task::block_in_place(|| {
        workflows::export::run(&bubbles, &final_config, &reporter)
    })?;

    info!(
        "Workflow finished with {} bubble(s) and {} contact(s).",
        export.bubbles.len(),
        export.stats.contact_count
    );

    format::write_bubbles(&args.output, &export.bubbles)?;
    progress_handler.log(format!(
        "✓ {} bubble(s) written to: {}",
        export.bubbles.len(),
        args.output.display()
    ));

    if let Some(mesh_path) = &args.mesh {
        ObjFile::write_to_path(&export.mesh, MESH_OBJECT_NAME, mesh_path).map_err(|e| {
            CliError::FileWriting {
                path: mesh_path.clone(),
                source: e.into(),
            }
        })?;
        progress_handler.log(format!(
            "✓ {} strut(s), {} triangle(s) written to: {}",
            export.struts.len(),
            export.mesh.triangle_count(),
            mesh_path.display()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use nalgebra::Point3;

    fn two_touching_bubbles() -> String {
        "x,y,z,radius\n0,0,0,1.0\n1.8,0,0,1.0\n".to_string()
    }

    #[test]
    fn standardize_radii_snaps_and_labels() {
        let mut bubbles = vec![
            Bubble::new(Point3::origin(), 1.29),
            Bubble::new(Point3::new(3.0, 0.0, 0.0), 1.71),
        ];
        bubbles[1].label.element = "X".to_string();

        standardize_radii(&mut bubbles);

        assert_eq!(bubbles[0].radius, 1.30);
        assert_eq!(bubbles[0].label.element, "H");
        assert_eq!(bubbles[1].radius, 1.70);
        assert_eq!(bubbles[1].label.element, "X");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn export_writes_bubbles_and_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.pdb");
        let mesh = dir.path().join("out.obj");
        std::fs::write(&input, two_touching_bubbles()).unwrap();

        let cli = Cli::parse_from([
            "foamify",
            "export",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--mesh",
            mesh.to_str().unwrap(),
            "--cells",
            "2",
        ]);
        let Commands::Export(args) = cli.command else {
            panic!("Expected 'export' subcommand");
        };
        let (sender, _receiver) = mpsc::channel(1024);
        run(args, sender).await.unwrap();

        let pdb = std::fs::read_to_string(&output).unwrap();
        assert_eq!(pdb.lines().filter(|l| l.starts_with("ATOM")).count(), 2);

        let obj = std::fs::read_to_string(&mesh).unwrap();
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 9);
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 12);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unsupported_output_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, two_touching_bubbles()).unwrap();

        let cli = Cli::parse_from([
            "foamify",
            "export",
            "-i",
            input.to_str().unwrap(),
            "-o",
            dir.path().join("out.xyz").to_str().unwrap(),
        ]);
        let Commands::Export(args) = cli.command else {
            panic!("Expected 'export' subcommand");
        };
        let (sender, _receiver) = mpsc::channel(1024);
        assert!(matches!(run(args, sender).await, Err(CliError::Argument(_))));
    }
}
