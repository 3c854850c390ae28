use crate::cli::StatsArgs;
use crate::config::PartialFoamConfig;
use crate::error::Result;
use crate::ui::{CliProgressHandler, UiEvent};
use crate::utils::format;
use foamify::core::geometry::bounds::BoundingBox;
use foamify::engine::progress::ProgressReporter;
use foamify::workflows::{self, export::FoamExport};
use tokio::sync::mpsc;
use tracing::info;

fn describe_box(label: &str, bbox: &BoundingBox) -> String {
    let (min, max) = (bbox.min_corner, bbox.max_corner);
    format!(
        "{:<18} [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
        label, min.x, min.y, min.z, max.x, max.y, max.z
    )
}

fn report(export: &FoamExport) -> Vec<String> {
    let stats = &export.stats;
    vec![
        format!("{:<18} {}", "Bubbles:", stats.bubble_count),
        format!("{:<18} {}", "Periodic images:", stats.image_count),
        format!(
            "{:<18} {:.4} .. {:.4}",
            "Radius range:", stats.min_radius, stats.max_radius
        ),
        format!("{:<18} {:.4}", "Total volume:", stats.total_volume),
        describe_box("Atoms box:", &export.boxes.atoms),
        describe_box("Padded box:", &export.boxes.padded),
        format!("{:<18} {}", "Contacts:", stats.contact_count),
        format!("{:<18} {:.3}", "Coordination:", stats.mean_coordination),
    ]
}

pub async fn run(args: StatsArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let partial_config = PartialFoamConfig::load(args.foam.config.as_deref())?;
    let final_config = partial_config.merge_with_cli(&args.foam)?;

    info!("Loading input bubbles from {:?}", &args.input);
    let bubbles = format::read_bubbles(&args.input)?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let export = tokio::task::block_in_place(|| {
        workflows::export::run(&bubbles, &final_config, &reporter)
    })?;

    for line in report(&export) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foamify::core::models::bubble::Bubble;
    use foamify::engine::config::FoamConfigBuilder;
    use nalgebra::Point3;

    #[test]
    fn report_lists_counts_and_boxes() {
        let bubbles = vec![
            Bubble::new(Point3::new(0.0, 0.0, 0.0), 1.0),
            Bubble::new(Point3::new(1.5, 0.0, 0.0), 0.5),
        ];
        let config = FoamConfigBuilder::new()
            .cells_per_axis(2)
            .strut_radius(0.1)
            .contact_scale(1.0)
            .build()
            .unwrap();
        let export = workflows::export::run(&bubbles, &config, &ProgressReporter::new()).unwrap();

        let lines = report(&export);
        assert_eq!(lines.len(), 8);
        assert!(lines[0].ends_with(" 2"));
        assert!(lines[2].contains("0.5000 .. 1.0000"));
        assert!(lines[4].starts_with("Atoms box:"));
        assert!(lines[4].contains("[0.000, 0.000, 0.000] .. [1.500, 0.000, 0.000]"));
        assert!(lines[6].ends_with(" 1"));
    }
}
