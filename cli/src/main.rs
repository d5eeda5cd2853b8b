use std::path::PathBuf;
use std::process::ExitCode;

use design::{Block, Marker};
use index::RegionIndex;
use structopt::StructOpt;
use tech::RouterConfig;

mod ingest;

/// Command-line front end wiring the guide-file loader, the connectivity repair engine and the
/// DRC engine together over a single design (§6 of the project's ambient CLI contract).
#[derive(Debug, StructOpt)]
#[structopt(name = "routecore", about = "Post-route connectivity repair and DRC")]
struct Opt {
    /// Plain-text connectivity guide file (§4.7): one block per net of `xl yl xh yh layer` rects.
    #[structopt(parse(from_os_str))]
    guide_file: PathBuf,

    /// Optional TOML config overriding `RouterConfig` defaults.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// `error`, `warn`, `info`, `debug`, or `trace`.
    #[structopt(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let opt = Opt::from_args();
    env_logger::Builder::new().parse_filters(&opt.log_level).init();

    let config = match &opt.config {
        Some(path) => match std::fs::read_to_string(path).map_err(|e| e.to_string()).and_then(|t| RouterConfig::from_toml(&t).map_err(|e| e.to_string())) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("failed to load config {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => RouterConfig::default(),
    };

    let guide_text = match std::fs::read_to_string(&opt.guide_file) {
        Ok(text) => text,
        Err(e) => {
            log::error!("failed to read guide file {}: {e}", opt.guide_file.display());
            return ExitCode::FAILURE;
        }
    };

    let tech = ingest::default_technology();
    let mut block = Block::new(opt.guide_file.file_stem().and_then(|s| s.to_str()).unwrap_or("design").to_string());
    let mut index = RegionIndex::new();

    if let Err(e) = ingest::load_guide(&guide_text, &tech, &mut block, &mut index) {
        log::error!("failed to parse guide file: {e}");
        return ExitCode::FAILURE;
    }

    log::info!("loaded {} nets from {}", block.nets().count(), opt.guide_file.display());

    let report = driver::run(&mut block, &tech, &config, &mut index);

    log::info!(
        "ran {} batch(es), repaired {} net(s), emitted {} marker(s)",
        report.batches_run,
        report.nets_repaired,
        report.markers_emitted
    );

    if !report.is_clean() {
        for failure in &report.failures {
            log::error!("net {} unrepairable; unreachable pins: {:?}", failure.net_name, failure.unreachable_pins);
        }
        return ExitCode::FAILURE;
    }

    report_markers(&block);
    ExitCode::SUCCESS
}

fn report_markers(block: &Block) {
    let markers: &[Marker] = block.markers();
    if markers.is_empty() {
        log::info!("no DRC violations or pending rechecks");
        return;
    }
    for marker in markers {
        log::warn!("{:?} on layer {} at {:?}", marker.constraint, marker.layer_num, marker.bbox);
    }
}
