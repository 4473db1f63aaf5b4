
use log::{error, info, LevelFilter};
use std::time::Instant;

use qcdist::cli::core::get_cli;
use qcdist::cli::dist::check_dist_settings;
use qcdist::data_types::class_enums::GenotypeError;
use qcdist::parsing::query::NormalizationError;
use qcdist::parsing::schema::SchemaError;
use qcdist::pipeline::{run_dist, DistConfig};

fn main() {
    // start the timer
    let start_time = Instant::now();

    let settings = get_cli();

    // set up logging before we check the other settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let settings = match check_dist_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let config = match DistConfig::from_settings(&settings) {
        Ok(c) => c,
        Err(e) => {
            error!("Error while building run config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    match run_dist(&config) {
        Ok(out_filename) => {
            info!("Report saved to {out_filename:?}.");
        },
        Err(e) => {
            error!("Error while comparing distributions: {e:#}");
            // malformed data and broken streams exit differently
            let data_error = e.downcast_ref::<SchemaError>().is_some() ||
                e.downcast_ref::<NormalizationError>().is_some() ||
                e.downcast_ref::<GenotypeError>().is_some();
            if data_error {
                std::process::exit(exitcode::DATAERR);
            } else {
                std::process::exit(exitcode::IOERR);
            }
        }
    }

    info!("Comparison completed in {} seconds.", start_time.elapsed().as_secs_f64());
    info!("Process finished successfully.");
}
