//! h2fluor command-line interface.
//!
//! Run fluorescence models from TOML configuration files:
//! ```sh
//! h2fluor-cli init h2fluor.toml
//! h2fluor-cli run h2fluor.toml
//! h2fluor-cli validate h2fluor.toml
//! h2fluor-cli lines
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "h2fluor-cli")]
#[command(about = "h2fluor: H2 UV fluorescence radiative transfer and line synthesis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a model from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running the model.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Write a configuration file populated with the default parameters.
    Init {
        #[arg(default_value = "h2fluor.toml")]
        path: PathBuf,
    },
    /// List the built-in HI Lyman-series table.
    Lines,
}

fn config_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("h2fluor fluorescence model");
            println!("==========================");
            let job = config::load_config(&config)?;
            job.validate()?;
            println!("Configuration: {}", config.display());

            let run = runner::run_model(&job, &config_dir(&config))?;

            let out_dir = output
                .unwrap_or_else(|| PathBuf::from(&job.output.directory))
                .join(&run.model_name);

            if job.output.save_spectra {
                runner::write_spectra_csv(&run, &out_dir.join("spectra.csv"))?;
            }
            if job.output.save_json {
                runner::write_spectra_json(&run, &out_dir.join("spectra.json"))?;
            }
            if job.output.save_source {
                runner::write_source_csv(&run, &out_dir.join("source.csv"))?;
            }

            println!("Model complete: {}", run.model_name);
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            job.validate()?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Init { path } => {
            config::create_config_file(&path)?;
            println!("Default configuration written to: {}", path.display());
            Ok(())
        }
        Commands::Lines => {
            println!("Built-in HI Lyman series:");
            println!();
            println!("  {:<10} {:>12} {:>12} {:>12}", "line", "lambda (AA)", "f_lu", "A_ul (s^-1)");
            for line in h2fluor_data::lyman_series() {
                println!(
                    "  {:<10} {:>12.4} {:>12.4e} {:>12.4e}",
                    h2fluor_data::hydrogen::lyman_label(line.n_upper),
                    line.wavelength_aa,
                    line.f_lu,
                    line.a_ul
                );
            }
            Ok(())
        }
    }
}
