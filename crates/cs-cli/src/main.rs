//! Cross-spectrum CLI

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cs_core::{Cosmology, MatterPowerSpectrum, RadialBin, RedshiftGrid};
use cs_cosmo::{ConstantPowerSpectrum, FlatLcdm, TabulatedPowerSpectrum};
use cs_limber::{Power, gw_galaxy_spectra, gw_galaxy_tracers};

use config::RunConfig;

#[derive(Parser)]
#[command(name = "cs-cli")]
#[command(about = "Angular cross-power spectra of GW events and galaxies (Limber approximation)")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute C_ℓ between every GW bin and one galaxy bin
    Cls {
        /// Run configuration (JSON). Flags below override its fields.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of bins
        #[arg(short, long)]
        nbins: Option<usize>,

        /// Minimum redshift
        #[arg(long)]
        zmin: Option<f64>,

        /// Maximum redshift
        #[arg(long)]
        zmax: Option<f64>,

        /// Number of points in the redshift grid
        #[arg(long)]
        npoints: Option<usize>,

        /// Galaxy bin
        #[arg(long)]
        galbin: Option<usize>,

        /// Multipole (repeatable)
        #[arg(short = 'l', long = "ell")]
        ells: Vec<u32>,

        /// Tabulated matter power spectrum (JSON with `z`, `k`, `pk`)
        #[arg(long)]
        power_table: Option<PathBuf>,

        /// Output directory for config.json and cls.json
        #[arg(short, long, default_value = "out")]
        output_dir: PathBuf,

        /// Threads (0 = auto). Use 1 for a serial run.
        #[arg(long, default_value = "0")]
        threads: usize,
    },

    /// Print version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Cls {
            config,
            nbins,
            zmin,
            zmax,
            npoints,
            galbin,
            ells,
            power_table,
            output_dir,
            threads,
        } => {
            let mut cfg = match config {
                Some(path) => RunConfig::from_json_file(&path)?,
                None => RunConfig::default(),
            };
            if let Some(v) = nbins {
                cfg.nbins = v;
            }
            if let Some(v) = zmin {
                cfg.zmin = v;
            }
            if let Some(v) = zmax {
                cfg.zmax = v;
            }
            if let Some(v) = npoints {
                cfg.npoints = v;
            }
            if let Some(v) = galbin {
                cfg.galbin = v;
            }
            if !ells.is_empty() {
                cfg.ells = ells;
            }
            if power_table.is_some() {
                cfg.power_table = power_table;
            }
            cmd_cls(&cfg, &output_dir, threads)
        }
        Commands::Version => {
            println!("crossspec {}", cs_core::VERSION);
            Ok(())
        }
    }
}

fn cmd_cls(cfg: &RunConfig, output_dir: &Path, threads: usize) -> Result<()> {
    cfg.validate()?;
    if threads > 1 {
        // Best-effort; if a global pool already exists, keep going.
        let _ = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global();
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let config_path = output_dir.join("config.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(cfg)?)?;
    tracing::info!(path = %config_path.display(), "run config saved");

    let power_spectrum: Arc<dyn MatterPowerSpectrum> = match &cfg.power_table {
        Some(path) => {
            let table = TabulatedPowerSpectrum::from_json_file(path)
                .with_context(|| format!("loading power table {}", path.display()))?;
            if cfg.extrapolate_k { Arc::new(table.with_k_extrapolation()) } else { Arc::new(table) }
        }
        None => {
            tracing::warn!("no power table given; using P_m = 1");
            Arc::new(ConstantPowerSpectrum::new(1.0)?)
        }
    };
    let cosmology: Arc<dyn Cosmology> =
        Arc::new(FlatLcdm::new(cfg.h0, cfg.om0, cfg.zmax, power_spectrum)?);

    tracing::info!(nbins = cfg.nbins, galbin = cfg.galbin, "defining redshift bins");
    let bins = RadialBin::equal_width(cfg.zmin, cfg.zmax, cfg.nbins)?;
    let galaxy_bin = bins[cfg.galbin];
    // Every bin is paired with the galaxy bin, for each tracer pairing.
    let pairs: Vec<(RadialBin, RadialBin)> = bins.iter().map(|bin| (*bin, galaxy_bin)).collect();

    let z = RedshiftGrid::linspace(cfg.zmin, cfg.zmax, cfg.npoints)?;
    let (gw, galaxy) = gw_galaxy_tracers(Arc::clone(&cosmology), &cfg.tracers)?;
    let power = Power::new(cosmology)?;

    let mut spectra = Vec::new();
    for (name, block) in gw_galaxy_spectra(&power, &gw, &galaxy, &z) {
        tracing::info!(block = name, multipoles = cfg.ells.len(), "computing cls");
        let table = block.compute(&cfg.ells, &pairs, threads != 1)?;
        spectra.push(serde_json::json!({
            "name": name,
            "labels1": table.labels1,
            "labels2": table.labels2,
            "entries": table.entries,
        }));
    }

    let output = serde_json::json!({
        "version": cs_core::VERSION,
        "galaxy_bin": cfg.galbin,
        "spectra": spectra,
    });
    let cls_path = output_dir.join("cls.json");
    std::fs::write(&cls_path, serde_json::to_string_pretty(&output)?)?;
    tracing::info!(path = %cls_path.display(), "cls saved");
    Ok(())
}
