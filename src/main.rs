use anyhow::Result;
use clap::{Parser, Subcommand};
use qcsim_lib::app::{self, AdvanceOptions};
use qcsim_lib::qcsim_core::collapse::simulate_collapse;
use qcsim_lib::qcsim_core::report::CivilizationAnalysis;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path (defaults to ./qcsim.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Advance a run by one or more cycles
    Advance {
        #[arg(long)]
        run_dir: PathBuf,
        /// Perturbation seed, overrides the config
        #[arg(long)]
        seed: Option<u64>,
        /// Use a source that never perturbs
        #[arg(long)]
        zero_drift: bool,
        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u64).range(1..=app::MAX_CYCLES)
        )]
        cycles: u64,
        /// Also write reports/cycle_N.md after each cycle
        #[arg(long)]
        report: bool,
    },
    /// Show the latest persisted cycle of a run
    Status {
        #[arg(long)]
        run_dir: PathBuf,
    },
    /// Write the markdown report for the current cycle
    Report {
        #[arg(long)]
        run_dir: PathBuf,
    },
    /// Measure a text sample and route it to a region
    Text {
        text: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Run the collapse scanner over a crisis record (JSON)
    Scan { input: PathBuf },
    /// Map an intent phase to eigen-like values
    Collapse {
        #[arg(long, allow_negative_numbers = true)]
        phase: f64,
    },
}

fn main() {
    qcsim_lib::qcsim_core::init_logging();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(app::exit_code(&e));
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Advance {
            run_dir,
            seed,
            zero_drift,
            cycles,
            report,
        } => {
            let config = app::load_config(args.config.as_deref())?;
            let opts = AdvanceOptions {
                run_dir,
                seed,
                zero_drift,
                cycles,
                write_report: report,
            };
            for outcome in app::advance(config, &opts)? {
                if outcome.recovered {
                    println!("Recovered {} from initial defaults.", opts.run_dir.display());
                }
                println!(
                    "Cycle {}: {}{}",
                    outcome.cycle,
                    outcome.classification,
                    if outcome.summary.classification_changed {
                        " (changed)"
                    } else {
                        ""
                    }
                );
            }
        }
        Command::Status { run_dir } => match app::status(&run_dir)? {
            Some(status) => {
                let s = &status.snapshot;
                let analysis = CivilizationAnalysis::of(s);
                println!("Run: {}", run_dir.display());
                println!("Cycle: {}", s.cycle);
                println!("Classification: {}", s.classification);
                println!("delta_H: {:.3}  coherence: {:.3}", s.delta_h, s.coherence);
                println!(
                    "Resonance PL/IL/NL: {:.3} / {:.3} / {:.3}",
                    s.pl_resonance, s.il_resonance, s.nl_resonance
                );
                println!("Coherence state: {}", analysis.coherence_state);
                println!("Last updated: {}", status.panel.last_updated);
            }
            None => println!("Run {} has not completed a cycle yet.", run_dir.display()),
        },
        Command::Report { run_dir } => {
            let config = app::load_config(args.config.as_deref())?;
            let path = app::report(config, &run_dir)?;
            println!("Report written to {}", path.display());
        }
        Command::Text { text, file } => {
            let assessment = app::assess(text.as_deref(), file.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
        Command::Scan { input } => {
            let analysis = app::scan_file(&input)?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Collapse { phase } => {
            println!("{}", serde_json::to_string_pretty(&simulate_collapse(phase))?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cycles_must_be_positive_and_bounded() {
        let parse = |cycles: &str| {
            Args::try_parse_from(["qcsim", "advance", "--run-dir", "r", "--cycles", cycles])
        };
        assert!(parse("0").is_err());
        assert!(parse("18446744073709551615").is_err());
        assert!(parse("3").is_ok());
    }
}
