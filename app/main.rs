use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use drift::{
    collector,
    report::{progress_line, Report, DEFAULT_RETAINED_CAP},
    snapshot::SnapshotSeries,
    source::fixture::FixtureChain,
    error::USAGE_EXIT_CODE,
    upgrades, Error,
};

#[derive(Parser, Debug)]
#[clap(about = "shows how a chain's pallets changed across its runtime upgrades")]
struct Arguments {
    #[arg(long, help = "JSON file recording the chain's blocks and runtimes")]
    chain: PathBuf,
    #[arg(long, help = "JSON list of [block, label] upgrade points")]
    upgrades: PathBuf,
    #[arg(long, value_enum, default_value_t = Format::Text, help = "output format")]
    format: Format,
    #[arg(
        long,
        default_value_t = DEFAULT_RETAINED_CAP,
        help = "how many retained pallets to list per upgrade"
    )]
    retained_cap: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn run(args: Arguments) -> Result<(), Error> {
    let chain = FixtureChain::open(&args.chain)?;
    let upgrades = upgrades::load(&args.upgrades)?;

    let snapshots = collector::collect(&chain, &upgrades, |snapshot| {
        if args.format == Format::Text {
            println!("{}", progress_line(snapshot));
        }
    })?;

    let series = SnapshotSeries::build(snapshots)?;
    let report = Report::new(&series);
    match args.format {
        Format::Text => print!("{}", report.render_text(args.retained_cap)),
        Format::Json => println!("{}", report.render_json()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = match Arguments::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(USAGE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("failed while {}: {}", err.stage(), err);
            eprintln!("error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}
