use std::{path::PathBuf, process::ExitCode, time::Instant};

use automata_transform::{
    grammar::read_grammar,
    prelude::*,
    tabular::{input, output, TabularError},
};

use tracing::{debug, error, info, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

fn files(command: Command) -> Command {
    command
        .arg(
            Arg::new("input")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}

fn cli() -> Command {
    Command::new("fsmconv")
        .about("Converts, minimizes and compiles finite state machines given as tables")
        .subcommand_required(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .global(true)
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .subcommand(files(
            Command::new("mealy-to-moore").about("converts a mealy table into a moore table"),
        ))
        .subcommand(files(
            Command::new("moore-to-mealy").about("converts a moore table into a mealy table"),
        ))
        .subcommand(files(Command::new("mealy").about("minimizes a mealy table")))
        .subcommand(files(Command::new("moore").about("minimizes a moore table")))
        .subcommand(files(
            Command::new("grammar")
                .about("compiles a left- or right-linear grammar into an acceptor table"),
        ))
        .subcommand(files(
            Command::new("determinize")
                .about("turns an acceptor table into a deterministic moore table")
                .arg(
                    Arg::new("minimize")
                        .long("minimize")
                        .action(ArgAction::SetTrue)
                        .help("minimizes the result"),
                ),
        ))
}

fn setup_logging(matches: &ArgMatches) {
    let Ok(Some(verbosity)) = matches.try_get_one::<String>("verbosity") else {
        return;
    };

    let level = match verbosity.as_str() {
        "trace" => filter::LevelFilter::TRACE,
        "debug" => filter::LevelFilter::DEBUG,
        _ => filter::LevelFilter::INFO,
    };

    let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn run(mode: &str, args: &ArgMatches, markers: &Markers) -> Result<(), TabularError> {
    let (Some(source), Some(target)) = (
        args.get_one::<PathBuf>("input"),
        args.get_one::<PathBuf>("output"),
    ) else {
        unreachable!("input and output are required")
    };
    debug!("running {mode} on {}", source.display());
    let start = Instant::now();

    match mode {
        "mealy-to-moore" => {
            let mealy = input::read_mealy(source)?.trim();
            debug!("read\n{}", mealy.show());
            let moore = mealy.to_moore(markers);
            debug!("converted\n{}", moore.show());
            output::save_moore(target, &moore, markers)?;
        }
        "moore-to-mealy" => {
            let moore = input::read_moore(source, markers)?.trim();
            debug!("read\n{}", moore.show());
            let mealy = moore.to_mealy();
            debug!("converted\n{}", mealy.show());
            output::save_mealy(target, &mealy)?;
        }
        "mealy" => {
            let mealy = input::read_mealy(source)?.trim();
            debug!("read\n{}", mealy.show());
            let minimized = mealy.minimize(markers);
            info!("minimized {} states to {}", mealy.size(), minimized.size());
            output::save_mealy(target, &minimized)?;
        }
        "moore" => {
            let moore = input::read_moore(source, markers)?.trim();
            debug!("read\n{}", moore.show());
            let minimized = moore.minimize(markers);
            info!("minimized {} states to {}", moore.size(), minimized.size());
            output::save_moore(target, &minimized, markers)?;
        }
        "grammar" => {
            let nfa = read_grammar(source, markers).compile(markers).trim();
            debug!("compiled\n{}", nfa.show());
            output::save_nfa(target, &nfa, markers)?;
        }
        "determinize" => {
            let nfa = input::read_nfa(source, markers)?.trim();
            let mut dfa = nfa.determinize(markers);
            if args.get_flag("minimize") {
                dfa = dfa.minimize(markers);
            }
            debug!("determinized\n{}", dfa.show());
            output::save_moore(target, &dfa, markers)?;
        }
        _ => unreachable!(),
    }
    info!("{mode} took {}µs", start.elapsed().as_micros());
    Ok(())
}

pub fn main() -> ExitCode {
    let matches = cli().get_matches();

    setup_logging(&matches);
    let markers = Markers::default();

    let Some((mode, args)) = matches.subcommand() else {
        unreachable!("a subcommand is required")
    };
    match run(mode, args, &markers) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("fsmconv: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::cli;

    #[test]
    fn cli_is_consistent() {
        cli().debug_assert();
        assert!(cli().try_get_matches_from(["fsmconv", "moore", "in.csv"]).is_err());
        assert!(cli().try_get_matches_from(["fsmconv", "frobnicate", "a", "b"]).is_err());
        let matches = cli()
            .try_get_matches_from(["fsmconv", "-v=debug", "determinize", "--minimize", "a", "b"])
            .unwrap();
        let (mode, args) = matches.subcommand().unwrap();
        assert_eq!(mode, "determinize");
        assert!(args.get_flag("minimize"));
    }
}
