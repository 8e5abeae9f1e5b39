use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::{anyhow, Error};
use clap::{values_t, App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};
use serde::Deserialize;

use fmb_dimacs::DimacsParser;
use fmb_model::{Outcome, SolverOptions};
use fmb_sat::{InternalSolver, SatSolver, SatSolverKind, SolveResult};

mod demo;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "% {}", record.args())
        } else {
            writeln!(buf, "% {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("FMB_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is fmb {}", env!("CARGO_PKG_VERSION"));
}

/// The subset of [`SolverOptions`] that can come from a TOML fragment.
///
/// `SolverOptions::deadline` wraps a `Box<dyn Fn() -> bool>` and so cannot
/// derive `Deserialize`; this struct mirrors every other field and is
/// applied onto a freshly-built `SolverOptions` by [`CliConfig::apply`].
#[derive(Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct CliConfig {
    sat_solver: Option<String>,
    complete: Option<bool>,
    proof_level: Option<u32>,
    max_model_size: Option<usize>,
    emit_dimacs: Option<bool>,
}

impl CliConfig {
    fn merge(&mut self, other: CliConfig) {
        if other.sat_solver.is_some() {
            self.sat_solver = other.sat_solver;
        }
        if other.complete.is_some() {
            self.complete = other.complete;
        }
        if other.proof_level.is_some() {
            self.proof_level = other.proof_level;
        }
        if other.max_model_size.is_some() {
            self.max_model_size = other.max_model_size;
        }
        if other.emit_dimacs.is_some() {
            self.emit_dimacs = other.emit_dimacs;
        }
    }

    fn apply(self, options: &mut SolverOptions) -> Result<(), Error> {
        if let Some(name) = self.sat_solver {
            options.sat_solver = match name.as_str() {
                "internal_cdcl" => SatSolverKind::InternalCdcl,
                "external_lingeling" => SatSolverKind::ExternalLingeling,
                "external_minisat" => SatSolverKind::ExternalMinisat,
                other => return Err(anyhow!("unknown sat_solver '{}'", other)),
            };
        }
        if let Some(complete) = self.complete {
            options.complete = complete;
        }
        if let Some(proof_level) = self.proof_level {
            options.proof_level = proof_level;
        }
        if self.max_model_size.is_some() {
            options.max_model_size_override = self.max_model_size;
        }
        if let Some(emit_dimacs) = self.emit_dimacs {
            options.emit_dimacs = emit_dimacs;
        }
        Ok(())
    }
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("fmb")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .setting(AppSettings::VersionlessSubcommands)
        .arg_from_usage("[INPUT] 'A DIMACS CNF file to solve directly (stdin if omitted)'")
        .arg(
            Arg::from_usage("--demo=[NAME] 'Run a built-in finite-model-building demo problem'")
                .possible_values(&demo::NAMES)
                .conflicts_with("INPUT"),
        )
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from a configuration file'")
        .arg(
            Arg::from_usage("[config-option] -C --config-option")
                .value_name("KEY=VALUE")
                .help("Specify a single config option as a TOML fragment")
                .multiple(true)
                .number_of_values(1),
        )
        .get_matches();

    init_logging();
    banner();

    let mut config = CliConfig::default();

    if let Some(config_path) = matches.value_of("config-file") {
        let mut contents = String::new();
        fs::File::open(config_path)?.read_to_string(&mut contents)?;
        config.merge(toml::from_str(&contents)?);
    }

    for fragment in values_t!(matches, "config-option", String).unwrap_or_default() {
        config.merge(toml::from_str(&fragment)?);
    }

    let mut options = SolverOptions::default();
    config.apply(&mut options)?;

    if let Some(name) = matches.value_of("demo") {
        return run_demo(name, &options);
    }

    run_dimacs(matches.value_of("INPUT"))
}

fn run_demo(name: &str, options: &SolverOptions) -> Result<i32, Error> {
    let (mut signature, clauses) = demo::build(name)?;
    info!("running demo problem '{}'", name);

    let (outcome, stats) = fmb_model::solve(&mut signature, &clauses, options)?;

    for size_stats in &stats.sizes {
        info!(
            "size {}: {} variables, {} clauses, {:?}",
            size_stats.size, size_stats.var_count, size_stats.clause_count, size_stats.result
        );
    }

    match outcome {
        Outcome::Satisfiable(model) => {
            println!("SATISFIABLE");
            print!("{}", model.display(&signature));
            Ok(10)
        }
        Outcome::Refutation => {
            println!("REFUTATION");
            Ok(20)
        }
        Outcome::Unknown(reason) => {
            println!("UNKNOWN");
            info!("reason: {:?}", reason);
            Ok(0)
        }
        Outcome::TimeLimit => {
            println!("TIME_LIMIT");
            Ok(0)
        }
    }
}

fn run_dimacs(input: Option<&str>) -> Result<i32, Error> {
    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match input {
        Some(path) => {
            info!("reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    let formula = DimacsParser::parse(file)?;

    let mut solver = InternalSolver::new();
    solver.ensure_var_count(formula.var_count());
    solver.add_clauses(&mut formula.iter(), false);

    match solver.solve() {
        SolveResult::Sat => {
            println!("s SATISFIABLE");
            print!("v");
            for i in 0..formula.var_count() {
                let var = fmb_formula::Var::from_index(i);
                let value = match solver.assignment(var) {
                    fmb_sat::Assignment::True => i as isize + 1,
                    fmb_sat::Assignment::False => -(i as isize + 1),
                    fmb_sat::Assignment::DontCare => i as isize + 1,
                };
                print!(" {}", value);
            }
            println!(" 0");
            Ok(10)
        }
        SolveResult::Unsat => {
            println!("s UNSATISFIABLE");
            Ok(20)
        }
        SolveResult::Unknown => {
            println!("s UNKNOWN");
            Ok(0)
        }
    }
}

