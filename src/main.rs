use std::collections::HashMap;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info, warn};

use treesynth::smt::{SolverConfig, Z3Solver};
use treesynth::{
    components, ComponentMultiset, Constant, Expression, Parameter, ProgramVariable, TbsConfig,
    TestCase, TreeBoundedSynthesis,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Demo {
    /// x + y from two examples
    Addition,
    /// Same as addition, with Add(x, y) forbidden
    ForbiddenChoice,
    /// Pick 0 out of {true, 0, 1, ITE}
    Ite,
    /// x + p, with the parameter p fitted by the solver
    Offset,
}

#[derive(Debug, Parser)]
#[command(about = "Tree-bounded synthesis on a few built-in problems")]
struct Args {
    #[arg(long, value_enum, default_value_t = Demo::Addition)]
    example: Demo,
    /// Number of component applications to start from.
    #[arg(long, default_value_t = 1)]
    bound: usize,
    /// Keep increasing the bound up to this value while there is no solution.
    #[arg(long)]
    max_bound: Option<usize>,
    /// Allow programs that use only part of the components.
    #[arg(long)]
    relaxed: bool,
    /// Solver time limit per query.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Print the SMT-LIB query instead of solving it.
    #[arg(long)]
    dump_smt: bool,
}

fn int_test(inputs: &[(&ProgramVariable, i64)], output: i64) -> TestCase {
    let inputs = inputs
        .iter()
        .map(|(v, c)| ((*v).clone(), Constant::Int(*c)))
        .collect::<HashMap<_, _>>();

    TestCase::of_assignment(inputs, Constant::Int(output))
}

fn problem(demo: Demo) -> (Vec<TestCase>, ComponentMultiset, Vec<Expression>) {
    let x = ProgramVariable::int("x");
    let y = ProgramVariable::int("y");

    match demo {
        Demo::Addition | Demo::ForbiddenChoice => {
            let tests = vec![
                int_test(&[(&x, 1), (&y, 1)], 2),
                int_test(&[(&x, 1), (&y, 2)], 3),
            ];
            let palette = ComponentMultiset::new()
                .with(x.clone())
                .with(y.clone())
                .with(components::add());
            let forbidden = match demo {
                Demo::ForbiddenChoice => vec![Expression::apply(
                    components::add(),
                    [Expression::leaf(x), Expression::leaf(y)],
                )],
                _ => Vec::new(),
            };

            (tests, palette, forbidden)
        }
        Demo::Ite => {
            let tests = vec![int_test(&[], 0).with_id("zero")];
            let palette = ComponentMultiset::new()
                .with(Constant::TRUE)
                .with(Constant::Int(0))
                .with(Constant::Int(1))
                .with(components::ite());

            (tests, palette, Vec::new())
        }
        Demo::Offset => {
            let tests = vec![int_test(&[(&x, 1)], 5), int_test(&[(&x, 10)], 14)];
            let palette = ComponentMultiset::new()
                .with(x)
                .with(Parameter::int("p"))
                .with(components::add());

            (tests, palette, Vec::new())
        }
    }
}

fn main() -> ExitCode {
    colog::init();

    let args = Args::parse();
    let (tests, palette, forbidden) = problem(args.example);
    let solver_config = match args.timeout_ms {
        Some(ms) => SolverConfig::with_timeout_millis(ms),
        None => SolverConfig::no_timeout(),
    };
    let max_bound = args.max_bound.unwrap_or(args.bound).max(args.bound);

    info!("Problem: {} tests over {palette}", tests.len());

    for bound in args.bound..=max_bound {
        let mut config = TbsConfig::new(bound).with_forbidden(forbidden.clone());
        if args.relaxed {
            config = config.disable_unique_usage();
        }
        let mut synth = TreeBoundedSynthesis::new(Z3Solver::with_config(solver_config.clone()), config);

        if args.dump_smt {
            return match synth.query(&tests, &palette) {
                Ok(text) => {
                    println!("{text}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("{e}");
                    ExitCode::FAILURE
                }
            };
        }

        match synth.synthesize(&tests, &palette) {
            Ok(Some(res)) => {
                println!("{res}");
                return ExitCode::SUCCESS;
            }
            Ok(None) => warn!("No solution with bound {bound}"),
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    println!("no solution");
    ExitCode::FAILURE
}
