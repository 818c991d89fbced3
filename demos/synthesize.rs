use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;

use contract_automata::automaton::Automaton;
use contract_automata::composition::compose;
use contract_automata::requirement::Requirement;
use contract_automata::synthesis::choreography::ChoreographySynthesisOperator;
use contract_automata::synthesis::mpc::MpcSynthesisOperator;
use contract_automata::synthesis::orchestration::OrchestrationSynthesisOperator;

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Controller {
    Orchestration,
    Choreography,
    Mpc,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Agreement {
    Weak,
    Strong,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Operand automata (`.data` files), composed in the given order.
    #[arg(value_name = "FILE", required = true)]
    operands: Vec<PathBuf>,

    /// Controller to synthesize.
    #[arg(short, long, value_enum, default_value = "orchestration")]
    controller: Controller,

    /// Agreement required of every label.
    #[arg(short, long, value_enum, default_value = "weak")]
    agreement: Agreement,

    /// Rank-1 property restricting the composition.
    #[arg(long, value_name = "FILE")]
    property: Option<PathBuf>,

    /// Exploration depth of the composition.
    #[arg(long, value_name = "INT", default_value_t = usize::MAX)]
    bound: usize,

    /// Output file (`.data`); the result is printed if omitted.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the result in DOT format.
    #[arg(long)]
    dot: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    info!("args = {:?}", args);

    let operands = args.operands.iter().map(Automaton::load).collect::<Result<Vec<_>, _>>()?;
    let refs: Vec<&Automaton> = operands.iter().collect();
    let Some(plant) = compose(&refs, |_| false, args.bound)? else {
        println!("The composition is empty");
        return Ok(());
    };
    info!(
        "composition: {} states, {} transitions",
        plant.num_states(),
        plant.num_transitions()
    );

    let requirement = match args.agreement {
        Agreement::Weak => Requirement::Agreement,
        Agreement::Strong => Requirement::StrongAgreement,
    };
    let property = args.property.as_ref().map(Automaton::load).transpose()?;

    let time_synthesis = std::time::Instant::now();
    let result = match args.controller {
        Controller::Orchestration => {
            let mut op = OrchestrationSynthesisOperator::new(requirement);
            if let Some(p) = property {
                op = op.with_property(p);
            }
            op.apply(&plant)?
        }
        Controller::Choreography => {
            let mut op = ChoreographySynthesisOperator::new(requirement);
            if let Some(p) = property {
                op = op.with_property(p);
            }
            op.apply(&plant)?
        }
        Controller::Mpc => {
            let mut op = MpcSynthesisOperator::new(requirement);
            if let Some(p) = property {
                op = op.with_property(p);
            }
            op.apply(&plant)?
        }
    };
    info!("synthesis done in {:.3} s", time_synthesis.elapsed().as_secs_f64());

    match result {
        None => println!("No {:?} exists", args.controller),
        Some(aut) => {
            println!(
                "{:?}: {} states, {} transitions",
                args.controller,
                aut.num_states(),
                aut.num_transitions()
            );
            if let Some(path) = &args.output {
                aut.save(path)?;
                println!("Saved to {}", path.display());
            } else if args.dot {
                println!("{}", aut.to_dot()?);
            } else {
                println!("{}", aut);
            }
        }
    }

    println!("\nAll done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
