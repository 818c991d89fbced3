//! A client books a hotel room and pays either by card or in cash.
//!
//! The hotel insists on being paid (urgent request), so the orchestrator must always
//! schedule one of the payments. A property forbidding cash leaves card payment only.

use contract_automata::automaton::Automaton;
use contract_automata::composition::compose;
use contract_automata::projection::{ProjectionFunction, Role};
use contract_automata::requirement::Requirement;
use contract_automata::synthesis::choreography::ChoreographySynthesisOperator;
use contract_automata::synthesis::mpc::MpcSynthesisOperator;
use contract_automata::synthesis::orchestration::OrchestrationSynthesisOperator;

const CLIENT: &str = "Rank: 1
Initial state: [c0]
Final states: [[c3]]
Transitions:
([c0],[!book],[c1])
([c1],[!card],[c2])
([c1],[!cash],[c2])
([c2],[?receipt],[c3])
";

const HOTEL: &str = "Rank: 1
Initial state: [h0]
Final states: [[h3]]
Transitions:
([h0],[?book],[h1])
!U([h1],[?card],[h2])
([h1],[?cash],[h2])
([h2],[!receipt],[h3])
";

const NO_CASH: &str = "Rank: 1
Initial state: [p]
Final states: [[p]]
Transitions:
([p],[!book],[p])
([p],[!card],[p])
([p],[!receipt],[p])
";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let client: Automaton = CLIENT.parse()?;
    let hotel: Automaton = HOTEL.parse()?;

    // Composition
    let plant = compose(&[&client, &hotel], |_| false, usize::MAX)?;
    let Some(plant) = plant else {
        println!("The composition is empty");
        return Ok(());
    };
    println!("Composition: {} states, {} transitions", plant.num_states(), plant.num_transitions());
    println!("{}", plant);

    // Orchestration
    match OrchestrationSynthesisOperator::new(Requirement::StrongAgreement).apply(&plant)? {
        Some(orc) => println!("Orchestration:\n{}", orc),
        None => println!("No orchestration"),
    }

    // Orchestration without cash
    let no_cash: Automaton = NO_CASH.parse()?;
    match OrchestrationSynthesisOperator::new(Requirement::StrongAgreement)
        .with_property(no_cash)
        .apply(&plant)?
    {
        Some(orc) => println!("Orchestration without cash:\n{}", orc),
        None => println!("No orchestration without cash"),
    }

    // Most permissive controller
    match MpcSynthesisOperator::new(Requirement::Agreement).apply(&plant)? {
        Some(mpc) => println!("Most permissive controller: {} transitions", mpc.num_transitions()),
        None => println!("No most permissive controller"),
    }

    // Choreography
    match ChoreographySynthesisOperator::new(Requirement::StrongAgreement).apply(&plant) {
        Ok(Some(cho)) => println!("Choreography:\n{}", cho),
        Ok(None) => println!("No choreography"),
        Err(e) => println!("Choreography not applicable: {}", e),
    }

    // Projection back on the hotel
    let projected = ProjectionFunction::new(Role::Requester).apply(&plant, 1)?;
    println!("Hotel, as seen in the composition:\n{}", projected);

    Ok(())
}
