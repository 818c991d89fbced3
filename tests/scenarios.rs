use contract_automata::automaton::Automaton;
use contract_automata::composition::compose;
use contract_automata::error::Error;
use contract_automata::label::Label;
use contract_automata::projection::{ProjectionFunction, Role};
use contract_automata::requirement::Requirement;
use contract_automata::synthesis::choreography::ChoreographySynthesisOperator;
use contract_automata::synthesis::mpc::MpcSynthesisOperator;
use contract_automata::synthesis::orchestration::OrchestrationSynthesisOperator;
use contract_automata::transition::Modality;
use test_log::test;

fn parse(s: &str) -> Automaton {
    s.parse().unwrap()
}

fn client() -> Automaton {
    parse("Rank: 1\nInitial state: [c0]\nFinal states: [[c1]]\nTransitions: \n([c0],[!pay],[c1])")
}

fn hotel() -> Automaton {
    parse("Rank: 1\nInitial state: [h0]\nFinal states: [[h1]]\nTransitions: \n!U([h0],[?pay],[h1])")
}

#[test]
fn test_client_and_hotel() {
    let plant = compose(&[&client(), &hotel()], |_| false, usize::MAX).unwrap().unwrap();
    assert_eq!(plant.rank(), 2);
    assert_eq!(plant.num_states(), 2);
    assert_eq!(plant.num_transitions(), 1);
    let t = &plant.transitions()[0];
    assert_eq!(t.modality(), Modality::Urgent);
    assert_eq!(t.label(), &Label::matched(2, 0, 1, "pay").unwrap());

    let orc = OrchestrationSynthesisOperator::new(Requirement::StrongAgreement)
        .apply(&plant)
        .unwrap();
    assert_eq!(orc.as_ref(), Some(&plant));
}

#[test]
fn test_hotel_with_unmatched_urgent_request() {
    let greedy = parse(
        "Rank: 1\nInitial state: [h0]\nFinal states: [[h1, h2]]\nTransitions: \n\
         !U([h0],[?pay],[h1])\n!U([h1],[?tip],[h2])",
    );
    let plant = compose(&[&client(), &greedy], |_| false, usize::MAX).unwrap().unwrap();
    assert_eq!(plant.num_transitions(), 2);
    let orc = OrchestrationSynthesisOperator::new(Requirement::Agreement)
        .apply(&plant)
        .unwrap();
    assert!(orc.is_none());
}

#[test]
fn test_composition_properties() {
    let a = client();
    let b = hotel();
    let plant = compose(&[&a, &b], |_| false, usize::MAX).unwrap().unwrap();
    assert_eq!(plant.rank(), a.rank() + b.rank());
    for s in plant.states() {
        assert!(a.find_state(&[s.local(0).label()]).is_some());
        assert!(b.find_state(&[s.local(1).label()]).is_some());
    }

    // Composing a composite with a further operand shifts its positions.
    let c = parse("Rank: 1\nInitial state: [x]\nFinal states: [[x]]\nTransitions: \n([x],[!ping],[x])");
    let nested = compose(&[&plant, &c], |_| false, usize::MAX).unwrap().unwrap();
    assert_eq!(nested.rank(), 3);
    assert!(nested
        .transitions()
        .iter()
        .any(|t| t.label() == &Label::offer(3, 2, "ping").unwrap()));
}

#[test]
fn test_synthesis_is_idempotent() {
    let client = parse(
        "Rank: 1\nInitial state: [c0]\nFinal states: [[c2]]\nTransitions: \n\
         ([c0],[!pay],[c1])\n([c0],[?refund],[c2])\n([c1],[!bye],[c2])",
    );
    let hotel = parse(
        "Rank: 1\nInitial state: [h0]\nFinal states: [[h2]]\nTransitions: \n\
         ([h0],[?pay],[h1])\n([h1],[?bye],[h2])",
    );
    let plant = compose(&[&client, &hotel], |_| false, usize::MAX).unwrap().unwrap();
    let op = OrchestrationSynthesisOperator::new(Requirement::Agreement);
    let once = op.apply(&plant).unwrap().unwrap();
    let twice = op.apply(&once).unwrap().unwrap();
    assert_eq!(once, twice);
    assert!(once.transitions().iter().all(|t| !t.label().is_request()));

    let mpc = MpcSynthesisOperator::new(Requirement::Agreement);
    let once = mpc.apply(&plant).unwrap().unwrap();
    assert_eq!(mpc.apply(&once).unwrap().unwrap(), once);
}

#[test]
fn test_choreography() {
    let plant = compose(&[&client(), &hotel()], |_| false, usize::MAX).unwrap().unwrap();
    let cho = ChoreographySynthesisOperator::new(Requirement::StrongAgreement)
        .apply(&plant)
        .unwrap();
    assert_eq!(cho, Some(plant));
}

#[test]
fn test_role_preconditions() {
    let urgent_request = hotel();
    assert!(matches!(
        ChoreographySynthesisOperator::new(Requirement::Agreement).apply(&urgent_request),
        Err(Error::NecessaryRequest)
    ));

    let lazy_offer = parse("Rank: 1\nInitial state: [c0]\nFinal states: [[c1]]\nTransitions: \n!L([c0],[!pay],[c1])");
    assert!(matches!(
        OrchestrationSynthesisOperator::new(Requirement::Agreement).apply(&lazy_offer),
        Err(Error::NecessaryOffer)
    ));
    assert!(matches!(
        MpcSynthesisOperator::new(Requirement::Agreement).apply(&lazy_offer),
        Err(Error::SemiControllable)
    ));
}

#[test]
fn test_projection_and_round_trip() {
    let plant = compose(&[&client(), &hotel()], |_| false, usize::MAX).unwrap().unwrap();
    let projection = ProjectionFunction::new(Role::Requester);
    assert_eq!(projection.apply(&plant, 1).unwrap(), hotel());

    let text = plant.to_data_string();
    assert_eq!(Automaton::from_data_string(&text).unwrap(), plant);
}

#[test]
fn test_infeasible_composition() {
    let a = parse("Rank: 1\nInitial state: [0]\nFinal states: [[1]]\nTransitions: \n([0],[!a],[1])");
    assert!(compose(&[&a], |l| l.name() == "a", usize::MAX).unwrap().is_none());
}
