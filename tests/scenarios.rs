//! End-to-end sessions against both controllers.

use dispenser::cooler::{self, CoolerEvent, CoolerState, RecordingValve, ValveCommand, WaterCooler};
use dispenser::engine::{drive, ScriptedSource};
use dispenser::vending::{
    self, Catalog, RecordingSink, Vending, VendingEffect, VendingEvent, VendingState,
};
use dispenser::{Clock, MachineError, ManualClock, State};
use std::sync::Arc;
use std::time::Duration;

fn coin(id: &str) -> VendingEvent {
    VendingEvent::Coin(id.to_string())
}

fn product(id: &str) -> VendingEvent {
    VendingEvent::Product(id.to_string())
}

#[test]
fn vending_accepts_every_coin() {
    let sink = RecordingSink::new();
    let mut machine =
        vending::machine(Vending::new(Catalog::canadian(), sink.clone()).unwrap()).unwrap();

    for id in ["$2", "$1", "¢25", "¢10", "¢5"] {
        machine.dispatch(coin(id)).unwrap();
    }

    assert_eq!(machine.state_name(), Some("add_coins"));
    assert_eq!(machine.controller().amount(), 340);
    assert_eq!(machine.controller().balance_message(), "Balance: ¢340");
    assert!(sink.effects().is_empty());
}

#[test]
fn vending_purchase_and_refund_session() {
    let sink = RecordingSink::new();
    let mut machine =
        vending::machine(Vending::new(Catalog::canadian(), sink.clone()).unwrap()).unwrap();

    let script = [
        Some(coin("$1")),
        Some(product("Chocolate")),
        Some(coin("$1")),
        Some(coin("¢25")),
        Some(product("Gum")),
        None,
        Some(coin("¢10")),
        Some(VendingEvent::Return),
        None,
    ];
    let mut states = Vec::new();
    let updates = drive(&mut machine, &mut ScriptedSource::new(script), |machine| {
        states.push(machine.state_name().unwrap_or_default().to_string());
    })
    .unwrap();

    assert_eq!(updates, 9);
    assert_eq!(
        states,
        vec![
            "add_coins",
            "add_coins",
            "add_coins",
            "add_coins",
            "count_change",
            "waiting",
            "add_coins",
            "count_change",
            "waiting",
        ]
    );
    assert_eq!(
        sink.effects(),
        vec![
            VendingEffect::Dispensed("Gum".to_string()),
            VendingEffect::Displayed("Change due: $1.00".to_string()),
            VendingEffect::CoinReturned(100),
            VendingEffect::Displayed("Change due: $0.10".to_string()),
            VendingEffect::CoinReturned(10),
        ]
    );
}

#[test]
fn vending_exact_payment_skips_change() {
    let sink = RecordingSink::new();
    let mut machine =
        vending::machine(Vending::new(Catalog::canadian(), sink.clone()).unwrap()).unwrap();

    machine.dispatch(coin("$1")).unwrap();
    machine.dispatch(coin("¢25")).unwrap();
    machine.dispatch(coin("¢25")).unwrap();
    machine.dispatch(product("Cola")).unwrap();

    assert_eq!(machine.current_state(), Some(&VendingState::Waiting));
    assert_eq!(sink.dispensed(), vec!["Cola".to_string()]);
    assert!(sink.returned_coins().is_empty());

    let path: Vec<&str> = machine.history().transitions().map(|t| t.to.name()).collect();
    assert_eq!(path, vec!["waiting", "add_coins", "deliver_product", "waiting"]);
}

#[test]
fn vending_parses_console_labels() {
    let catalog = Catalog::canadian();
    assert_eq!(catalog.parse_event("return").unwrap(), VendingEvent::Return);
    assert_eq!(catalog.parse_event("$2").unwrap(), coin("$2"));
    assert_eq!(catalog.parse_event("Choc Milk").unwrap(), product("Choc Milk"));
    assert_eq!(
        catalog.parse_event("$3"),
        Err(MachineError::UnrecognizedEvent {
            label: "$3".to_string()
        })
    );
}

fn cooler_machine() -> (
    dispenser::StateMachine<WaterCooler>,
    Arc<ManualClock>,
    RecordingValve,
) {
    let clock = Arc::new(ManualClock::new());
    let valve = RecordingValve::new();
    let controller = WaterCooler::new(Duration::from_secs(5), valve.clone());
    let machine = cooler::machine(controller, clock.clone()).unwrap();
    (machine, clock, valve)
}

#[test]
fn cooler_times_out_and_needs_removal() {
    let (mut machine, clock, valve) = cooler_machine();

    machine.dispatch(CoolerEvent::Detect).unwrap();
    assert_eq!(machine.current_state(), Some(&CoolerState::Filling));
    assert!(valve.is_open());

    clock.advance(Duration::from_millis(4990));
    machine.tick().unwrap();
    assert_eq!(machine.current_state(), Some(&CoolerState::Filling));

    clock.advance(Duration::from_millis(20));
    machine.tick().unwrap();
    assert_eq!(machine.state_name(), Some("timedout"));
    assert!(!valve.is_open());

    machine.dispatch(CoolerEvent::Detect).unwrap();
    assert_eq!(machine.current_state(), Some(&CoolerState::TimedOut));
    assert!(!valve.is_open());

    machine.dispatch(CoolerEvent::Undetect).unwrap();
    assert_eq!(machine.current_state(), Some(&CoolerState::Waiting));
}

#[test]
fn cooler_fill_cycle() {
    let (mut machine, clock, valve) = cooler_machine();

    let script = [
        Some(CoolerEvent::Detect),
        None,
        None,
        Some(CoolerEvent::Undetect),
        Some(CoolerEvent::Undetect),
    ];
    let mut source = ScriptedSource::new(script);
    drive(&mut machine, &mut source, |_| clock.advance(Duration::from_secs(1))).unwrap();

    assert_eq!(machine.current_state(), Some(&CoolerState::Waiting));
    assert_eq!(machine.controller().stop_time(), None);
    assert_eq!(
        valve.commands(),
        vec![ValveCommand::Open, ValveCommand::Close]
    );
}

#[test]
fn cooler_refill_restarts_timer() {
    let (mut machine, clock, _valve) = cooler_machine();

    machine.dispatch(CoolerEvent::Detect).unwrap();
    let first = machine.controller().stop_time().unwrap();

    clock.advance(Duration::from_secs(3));
    machine.dispatch(CoolerEvent::Undetect).unwrap();
    machine.dispatch(CoolerEvent::Detect).unwrap();
    let second = machine.controller().stop_time().unwrap();

    assert_eq!(second - first, Duration::from_secs(3));
    assert_eq!(
        machine.controller().remaining(clock.now()),
        Some(Duration::from_secs(5))
    );
}
