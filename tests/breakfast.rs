//! End-to-end runs through the public API.

use std::sync::Arc;

use breakfast_kata::{
    CookState, EnergySource, FoodKind, Kitchen, KitchenError, KitchenEvent, LoadSim, Menu,
    NullSink, RecordingSink,
};

fn fixed_menu(eggs: usize, bacon: usize, bread: usize, energy: f32) -> Menu {
    Menu {
        eggs,
        bacon,
        bread,
        energy: EnergySource::Fixed(energy),
        load: LoadSim::Off,
        ..Menu::default()
    }
}

#[test]
fn deterministic_breakfast_plates_everything() {
    let report = Kitchen::new(fixed_menu(3, 3, 2, 0.0823), Arc::new(NullSink))
        .expect("menu fits the appliances")
        .run();

    assert_eq!(report.plated(FoodKind::Egg), 3);
    assert_eq!(report.plated(FoodKind::Bacon), 3);
    assert_eq!(report.plated(FoodKind::Bread), 2);
    assert!(report.wasted().is_empty());

    let text = report.to_string();
    assert!(text.starts_with("Breakfast is ready!"));
    assert!(text.contains("We wasted 0 items:"));
}

#[test]
fn burned_bacon_ends_up_in_the_report() {
    let report = Kitchen::new(fixed_menu(0, 3, 0, 0.40), Arc::new(NullSink))
        .expect("menu fits the appliances")
        .run();

    assert_eq!(report.plated(FoodKind::Bacon), 0);
    assert_eq!(report.wasted().len(), 3);
    for item in report.wasted() {
        assert_eq!(item.kind, FoodKind::Bacon);
        assert_eq!(item.status.primary, CookState::Burned);
        assert!(!item.status.partially_cooked);
    }
}

#[test]
fn the_pan_is_shared_without_overfilling() {
    let sink = Arc::new(RecordingSink::new());
    Kitchen::new(fixed_menu(3, 3, 2, 0.0823), sink.clone())
        .expect("menu fits the appliances")
        .run();

    let mut pan_occupancy = 0usize;
    let mut toaster_occupancy = 0usize;
    for event in sink.events() {
        match event {
            KitchenEvent::Admitted { cooker, .. } => {
                let occupancy = if cooker.name == "frying pan" {
                    &mut pan_occupancy
                } else {
                    &mut toaster_occupancy
                };
                *occupancy += 1;
                assert!(pan_occupancy <= 3);
                assert!(toaster_occupancy <= 2);
            }
            KitchenEvent::Removed { cooker, .. } => {
                if cooker.name == "frying pan" {
                    pan_occupancy -= 1;
                } else {
                    toaster_occupancy -= 1;
                }
            }
            _ => {}
        }
    }
    assert_eq!(pan_occupancy, 0);
    assert_eq!(toaster_occupancy, 0);
}

#[test]
fn deferred_batches_are_admitted_whole() {
    let sink = Arc::new(RecordingSink::new());
    Kitchen::new(fixed_menu(2, 2, 0, 0.0823), sink.clone())
        .expect("menu fits the appliances")
        .run();

    // The pan has 3 slots; two eggs go in first and the two bacon slices
    // wait as one batch rather than splitting into the single free slot.
    let events = sink.events();
    let bacon_admissions: Vec<usize> = events
        .iter()
        .enumerate()
        .filter_map(|(index, event)| match event {
            KitchenEvent::Admitted { item, .. } if item.kind == FoodKind::Bacon => Some(index),
            _ => None,
        })
        .collect();
    assert_eq!(bacon_admissions.len(), 2);
    assert_eq!(bacon_admissions[0] + 1, bacon_admissions[1]);

    let awaited = events.iter().any(|event| {
        matches!(
            event,
            KitchenEvent::AwaitingSpace { kind: FoodKind::Bacon, queued: 2, .. }
        )
    });
    assert!(awaited);
}

#[test]
fn oversized_menus_are_refused() {
    let error = Kitchen::new(fixed_menu(5, 0, 0, 0.0823), Arc::new(NullSink)).unwrap_err();
    match error {
        KitchenError::BatchExceedsCapacity {
            kind,
            count,
            cooker,
            capacity,
        } => {
            assert_eq!(kind, FoodKind::Egg);
            assert_eq!(count, 5);
            assert_eq!(cooker, "frying pan");
            assert_eq!(capacity, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unheated_menus_are_refused() {
    let error = Kitchen::new(fixed_menu(1, 0, 0, 0.0), Arc::new(NullSink)).unwrap_err();
    assert!(matches!(error, KitchenError::NoUsableHeat { .. }));
}
