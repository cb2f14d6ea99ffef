//! Tests against a real device running the remapper firmware.
//!
//! Run with: cargo test -p remapper-mouse --test hardware -- --ignored --nocapture

use remapper_mouse::{open_controller, InterfaceMatch, Pacing, ProtocolRevision};
use remapper_transport::{HidDiscovery, SurveyStatus};

#[test]
#[ignore] // requires hardware
fn configuration_interface_is_enumerated() {
    let survey = HidDiscovery::default()
        .survey()
        .expect("hidapi should initialise");
    for candidate in &survey.candidates {
        println!("{candidate}");
    }
    assert_eq!(survey.status(), SurveyStatus::Ready);
}

#[test]
#[ignore] // requires hardware; moves the pointer
fn nudge_pointer_and_back() {
    let ctl = open_controller(
        &InterfaceMatch::default(),
        ProtocolRevision::default(),
        Pacing::default(),
    )
    .expect("No remapper found; plug in a device running the firmware");

    ctl.move_by(20, 0).unwrap();
    ctl.move_by(-20, 0).unwrap();
    ctl.disconnect();
}
