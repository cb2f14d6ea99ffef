//! Frame sequences produced by the controller, captured with
//! `RecordingTransport`.

use std::time::Duration;

use remapper_mouse::{ControllerError, InjectInput, MouseController, Pacing, SetIdentity};
use remapper_transport::{
    DeviceDescriptor, ParsedCommand, ProtocolRevision, RecordingTransport, ReportMode,
};

fn recorder(revision: ProtocolRevision) -> RecordingTransport {
    RecordingTransport::new(
        DeviceDescriptor::new(0x046D, 0xC08B, 0xFF00, 0x0020),
        revision.default_report_mode(),
    )
}

fn parse_all(ctl: &MouseController<RecordingTransport>) -> Vec<ParsedCommand> {
    ctl.transport()
        .reports()
        .iter()
        .map(|r| r.parse(ctl.revision()).expect("recorded frame must parse"))
        .collect()
}

#[test]
fn click_sends_press_then_release_at_least_50ms_apart() {
    let ctl = MouseController::new(recorder(ProtocolRevision::V19), ProtocolRevision::V19);
    ctl.click(1).unwrap();

    let reports = ctl.transport().reports();
    assert_eq!(reports.len(), 2);
    assert_eq!(
        parse_all(&ctl),
        vec![
            ParsedCommand::InjectInput(InjectInput::new().buttons(0x01)),
            ParsedCommand::InjectInput(InjectInput::new()),
        ]
    );
    let held = reports[1].at.duration_since(reports[0].at);
    assert!(held >= Duration::from_millis(50), "held only {held:?}");
}

#[test]
fn click_on_legacy_revision_uses_feature_report() {
    let ctl = MouseController::new(recorder(ProtocolRevision::V18), ProtocolRevision::V18)
        .with_pacing(Pacing::from_millis(1, 0));
    ctl.click(2).unwrap();

    let reports = ctl.transport().reports();
    assert_eq!(reports.len(), 2);
    assert_eq!(
        ctl.transport().report_mode(),
        ReportMode::Feature { report_id: 100 }
    );
    for report in &reports {
        let wire = report.wire_bytes();
        assert_eq!(wire.len(), 33);
        assert_eq!(wire[0], 100);
        assert_eq!(wire[1], 18);
        assert_eq!(wire[2], 0x42);
    }
    assert_eq!(
        parse_all(&ctl)[0],
        ParsedCommand::InjectInput(InjectInput::new().buttons(0x02))
    );
}

#[test]
fn set_identity_is_followed_by_persist() {
    let ctl = MouseController::new(recorder(ProtocolRevision::V19), ProtocolRevision::V19);
    let identity = SetIdentity::new(0x1234, 0xABCD, 0x0200, "Acme", "Pointer", "SN-001");

    let truncation = ctl.set_identity(&identity).unwrap();
    assert!(!truncation.any());
    assert_eq!(
        parse_all(&ctl),
        vec![
            ParsedCommand::SetIdentity(identity),
            ParsedCommand::PersistConfig
        ]
    );
}

#[test]
fn set_identity_reports_truncated_strings() {
    let ctl = MouseController::new(recorder(ProtocolRevision::V19), ProtocolRevision::V19);
    let long = "M".repeat(40);
    let identity = SetIdentity::new(0x1234, 0xABCD, 0x0100, long.as_str(), "P", "S");

    let truncation = ctl.set_identity(&identity).unwrap();
    assert!(truncation.manufacturer);
    assert!(!truncation.product);
    assert!(!truncation.serial);

    match &parse_all(&ctl)[0] {
        ParsedCommand::SetIdentity(sent) => assert_eq!(sent.manufacturer, "M".repeat(31)),
        other => panic!("expected SetIdentity, got {other:?}"),
    }
}

#[test]
fn failed_persist_is_identity_not_persisted() {
    let transport = recorder(ProtocolRevision::V19).failing_after(1);
    let ctl = MouseController::new(transport, ProtocolRevision::V19);
    let identity = SetIdentity::new(0x1234, 0xABCD, 0x0100, "A", "B", "C");

    let err = ctl.set_identity(&identity).unwrap_err();
    assert!(err.is_partial());
    assert!(matches!(err, ControllerError::IdentityNotPersisted(_)));
    // Identity frame went out; persist did not
    assert_eq!(ctl.transport().len(), 1);
}

#[test]
fn failed_identity_write_is_transport_error() {
    let transport = recorder(ProtocolRevision::V19).failing_after(0);
    let ctl = MouseController::new(transport, ProtocolRevision::V19);
    let identity = SetIdentity::new(0x1234, 0xABCD, 0x0100, "A", "B", "C");

    let err = ctl.set_identity(&identity).unwrap_err();
    assert!(matches!(err, ControllerError::Transport(_)));
    assert!(ctl.transport().is_empty());
}

#[test]
fn press_failure_skips_release() {
    let transport = recorder(ProtocolRevision::V19).failing_after(0);
    let ctl = MouseController::new(transport, ProtocolRevision::V19);
    assert!(ctl.click(1).is_err());
    assert!(ctl.transport().is_empty());
}

#[test]
fn bootloader_consumes_controller() {
    let ctl = MouseController::new(recorder(ProtocolRevision::V19), ProtocolRevision::V19);
    ctl.move_by(1, 1).unwrap();
    assert_eq!(ctl.transport().len(), 1);
    ctl.reset_to_bootloader().unwrap();
}

#[test]
fn bootloader_unsupported_on_legacy_revision() {
    let ctl = MouseController::new(recorder(ProtocolRevision::V18), ProtocolRevision::V18);
    assert!(matches!(
        ctl.reset_to_bootloader(),
        Err(ControllerError::Protocol(_))
    ));
}
