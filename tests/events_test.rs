//! Tests for event draining and capability queries

#[cfg(test)]
mod events_tests {
    use tethercam::driver::{CameraEvent, CameraFilePath};
    use tethercam::testing::{sample_abilities, FailPoint, SimulatedCamera, SAMPLE_MODEL};
    use tethercam::{AbilityDescriptor, CameraSession, CapabilityRecord, Operations, TetherConfig};

    fn open(camera: SimulatedCamera) -> CameraSession<SimulatedCamera> {
        CameraSession::new(camera, SAMPLE_MODEL, "usb:001,004", TetherConfig::default())
    }

    #[test]
    fn test_empty_queue_reports_nothing() {
        let mut session = open(SimulatedCamera::new());
        assert!(!session.consume_events().unwrap());
    }

    #[test]
    fn test_pending_events_are_drained() {
        let camera = SimulatedCamera::new().with_events([
            CameraEvent::Unknown("PTP Property d1d9 changed".to_string()),
            CameraEvent::FolderAdded(CameraFilePath::new("/store_00020001/DCIM", "101CANON")),
        ]);
        let probe = camera.probe();
        let mut session = open(camera);

        assert!(session.consume_events().unwrap());
        assert!(!session.consume_events().unwrap());

        probe.push_event(CameraEvent::CaptureComplete);
        assert!(session.consume_events().unwrap());
    }

    #[test]
    fn test_drain_terminates_on_chatty_device() {
        let mut config = TetherConfig::default();
        config.events.max_events_per_drain = 64;
        let camera = SimulatedCamera::new().with_endless_events();
        let probe = camera.probe();
        let mut session = CameraSession::new(camera, SAMPLE_MODEL, "usb:001,004", config);

        assert!(session.consume_events().unwrap());
        assert_eq!(probe.polls(), 64);
    }

    #[test]
    fn test_poll_failure_surfaces() {
        let mut session = open(SimulatedCamera::new().with_failure(FailPoint::Poll));
        assert!(session.consume_events().unwrap_err().is_driver_error());
    }

    #[test]
    fn test_image_and_config_only() {
        let abilities = AbilityDescriptor::new(
            SAMPLE_MODEL,
            "ptp2",
            Operations::CAPTURE_IMAGE | Operations::CONFIG,
        );
        let session = open(SimulatedCamera::new().with_abilities(abilities));

        let record = session.supported_ops().unwrap();
        assert_eq!(
            record,
            CapabilityRecord {
                capture_image: true,
                capture_video: false,
                capture_audio: false,
                capture_preview: false,
                config: true,
                trigger_capture: false,
            }
        );
    }

    #[test]
    fn test_capabilities_json() {
        let camera = SimulatedCamera::new().with_abilities(sample_abilities(SAMPLE_MODEL));
        let session = open(camera);
        let json = serde_json::to_value(session.supported_ops().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "captureImage": true,
                "captureVideo": false,
                "captureAudio": false,
                "capturePreview": true,
                "config": true,
                "triggerCapture": true
            })
        );
    }

    #[test]
    fn test_abilities_are_passed_through() {
        let session = open(SimulatedCamera::new());
        let abilities = session.abilities().unwrap();
        assert_eq!(abilities.model, SAMPLE_MODEL);
        assert_eq!(abilities.driver, "ptp2");
    }
}
