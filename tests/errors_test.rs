#[cfg(test)]
mod error_tests {
    use tethercam::driver::DriverError;
    use tethercam::errors::CameraError;

    #[test]
    fn test_driver_io_display_uses_driver_status() {
        let error = CameraError::driver("capture", DriverError::camera_busy());
        assert_eq!(error.to_string(), "capture failed: I/O in progress");
        assert!(error.is_driver_error());
    }

    #[test]
    fn test_unsupported_kind_message() {
        let error = CameraError::unsupported_kind("autofocusdrive", "button");
        assert!(error.to_string().contains("button"));
        assert!(error.to_string().contains("autofocusdrive"));
    }

    #[test]
    fn test_partial_failure_message() {
        let error = CameraError::DiscoveryPartialFailure {
            model: "Nikon DSC D750".to_string(),
            port: "usb:001,005".to_string(),
            reason: "init camera failed: Could not claim the USB device".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("Nikon DSC D750"));
        assert!(message.contains("usb:001,005"));
        assert!(message.contains("Could not claim"));
    }

    #[test]
    fn test_other_variants_display() {
        assert_eq!(CameraError::NoDevices.to_string(), "no cameras detected");
        assert!(CameraError::Config("bad".into())
            .to_string()
            .contains("bad"));
        assert!(CameraError::Scheduler("join".into())
            .to_string()
            .contains("join"));
    }
}
