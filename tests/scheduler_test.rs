//! Tests for async operation scheduling

#[cfg(test)]
mod scheduler_tests {
    use tethercam::testing::{SimulatedCamera, SAMPLE_MODEL};
    use tethercam::{CameraSession, GenericValue, SessionScheduler, TetherConfig};

    fn scheduler(camera: SimulatedCamera) -> SessionScheduler<SimulatedCamera> {
        SessionScheduler::new(CameraSession::new(
            camera,
            SAMPLE_MODEL,
            "usb:001,004",
            TetherConfig::default(),
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_write_then_read_through_scheduler() {
        let scheduler = scheduler(SimulatedCamera::new());
        scheduler.set_config_value("iso", "800").await.unwrap();
        let tree = scheduler.config_tree().await.unwrap().unwrap();
        assert_eq!(
            tree.find("iso").and_then(|n| n.value()),
            Some(GenericValue::Text("800".to_string()))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_captures_are_serialized() {
        let camera = SimulatedCamera::new();
        let probe = camera.probe();
        let scheduler = scheduler(camera);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let scheduler = scheduler.clone();
                tokio::spawn(async move { scheduler.capture_image().await })
            })
            .collect();

        for task in tasks {
            let image = task.await.unwrap().unwrap().unwrap();
            assert_eq!(image.filename(), Some("image.jpg"));
        }
        assert_eq!(probe.deleted_files().len(), 8);
        assert!(probe.stored_files().is_empty());
    }

    #[tokio::test]
    async fn test_work_after_shutdown_is_skipped() {
        let camera = SimulatedCamera::new();
        let probe = camera.probe();
        let scheduler = scheduler(camera);

        let session = scheduler.shutdown().await.expect("session is returned once");
        drop(session);
        assert!(scheduler.shutdown().await.is_none());

        assert_eq!(scheduler.capture_preview().await.unwrap(), None);
        assert_eq!(scheduler.consume_events().await.unwrap(), None);
        assert_eq!(probe.polls(), 0);
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let scheduler = scheduler(SimulatedCamera::new());
        let err = scheduler
            .set_config_value("exposurecompensation", "bright")
            .await
            .unwrap_err();
        assert!(matches!(err, tethercam::CameraError::TypeMismatch { .. }));
        assert_eq!(scheduler.consume_events().await.unwrap(), Some(false));
    }
}
