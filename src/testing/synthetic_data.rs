//! Sample data modelled on a Canon EOS body over PTP
//!
//! Gives the simulated driver a realistic widget tree, catalog entries and
//! image bytes so sessions can be exercised without hardware.

use crate::catalog::{AbilityDescriptor, Operations, PortDescriptor, PortType};
use crate::driver::Widget;

pub const SAMPLE_MODEL: &str = "Canon EOS 5D Mark III";

/// Abilities of a typical PTP DSLR: stills, preview, config and trigger.
pub fn sample_abilities(model: &str) -> AbilityDescriptor {
    AbilityDescriptor::new(
        model,
        "ptp2",
        Operations::CAPTURE_IMAGE
            | Operations::CAPTURE_PREVIEW
            | Operations::CONFIG
            | Operations::TRIGGER_CAPTURE,
    )
}

pub fn usb_port(path: &str) -> PortDescriptor {
    PortDescriptor::new(path, "Universal Serial Bus", PortType::Usb)
}

/// Configuration tree shaped like the one a PTP body reports.
///
/// `eosremoterelease` reports 2, the sentinel action widgets use for
/// "no state".
pub fn sample_config_tree() -> Widget {
    Widget::window("main", "Camera and Driver Configuration")
        .with_child(
            Widget::section("actions", "Camera Actions")
                .with_child(Widget::toggle("eosremoterelease", "Canon EOS Remote Release", 2))
                .with_child(Widget::toggle("viewfinder", "Canon EOS Viewfinder", 0)),
        )
        .with_child(
            Widget::section("settings", "Camera Settings")
                .with_child(
                    Widget::date("datetime", "Camera Date and Time", 1_600_000_000)
                        .with_info("Seconds are reported by the body"),
                )
                .with_child(Widget::text("ownername", "Owner Name", "studio"))
                .with_child(Widget::toggle("reviewtime", "Quick Review", 1)),
        )
        .with_child(
            Widget::section("imgsettings", "Image Settings")
                .with_child(Widget::menu(
                    "iso",
                    "ISO Speed",
                    "100",
                    &["Auto", "100", "200", "400", "800", "1600"],
                ))
                .with_child(Widget::radio(
                    "imageformat",
                    "Image Format",
                    "RAW",
                    &["Large Fine JPEG", "RAW", "RAW + Large Fine JPEG"],
                )),
        )
        .with_child(
            Widget::section("capturesettings", "Capture Settings")
                .with_child(Widget::range(
                    "exposurecompensation",
                    "Exposure Compensation",
                    0.0,
                    -3.0,
                    3.0,
                    0.5,
                ))
                .with_child(
                    Widget::text("lensname", "Lens Name", "EF24-70mm f/2.8L II USM")
                        .with_readonly(true),
                ),
        )
}

/// Bytes that start like a JPEG; `len` includes the SOI/EOI markers.
pub fn synthetic_jpeg(len: usize) -> Vec<u8> {
    let len = len.max(4);
    let mut data = vec![0u8; len];
    data[0] = 0xFF;
    data[1] = 0xD8;
    for (i, byte) in data.iter_mut().enumerate().take(len - 2).skip(2) {
        *byte = (i % 251) as u8;
    }
    data[len - 2] = 0xFF;
    data[len - 1] = 0xD9;
    data
}
