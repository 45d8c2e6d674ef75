//! Conversion between the native widget tree and [`ConfigNode`]s.

use super::node::{Children, ConfigNode, NodeKind};
use super::value::GenericValue;
use crate::driver::{DeviceHandle, DriverError, Widget, WidgetKind, WidgetValue};
use crate::errors::{CameraError, Result};

/// Fetch the device's full widget tree and convert it.
pub fn fetch_config_tree<H: DeviceHandle>(handle: &mut H) -> Result<ConfigNode> {
    let root = handle
        .config_tree()
        .map_err(|e| CameraError::driver("get config", e))?;
    walk_widget(&root)
}

/// Convert one native widget and, for containers, everything below it.
///
/// Any kind without a defined conversion fails the whole walk rather than
/// dropping the subtree. So does a range reporting NaN or an infinity, which
/// JSON cannot carry.
pub fn walk_widget(widget: &Widget) -> Result<ConfigNode> {
    let kind = match widget.kind() {
        WidgetKind::Range => {
            let value = float_value(widget)?;
            let (min, max, step) = widget
                .range_bounds()
                .map_err(|e| CameraError::driver("get range", e))?;
            if ![min, max, step].iter().all(|b| b.is_finite()) {
                return Err(CameraError::driver(
                    "get range",
                    DriverError::bad_parameters(format!(
                        "range widget '{}' has bounds {} to {} step {}",
                        widget.name(),
                        min,
                        max,
                        step
                    )),
                ));
            }
            NodeKind::Range {
                value,
                min,
                max,
                step,
            }
        }
        WidgetKind::Menu => NodeKind::Menu {
            value: text_value(widget)?,
            choices: widget.choices().to_vec(),
        },
        WidgetKind::Radio => NodeKind::Radio {
            value: text_value(widget)?,
            choices: widget.choices().to_vec(),
        },
        // Action widgets report sentinels like 2 here; those stay unset
        // rather than being shown as on or off.
        WidgetKind::Toggle => NodeKind::Toggle {
            value: match int_value(widget)? {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            },
        },
        WidgetKind::Text => NodeKind::Text {
            value: text_value(widget)?,
        },
        WidgetKind::Date => NodeKind::DateTime {
            value: i64::from(int_value(widget)?) * 1000,
        },
        WidgetKind::Window => NodeKind::Window {
            children: walk_children(widget)?,
        },
        WidgetKind::Section => NodeKind::Section {
            children: walk_children(widget)?,
        },
        WidgetKind::Button => {
            return Err(CameraError::unsupported_kind(
                widget.name(),
                widget.kind().as_str(),
            ))
        }
    };

    Ok(ConfigNode {
        name: widget.name().to_string(),
        info: widget.info().to_string(),
        label: widget.label().to_string(),
        readonly: widget.readonly(),
        kind,
    })
}

fn walk_children(widget: &Widget) -> Result<Children> {
    let mut children = Children::new();
    for child in widget.children() {
        children.insert(walk_widget(child)?);
    }
    Ok(children)
}

fn value_error(widget: &Widget) -> CameraError {
    CameraError::driver(
        "get value",
        DriverError::bad_parameters(format!(
            "{} widget '{}' holds {:?}",
            widget.kind().as_str(),
            widget.name(),
            widget.value()
        )),
    )
}

fn float_value(widget: &Widget) -> Result<f32> {
    match widget.value() {
        WidgetValue::Float(v) if v.is_finite() => Ok(*v),
        _ => Err(value_error(widget)),
    }
}

fn int_value(widget: &Widget) -> Result<i32> {
    match widget.value() {
        WidgetValue::Int(v) => Ok(*v),
        _ => Err(value_error(widget)),
    }
}

fn text_value(widget: &Widget) -> Result<String> {
    match widget.value() {
        WidgetValue::Text(v) => Ok(v.clone()),
        _ => Err(value_error(widget)),
    }
}

/// Coerce a generic value into the raw value a widget of this kind stores.
pub fn coerce_value(widget: &Widget, value: GenericValue) -> Result<WidgetValue> {
    let name = widget.name();
    match (widget.kind(), value) {
        (WidgetKind::Range, GenericValue::Number(n)) => {
            let value = n as f32;
            if !value.is_finite() {
                return Err(CameraError::type_mismatch(
                    name,
                    "finite number",
                    n.to_string(),
                ));
            }
            Ok(WidgetValue::Float(value))
        }
        (WidgetKind::Range, other) => Err(CameraError::type_mismatch(
            name,
            "number",
            other.type_name(),
        )),

        (WidgetKind::Menu | WidgetKind::Radio | WidgetKind::Text, GenericValue::Text(s)) => {
            Ok(WidgetValue::Text(s))
        }
        (WidgetKind::Menu | WidgetKind::Radio | WidgetKind::Text, other) => Err(
            CameraError::type_mismatch(name, "string", other.type_name()),
        ),

        (WidgetKind::Toggle, GenericValue::Bool(on)) => Ok(WidgetValue::Int(i32::from(on))),
        (WidgetKind::Toggle, other) => Err(CameraError::type_mismatch(
            name,
            "bool",
            other.type_name(),
        )),

        (WidgetKind::Date, GenericValue::Number(ms)) => {
            let seconds = (ms / 1000.0).trunc();
            if !seconds.is_finite()
                || seconds < f64::from(i32::MIN)
                || seconds > f64::from(i32::MAX)
            {
                return Err(CameraError::type_mismatch(
                    name,
                    "milliseconds within the device date range",
                    ms.to_string(),
                ));
            }
            Ok(WidgetValue::Int(seconds as i32))
        }
        (WidgetKind::Date, other) => Err(CameraError::type_mismatch(
            name,
            "number of milliseconds",
            other.type_name(),
        )),

        (kind @ (WidgetKind::Window | WidgetKind::Section | WidgetKind::Button), _) => {
            Err(CameraError::unsupported_kind(name, kind.as_str()))
        }
    }
}

/// Write one leaf: fetch it on its own, coerce, apply, commit.
///
/// Nothing is committed if coercion fails. A commit failure is returned as
/// is; the device keeps whatever state the driver left it in.
pub fn set_config_value<H: DeviceHandle>(
    handle: &mut H,
    name: &str,
    value: GenericValue,
) -> Result<()> {
    let mut widget = handle
        .single_widget(name)
        .map_err(|e| CameraError::driver("get single config", e))?;

    if widget.readonly() {
        log::debug!(
            "Writing to read-only widget '{}'; the driver may reject it",
            name
        );
    }

    let raw = coerce_value(&widget, value)?;
    widget
        .set_value(raw)
        .map_err(|e| CameraError::driver("set widget value", e))?;

    handle
        .commit_widget(name, &widget)
        .map_err(|e| CameraError::driver("set single config", e))?;

    log::debug!("Committed '{}' = {:?}", name, widget.value());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_range() {
        let widget = Widget::range("exposurecompensation", "Exposure", -1.0, -3.0, 3.0, 0.5)
            .with_info("EV steps");
        let node = walk_widget(&widget).unwrap();
        assert_eq!(node.info, "EV steps");
        assert_eq!(
            node.kind,
            NodeKind::Range {
                value: -1.0,
                min: -3.0,
                max: 3.0,
                step: 0.5
            }
        );
    }

    #[test]
    fn test_walk_range_rejects_non_finite_values() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let widget = Widget::range("zoom", "Zoom", bad, 1.0, 10.0, 1.0);
            let err = walk_widget(&widget).unwrap_err();
            match err {
                CameraError::DriverIo { operation, .. } => assert_eq!(operation, "get value"),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        let widget = Widget::range("zoom", "Zoom", 1.0, 1.0, f32::INFINITY, 1.0);
        assert!(walk_widget(&widget).unwrap_err().is_driver_error());
    }

    #[test]
    fn test_coerce_range_rejects_non_finite_numbers() {
        let range = Widget::range("zoom", "Zoom", 1.0, 1.0, 10.0, 1.0);
        for bad in [f64::NAN, f64::INFINITY, 1e300] {
            assert!(matches!(
                coerce_value(&range, GenericValue::Number(bad)),
                Err(CameraError::TypeMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_walk_toggle_three_valued() {
        let cases = [(0, Some(false)), (1, Some(true)), (2, None), (-1, None)];
        for (raw, expected) in cases {
            let node = walk_widget(&Widget::toggle("capture", "Capture", raw)).unwrap();
            assert_eq!(node.kind, NodeKind::Toggle { value: expected }, "raw {raw}");
        }
    }

    #[test]
    fn test_walk_date_is_milliseconds() {
        let widget = Widget::date("datetime", "Camera Date and Time", 1_600_000_000);
        let node = walk_widget(&widget).unwrap();
        assert_eq!(
            node.kind,
            NodeKind::DateTime {
                value: 1_600_000_000_000
            }
        );
    }

    #[test]
    fn test_walk_button_is_unsupported_even_when_nested() {
        let tree = Widget::window("main", "Main").with_child(
            Widget::section("actions", "Camera Actions")
                .with_child(Widget::button("autofocusdrive", "AF")),
        );
        let err = walk_widget(&tree).unwrap_err();
        match err {
            CameraError::UnsupportedWidgetKind { widget, kind } => {
                assert_eq!(widget, "autofocusdrive");
                assert_eq!(kind, "button");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_coerce_table() {
        let range = Widget::range("zoom", "Zoom", 1.0, 1.0, 10.0, 1.0);
        assert_eq!(
            coerce_value(&range, 3.0f64.into()).unwrap(),
            WidgetValue::Float(3.0)
        );
        assert!(matches!(
            coerce_value(&range, "3".into()),
            Err(CameraError::TypeMismatch { .. })
        ));

        let menu = Widget::menu("iso", "ISO", "100", &["100", "200"]);
        assert_eq!(
            coerce_value(&menu, "200".into()).unwrap(),
            WidgetValue::Text("200".into())
        );
        assert!(coerce_value(&menu, 200i32.into()).is_err());

        let toggle = Widget::toggle("autofocus", "AF", 0);
        assert_eq!(
            coerce_value(&toggle, true.into()).unwrap(),
            WidgetValue::Int(1)
        );
        assert_eq!(
            coerce_value(&toggle, false.into()).unwrap(),
            WidgetValue::Int(0)
        );
        assert!(coerce_value(&toggle, 1i32.into()).is_err());

        let date = Widget::date("datetime", "Date", 0);
        assert_eq!(
            coerce_value(&date, 1_600_000_000_999i64.into()).unwrap(),
            WidgetValue::Int(1_600_000_000)
        );
        assert!(coerce_value(&date, 1e20f64.into()).is_err());
        assert!(coerce_value(&date, "now".into()).is_err());

        let section = Widget::section("settings", "Settings");
        assert!(matches!(
            coerce_value(&section, "x".into()),
            Err(CameraError::UnsupportedWidgetKind { .. })
        ));
    }
}
