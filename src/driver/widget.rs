//! Native configuration widgets as reported by the driver subsystem.

use super::DriverError;

/// Widget kinds the driver subsystem can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Window,
    Section,
    Text,
    Range,
    Toggle,
    Radio,
    Menu,
    Button,
    Date,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Window => "window",
            WidgetKind::Section => "section",
            WidgetKind::Text => "text",
            WidgetKind::Range => "range",
            WidgetKind::Toggle => "toggle",
            WidgetKind::Radio => "radio",
            WidgetKind::Menu => "menu",
            WidgetKind::Button => "button",
            WidgetKind::Date => "date",
        }
    }

    /// Storage type a widget of this kind holds its value in.
    fn value_shape(&self) -> ValueShape {
        match self {
            WidgetKind::Text | WidgetKind::Radio | WidgetKind::Menu => ValueShape::Text,
            WidgetKind::Range => ValueShape::Float,
            WidgetKind::Toggle | WidgetKind::Date => ValueShape::Int,
            WidgetKind::Window | WidgetKind::Section | WidgetKind::Button => ValueShape::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueShape {
    None,
    Text,
    Float,
    Int,
}

/// Raw widget value. Toggles and dates are stored as integers.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetValue {
    None,
    Text(String),
    Float(f32),
    Int(i32),
}

impl WidgetValue {
    fn shape(&self) -> ValueShape {
        match self {
            WidgetValue::None => ValueShape::None,
            WidgetValue::Text(_) => ValueShape::Text,
            WidgetValue::Float(_) => ValueShape::Float,
            WidgetValue::Int(_) => ValueShape::Int,
        }
    }
}

/// One node of the native configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    kind: WidgetKind,
    name: String,
    label: String,
    info: String,
    readonly: bool,
    changed: bool,
    value: WidgetValue,
    range: (f32, f32, f32),
    choices: Vec<String>,
    children: Vec<Widget>,
}

impl Widget {
    pub fn new(kind: WidgetKind, name: impl Into<String>, label: impl Into<String>) -> Self {
        let value = match kind.value_shape() {
            ValueShape::None => WidgetValue::None,
            ValueShape::Text => WidgetValue::Text(String::new()),
            ValueShape::Float => WidgetValue::Float(0.0),
            ValueShape::Int => WidgetValue::Int(0),
        };
        Self {
            kind,
            name: name.into(),
            label: label.into(),
            info: String::new(),
            readonly: false,
            changed: false,
            value,
            range: (0.0, 0.0, 0.0),
            choices: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn window(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(WidgetKind::Window, name, label)
    }

    pub fn section(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(WidgetKind::Section, name, label)
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>, value: &str) -> Self {
        let mut widget = Self::new(WidgetKind::Text, name, label);
        widget.value = WidgetValue::Text(value.to_string());
        widget
    }

    pub fn range(
        name: impl Into<String>,
        label: impl Into<String>,
        value: f32,
        min: f32,
        max: f32,
        step: f32,
    ) -> Self {
        let mut widget = Self::new(WidgetKind::Range, name, label);
        widget.value = WidgetValue::Float(value);
        widget.range = (min, max, step);
        widget
    }

    pub fn toggle(name: impl Into<String>, label: impl Into<String>, raw: i32) -> Self {
        let mut widget = Self::new(WidgetKind::Toggle, name, label);
        widget.value = WidgetValue::Int(raw);
        widget
    }

    pub fn menu(
        name: impl Into<String>,
        label: impl Into<String>,
        value: &str,
        choices: &[&str],
    ) -> Self {
        Self::choice(WidgetKind::Menu, name, label, value, choices)
    }

    pub fn radio(
        name: impl Into<String>,
        label: impl Into<String>,
        value: &str,
        choices: &[&str],
    ) -> Self {
        Self::choice(WidgetKind::Radio, name, label, value, choices)
    }

    fn choice(
        kind: WidgetKind,
        name: impl Into<String>,
        label: impl Into<String>,
        value: &str,
        choices: &[&str],
    ) -> Self {
        let mut widget = Self::new(kind, name, label);
        widget.value = WidgetValue::Text(value.to_string());
        widget.choices = choices.iter().map(|c| c.to_string()).collect();
        widget
    }

    /// Date widget holding seconds since the Unix epoch.
    pub fn date(name: impl Into<String>, label: impl Into<String>, seconds: i32) -> Self {
        let mut widget = Self::new(WidgetKind::Date, name, label);
        widget.value = WidgetValue::Int(seconds);
        widget
    }

    pub fn button(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(WidgetKind::Button, name, label)
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn with_child(mut self, child: Widget) -> Self {
        self.children.push(child);
        self
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn readonly(&self) -> bool {
        self.readonly
    }

    /// Whether `set_value` has been called since the widget was fetched.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn value(&self) -> &WidgetValue {
        &self.value
    }

    /// Replace the value. The new value must have the storage type of the kind.
    pub fn set_value(&mut self, value: WidgetValue) -> Result<(), DriverError> {
        if value.shape() != self.kind.value_shape() || value.shape() == ValueShape::None {
            return Err(DriverError::bad_parameters(format!(
                "Bad parameters: cannot store {:?} in {} widget '{}'",
                value,
                self.kind.as_str(),
                self.name
            )));
        }
        self.value = value;
        self.changed = true;
        Ok(())
    }

    /// (min, max, step); only meaningful for range widgets.
    pub fn range_bounds(&self) -> Result<(f32, f32, f32), DriverError> {
        match self.kind {
            WidgetKind::Range => Ok(self.range),
            other => Err(DriverError::bad_parameters(format!(
                "Bad parameters: {} widget '{}' has no range",
                other.as_str(),
                self.name
            ))),
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn children(&self) -> &[Widget] {
        &self.children
    }

    /// Depth-first search by name, including `self`.
    pub fn find(&self, name: &str) -> Option<&Widget> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Widget> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_marks_changed() {
        let mut widget = Widget::range("aperture", "Aperture", 2.8, 1.4, 22.0, 0.1);
        assert!(!widget.changed());
        widget.set_value(WidgetValue::Float(5.6)).unwrap();
        assert!(widget.changed());
        assert_eq!(widget.value(), &WidgetValue::Float(5.6));
    }

    #[test]
    fn test_set_value_rejects_wrong_storage_type() {
        let mut widget = Widget::toggle("autofocus", "Autofocus", 0);
        assert!(widget.set_value(WidgetValue::Text("on".into())).is_err());
        assert!(!widget.changed());

        let mut window = Widget::window("main", "Camera and Driver Configuration");
        assert!(window.set_value(WidgetValue::None).is_err());
    }

    #[test]
    fn test_range_bounds_only_for_range() {
        let widget = Widget::text("owner", "Owner Name", "");
        assert!(widget.range_bounds().is_err());
        let widget = Widget::range("zoom", "Zoom", 1.0, 1.0, 10.0, 0.5);
        assert_eq!(widget.range_bounds().unwrap(), (1.0, 10.0, 0.5));
    }

    #[test]
    fn test_find_nested() {
        let tree = Widget::window("main", "Main").with_child(
            Widget::section("settings", "Settings")
                .with_child(Widget::menu("iso", "ISO", "100", &["100", "200"])),
        );
        assert_eq!(tree.find("iso").map(|w| w.kind()), Some(WidgetKind::Menu));
        assert!(tree.find("shutterspeed").is_none());
    }
}
