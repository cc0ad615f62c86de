//! Display collaborator and the metric panel rendered on it

/// Text display driver (e.g. a 128x64 monochrome OLED).
pub trait Display: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn clear(&mut self) -> Result<(), Self::Error>;

    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), Self::Error>;

    /// Push the frame buffer to the panel
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Row of the label line, in pixels
pub const LABEL_ROW: i32 = 0;

/// Row of the metric line, in pixels
pub const METRIC_ROW: i32 = 35;

/// Renders the latest metric with a label, overwriting previous content.
pub struct MetricPanel<D> {
    display: D,
    label: String,
}

impl<D: Display> MetricPanel<D> {
    pub fn new(display: D, label: impl Into<String>) -> Self {
        Self { display, label: label.into() }
    }

    /// Replace the whole screen with `label` and `metric`
    pub fn show(&mut self, metric: i32) -> Result<(), D::Error> {
        self.display.clear()?;
        self.display.draw_text(&self.label, 0, LABEL_ROW)?;
        self.display.draw_text(&format_metric(metric), 0, METRIC_ROW)?;
        self.display.flush()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Text of the metric line
pub fn format_metric(metric: i32) -> String {
    format!("RSSI: {metric} dBm")
}
