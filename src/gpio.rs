//! Digital I/O collaborators: the trigger button and the activity LED

/// Digital input pin; `true` means the line reads high.
pub trait DigitalInput: Send {
    fn read(&mut self) -> bool;
}

/// Digital output pin; `true` drives the line high.
pub trait DigitalOutput: Send {
    fn write(&mut self, high: bool);
}

/// Level-checked trigger for a transmission pass.
pub trait Trigger: Send {
    /// Whether the trigger is held right now (level, not edge)
    fn is_pressed(&mut self) -> bool;
}

/// Electrical polarity of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pressed pulls the line low (pull-up wiring)
    ActiveLow,
    /// Pressed drives the line high (pull-down wiring)
    ActiveHigh,
}

/// Push button on a digital input
pub struct ButtonTrigger<I> {
    input: I,
    polarity: Polarity,
}

impl<I: DigitalInput> ButtonTrigger<I> {
    pub fn new(input: I, polarity: Polarity) -> Self {
        Self { input, polarity }
    }

    /// Button wired to ground with the internal pull-up enabled
    pub fn active_low(input: I) -> Self {
        Self::new(input, Polarity::ActiveLow)
    }
}

impl<I: DigitalInput> Trigger for ButtonTrigger<I> {
    fn is_pressed(&mut self) -> bool {
        let level = self.input.read();
        match self.polarity {
            Polarity::ActiveLow => !level,
            Polarity::ActiveHigh => level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Level(bool);

    impl DigitalInput for Level {
        fn read(&mut self) -> bool {
            self.0
        }
    }

    #[test]
    fn active_low_button_is_pressed_when_line_is_low() {
        assert!(ButtonTrigger::active_low(Level(false)).is_pressed());
        assert!(!ButtonTrigger::active_low(Level(true)).is_pressed());
    }

    #[test]
    fn active_high_button_follows_the_line() {
        assert!(ButtonTrigger::new(Level(true), Polarity::ActiveHigh).is_pressed());
        assert!(!ButtonTrigger::new(Level(false), Polarity::ActiveHigh).is_pressed());
    }
}
