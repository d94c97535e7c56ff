//! Modifier-aware value snapping.

use manip_math::radians;

use crate::config::SnapSettings;

/// Fine-adjust multiplier
const FINE: f64 = 0.1;
/// Alternate fine-adjust multiplier
const ALTERNATE_FINE: f64 = 0.25;

/// Transform channel a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Translate,
    Rotate,
    Scale,
}

/// Modifier keys relevant to snapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub snap: bool,
    pub fine: bool,
    pub alternate_fine: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        snap: false,
        fine: false,
        alternate_fine: false,
    };

    pub const SNAP: Self = Self {
        snap: true,
        fine: false,
        alternate_fine: false,
    };
}

/// Apply snapping to a value.
pub fn snap_value(value: f64, step: f64) -> f64 {
    if step > 0.0 && step.is_finite() {
        (value / step).round() * step
    } else {
        value
    }
}

/// Quantizes solver output using per-channel steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct Snapper {
    pub settings: SnapSettings,
}

impl Snapper {
    pub fn new(settings: SnapSettings) -> Self {
        Self { settings }
    }

    /// Configured step for a channel; rotation is returned in radians.
    pub fn step(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Translate => self.settings.translate,
            Channel::Rotate => radians(self.settings.rotate_degrees),
            Channel::Scale => self.settings.scale,
        }
    }

    /// Snap `value` for `channel`.
    ///
    /// Scale factors are quantized like any other value, except that a
    /// factor snapped to exactly zero is returned as 1.
    /// Without the snap modifier the fine modifier acts as a gain instead.
    pub fn snap(&self, channel: Channel, value: f64, modifiers: Modifiers) -> f64 {
        let step = self.step(channel);
        if !(step > 0.0 && step.is_finite()) {
            return value;
        }

        let quantize = |v: f64| {
            if modifiers.snap {
                let mut effective = step;
                if modifiers.fine {
                    effective *= FINE;
                }
                if modifiers.alternate_fine {
                    effective *= ALTERNATE_FINE;
                }
                snap_value(v, effective)
            } else if modifiers.fine {
                v * FINE
            } else {
                v
            }
        };

        match channel {
            Channel::Scale => {
                let factor = quantize(value);
                if factor == 0.0 { 1.0 } else { factor }
            }
            Channel::Translate | Channel::Rotate => quantize(value),
        }
    }
}
