//! Named code tables for the pass-through payload bytes
//!
//! The wire records keep raw `u8` fields so out-of-range values reach the
//! device untouched. These enums give the documented values a name for
//! callers that want to build or present them.

use crate::error::ParseError;

macro_rules! code_table {
    (
        $(#[$meta:meta])*
        $name:ident, $table:literal {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            /// Every documented value, in wire order
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Human-readable label
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = ParseError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    _ => Err(ParseError::UnknownCode {
                        table: $table,
                        value,
                    }),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(code: $name) -> u8 {
                code as u8
            }
        }
    };
}

code_table! {
    /// LED stage pattern for the run control command
    LedPattern, "LED pattern" {
        /// Light off
        Off = 0x00 => "off",
        /// Light on
        On = 0x01 => "on",
        /// Flashing
        Blinking = 0x02 => "blinking",
        /// Keep current state
        NoChange = 0x09 => "no change",
    }
}

code_table! {
    /// Buzzer pattern for the run control command
    BuzzerPattern, "buzzer pattern" {
        Stop = 0x00 => "stop",
        Pattern1 = 0x01 => "pattern 1",
        Pattern2 = 0x02 => "pattern 2",
        /// Tone used when input arrives simultaneously with the buzzer
        SimultaneousTone = 0x03 => "simultaneous tone",
        NoChange = 0x09 => "no change",
    }
}

code_table! {
    /// LED stage color for the detail run control command
    LedColor, "LED color" {
        Off = 0x00 => "off",
        Red = 0x01 => "red",
        Yellow = 0x02 => "yellow",
        Lemon = 0x03 => "lemon",
        Green = 0x04 => "green",
        SkyBlue = 0x05 => "sky blue",
        Blue = 0x06 => "blue",
        Purple = 0x07 => "purple",
        Peach = 0x08 => "peach",
        White = 0x09 => "white",
    }
}

code_table! {
    /// Blinking toggle for the detail run control command
    BlinkControl, "blink control" {
        Off = 0x00 => "off",
        On = 0x01 => "on",
    }
}

code_table! {
    /// Buzzer pattern for the detail run control command
    DetailBuzzerPattern, "detail buzzer pattern" {
        Stop = 0x00 => "stop",
        Pattern1 = 0x01 => "pattern 1",
        Pattern2 = 0x02 => "pattern 2",
        Pattern3 = 0x03 => "pattern 3",
        Pattern4 = 0x04 => "pattern 4",
        Pattern5 = 0x05 => "pattern 5",
        Pattern6 = 0x06 => "pattern 6",
        Pattern7 = 0x07 => "pattern 7",
        Pattern8 = 0x08 => "pattern 8",
        Pattern9 = 0x09 => "pattern 9",
        Pattern10 = 0x0A => "pattern 10",
        Pattern11 = 0x0B => "pattern 11",
    }
}

/// Device operating mode as reported in status responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Signal light mode
    Led,
    /// Smart mode
    Smart,
}

impl Mode {
    /// Mode byte sent by devices in signal light mode
    pub const LED_BYTE: u8 = 0x00;
    /// Mode byte sent by devices in smart mode
    pub const SMART_BYTE: u8 = 0x01;

    /// Classify a mode byte; anything but the LED sentinel is smart mode
    pub fn from_byte(byte: u8) -> Self {
        if byte == Self::LED_BYTE {
            Mode::Led
        } else {
            Mode::Smart
        }
    }

    /// Canonical byte for this mode
    pub fn to_byte(self) -> u8 {
        match self {
            Mode::Led => Self::LED_BYTE,
            Mode::Smart => Self::SMART_BYTE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Led => "signal light mode",
            Mode::Smart => "smart mode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_pattern_codes() {
        assert_eq!(u8::from(LedPattern::NoChange), 9);
        assert_eq!(LedPattern::try_from(2), Ok(LedPattern::Blinking));
        assert_eq!(
            LedPattern::try_from(3),
            Err(ParseError::UnknownCode {
                table: "LED pattern",
                value: 3
            })
        );
    }

    #[test]
    fn test_detail_tables_cover_documented_ranges() {
        assert_eq!(LedColor::ALL.len(), 10);
        assert_eq!(DetailBuzzerPattern::ALL.len(), 12);
        assert_eq!(
            DetailBuzzerPattern::try_from(0x0B),
            Ok(DetailBuzzerPattern::Pattern11)
        );
        assert!(LedColor::try_from(10).is_err());
    }

    #[test]
    fn test_mode_from_byte_is_permissive() {
        assert_eq!(Mode::from_byte(0x00), Mode::Led);
        assert_eq!(Mode::from_byte(0x01), Mode::Smart);
        assert_eq!(Mode::from_byte(0xFF), Mode::Smart);
    }
}
