//! Logical axes and their physical PWM channels

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Logical arm axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Axis {
    /// Forward/back reach
    X,
    /// Shoulder lift
    Y,
    /// Gripper open/close
    Grab,
    /// Base rotation
    Rotate,
}

impl Axis {
    /// All axes, in declaration order
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Grab, Axis::Rotate];

    /// Order in which a reset drives the axes home
    ///
    /// The shoulder goes first so the arm lifts clear before it swings.
    pub const RESET_ORDER: [Axis; 4] = [Axis::Y, Axis::X, Axis::Rotate, Axis::Grab];

    /// Lowercase axis name, as used in config files and logs
    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Grab => "grab",
            Axis::Rotate => "rotate",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Grab => 2,
            Axis::Rotate => 3,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output channel on a 16-channel PWM controller
///
/// Always below [`Channel::COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Channel(u8);

impl Channel {
    /// Number of outputs on the chip
    pub const COUNT: u8 = 16;

    /// Create a channel, rejecting numbers the chip does not have
    pub const fn new(channel: u8) -> Option<Self> {
        if channel < Self::COUNT {
            Some(Self(channel))
        } else {
            None
        }
    }

    /// Channel number (0-15)
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    fn try_from(channel: u8) -> Result<Self, Self::Error> {
        Self::new(channel).ok_or(InvalidChannel(channel))
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

/// Channel number outside 0-15
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidChannel(pub u8);

impl fmt::Display for InvalidChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel {} out of range (0-{})",
            self.0,
            Channel::COUNT - 1
        )
    }
}

impl core::error::Error for InvalidChannel {}

/// Two axes assigned to the same output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DuplicateChannel {
    pub channel: Channel,
    pub first: Axis,
    pub second: Axis,
}

impl fmt::Display for DuplicateChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "axes {} and {} both mapped to channel {}",
            self.first,
            self.second,
            self.channel.get()
        )
    }
}

impl core::error::Error for DuplicateChannel {}

/// Which PWM channel drives each axis
///
/// Depends on how the servo cables are plugged into the controller board.
/// Every axis has its own channel, so commanding one axis never touches
/// another axis's registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "ChannelAssignment", into = "ChannelAssignment")
)]
pub struct ChannelMap {
    channels: [Channel; 4],
}

/// Unchecked per-axis channel assignment, as written in a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct ChannelAssignment {
    pub x: Channel,
    pub y: Channel,
    pub grab: Channel,
    pub rotate: Channel,
}

impl ChannelMap {
    /// Wiring of the stock arm: shoulder on 0, reach on 1, gripper on 2, base on 3
    pub const STOCK: Self = Self {
        channels: [Channel(1), Channel(0), Channel(2), Channel(3)],
    };

    /// Build a map, rejecting assignments where two axes share a channel
    pub fn new(assignment: ChannelAssignment) -> Result<Self, DuplicateChannel> {
        let mut channels = [Channel(0); 4];
        for axis in Axis::ALL {
            channels[axis.index()] = match axis {
                Axis::X => assignment.x,
                Axis::Y => assignment.y,
                Axis::Grab => assignment.grab,
                Axis::Rotate => assignment.rotate,
            };
        }

        for (i, first) in Axis::ALL.iter().enumerate() {
            for second in &Axis::ALL[i + 1..] {
                if channels[first.index()] == channels[second.index()] {
                    return Err(DuplicateChannel {
                        channel: channels[first.index()],
                        first: *first,
                        second: *second,
                    });
                }
            }
        }

        Ok(Self { channels })
    }

    /// Channel driving `axis`
    pub fn channel(&self, axis: Axis) -> Channel {
        self.channels[axis.index()]
    }
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self::STOCK
    }
}

impl TryFrom<ChannelAssignment> for ChannelMap {
    type Error = DuplicateChannel;

    fn try_from(assignment: ChannelAssignment) -> Result<Self, Self::Error> {
        Self::new(assignment)
    }
}

impl From<ChannelMap> for ChannelAssignment {
    fn from(map: ChannelMap) -> Self {
        Self {
            x: map.channel(Axis::X),
            y: map.channel(Axis::Y),
            grab: map.channel(Axis::Grab),
            rotate: map.channel(Axis::Rotate),
        }
    }
}
