use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Column name SLDC uses for the grid total.
pub const TOTAL_NAME: &str = "DELHI";

/// A distribution utility whose load contributes to the Delhi total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// BSES Rajdhani Power Ltd
    Brpl,
    /// BSES Yamuna Power Ltd
    Bypl,
    /// North Delhi Power Ltd (Tata Power-DDL)
    Ndpl,
    /// New Delhi Municipal Council
    Ndmc,
    /// Military Engineer Services
    Mes,
}

impl Channel {
    /// All channels, in the column order of the SLDC load table.
    pub const ALL: [Channel; 5] = [
        Channel::Brpl,
        Channel::Bypl,
        Channel::Ndpl,
        Channel::Ndmc,
        Channel::Mes,
    ];

    /// Upper-case name as printed in the SLDC table header.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Brpl => "BRPL",
            Channel::Bypl => "BYPL",
            Channel::Ndpl => "NDPL",
            Channel::Ndmc => "NDMC",
            Channel::Mes => "MES",
        }
    }

    /// Lower-case field name used in JSON items and CSV headers.
    pub fn key(&self) -> &'static str {
        match self {
            Channel::Brpl => "brpl",
            Channel::Bypl => "bypl",
            Channel::Ndpl => "ndpl",
            Channel::Ndmc => "ndmc",
            Channel::Mes => "mes",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Channel::ALL
            .into_iter()
            .find(|c| c.key() == lowered)
            .ok_or_else(|| format!("unknown channel: {s}"))
    }
}

/// Load in MW for each channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelLoads {
    pub brpl: f64,
    pub bypl: f64,
    pub ndpl: f64,
    pub ndmc: f64,
    pub mes: f64,
}

impl ChannelLoads {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Brpl => self.brpl,
            Channel::Bypl => self.bypl,
            Channel::Ndpl => self.ndpl,
            Channel::Ndmc => self.ndmc,
            Channel::Mes => self.mes,
        }
    }

    pub fn set(&mut self, channel: Channel, value: f64) {
        let slot = match channel {
            Channel::Brpl => &mut self.brpl,
            Channel::Bypl => &mut self.bypl,
            Channel::Ndpl => &mut self.ndpl,
            Channel::Ndmc => &mut self.ndmc,
            Channel::Mes => &mut self.mes,
        };
        *slot = value;
    }

    /// Values in [`Channel::ALL`] order.
    pub fn values(&self) -> [f64; 5] {
        [self.brpl, self.bypl, self.ndpl, self.ndmc, self.mes]
    }

    /// Inverse of [`ChannelLoads::values`].
    pub fn from_values(values: [f64; 5]) -> ChannelLoads {
        let [brpl, bypl, ndpl, ndmc, mes] = values;
        ChannelLoads {
            brpl,
            bypl,
            ndpl,
            ndmc,
            mes,
        }
    }
}
