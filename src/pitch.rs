//! Pitch records.
//!
//! [`PitchParameters`] is what the playback core consumes, already expressed in the
//! crate's world frame. [`StatcastPitch`] is a raw Statcast row as found in pitch
//! datasets; converting it applies the frame mapping described below and checks that
//! every required column is present.
//!
//! # World frame
//!
//! Right-handed, in feet. `+y` points up, the pitch travels toward `-z`, and the
//! origin sits on the ground at the front of the pitching rubber, so home plate is the
//! plane `z = -PLATE_DISTANCE_FT`. `+x` is the pitcher's right when looking from
//! behind the mound.
//!
//! Statcast measures from the catcher's side with `y` running from the plate toward
//! the mound and `z` up, so:
//!
//! ```text
//! world.x = -statcast.x
//! world.y =  statcast.z
//! world.z =  statcast.y - PLATE_DISTANCE_FT   (positions only get the offset)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{math::Vec3, playback::PlaybackError};

/// Distance from the front of the pitching rubber to the tip of home plate.
pub const PLATE_DISTANCE_FT: f64 = 60.5;

/// Pitch classification. Only used to pick a display color.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PitchType {
    FourSeamFastball,
    Slider,
    Changeup,
    Curveball,
    Sinker,
    Other(String),
}

impl PitchType {
    /// Statcast code for this pitch type ("FF", "SL", ...).
    pub fn code(&self) -> &str {
        match self {
            PitchType::FourSeamFastball => "FF",
            PitchType::Slider => "SL",
            PitchType::Changeup => "CH",
            PitchType::Curveball => "CU",
            PitchType::Sinker => "SI",
            PitchType::Other(code) => code,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PitchType::FourSeamFastball => "#FF0000",
            PitchType::Slider => "#0000FF",
            PitchType::Changeup => "#00FF00",
            PitchType::Curveball => "#8A2BE2",
            PitchType::Sinker => "#FFA500",
            PitchType::Other(_) => "#888888",
        }
    }
}

impl Default for PitchType {
    fn default() -> Self {
        PitchType::Other(String::new())
    }
}

impl From<String> for PitchType {
    fn from(code: String) -> Self {
        match code.as_str() {
            "FF" => PitchType::FourSeamFastball,
            "SL" => PitchType::Slider,
            "CH" => PitchType::Changeup,
            "CU" => PitchType::Curveball,
            "SI" => PitchType::Sinker,
            _ => PitchType::Other(code),
        }
    }
}

impl From<&str> for PitchType {
    fn from(code: &str) -> Self {
        PitchType::from(code.to_owned())
    }
}

impl From<PitchType> for String {
    fn from(pitch_type: PitchType) -> Self {
        pitch_type.code().to_owned()
    }
}

impl fmt::Display for PitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Physics parameters of one throw, in the world frame.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
pub struct PitchParameters {
    /// ball position at release (ft)
    pub release_position: Vec3,
    /// velocity at release (ft/s)
    pub initial_velocity: Vec3,
    /// constant acceleration (ft/s²), gravity plus drag and Magnus effect
    pub acceleration: Vec3,
    /// revolutions per minute
    pub spin_rate: f64,
    /// direction of the spin axis in the horizontal plane, degrees
    pub spin_axis: f64,
    #[serde(default)]
    pub pitch_type: PitchType,
    /// per pitch flight bound (s), the throw ends there even short of the plate
    #[serde(default)]
    pub time_to_plate: Option<f64>,
}

impl PitchParameters {
    /// Checks that every numeric field is usable by the trajectory engine.
    pub fn validate(&self) -> Result<(), PlaybackError> {
        let vectors = [
            ("release_position", self.release_position),
            ("initial_velocity", self.initial_velocity),
            ("acceleration", self.acceleration),
        ];
        for (field, v) in vectors {
            if !v.is_finite() {
                return Err(PlaybackError::InvalidPitchData { field });
            }
        }
        if !self.spin_rate.is_finite() || self.spin_rate < 0. {
            return Err(PlaybackError::InvalidPitchData { field: "spin_rate" });
        }
        if !self.spin_axis.is_finite() {
            return Err(PlaybackError::InvalidPitchData { field: "spin_axis" });
        }
        if let Some(limit) = self.time_to_plate {
            if !limit.is_finite() || limit < 0. {
                return Err(PlaybackError::InvalidPitchData {
                    field: "time_to_plate",
                });
            }
        }
        Ok(())
    }
}

/// A raw Statcast row. Unknown columns are ignored, known ones may be missing or null.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct StatcastPitch {
    pub release_pos_x: Option<f64>,
    pub release_pos_y: Option<f64>,
    pub release_pos_z: Option<f64>,
    pub vx0: Option<f64>,
    pub vy0: Option<f64>,
    pub vz0: Option<f64>,
    pub ax: Option<f64>,
    pub ay: Option<f64>,
    pub az: Option<f64>,
    pub release_spin_rate: Option<f64>,
    pub spin_axis: Option<f64>,
    pub pitch_type: Option<String>,
    pub time_to_plate: Option<f64>,
}

fn required(value: Option<f64>, field: &'static str) -> Result<f64, PlaybackError> {
    value.ok_or(PlaybackError::InvalidPitchData { field })
}

/// Maps a Statcast direction (velocity, acceleration) into the world frame.
fn statcast_direction(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(-x, z, y)
}

impl TryFrom<StatcastPitch> for PitchParameters {
    type Error = PlaybackError;

    fn try_from(row: StatcastPitch) -> Result<Self, Self::Error> {
        let release_position = statcast_direction(
            required(row.release_pos_x, "release_pos_x")?,
            required(row.release_pos_y, "release_pos_y")?,
            required(row.release_pos_z, "release_pos_z")?,
        ) + Vec3::new(0., 0., -PLATE_DISTANCE_FT);
        let initial_velocity = statcast_direction(
            required(row.vx0, "vx0")?,
            required(row.vy0, "vy0")?,
            required(row.vz0, "vz0")?,
        );
        let acceleration = statcast_direction(
            required(row.ax, "ax")?,
            required(row.ay, "ay")?,
            required(row.az, "az")?,
        );

        let pitch = PitchParameters {
            release_position,
            initial_velocity,
            acceleration,
            spin_rate: row.release_spin_rate.unwrap_or(0.),
            spin_axis: row.spin_axis.unwrap_or(0.),
            pitch_type: row.pitch_type.map(PitchType::from).unwrap_or_default(),
            time_to_plate: row.time_to_plate,
        };
        pitch.validate()?;
        Ok(pitch)
    }
}
