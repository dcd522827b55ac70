use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Rectangular region of interest in (row, col) coordinates.
/// `top`/`left` are inclusive, `bottom`/`right` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl Roi {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Whether an image of the given size contains the whole region
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.right <= width && self.bottom <= height
    }
}

impl Default for Roi {
    fn default() -> Self {
        Self {
            top: 20,
            left: 90,
            bottom: 390,
            right: 575,
        }
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})..({}, {})",
            self.top, self.left, self.bottom, self.right
        )
    }
}

/// Which camera of the stereo rig an image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Substring that marks a file as belonging to this side
    pub fn marker(&self) -> &'static str {
        match self {
            Side::Left => "_L_",
            Side::Right => "_R_",
        }
    }
}

/// Left and right camera images of one membrane capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub left: PathBuf,
    pub right: PathBuf,
}

impl ImagePair {
    /// File name of the left image, used as the sample key
    pub fn name(&self) -> String {
        self.left
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Stage {
    Train,
    Val,
    Test,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Train, Stage::Val, Stage::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Train => "train",
            Stage::Val => "val",
            Stage::Test => "test",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const NUM_ATTRIBUTES: usize = 6;

/// Regression targets of one sample, indexed by [`Attribute::index`]
pub type Attributes = [f32; NUM_ATTRIBUTES];

/// Contact attributes estimated by the regression experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    X,
    Y,
    Ra,
    Rb,
    F,
    D,
}

impl Attribute {
    pub const ALL: [Attribute; NUM_ATTRIBUTES] = [
        Attribute::X,
        Attribute::Y,
        Attribute::Ra,
        Attribute::Rb,
        Attribute::F,
        Attribute::D,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Column header used in spreadsheets
    pub fn header(&self) -> &'static str {
        match self {
            Attribute::X => "X",
            Attribute::Y => "Y",
            Attribute::Ra => "Ra",
            Attribute::Rb => "Rb",
            Attribute::F => "F",
            Attribute::D => "D",
        }
    }

    /// Column name used in CSV label and prediction files
    pub fn column(&self) -> &'static str {
        match self {
            Attribute::X => "x",
            Attribute::Y => "y",
            Attribute::Ra => "ra",
            Attribute::Rb => "rb",
            Attribute::F => "f",
            Attribute::D => "d",
        }
    }
}
