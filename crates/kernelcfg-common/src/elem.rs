use core::{
    fmt::Debug,
    ops::{Add, Div, Mul, Sub},
    str::FromStr,
};

use derive_more::Display;
use half::f16;

use crate::ConfigError;

/// The scalar element types a kernel template can be specialized on.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Elem {
    /// 16-bit float.
    #[display("half")]
    F16,
    /// 32-bit float, the fallback when no element type was provided.
    #[default]
    #[display("float")]
    F32,
    /// 64-bit float.
    #[display("double")]
    F64,
}

impl Elem {
    /// All element types, in increasing precision.
    pub const ALL: [Elem; 3] = [Elem::F16, Elem::F32, Elem::F64];

    /// The OpenCL C spelling of the type.
    pub fn c_name(&self) -> &'static str {
        match self {
            Elem::F16 => "half",
            Elem::F32 => "float",
            Elem::F64 => "double",
        }
    }

    /// The path of the matching Rust type, used when generating host constants.
    pub fn rust_type(&self) -> &'static str {
        match self {
            Elem::F16 => "half::f16",
            Elem::F32 => "f32",
            Elem::F64 => "f64",
        }
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            Elem::F16 => core::mem::size_of::<f16>(),
            Elem::F32 => core::mem::size_of::<f32>(),
            Elem::F64 => core::mem::size_of::<f64>(),
        }
    }
}

impl FromStr for Elem {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "half" | "__half" | "f16" => Ok(Elem::F16),
            "float" | "f32" => Ok(Elem::F32),
            "double" | "f64" => Ok(Elem::F64),
            other => Err(ConfigError::UnknownElem(other.to_string())),
        }
    }
}

/// A host type that maps onto one of the kernel [element types](Elem).
pub trait Element:
    Copy
    + Default
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// The kernel element type of `Self`.
    const ELEM: Elem;

    /// Widens the value for printing.
    fn to_f64(self) -> f64;
}

impl Element for f16 {
    const ELEM: Elem = Elem::F16;

    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }
}

impl Element for f32 {
    const ELEM: Elem = Elem::F32;

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for f64 {
    const ELEM: Elem = Elem::F64;

    fn to_f64(self) -> f64 {
        self
    }
}
