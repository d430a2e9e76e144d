use core::str::FromStr;

use derive_more::Display;

use crate::{ConfigError, Element, Ident};

/// A binary operator an operator-generic kernel template is specialized on.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// Add (+) operator
    #[default]
    #[display("+")]
    Add,
    /// Sub (-) operator
    #[display("-")]
    Sub,
    /// Mul (*) operator
    #[display("*")]
    Mul,
    /// Div (/) operator
    #[display("/")]
    Div,
}

impl Operator {
    /// All operators, in the order their kernel variants are generated.
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    /// The infix token substituted for `OPERATOR`.
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        }
    }

    /// The conventional kernel name for this operator.
    pub fn kernel_name(&self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
            Operator::Div => "div",
        }
    }

    /// The conventional kernel name as an identifier.
    pub fn ident(&self) -> Ident {
        Ident::from_static(self.kernel_name())
    }

    /// Applies the operator on the host, matching what the kernel computes per element.
    pub fn apply<E: Element>(&self, lhs: E, rhs: E) -> E {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Sub => lhs - rhs,
            Operator::Mul => lhs * rhs,
            Operator::Div => lhs / rhs,
        }
    }
}

impl FromStr for Operator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "add" => Ok(Operator::Add),
            "-" | "sub" => Ok(Operator::Sub),
            "*" | "mul" => Ok(Operator::Mul),
            "/" | "div" => Ok(Operator::Div),
            other => Err(ConfigError::UnknownOperator(other.to_string())),
        }
    }
}
