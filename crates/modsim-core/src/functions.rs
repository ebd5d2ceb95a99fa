//! The closed registry of state-manager operations.
//!
//! Profiles reference functions by name. Names are resolved to an
//! [`Operation`] once, when the graph is built, so an unknown name fails the
//! profile load instead of surfacing mid-run.

use std::collections::BTreeMap;

use modsim_types::{StateManagerSchema, Value, Vector3};

/// Length of the next time step returned by [`Operation::TimestepManager`].
const FIXED_TIME_STEP: f64 = 100.0;

/// Errors raised while applying an operation to resolved inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FunctionError {
    /// The number of inputs does not match the operation's parameters.
    #[error("{operation} expects {expected} arguments, got {found}")]
    Arity {
        /// Registry name of the operation.
        operation: &'static str,
        /// Declared parameter count.
        expected: usize,
        /// Number of inputs supplied.
        found: usize,
    },

    /// An input has the wrong shape.
    #[error("{operation}: parameter `{parameter}` expected {expected}, found {found}")]
    TypeMismatch {
        /// Registry name of the operation.
        operation: &'static str,
        /// Parameter name.
        parameter: &'static str,
        /// Expected type name.
        expected: &'static str,
        /// Type of the value supplied.
        found: &'static str,
    },

    /// Two bodies occupy the same position, so gravity is undefined.
    #[error("{operation}: degenerate separation between bodies at {position:?}")]
    DegenerateSeparation {
        /// Registry name of the operation.
        operation: &'static str,
        /// The shared position.
        position: Vector3,
    },
}

/// A supported state-manager function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Gravitational velocity update from one other body.
    PropagateVelocity,
    /// Position update from a velocity.
    ///
    /// Returns the advanced position `position + velocity * dt`, never the
    /// velocity itself.
    PropagatePosition,
    /// Mass passthrough.
    PropagateMass,
    /// Returns its single argument.
    Identity,
    /// Length of the next time step.
    TimestepManager,
    /// Time of the next step.
    TimeManager,
}

impl Operation {
    /// Every operation, in registry order.
    pub const ALL: [Self; 6] = [
        Self::PropagateVelocity,
        Self::PropagatePosition,
        Self::PropagateMass,
        Self::Identity,
        Self::TimestepManager,
        Self::TimeManager,
    ];

    /// The name profiles use to reference this operation.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PropagateVelocity => "propagate_velocity",
            Self::PropagatePosition => "propagate_position",
            Self::PropagateMass => "propagate_mass",
            Self::Identity => "identity",
            Self::TimestepManager => "timestep_manager",
            Self::TimeManager => "time_manager",
        }
    }

    /// Look up an operation by registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Parameters in call order, as `(name, type)`.
    pub const fn parameters(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::PropagateVelocity => &[
                ("time_step", "float"),
                ("position", "Vector3"),
                ("velocity", "Vector3"),
                ("other_position", "Vector3"),
                ("m_other", "float"),
            ],
            Self::PropagatePosition => &[
                ("time_step", "float"),
                ("position", "Vector3"),
                ("velocity", "Vector3"),
            ],
            Self::PropagateMass => &[("mass", "float")],
            Self::Identity => &[("arg", "any")],
            Self::TimestepManager => &[("velocity", "Vector3")],
            Self::TimeManager => &[("time", "float"), ("timeStep", "float")],
        }
    }

    /// Type name of the returned value.
    pub const fn output_type(self) -> &'static str {
        match self {
            Self::PropagateVelocity | Self::PropagatePosition => "Vector3",
            Self::PropagateMass | Self::TimestepManager | Self::TimeManager => "float",
            Self::Identity => "any",
        }
    }

    /// Number of inputs the operation takes.
    pub const fn arity(self) -> usize {
        self.parameters().len()
    }

    /// Introspection record for the schema endpoint.
    pub fn schema(self) -> StateManagerSchema {
        StateManagerSchema {
            function_name: self.name().to_owned(),
            inputs: self
                .parameters()
                .iter()
                .map(|(name, ty)| BTreeMap::from([((*name).to_owned(), (*ty).to_owned())]))
                .collect(),
            output_type: self.output_type().to_owned(),
        }
    }

    /// Apply the operation to resolved inputs in query order.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionError`] on an arity or type mismatch, or when a
    /// velocity update is asked for two coincident bodies.
    pub fn apply(self, args: &[Value]) -> Result<Value, FunctionError> {
        if args.len() != self.arity() {
            return Err(FunctionError::Arity {
                operation: self.name(),
                expected: self.arity(),
                found: args.len(),
            });
        }
        let args = Args { op: self, values: args };

        match self {
            Self::PropagateVelocity => {
                let dt = args.number(0)?;
                let position = args.vector(1)?;
                let velocity = args.vector(2)?;
                let other_position = args.vector(3)?;
                let m_other = args.number(4)?;

                let r = position - other_position;
                let distance = r.norm();
                if distance == 0.0 {
                    return Err(FunctionError::DegenerateSeparation {
                        operation: self.name(),
                        position,
                    });
                }
                let dvdt = r * (-m_other / distance.powi(3));
                Ok(Value::Vector(velocity + dvdt * dt))
            }
            Self::PropagatePosition => {
                let dt = args.number(0)?;
                let position = args.vector(1)?;
                let velocity = args.vector(2)?;
                Ok(Value::Vector(position + velocity * dt))
            }
            Self::PropagateMass => Ok(Value::Number(args.number(0)?)),
            Self::Identity => Ok(args.values.first().cloned().unwrap_or(Value::List(Vec::new()))),
            Self::TimestepManager => {
                args.vector(0)?;
                Ok(Value::Number(FIXED_TIME_STEP))
            }
            Self::TimeManager => Ok(Value::Number(args.number(0)? + args.number(1)?)),
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Schema for every registered operation, in registry order.
pub fn schema() -> Vec<StateManagerSchema> {
    Operation::ALL.into_iter().map(Operation::schema).collect()
}

/// Typed access to an operation's inputs.
struct Args<'a> {
    op: Operation,
    values: &'a [Value],
}

impl Args<'_> {
    fn parameter(&self, index: usize) -> &'static str {
        self.op
            .parameters()
            .get(index)
            .map_or("?", |(name, _)| *name)
    }

    fn mismatch(&self, index: usize, expected: &'static str) -> FunctionError {
        FunctionError::TypeMismatch {
            operation: self.op.name(),
            parameter: self.parameter(index),
            expected,
            found: self.values.get(index).map_or("nothing", Value::kind),
        }
    }

    fn number(&self, index: usize) -> Result<f64, FunctionError> {
        self.values
            .get(index)
            .and_then(Value::as_number)
            .ok_or_else(|| self.mismatch(index, "float"))
    }

    fn vector(&self, index: usize) -> Result<Vector3, FunctionError> {
        self.values
            .get(index)
            .and_then(Value::as_vector)
            .ok_or_else(|| self.mismatch(index, "Vector3"))
    }
}
