//! One condition or action call.

use thiserror::Error;

use super::expression::Expression;

/// Most instructions fit in this many parameters.
const PARAMETERS_CAPACITY: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("parameter {index} is out of range (instruction has {len} parameters)")]
    ParameterOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    instruction_type: String,
    parameters: Vec<Expression>,
    inverted: bool,
}

impl Instruction {
    pub fn new(instruction_type: impl Into<String>) -> Self {
        Self {
            instruction_type: instruction_type.into(),
            parameters: Vec::with_capacity(PARAMETERS_CAPACITY),
            inverted: false,
        }
    }

    /// Builder used by the loader and the tests.
    pub fn with_parameters<I, E>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub fn instruction_type(&self) -> &str {
        &self.instruction_type
    }

    pub fn parameters(&self) -> &[Expression] {
        &self.parameters
    }

    pub fn parameters_count(&self) -> usize {
        self.parameters.len()
    }

    /// `None` when `index` is past the last parameter.
    pub fn parameter(&self, index: usize) -> Option<&Expression> {
        self.parameters.get(index)
    }

    /// Plain text of a parameter, empty when absent.
    pub fn parameter_text(&self, index: usize) -> &str {
        self.parameter(index).map(Expression::plain_string).unwrap_or("")
    }

    /// Replaces an existing parameter. Never grows the list.
    pub fn set_parameter(
        &mut self,
        index: usize,
        value: impl Into<Expression>,
    ) -> Result<(), ModelError> {
        let len = self.parameters.len();
        let slot = self
            .parameters
            .get_mut(index)
            .ok_or(ModelError::ParameterOutOfRange { index, len })?;
        *slot = value.into();
        Ok(())
    }

    pub fn set_parameters(&mut self, parameters: Vec<Expression>) {
        self.parameters = parameters;
    }

    /// Pads the parameter list with empty expressions up to `count`.
    pub fn ensure_parameters(&mut self, count: usize) {
        if self.parameters.len() < count {
            self.parameters.resize(count, Expression::default());
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_pressed() -> Instruction {
        Instruction::new("KeyPressed").with_parameters(["", "Left"])
    }

    #[test]
    fn out_of_range_parameter_is_absent() {
        let instruction = key_pressed();
        assert_eq!(instruction.parameter(1).map(|p| p.plain_string()), Some("Left"));
        for index in [2, 3, 100, usize::MAX] {
            assert_eq!(instruction.parameter(index), None);
            assert_eq!(instruction.parameter_text(index), "");
        }
    }

    #[test]
    fn set_parameter_rejects_out_of_range_writes() {
        let mut instruction = key_pressed();
        assert_eq!(instruction.set_parameter(1, "Right"), Ok(()));
        assert_eq!(instruction.parameter_text(1), "Right");

        let err = instruction.set_parameter(5, "Up").unwrap_err();
        assert_eq!(err, ModelError::ParameterOutOfRange { index: 5, len: 2 });
        assert_eq!(instruction.parameters_count(), 2);
    }

    #[test]
    fn ensure_parameters_only_grows() {
        let mut instruction = key_pressed();
        instruction.ensure_parameters(4);
        assert_eq!(instruction.parameters_count(), 4);
        assert_eq!(instruction.parameter_text(3), "");

        instruction.ensure_parameters(1);
        assert_eq!(instruction.parameters_count(), 4);
    }

    #[test]
    fn inverted_flag() {
        let instruction = key_pressed().inverted(true);
        assert!(instruction.is_inverted());
        assert!(!key_pressed().is_inverted());
    }
}
