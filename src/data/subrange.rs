//! Axis subranges: which indices of one axis to keep when
//! duplicating part of a dataset.
//!
//! A definition is a comma separated list of terms, each a
//! single index (`3`), an inclusive range (`1-10`) or a range
//! with a step (`12-60-6`). Terms are kept in the order given,
//! so `1,3-5,12-60-6` selects 1, 3, 4, 5, 12, 18, ... 60.

/// Things that can be wrong with a subrange definition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubrangeError {
    #[error("Empty subrange definition")]
    Empty,

    #[error("Illegal subrange term `{0}`: expected `n`, `start-end` or `start-end-step`")]
    Malformed(String),

    #[error("Subrange term `{0}` has a step of 0")]
    ZeroStep(String),

    #[error("Subrange {start}-{end} ends before it starts")]
    Reversed { start : usize, end : usize },

    #[error("Index {value} is below the origin {origin}")]
    BelowOrigin { value : usize, origin : usize },

    #[error("Index {index} (zero-based) is outside an axis of length {dim}")]
    OutOfRange { index : usize, dim : usize },
}

/// The zero-based indices of one axis to keep, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSubrange {
    indices : Vec<usize>,
}

impl AxisSubrange {
    /// Parses a definition such as `1,3-5,12-60-6`.
    ///
    /// ## Arguments
    ///
    /// * `definition` - The terms, separated by commas
    /// * `origin_is_one` - Whether the numbers written count from 1
    /// (as shown to users) rather than from 0
    ///
    /// ## Example
    ///
    /// ```
    /// use axiscope::data::subrange::AxisSubrange;
    ///
    /// let range = AxisSubrange::parse("1,3-5,8-12-2", true).unwrap();
    /// assert_eq!(range.indices(), &[0, 2, 3, 4, 7, 9, 11]);
    /// ```
    pub fn parse(definition : &str, origin_is_one : bool) -> Result<AxisSubrange, SubrangeError> {
        if definition.trim().is_empty() {
            return Err(SubrangeError::Empty);
        }
        let origin = if origin_is_one { 1 } else { 0 };
        let mut indices = Vec::new();
        for term in definition.split(',').map(str::trim) {
            let numbers = term.split('-')
                .map(|number| number.trim().parse::<usize>())
                .collect::<Result<Vec<usize>, _>>()
                .map_err(|_| SubrangeError::Malformed(term.to_string()))?;

            let (start, end, step) = match numbers.as_slice() {
                &[index] => (index, index, 1),
                &[start, end] => (start, end, 1),
                &[start, end, step] => (start, end, step),
                _ => return Err(SubrangeError::Malformed(term.to_string())),
            };
            if step == 0 {
                return Err(SubrangeError::ZeroStep(term.to_string()));
            }
            if end < start {
                return Err(SubrangeError::Reversed { start, end });
            }
            if start < origin {
                return Err(SubrangeError::BelowOrigin { value : start, origin });
            }
            indices.extend((start..=end).step_by(step).map(|value| value - origin));
        }
        Ok(AxisSubrange { indices })
    }

    /// Every index of an axis of length `dim`.
    pub fn full(dim : usize) -> AxisSubrange {
        AxisSubrange { indices : (0..dim).collect() }
    }

    pub fn from_indices(indices : Vec<usize>) -> AxisSubrange {
        AxisSubrange { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Errors if the subrange is empty or reaches past `dim`.
    pub fn check(&self, dim : usize) -> Result<(), SubrangeError> {
        if self.indices.is_empty() {
            return Err(SubrangeError::Empty);
        }
        match self.indices.iter().find(|&&index| index >= dim) {
            Some(&index) => Err(SubrangeError::OutOfRange { index, dim }),
            None => Ok(()),
        }
    }
}
