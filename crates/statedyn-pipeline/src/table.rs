use statedyn::NumericArray;

use crate::PipelineError;

/// Named `f64` columns of equal length, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns<I, S>(columns: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a column, or replace it in place if the name already exists.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), PipelineError> {
        let name = name.into();
        if !self.columns.is_empty() && values.len() != self.nrows() {
            return Err(PipelineError::LengthMismatch {
                context: format!("column '{name}'"),
                expected: self.nrows(),
                got: values.len(),
            });
        }

        match self.position(&name) {
            Some(idx) => self.columns[idx] = values,
            None => {
                self.names.push(name);
                self.columns.push(values);
            }
        }
        Ok(())
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.position(name).map(|idx| self.columns[idx].as_slice())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn require(&self, name: &str) -> Result<usize, PipelineError> {
        self.position(name)
            .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))
    }

    /// Stable ascending sort of every column by the values in `name`.
    pub fn sort_by(&mut self, name: &str) -> Result<(), PipelineError> {
        let key = &self.columns[self.require(name)?];
        let mut order: Vec<usize> = (0..key.len()).collect();
        order.sort_by(|&i, &j| key[i].total_cmp(&key[j]));

        for column in &mut self.columns {
            *column = order.iter().map(|&i| column[i]).collect();
        }
        Ok(())
    }

    /// Split into the state trajectory `(N,)` and the input matrix `(N, k)`.
    ///
    /// Inputs are `input_columns` in the given order, or every other column in
    /// table order when `None`. Returns the input column names alongside.
    pub fn state_and_inputs(
        &self,
        state_column: &str,
        input_columns: Option<&[String]>,
    ) -> Result<(NumericArray, NumericArray, Vec<String>), PipelineError> {
        let state_idx = self.require(state_column)?;

        let inputs: Vec<usize> = match input_columns {
            Some(names) => names
                .iter()
                .map(|name| self.require(name))
                .collect::<Result<_, _>>()?,
            None => (0..self.ncols()).filter(|&idx| idx != state_idx).collect(),
        };

        let n = self.nrows();
        let mut data = Vec::with_capacity(n * inputs.len());
        for row in 0..n {
            data.extend(inputs.iter().map(|&col| self.columns[col][row]));
        }

        let x = NumericArray::vector(self.columns[state_idx].clone());
        let u = NumericArray::new(vec![n, inputs.len()], data)?;
        let names = inputs.iter().map(|&idx| self.names[idx].clone()).collect();
        Ok((x, u, names))
    }
}
