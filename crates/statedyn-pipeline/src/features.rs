//! Registry of named element-wise column transformations.
//!
//! Used to augment a measurement table with nonlinear features (squares,
//! exponentials, ...) before the state dynamics fit.

use std::fmt;
use std::sync::Arc;

use crate::table::Table;
use crate::PipelineError;

pub type Transform = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

pub const BUILTIN_TRANSFORMATIONS: [&str; 5] = ["square", "cube", "sin", "exp", "log1p"];

#[derive(Clone, Default)]
pub struct FeatureFactory {
    transformations: Vec<(String, Transform)>,
}

impl fmt::Debug for FeatureFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureFactory")
            .field("transformations", &self.list_transformations())
            .finish()
    }
}

impl FeatureFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory preloaded with `square`, `cube`, `sin`, `exp` and `log1p`.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.add_transformation("square", |x| x * x);
        factory.add_transformation("cube", |x| x * x * x);
        factory.add_transformation("sin", f64::sin);
        factory.add_transformation("exp", f64::exp);
        factory.add_transformation("log1p", f64::ln_1p);
        factory
    }

    /// Register a transformation. Re-registering a name replaces it and keeps
    /// its original position.
    pub fn add_transformation<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let name = name.into();
        let func: Transform = Arc::new(func);
        match self.transformations.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = func,
            None => self.transformations.push((name, func)),
        }
    }

    /// Returns whether a transformation was removed.
    pub fn remove_transformation(&mut self, name: &str) -> bool {
        let before = self.transformations.len();
        self.transformations.retain(|(n, _)| n != name);
        self.transformations.len() != before
    }

    pub fn list_transformations(&self) -> Vec<&str> {
        self.transformations.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.transformations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// Apply the selected transformations (all registered ones when `None`)
    /// to each listed column, returning an augmented copy of `table`.
    ///
    /// New columns are named `{column}_{transformation}` when `suffix` is set,
    /// otherwise just `{transformation}` (later columns then overwrite earlier
    /// ones of the same name).
    pub fn transform(
        &self,
        table: &Table,
        columns: &[String],
        selection: Option<&[String]>,
        suffix: bool,
    ) -> Result<Table, PipelineError> {
        let selected: Vec<&str> = match selection {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => self.list_transformations(),
        };

        let mut out = table.clone();
        for column in columns {
            let values = out
                .column(column)
                .ok_or_else(|| PipelineError::UnknownColumn(column.clone()))?
                .to_vec();

            for &name in &selected {
                let func = self
                    .get(name)
                    .ok_or_else(|| PipelineError::UnknownTransformation(name.to_string()))?;
                let derived: Vec<f64> = values.iter().map(|&v| func(v)).collect();
                let new_name = if suffix {
                    format!("{column}_{name}")
                } else {
                    name.to_string()
                };
                out.push_column(new_name, derived)?;
            }
        }

        tracing::debug!(
            columns = columns.len(),
            transformations = selected.len(),
            width = out.ncols(),
            "applied feature transformations"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table() -> Table {
        Table::from_columns([("x", vec![1.0, 2.0, 3.0]), ("y", vec![10.0, 20.0, 30.0])]).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builtins_are_listed_in_registration_order() {
        let factory = FeatureFactory::with_builtins();
        assert_eq!(factory.list_transformations(), BUILTIN_TRANSFORMATIONS.to_vec());
    }

    #[test]
    fn re_registering_keeps_position() {
        let mut factory = FeatureFactory::with_builtins();
        factory.add_transformation("square", |x| 2.0 * x);
        assert_eq!(factory.list_transformations()[0], "square");
        assert_eq!((factory.get("square").unwrap())(3.0), 6.0);
    }

    #[test]
    fn remove_is_a_no_op_for_unknown_names() {
        let mut factory = FeatureFactory::with_builtins();
        assert!(factory.remove_transformation("exp"));
        assert!(!factory.remove_transformation("exp"));
        assert!(!factory.list_transformations().contains(&"exp"));
    }

    #[test]
    fn transform_appends_suffixed_columns() {
        let factory = FeatureFactory::with_builtins();
        let out = factory
            .transform(&table(), &names(&["x", "y"]), Some(&names(&["square", "cube"])), true)
            .unwrap();

        assert_eq!(
            out.column_names(),
            &["x", "y", "x_square", "x_cube", "y_square", "y_cube"]
        );
        assert_eq!(out.column("x_cube").unwrap(), &[1.0, 8.0, 27.0]);
        assert_eq!(out.column("y_square").unwrap(), &[100.0, 400.0, 900.0]);
    }

    #[test]
    fn transform_applies_every_registered_function_by_default() {
        let factory = FeatureFactory::with_builtins();
        let out = factory.transform(&table(), &names(&["x"]), None, true).unwrap();
        assert_eq!(out.ncols(), 2 + BUILTIN_TRANSFORMATIONS.len());
        assert_relative_eq!(out.column("x_sin").unwrap()[1], 2.0_f64.sin());
        assert_relative_eq!(out.column("x_log1p").unwrap()[0], 2.0_f64.ln());
    }

    #[test]
    fn without_suffix_later_columns_overwrite() {
        let factory = FeatureFactory::with_builtins();
        let out = factory
            .transform(&table(), &names(&["x", "y"]), Some(&names(&["square"])), false)
            .unwrap();
        assert_eq!(out.column_names(), &["x", "y", "square"]);
        assert_eq!(out.column("square").unwrap(), &[100.0, 400.0, 900.0]);
    }

    #[test]
    fn input_table_is_left_untouched() {
        let factory = FeatureFactory::with_builtins();
        let original = table();
        factory.transform(&original, &names(&["x"]), None, true).unwrap();
        assert_eq!(original, table());
    }

    #[test]
    fn unknown_names_are_reported() {
        let factory = FeatureFactory::with_builtins();
        assert!(matches!(
            factory.transform(&table(), &names(&["z"]), None, true),
            Err(PipelineError::UnknownColumn(c)) if c == "z"
        ));
        assert!(matches!(
            factory.transform(&table(), &names(&["x"]), Some(&names(&["tanh"])), true),
            Err(PipelineError::UnknownTransformation(t)) if t == "tanh"
        ));
    }
}
