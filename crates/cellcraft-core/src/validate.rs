//! Task completion checks.
//!
//! A task declares a [`ValidationCriteria`] record; the session checks it
//! against the current cells after every edit. Rules run in a fixed order and
//! a later rule's outcome replaces an earlier one, so a record combining
//! several rules is decided by the last applicable one.

use std::str::FromStr;

use cellcraft_engine::engine::{CellFormat, CellRange, CellRef, CellStore, parse_number};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpectedCellValue {
    pub cell: CellRef,
    pub value: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpectedFormatting {
    /// A single cell (`C1`) or a range (`B2:B5`).
    pub cell: String,
    pub format: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpectedRange {
    pub start: CellRef,
    pub end: CellRef,
    pub operation: String,
}

/// What an `expected_range` rule checks over its cells.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeOperation {
    /// Consecutive integers ascending by one.
    Sequence,
    /// Every cell non-empty and all equal.
    Fill,
    /// All numeric and non-decreasing.
    Sorted,
    Table,
    Summary,
    Dashboard,
}

impl FromStr for RangeOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequence" => Ok(RangeOperation::Sequence),
            "fill" => Ok(RangeOperation::Fill),
            "sorted" => Ok(RangeOperation::Sorted),
            "table" => Ok(RangeOperation::Table),
            "summary" => Ok(RangeOperation::Summary),
            "dashboard" => Ok(RangeOperation::Dashboard),
            other => Err(format!("Unknown range operation: {}", other)),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidationCriteria {
    /// Formula the target cell must hold, compared case- and
    /// whitespace-insensitively.
    pub expected_formula: Option<String>,
    /// With `expected_formula`, only names the target cell.
    pub expected_cell_value: Option<ExpectedCellValue>,
    pub expected_formatting: Option<ExpectedFormatting>,
    pub expected_range: Option<ExpectedRange>,
    /// A rule outside what the grid models (e.g. data validation); never passes.
    pub custom_validation: Option<String>,
}

impl ValidationCriteria {
    /// True when the cells satisfy the criteria. `selected` is the target
    /// of `expected_formula` when no `expected_cell_value` names one.
    pub fn check(&self, cells: &CellStore, selected: &CellRef) -> bool {
        let mut valid = false;

        if let Some(expected) = &self.expected_formula {
            let target = self
                .expected_cell_value
                .as_ref()
                .map_or(*selected, |expected| expected.cell);
            valid = cells
                .get(&target)
                .and_then(|cell| cell.formula.as_deref())
                .is_some_and(|formula| normalize_formula(formula) == normalize_formula(expected));
        }

        if let Some(expected) = &self.expected_cell_value
            && self.expected_formula.is_none()
        {
            valid = cells.value(&expected.cell) == Some(expected.value.as_str());
        }

        if let Some(expected) = &self.expected_formatting {
            valid = expected.check(cells);
        }

        if let Some(expected) = &self.expected_range {
            valid = expected.check(cells);
        }

        if self.custom_validation.is_some() {
            valid = false;
        }

        valid
    }

    pub fn is_empty(&self) -> bool {
        *self == ValidationCriteria::default()
    }

    /// The cell the player is expected to work in, when the criteria name one.
    pub fn target_cell(&self) -> Option<CellRef> {
        if let Some(expected) = &self.expected_cell_value {
            return Some(expected.cell);
        }
        if let Some(expected) = &self.expected_formatting {
            return target_cells(&expected.cell).and_then(|cells| cells.first().copied());
        }
        self.expected_range.as_ref().map(|expected| expected.start)
    }
}

impl ExpectedFormatting {
    fn check(&self, cells: &CellStore) -> bool {
        let Ok(format) = self.format.parse::<CellFormat>() else {
            return false;
        };
        let Some(targets) = target_cells(&self.cell) else {
            return false;
        };
        !targets.is_empty()
            && targets
                .iter()
                .all(|cell_ref| cells.get(cell_ref).and_then(|cell| cell.format) == Some(format))
    }
}

impl ExpectedRange {
    fn check(&self, cells: &CellStore) -> bool {
        let Ok(operation) = self.operation.parse::<RangeOperation>() else {
            return false;
        };
        let values: Vec<&str> = CellRange::new(self.start, self.end)
            .cells()
            .map(|cell_ref| cells.value(&cell_ref).unwrap_or(""))
            .collect();
        if values.is_empty() {
            return false;
        }

        match operation {
            RangeOperation::Sequence => is_sequence(&values),
            RangeOperation::Fill => {
                !values[0].is_empty() && values.iter().all(|value| *value == values[0])
            }
            RangeOperation::Sorted => is_sorted(&values),
            RangeOperation::Table | RangeOperation::Summary | RangeOperation::Dashboard => {
                values.iter().all(|value| !value.is_empty())
            }
        }
    }
}

/// `C1` or `B2:B5` as a list of cells.
fn target_cells(spec: &str) -> Option<Vec<CellRef>> {
    if spec.contains(':') {
        return CellRange::parse(spec).map(|range| range.cells().collect());
    }
    CellRef::from_str(spec.trim()).map(|cell_ref| vec![cell_ref])
}

fn normalize_formula(formula: &str) -> String {
    formula
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

fn is_sequence(values: &[&str]) -> bool {
    let Some(numbers) = values
        .iter()
        .map(|value| parse_number(value).filter(|n| n.fract() == 0.0))
        .collect::<Option<Vec<f64>>>()
    else {
        return false;
    };
    numbers.windows(2).all(|pair| pair[1] - pair[0] == 1.0)
}

fn is_sorted(values: &[&str]) -> bool {
    let Some(numbers) = values
        .iter()
        .map(|value| parse_number(value))
        .collect::<Option<Vec<f64>>>()
    else {
        return false;
    };
    numbers.windows(2).all(|pair| pair[0] <= pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellcraft_engine::engine::Cell;

    fn cell(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn store(cells: &[(&str, Cell)]) -> CellStore {
        cells
            .iter()
            .map(|(id, cell_value)| (cell(id), cell_value.clone()))
            .collect()
    }

    fn values(cells: &[(&str, &str)]) -> CellStore {
        cells
            .iter()
            .map(|(id, value)| (cell(id), Cell::new_value(value)))
            .collect()
    }

    fn formula_criteria(formula: &str) -> ValidationCriteria {
        ValidationCriteria {
            expected_formula: Some(formula.to_string()),
            ..Default::default()
        }
    }

    fn range_criteria(start: &str, end: &str, operation: &str) -> ValidationCriteria {
        ValidationCriteria {
            expected_range: Some(ExpectedRange {
                start: cell(start),
                end: cell(end),
                operation: operation.to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_formula_ignores_case_and_whitespace() {
        let criteria = formula_criteria("=SUM(A1:A5)");
        let cells = store(&[("A6", Cell::new_formula("= sum( a1 : a5 )", "100"))]);
        assert!(criteria.check(&cells, &cell("A6")));
        assert!(!criteria.check(&cells, &cell("A7")));
    }

    #[test]
    fn test_formula_requires_a_formula() {
        let criteria = formula_criteria("=A1");
        let cells = values(&[("B1", "=A1")]);
        assert!(!criteria.check(&cells, &cell("B1")));
    }

    #[test]
    fn test_formula_target_comes_from_cell_value() {
        let criteria = ValidationCriteria {
            expected_formula: Some("=A1".into()),
            expected_cell_value: Some(ExpectedCellValue {
                cell: cell("B1"),
                value: "=A1".into(),
            }),
            ..Default::default()
        };
        let cells = store(&[("B1", Cell::new_formula("=A1", "X-100"))]);
        assert!(criteria.check(&cells, &cell("C9")));

        let cells = store(&[("C9", Cell::new_formula("=A1", "X-100"))]);
        assert!(!criteria.check(&cells, &cell("C9")));
    }

    #[test]
    fn test_cell_value() {
        let criteria = ValidationCriteria {
            expected_cell_value: Some(ExpectedCellValue {
                cell: cell("A6"),
                value: "100".into(),
            }),
            ..Default::default()
        };
        assert!(criteria.check(&values(&[("A6", "100")]), &cell("A1")));
        assert!(!criteria.check(&values(&[("A6", "100.0")]), &cell("A1")));
        assert!(!criteria.check(&CellStore::new(), &cell("A1")));
    }

    #[test]
    fn test_formatting_single_cell_and_range() {
        let criteria = ValidationCriteria {
            expected_formatting: Some(ExpectedFormatting {
                cell: "C1".into(),
                format: "currency".into(),
            }),
            ..Default::default()
        };
        let currency = Cell::new_value("2450.75").with_format(Some(CellFormat::Currency));
        assert!(criteria.check(&store(&[("C1", currency.clone())]), &cell("A1")));
        assert!(!criteria.check(&values(&[("C1", "2450.75")]), &cell("A1")));

        let criteria = ValidationCriteria {
            expected_formatting: Some(ExpectedFormatting {
                cell: "B2:B3".into(),
                format: "currency".into(),
            }),
            ..Default::default()
        };
        assert!(criteria.check(
            &store(&[("B2", currency.clone()), ("B3", currency.clone())]),
            &cell("A1")
        ));
        assert!(!criteria.check(&store(&[("B2", currency)]), &cell("A1")));
    }

    #[test]
    fn test_unknown_format_never_passes() {
        let criteria = ValidationCriteria {
            expected_formatting: Some(ExpectedFormatting {
                cell: "B1".into(),
                format: "conditional".into(),
            }),
            ..Default::default()
        };
        let cells = store(&[("B1", Cell::new_value("1").with_format(Some(CellFormat::Text)))]);
        assert!(!criteria.check(&cells, &cell("B1")));
    }

    #[test]
    fn test_sequence() {
        let criteria = range_criteria("A1", "A5", "sequence");
        let ok = values(&[("A1", "1"), ("A2", "2"), ("A3", "3"), ("A4", "4"), ("A5", "5")]);
        assert!(criteria.check(&ok, &cell("A1")));

        let gap = values(&[("A1", "1"), ("A2", "2"), ("A3", "4"), ("A4", "5"), ("A5", "6")]);
        assert!(!criteria.check(&gap, &cell("A1")));

        let short = values(&[("A1", "1"), ("A2", "2")]);
        assert!(!criteria.check(&short, &cell("A1")));
    }

    #[test]
    fn test_fill() {
        let criteria = range_criteria("G1", "G3", "fill");
        let ok = values(&[("G1", "500"), ("G2", "500"), ("G3", "500")]);
        assert!(criteria.check(&ok, &cell("G1")));
        let mixed = values(&[("G1", "500"), ("G2", "501"), ("G3", "500")]);
        assert!(!criteria.check(&mixed, &cell("G1")));
        assert!(!criteria.check(&CellStore::new(), &cell("G1")));
    }

    #[test]
    fn test_sorted() {
        let criteria = range_criteria("A1", "A5", "sorted");
        let sorted = values(&[("A1", "1"), ("A2", "2"), ("A3", "2"), ("A4", "8"), ("A5", "9")]);
        assert!(criteria.check(&sorted, &cell("A1")));
        let unsorted = values(&[("A1", "5"), ("A2", "2"), ("A3", "8"), ("A4", "1"), ("A5", "9")]);
        assert!(!criteria.check(&unsorted, &cell("A1")));
    }

    #[test]
    fn test_table_requires_every_cell() {
        let criteria = range_criteria("A1", "B2", "table");
        let full = values(&[("A1", "Name"), ("B1", "Score"), ("A2", "John"), ("B2", "85")]);
        assert!(criteria.check(&full, &cell("A1")));
        let partial = values(&[("A1", "Name"), ("B1", "Score"), ("A2", "John")]);
        assert!(!criteria.check(&partial, &cell("A1")));
    }

    #[test]
    fn test_unknown_operation_and_custom_rule_never_pass() {
        let cells = values(&[("A1", "1")]);
        assert!(!range_criteria("A1", "A1", "pivot").check(&cells, &cell("A1")));

        let custom = ValidationCriteria {
            custom_validation: Some("data-validation-D1".into()),
            ..Default::default()
        };
        assert!(!custom.check(&cells, &cell("A1")));
        assert!(!ValidationCriteria::default().check(&cells, &cell("A1")));
        assert!(ValidationCriteria::default().is_empty());
    }

    #[test]
    fn test_target_cell() {
        assert_eq!(
            range_criteria("I11", "I14", "summary").target_cell(),
            Some(cell("I11"))
        );
        assert_eq!(formula_criteria("=A1").target_cell(), None);
    }
}
