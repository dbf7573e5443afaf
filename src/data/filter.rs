use std::collections::BTreeMap;

use super::model::StarRecord;

// ---------------------------------------------------------------------------
// Selection criteria: which records are scientifically usable
// ---------------------------------------------------------------------------

/// Predicates applied to star metadata before cleaning.
///
/// Records pass when their field is one of `fields` (OR over names; an empty
/// list means "no field constraint") and every named label lies strictly
/// inside its open range (AND over ranges; a record missing a constrained
/// label fails).
#[derive(Debug, Clone, Default)]
pub struct SelectionCriteria {
    /// Accepted observation fields / cluster names.
    pub fields: Vec<String>,
    /// Open `(low, high)` range per label name.
    pub label_ranges: BTreeMap<String, (f64, f64)>,
}

impl SelectionCriteria {
    /// Whether a single record passes all active predicates.
    pub fn accepts(&self, record: &StarRecord) -> bool {
        if !self.fields.is_empty() && !self.fields.iter().any(|f| *f == record.field) {
            return false;
        }
        for (label, &(low, high)) in &self.label_ranges {
            match record.labels.get(label) {
                Some(&value) if low < value && value < high => {}
                _ => return false,
            }
        }
        true
    }
}

/// Return indices of records that pass all active criteria, in input order.
pub fn filtered_indices(records: &[StarRecord], criteria: &SelectionCriteria) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.accepts(record))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::StarSpectrum;

    fn record(field: &str, labels: &[(&str, f64)]) -> StarRecord {
        StarRecord {
            identifier: "star".to_string(),
            field: field.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            spectrum: StarSpectrum {
                wavelength: vec![1.0, 2.0],
                flux: vec![1.0, 1.0],
                errors: vec![0.1, 0.1],
                bitmask: vec![0, 0],
            },
        }
    }

    #[test]
    fn empty_criteria_accept_everything() {
        let records = vec![record("M15", &[]), record("N6791", &[])];
        let criteria = SelectionCriteria::default();
        assert_eq!(filtered_indices(&records, &criteria), vec![0, 1]);
    }

    #[test]
    fn field_membership_is_or_composed() {
        let records = vec![
            record("M15", &[]),
            record("N6791", &[]),
            record("060+00", &[]),
        ];
        let criteria = SelectionCriteria {
            fields: vec!["M15".to_string(), "060+00".to_string()],
            ..Default::default()
        };
        assert_eq!(filtered_indices(&records, &criteria), vec![0, 2]);
    }

    #[test]
    fn label_ranges_are_strict_and_and_composed() {
        let records = vec![
            record("M15", &[("teff", 4800.0), ("logg", 2.5)]),
            record("M15", &[("teff", 5700.0), ("logg", 2.5)]), // teff on the bound
            record("M15", &[("teff", 4800.0)]),                // missing logg
        ];
        let mut criteria = SelectionCriteria::default();
        criteria
            .label_ranges
            .insert("teff".to_string(), (0.0, 5700.0));
        criteria.label_ranges.insert("logg".to_string(), (0.0, 4.0));
        assert_eq!(filtered_indices(&records, &criteria), vec![0]);
    }
}
