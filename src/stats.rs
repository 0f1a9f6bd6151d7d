use serde::Serialize;

use crate::zones::ZoneTable;

/// Label reported when a history contains no usable pitch values.
const NO_DATA_CATEGORY: &str = "No data";

/// Summary statistics over a user's stored pitch values.
///
/// All numeric fields are `None` when `valid_count` is zero; an empty or
/// all-invalid history is a normal state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchStatsSummary {
    pub total_count: usize,
    /// How many entries survived filtering (positive, finite).
    pub valid_count: usize,
    pub min_hz: Option<f32>,
    pub max_hz: Option<f32>,
    pub mean_hz: Option<f32>,
    pub median_hz: Option<f32>,
    pub range_hz: Option<f32>,
    /// Zone of the mean pitch, using the same boundary semantics as live
    /// classification.
    pub dominant_category: String,
}

impl PitchStatsSummary {
    fn empty(total_count: usize) -> Self {
        Self {
            total_count,
            valid_count: 0,
            min_hz: None,
            max_hz: None,
            mean_hz: None,
            median_hz: None,
            range_hz: None,
            dominant_category: NO_DATA_CATEGORY.into(),
        }
    }
}

/// Summarize a batch of stored pitch values against a zone table.
///
/// Entries that are zero, negative, or non-finite mean "no pitch detected
/// for that recording" and are excluded before computing statistics;
/// `valid_count` vs `total_count` reflects the exclusions. Stateless and
/// side-effect free — safe to call concurrently on independent inputs.
pub fn summarize(values: &[f32], table: &ZoneTable) -> PitchStatsSummary {
    let mut valid: Vec<f32> = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();

    if valid.is_empty() {
        return PitchStatsSummary::empty(values.len());
    }

    valid.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let min = valid[0];
    let max = valid[valid.len() - 1];
    let mean = valid.iter().sum::<f32>() / valid.len() as f32;
    let median = if valid.len() % 2 == 1 {
        valid[valid.len() / 2]
    } else {
        let mid = valid.len() / 2;
        (valid[mid - 1] + valid[mid]) / 2.0
    };

    let dominant_category = table
        .classify(Some(mean))
        .unwrap_or(NO_DATA_CATEGORY)
        .to_string();

    PitchStatsSummary {
        total_count: values.len(),
        valid_count: valid.len(),
        min_hz: Some(min),
        max_hz: Some(max),
        mean_hz: Some(mean),
        median_hz: Some(median),
        range_hz: Some(max - min),
        dominant_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_all_none() {
        let s = summarize(&[], &ZoneTable::default_male());
        assert_eq!(s.total_count, 0);
        assert_eq!(s.valid_count, 0);
        assert_eq!(s.min_hz, None);
        assert_eq!(s.max_hz, None);
        assert_eq!(s.mean_hz, None);
        assert_eq!(s.median_hz, None);
        assert_eq!(s.range_hz, None);
        assert_eq!(s.dominant_category, "No data");
    }

    #[test]
    fn known_values() {
        let s = summarize(&[100.0, 150.0, 200.0], &ZoneTable::default_male());
        assert_eq!(s.valid_count, 3);
        assert_eq!(s.min_hz, Some(100.0));
        assert_eq!(s.max_hz, Some(200.0));
        assert_eq!(s.mean_hz, Some(150.0));
        assert_eq!(s.median_hz, Some(150.0));
        assert_eq!(s.range_hz, Some(100.0));
        assert_eq!(s.dominant_category, "Baritone");
    }

    #[test]
    fn invalid_entries_are_excluded_not_fatal() {
        let s = summarize(
            &[0.0, -50.0, f32::NAN, f32::INFINITY, 120.0, 0.0],
            &ZoneTable::default_male(),
        );
        assert_eq!(s.total_count, 6);
        assert_eq!(s.valid_count, 1);
        assert_eq!(s.mean_hz, Some(120.0));
        assert_eq!(s.dominant_category, "Bass");
    }

    #[test]
    fn all_invalid_matches_empty() {
        let s = summarize(&[0.0, 0.0, -1.0], &ZoneTable::default_male());
        assert_eq!(s.total_count, 3);
        assert_eq!(s.valid_count, 0);
        assert_eq!(s.dominant_category, "No data");
    }

    #[test]
    fn even_count_median_is_midpoint_average() {
        let s = summarize(&[100.0, 110.0, 200.0, 210.0], &ZoneTable::default_male());
        assert_eq!(s.median_hz, Some(155.0));
    }

    #[test]
    fn unsorted_input_is_handled() {
        let s = summarize(&[200.0, 100.0, 150.0], &ZoneTable::default_male());
        assert_eq!(s.min_hz, Some(100.0));
        assert_eq!(s.max_hz, Some(200.0));
        assert_eq!(s.median_hz, Some(150.0));
    }

    #[test]
    fn dominant_category_round_trips_with_classifier() {
        let table = ZoneTable::default_male();
        let values = [90.0f32, 95.0, 105.0, 110.0];
        let s = summarize(&values, &table);
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        assert_eq!(
            s.dominant_category,
            table.classify(Some(mean)).unwrap().to_string()
        );
    }

    #[test]
    fn out_of_band_mean_gets_boundary_label() {
        let s = summarize(&[40.0, 50.0], &ZoneTable::default_male());
        assert_eq!(s.dominant_category, "Too Low");
    }
}
