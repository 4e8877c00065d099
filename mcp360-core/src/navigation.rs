//! Side-rail indicators, one per slate.

use crate::slate::SlateIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavIndicator {
    pub index: SlateIndex,
    pub label: String,
    pub is_active: bool,
}

/// Label for the indicator at `index`, falling back to a 1-based
/// "Slide N" when no usable label is configured.
pub fn label_for(labels: &[String], index: SlateIndex) -> String {
    labels
        .get(index.value())
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Slide {}", index.value() + 1))
}

pub fn indicators(
    total_slates: usize,
    labels: &[String],
    active: SlateIndex,
) -> Vec<NavIndicator> {
    (0..total_slates)
        .map(SlateIndex::new)
        .map(|index| NavIndicator {
            index,
            label: label_for(labels, index),
            is_active: index == active,
        })
        .collect()
}
