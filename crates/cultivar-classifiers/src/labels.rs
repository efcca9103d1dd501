//! Bijective mapping between crop label strings and dense class indices.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Label codec built once from the training label column.
///
/// Distinct labels are assigned indices in sorted order; the mapping is
/// frozen after `fit`. An unseen label at inference time is reported, never
/// guessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCodec {
    classes: Vec<String>,
}

impl LabelCodec {
    pub fn fit(labels: &[String]) -> Self {
        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        LabelCodec { classes }
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| Error::UnknownLabel(label.to_string()))
    }

    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownLabel(format!("class index {}", index)))
    }

    pub fn encode_all(&self, labels: &[String]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l)).collect()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> LabelCodec {
        LabelCodec::fit(&[
            "rice".to_string(),
            "maize".to_string(),
            "rice".to_string(),
            "cotton".to_string(),
        ])
    }

    #[test]
    fn indices_follow_sorted_order() {
        let codec = codec();
        assert_eq!(codec.classes(), &["cotton", "maize", "rice"]);
        assert_eq!(codec.encode("cotton").unwrap(), 0);
        assert_eq!(codec.encode("rice").unwrap(), 2);
    }

    #[test]
    fn decode_inverts_encode() {
        let codec = codec();
        for label in ["cotton", "maize", "rice"] {
            assert_eq!(codec.decode(codec.encode(label).unwrap()).unwrap(), label);
        }
    }

    #[test]
    fn unknown_label_is_reported() {
        let codec = codec();
        assert!(matches!(
            codec.encode("banana"),
            Err(Error::UnknownLabel(_))
        ));
        assert!(matches!(codec.decode(99), Err(Error::UnknownLabel(_))));
    }
}
