//! Soft-voting ensemble.
//!
//! Averages the member probability vectors with equal weight; prediction is
//! the argmax of the averaged vector, lowest index winning ties.
use ndarray::Array2;

use crate::error::{Error, Result};
use crate::models::classifier::Classifier;

pub struct SoftVotingEnsemble {
    members: Vec<Box<dyn Classifier>>,
    fitted: bool,
}

impl SoftVotingEnsemble {
    pub fn new(members: Vec<Box<dyn Classifier>>) -> Self {
        SoftVotingEnsemble {
            members,
            fitted: false,
        }
    }

    pub fn members(&self) -> &[Box<dyn Classifier>] {
        &self.members
    }
}

impl Classifier for SoftVotingEnsemble {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) -> Result<()> {
        if self.members.is_empty() {
            return Err(Error::Shape("ensemble has no members".into()));
        }
        for member in self.members.iter_mut() {
            log::debug!("[Cultivar: voting] fitting member {}", member.name());
            member.fit(x, y, n_classes)?;
        }
        self.fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if !self.fitted {
            return Err(Error::NotFitted);
        }
        let mut mean: Option<Array2<f32>> = None;
        for member in &self.members {
            let proba = member.predict_proba(x)?;
            mean = Some(match mean {
                Some(acc) => acc + proba,
                None => proba,
            });
        }
        let mut mean = mean.ok_or(Error::NotFitted)?;
        mean.mapv_inplace(|v| v / self.members.len() as f32);
        Ok(mean)
    }

    fn name(&self) -> &str {
        "Ensemble"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{blobs, train_accuracy};
    use crate::models::RandomForest;

    struct Fixed {
        proba: Array2<f32>,
    }

    impl Classifier for Fixed {
        fn fit(&mut self, _: &Array2<f32>, _: &[usize], _: usize) -> Result<()> {
            Ok(())
        }
        fn predict_proba(&self, _: &Array2<f32>) -> Result<Array2<f32>> {
            Ok(self.proba.clone())
        }
        fn name(&self) -> &str {
            "Fixed"
        }
    }

    #[test]
    fn two_member_vote_matches_hand_computation() {
        use ndarray::array;
        // Member A prefers class 1, member B prefers class 0; the averages
        // are [0.45, 0.45, 0.10] and [0.20, 0.50, 0.30], so the vote picks
        // class 0 (tie to lowest index) then class 1.
        let a = Fixed {
            proba: array![[0.3f32, 0.6, 0.1], [0.1, 0.6, 0.3]],
        };
        let b = Fixed {
            proba: array![[0.6f32, 0.3, 0.1], [0.3, 0.4, 0.3]],
        };
        let mut ensemble = SoftVotingEnsemble::new(vec![Box::new(a), Box::new(b)]);
        let (x, y) = blobs(3, 2, 7);
        ensemble.fit(&x, &y, 3).unwrap();

        let query = x.select(ndarray::Axis(0), &[0, 1]);
        let proba = ensemble.predict_proba(&query).unwrap();
        assert!((proba[[0, 0]] - 0.45).abs() < 1e-6);
        assert!((proba[[0, 1]] - 0.45).abs() < 1e-6);
        assert!((proba[[1, 1]] - 0.5).abs() < 1e-6);
        assert_eq!(ensemble.predict(&query).unwrap(), vec![0, 1]);
    }

    #[test]
    fn empty_ensemble_cannot_fit() {
        let mut ensemble = SoftVotingEnsemble::new(Vec::new());
        let (x, y) = blobs(2, 5, 7);
        assert!(matches!(
            ensemble.fit(&x, &y, 2),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn errors_before_fit() {
        let ensemble = SoftVotingEnsemble::new(vec![Box::new(RandomForest::new(5, None, 0))]);
        let (x, _) = blobs(2, 5, 7);
        assert!(matches!(ensemble.predict_proba(&x), Err(Error::NotFitted)));
    }

    #[test]
    fn averages_member_probabilities() {
        let (x, y) = blobs(3, 15, 7);
        let mut ensemble = SoftVotingEnsemble::new(vec![
            Box::new(RandomForest::new(10, None, 1)),
            Box::new(RandomForest::new(10, None, 2)),
        ]);
        ensemble.fit(&x, &y, 3).unwrap();

        let mut a = RandomForest::new(10, None, 1);
        let mut b = RandomForest::new(10, None, 2);
        a.fit(&x, &y, 3).unwrap();
        b.fit(&x, &y, 3).unwrap();
        let expected = (a.predict_proba(&x).unwrap() + b.predict_proba(&x).unwrap()) / 2.0;

        let got = ensemble.predict_proba(&x).unwrap();
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-6);
        }
        assert!(train_accuracy(&ensemble, &x, &y) > 0.9);
    }
}
