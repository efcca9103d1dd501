//! Classifier implementations and their shared trait.
pub mod adaboost;
pub mod classifier;
pub mod factory;
pub mod forest;
pub mod gradient_boosting;
pub mod logistic;
pub mod svm;
pub mod tree;
pub mod voting;

pub use adaboost::AdaBoost;
pub use classifier::Classifier;
pub use forest::RandomForest;
pub use gradient_boosting::GradientBoosting;
pub use logistic::OneVsRestLogistic;
pub use svm::RbfSvm;
pub use voting::SoftVotingEnsemble;

#[cfg(test)]
pub(crate) mod test_support {
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::Classifier;

    /// Well-separated clusters, one per class, with small uniform jitter.
    pub fn blobs(n_classes: usize, per_class: usize, n_features: usize) -> (Array2<f32>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(1234);
        let n = n_classes * per_class;
        let mut x = Array2::zeros((n, n_features));
        let mut y = Vec::with_capacity(n);
        for class in 0..n_classes {
            let center = class as f32 * 10.0;
            for i in 0..per_class {
                let row = class * per_class + i;
                for j in 0..n_features {
                    x[[row, j]] = center + rng.gen_range(-1.0..1.0);
                }
                y.push(class);
            }
        }
        (x, y)
    }

    pub fn train_accuracy(clf: &dyn Classifier, x: &Array2<f32>, y: &[usize]) -> f32 {
        let predicted = clf.predict(x).unwrap();
        let hits = predicted.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        hits as f32 / y.len() as f32
    }
}
