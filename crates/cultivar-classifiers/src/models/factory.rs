//! Construction of classifiers from their configuration.
use crate::config::ClassifierKind;
use crate::models::adaboost::AdaBoost;
use crate::models::classifier::Classifier;
use crate::models::forest::RandomForest;
use crate::models::gradient_boosting::GradientBoosting;
use crate::models::logistic::OneVsRestLogistic;
use crate::models::svm::RbfSvm;
use crate::models::voting::SoftVotingEnsemble;

/// Build a single classifier for the given configuration and seed.
pub fn build(kind: &ClassifierKind, seed: u64) -> Box<dyn Classifier> {
    match *kind {
        ClassifierKind::RandomForest {
            n_estimators,
            max_depth,
        } => Box::new(RandomForest::new(n_estimators, max_depth, seed)),
        ClassifierKind::GradientBoosting {
            n_estimators,
            learning_rate,
            max_depth,
        } => Box::new(GradientBoosting::new(n_estimators, learning_rate, max_depth)),
        ClassifierKind::AdaBoost { n_estimators } => Box::new(AdaBoost::new(n_estimators, seed)),
        ClassifierKind::LogisticRegression {
            max_iter,
            learning_rate,
            c,
        } => Box::new(OneVsRestLogistic::new(max_iter, learning_rate, c)),
        ClassifierKind::RbfSvm { c } => Box::new(RbfSvm::new(c, seed)),
    }
}

/// Build every base classifier, in evaluation order.
pub fn build_base_set(seed: u64) -> Vec<Box<dyn Classifier>> {
    ClassifierKind::base_set()
        .iter()
        .map(|kind| build(kind, seed))
        .collect()
}

/// Build the soft-voting ensemble over a fresh base set.
pub fn build_ensemble(seed: u64) -> SoftVotingEnsemble {
    SoftVotingEnsemble::new(build_base_set(seed))
}
