use serde::{Deserialize, Serialize};

/// Seed used by the reference benchmark run.
pub const DEFAULT_SEED: u64 = 42;

/// Supported classifier kinds and their hyper-parameters.
///
/// This is a closed set: the evaluator and the voting ensemble only ever see
/// classifiers built from these variants. Defaults reproduce the reference
/// benchmark configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ClassifierKind {
    RandomForest {
        n_estimators: usize,
        /// `None` grows trees until leaves are pure.
        max_depth: Option<usize>,
    },
    GradientBoosting {
        n_estimators: usize,
        learning_rate: f32,
        max_depth: usize,
    },
    AdaBoost {
        n_estimators: usize,
    },
    LogisticRegression {
        max_iter: usize,
        learning_rate: f32,
        /// Inverse of regularization strength.
        c: f32,
    },
    RbfSvm {
        c: f32,
    },
}

impl ClassifierKind {
    pub fn random_forest() -> Self {
        ClassifierKind::RandomForest {
            n_estimators: 200,
            max_depth: None,
        }
    }

    pub fn gradient_boosting() -> Self {
        ClassifierKind::GradientBoosting {
            n_estimators: 200,
            learning_rate: 0.05,
            max_depth: 5,
        }
    }

    pub fn adaboost() -> Self {
        ClassifierKind::AdaBoost { n_estimators: 200 }
    }

    pub fn logistic_regression() -> Self {
        ClassifierKind::LogisticRegression {
            max_iter: 5000,
            learning_rate: 0.1,
            c: 1.0,
        }
    }

    pub fn rbf_svm() -> Self {
        ClassifierKind::RbfSvm { c: 1.0 }
    }

    /// The five base learners in benchmark order.
    pub fn base_set() -> Vec<ClassifierKind> {
        vec![
            ClassifierKind::random_forest(),
            ClassifierKind::gradient_boosting(),
            ClassifierKind::adaboost(),
            ClassifierKind::logistic_regression(),
            ClassifierKind::rbf_svm(),
        ]
    }

    /// Human readable name used in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            ClassifierKind::RandomForest { .. } => "Random Forest",
            ClassifierKind::GradientBoosting { .. } => "Gradient Boosting",
            ClassifierKind::AdaBoost { .. } => "AdaBoost",
            ClassifierKind::LogisticRegression { .. } => "Logistic Regression",
            ClassifierKind::RbfSvm { .. } => "SVM",
        }
    }
}

/// Parameters controlling a full benchmark run.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Seed threaded into every probabilistic component (splits, folds,
    /// tree/boosting randomness). Never ambient.
    pub seed: u64,
    /// Held-out fraction for the stratified train/test split.
    pub test_fraction: f32,
    /// Number of stratified cross-validation folds.
    pub cv_folds: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_fraction: 0.2,
            cv_folds: 5,
        }
    }
}
