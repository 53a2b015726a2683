//! Binary logistic regression over sparse TF-IDF features.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerityError};
use crate::model::vectorizer::SparseVector;

/// Training options for [`LogisticRegression::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    /// Inverse regularization strength.
    pub c: f64,
    /// Maximum number of gradient descent iterations.
    pub max_iter: usize,
    /// Stop once the largest gradient component falls below this.
    pub tol: f64,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        LogisticRegressionParams {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

/// Outcome of classifying one feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassPrediction {
    /// The winning class label.
    pub class: u8,
    /// Probability of each class, in the order of [`LogisticRegression::classes`].
    pub probabilities: [f64; 2],
}

impl ClassPrediction {
    /// Probability of the winning class.
    pub fn confidence(&self) -> f64 {
        self.probabilities[0].max(self.probabilities[1])
    }
}

/// Trained two-class logistic regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    coef: Vec<f64>,
    intercept: f64,
    classes: Vec<u8>,
    n_iter: usize,
}

impl LogisticRegression {
    /// Build a model from known weights.
    pub fn from_parts(coef: Vec<f64>, intercept: f64, classes: Vec<u8>) -> Self {
        LogisticRegression {
            coef,
            intercept,
            classes,
            n_iter: 0,
        }
    }

    /// Fit with deterministic full-batch gradient descent on the
    /// L2-regularized log loss.
    ///
    /// Labels must be `0` or `1` and both must be present.
    pub fn fit(
        features: &[SparseVector],
        labels: &[u8],
        params: &LogisticRegressionParams,
    ) -> Result<Self> {
        if features.is_empty() {
            return Err(VerityError::training("No training examples"));
        }
        if features.len() != labels.len() {
            return Err(VerityError::training(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if labels.iter().any(|&y| y > 1) {
            return Err(VerityError::training("Labels must be 0 or 1"));
        }
        if !labels.contains(&0) || !labels.contains(&1) {
            return Err(VerityError::training(
                "Training data must contain both classes",
            ));
        }
        if params.c <= 0.0 || !params.c.is_finite() {
            return Err(VerityError::training("C must be a positive number"));
        }

        let dim = features[0].dim;
        if features.iter().any(|x| x.dim != dim) {
            return Err(VerityError::training("Feature rows have differing dimensions"));
        }

        let n = features.len() as f64;
        let lambda = 1.0 / (params.c * n);
        // Rows are l2-normalized, so with the intercept column the loss
        // gradient is Lipschitz with constant at most 0.5 + lambda.
        let learning_rate = 1.0 / (0.5 + lambda);

        let mut coef = vec![0.0; dim];
        let mut intercept = 0.0;
        let mut grad = vec![0.0; dim];
        let mut n_iter = 0;

        for iteration in 0..params.max_iter {
            n_iter = iteration + 1;
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_intercept = 0.0;

            for (x, &y) in features.iter().zip(labels) {
                let z = intercept + x.iter().map(|(i, v)| v * coef[i]).sum::<f64>();
                let residual = sigmoid(z) - y as f64;
                for (i, v) in x.iter() {
                    grad[i] += residual * v;
                }
                grad_intercept += residual;
            }

            let mut max_grad = (grad_intercept / n).abs();
            for (g, w) in grad.iter_mut().zip(&coef) {
                *g = *g / n + lambda * w;
                max_grad = max_grad.max(g.abs());
            }

            if max_grad < params.tol {
                break;
            }

            for (w, g) in coef.iter_mut().zip(&grad) {
                *w -= learning_rate * g;
            }
            intercept -= learning_rate * grad_intercept / n;
        }

        debug!("Logistic regression finished after {n_iter} iterations");

        Ok(LogisticRegression {
            coef,
            intercept,
            classes: vec![0, 1],
            n_iter,
        })
    }

    /// Signed distance from the decision boundary.
    pub fn decision_function(&self, features: &SparseVector) -> Result<f64> {
        Ok(features.dot(&self.coef)? + self.intercept)
    }

    /// Class probabilities, ordered like [`classes`](Self::classes).
    pub fn predict_proba(&self, features: &SparseVector) -> Result<[f64; 2]> {
        let positive = sigmoid(self.decision_function(features)?);
        let probabilities = [1.0 - positive, positive];
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(VerityError::internal("Classifier produced non-finite probabilities"));
        }
        Ok(probabilities)
    }

    /// Predicted class together with both probabilities.
    pub fn predict(&self, features: &SparseVector) -> Result<ClassPrediction> {
        let probabilities = self.predict_proba(features)?;
        let winner = if probabilities[1] > probabilities[0] { 1 } else { 0 };
        let class = *self
            .classes
            .get(winner)
            .ok_or_else(|| VerityError::internal("Classifier has fewer than two classes"))?;
        Ok(ClassPrediction {
            class,
            probabilities,
        })
    }

    /// Check internal consistency against the expected feature count.
    pub fn validate(&self, feature_count: usize) -> Result<()> {
        if self.classes.len() != 2 {
            return Err(VerityError::artifact_corrupt(format!(
                "expected 2 classes, found {}",
                self.classes.len()
            )));
        }
        if self.coef.len() != feature_count {
            return Err(VerityError::artifact_corrupt(format!(
                "classifier has {} weights but the vectorizer produces {} features",
                self.coef.len(),
                feature_count
            )));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|w| !w.is_finite()) {
            return Err(VerityError::artifact_corrupt(
                "classifier weights contain non-finite values",
            ));
        }
        Ok(())
    }

    pub fn coef(&self) -> &[f64] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn classes(&self) -> &[u8] {
        &self.classes
    }

    /// Iterations run by [`fit`](Self::fit).
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
