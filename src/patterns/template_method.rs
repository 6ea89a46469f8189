//! Template method: a fixed training pipeline with overridable steps.

use crate::config::AppConfig;
use crate::transcript::Transcript;

pub trait ModelTrainer {
    fn load(&self, path: &str) -> String {
        format!("[COMMON] Loading the data from {path}")
    }

    fn preprocess(&self) -> String {
        "[COMMON] Pre-processing and cleaning the data".to_string()
    }

    fn train(&self) -> String;
    fn evaluate(&self) -> String;

    fn save(&self) -> String {
        "[COMMON] Saving the model to a file".to_string()
    }

    /// The template. Implementors override steps, never the order.
    fn train_model(&self, path: &str) -> Vec<String> {
        vec![
            self.load(path),
            self.preprocess(),
            self.train(),
            self.evaluate(),
            self.save(),
        ]
    }
}

pub struct NeuralNetwork;
pub struct DecisionTree;

impl ModelTrainer for NeuralNetwork {
    fn train(&self) -> String {
        "[NEURAL NETWORK] Training the model".to_string()
    }

    fn evaluate(&self) -> String {
        "[NEURAL NETWORK] Evaluating the model".to_string()
    }

    fn save(&self) -> String {
        "[NEURAL NETWORK] Saving the model to the database".to_string()
    }
}

impl ModelTrainer for DecisionTree {
    fn train(&self) -> String {
        "[DECISION TREE] Training the model".to_string()
    }

    fn evaluate(&self) -> String {
        "[DECISION TREE] Evaluating the model".to_string()
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Template method: neural network");
    t.extend(NeuralNetwork.train_model("data/images/"));
    t.heading("Template method: decision tree");
    t.extend(DecisionTree.train_model("data/iris.csv"));
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order_is_fixed() {
        let steps = DecisionTree.train_model("x.csv");
        assert_eq!(steps.len(), 5);
        assert!(steps[0].contains("x.csv"));
        assert!(steps[2].starts_with("[DECISION TREE] Training"));
        assert_eq!(steps[4], "[COMMON] Saving the model to a file");
    }

    #[test]
    fn test_override_replaces_only_that_step() {
        let steps = NeuralNetwork.train_model("p");
        assert!(steps[1].starts_with("[COMMON]"));
        assert!(steps[4].contains("database"));
    }
}
