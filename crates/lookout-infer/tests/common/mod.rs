use lookout_base::Tensor;
use lookout_infer::{InferError, Session};
use std::sync::{Arc, Mutex};

/// Session that returns canned outputs and records the input shapes it was given.
pub struct CannedSession {
    pub outputs: Vec<(String, Tensor<f32>)>,
    pub seen_shapes: Arc<Mutex<Vec<Vec<usize>>>>,
}

impl CannedSession {
    pub fn boxed(outputs: Vec<(&str, Tensor<f32>)>) -> (Box<dyn Session + Send>, Arc<Mutex<Vec<Vec<usize>>>>) {
        let seen_shapes = Arc::new(Mutex::new(Vec::new()));
        let session = CannedSession {
            outputs: outputs.into_iter().map(|(n, t)| (n.to_string(), t)).collect(),
            seen_shapes: seen_shapes.clone(),
        };
        (Box::new(session), seen_shapes)
    }
}

impl Session for CannedSession {
    fn run(&mut self, inputs: &[(&str, Tensor<f32>)]) -> Result<Vec<(String, Tensor<f32>)>, InferError> {
        for (name, tensor) in inputs {
            if *name != "input" {
                return Err(InferError::InvalidInput {
                    name: name.to_string(),
                    expected_names: vec!["input".to_string()],
                });
            }
            self.seen_shapes.lock().unwrap().push(tensor.shape.clone());
        }
        Ok(self.outputs.clone())
    }

    fn input_names(&self) -> &[String] {
        static NAMES: std::sync::OnceLock<Vec<String>> = std::sync::OnceLock::new();
        NAMES.get_or_init(|| vec!["input".to_string()])
    }

    fn output_names(&self) -> &[String] {
        &[]
    }
}
