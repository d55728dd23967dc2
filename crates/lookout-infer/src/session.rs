use crate::InferError;
use lookout_base::Tensor;

/// A loaded model.
pub trait Session {
    /// Runs the model. Outputs come back in the model's declared output order.
    fn run(&mut self, inputs: &[(&str, Tensor<f32>)]) -> Result<Vec<(String, Tensor<f32>)>, InferError>;
    fn input_names(&self) -> &[String];
    fn output_names(&self) -> &[String];
}
