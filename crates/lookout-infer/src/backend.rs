use crate::{InferError, ModelSource, Session};

pub trait Backend {
    fn name(&self) -> &str;
    fn load_model(&self, model: ModelSource) -> Result<Box<dyn Session + Send>, InferError>;
}
