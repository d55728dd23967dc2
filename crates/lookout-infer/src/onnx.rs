use crate::{Backend, Device, InferError, ModelSource, Session};
use lookout_base::Tensor;
use ndarray::{ArrayViewD, IxDyn};
use ort::session::builder::GraphOptimizationLevel;
use ort::{inputs, session::Session as OrtSession, value::TensorRef};

/// ONNX Runtime backend. CUDA needs the `cuda` feature.
pub struct OnnxBackend {
    device: Device,
}

impl OnnxBackend {
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl Default for OnnxBackend {
    fn default() -> Self {
        Self::new(Device::Cpu)
    }
}

impl Backend for OnnxBackend {
    fn name(&self) -> &str {
        "onnx"
    }

    fn load_model(&self, model: ModelSource) -> Result<Box<dyn Session + Send>, InferError> {
        let device = &self.device;
        let mut builder = OrtSession::builder().map_err(|e| {
            InferError::BackendError(format!("failed to create session builder: {e}"))
        })?;
        builder = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferError::BackendError(format!("failed to set optimization level: {e}")))?;

        builder = match device {
            Device::Cpu => {
                log::info!("onnx: using CPU execution provider");
                builder
            }
            #[cfg(feature = "cuda")]
            Device::Cuda { device_id } => {
                use ort::ep::ExecutionProvider;
                use ort::execution_providers::CUDAExecutionProvider;
                let ep = CUDAExecutionProvider::default().with_device_id(*device_id);
                let available = ep.is_available().unwrap_or(false);
                log::info!("onnx: CUDA EP requested (device_id={device_id}), available: {available}");
                builder
                    .with_execution_providers([ep.build()])
                    .map_err(|_| InferError::UnsupportedDevice(device.clone()))?
            }
            #[cfg(not(feature = "cuda"))]
            Device::Cuda { .. } => {
                return Err(InferError::UnsupportedDevice(device.clone()));
            }
        };

        let session = match model {
            ModelSource::File(path) => builder.commit_from_file(&path).map_err(|e| {
                InferError::ModelLoad(format!("failed to load model from {}: {e}", path.display()))
            })?,
            ModelSource::Memory(bytes) => builder.commit_from_memory(&bytes).map_err(|e| {
                InferError::ModelLoad(format!("failed to load model from memory: {e}"))
            })?,
        };

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();
        log::debug!("onnx: model inputs {input_names:?}, outputs {output_names:?}");

        Ok(Box::new(OnnxSession {
            session,
            input_names,
            output_names,
        }))
    }
}

pub struct OnnxSession {
    session: OrtSession,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl Session for OnnxSession {
    fn run(&mut self, inputs: &[(&str, Tensor<f32>)]) -> Result<Vec<(String, Tensor<f32>)>, InferError> {
        for (name, _) in inputs {
            if !self.input_names.iter().any(|known| known == name) {
                return Err(InferError::InvalidInput {
                    name: name.to_string(),
                    expected_names: self.input_names.clone(),
                });
            }
        }

        let views = inputs
            .iter()
            .map(|(name, tensor)| Ok((*name, tensor_view(tensor)?)))
            .collect::<Result<Vec<_>, InferError>>()?;

        let (name, view) = single_input(&views)?;
        let tensor_ref = TensorRef::from_array_view(view.view())
            .map_err(|e| InferError::BackendError(format!("failed to create tensor ref: {e}")))?;
        let outputs = self
            .session
            .run(inputs![*name => tensor_ref])
            .map_err(|e| InferError::BackendError(format!("inference failed: {e}")))?;

        let mut result = Vec::with_capacity(self.output_names.len());
        for output_name in &self.output_names {
            let value = &outputs[output_name.as_str()];
            let array = value.try_extract_array::<f32>().map_err(|e| {
                InferError::UnsupportedDtype(format!("output '{output_name}' is not f32: {e}"))
            })?;
            result.push((output_name.clone(), ndarray_to_tensor(array)?));
        }

        Ok(result)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

/// Every lookout model takes exactly one image tensor.
fn single_input<T>(inputs: &[T]) -> Result<&T, InferError> {
    match inputs {
        [input] => Ok(input),
        _ => Err(InferError::BackendError(format!(
            "only single-input models are supported, got {} inputs",
            inputs.len()
        ))),
    }
}

/// Borrows a tensor as an `ndarray` view without copying.
pub fn tensor_view(tensor: &Tensor<f32>) -> Result<ArrayViewD<'_, f32>, InferError> {
    ArrayViewD::from_shape(IxDyn(&tensor.shape), &tensor.data)
        .map_err(|e| InferError::BackendError(format!("failed to view tensor as ndarray: {e}")))
}

pub fn ndarray_to_tensor(array: ArrayViewD<'_, f32>) -> Result<Tensor<f32>, InferError> {
    let shape = array.shape().to_vec();
    let data = array.iter().copied().collect();
    Ok(Tensor::new(shape, data)?)
}
