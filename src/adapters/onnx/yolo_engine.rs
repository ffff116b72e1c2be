use anyhow::Result;
use async_trait::async_trait;
use image::{imageops::FilterType, DynamicImage, RgbImage};
use ndarray::{s, Array4, ArrayView2};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::adapters::onnx::model_catalog::{fallback_names, read_metadata, validate_model_path};
use crate::application::ports::DetectorPort;
use crate::domain::detection::{non_max_suppression, ClassNames, Detection, DetectionResult};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::YoloParams;

/// Modelo YOLO exportado a ONNX. Se carga una vez al arrancar y se comparte.
pub struct OnnxYoloEngine {
    // `Session::run` exige `&mut`: las ejecuciones se serializan aquí.
    session: Arc<Mutex<Session>>,
    names: Option<Arc<ClassNames>>,
    params: YoloParams,
}

impl OnnxYoloEngine {
    pub fn load(path: &Path, params: YoloParams) -> Result<Self> {
        validate_model_path(path)?;

        let mut builder = Session::builder()?.with_intra_threads(4)?;

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let session = builder.commit_from_file(path)?;

        let metadata = read_metadata(&session);
        let params = YoloParams {
            input_size: metadata.imgsz.unwrap_or(params.input_size),
            ..params
        };
        info!(
            "Modelo cargado: {} ({} clases en metadatos, entrada {}px)",
            path.display(),
            metadata.names.as_ref().map_or(0, |n| n.len()),
            params.input_size
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            names: metadata.names.map(Arc::new),
            params,
        })
    }
}

#[async_trait]
impl DetectorPort for OnnxYoloEngine {
    async fn detect(&self, image: DynamicImage) -> DomainResult<DetectionResult> {
        let session = Arc::clone(&self.session);
        let names = self.names.clone();
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || {
            run_detection(&session, names.as_deref(), &params, &image.to_rgb8())
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("inference task failed: {e}")))?
    }
}

fn run_detection(
    session: &Mutex<Session>,
    names: Option<&ClassNames>,
    params: &YoloParams,
    rgb: &RgbImage,
) -> DomainResult<DetectionResult> {
    let input_tensor = preprocess(rgb, params.input_size)?;

    let (dims, data) = {
        let mut session = session
            .lock()
            .map_err(|_| DomainError::OperationFailed("model session lock poisoned".into()))?;
        let outputs = session.run(ort::inputs![input_tensor]).map_err(ort_failure)?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>().map_err(ort_failure)?;
        let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
        (dims, data_out.to_vec())
    };

    decode_output(&dims, &data, (rgb.width(), rgb.height()), params, names)
}

/// Estira la imagen al cuadrado de entrada sin letterbox, así que las cajas se
/// reescalan por eje y no coinciden al píxel con las de Ultralytics.
fn preprocess(rgb: &RgbImage, input_size: u32) -> DomainResult<Tensor<f32>> {
    let imgsz = input_size as usize;
    let resized = image::imageops::resize(rgb, input_size, input_size, FilterType::Triangle);

    let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
    for (x, y, pixel) in resized.enumerate_pixels() {
        input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
        input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
        input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
    }

    let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
    let (raw, _) = input.into_raw_vec_and_offset();
    Tensor::from_array((input_shape, raw)).map_err(ort_failure)
}

/// Decodifica la salida `[1, 4 + nc, N]` (cx, cy, w, h, scores por clase) a
/// cajas en coordenadas de la imagen original, ya filtradas y con NMS.
pub fn decode_output(
    dims: &[usize],
    data: &[f32],
    (orig_w, orig_h): (u32, u32),
    params: &YoloParams,
    names: Option<&ClassNames>,
) -> DomainResult<DetectionResult> {
    if dims.len() != 3 || dims[0] != 1 || dims[1] < 5 {
        return Err(DomainError::OperationFailed(format!(
            "unexpected model output shape {dims:?}"
        )));
    }

    let view = ArrayView2::from_shape((dims[1], dims[2]), data)
        .map_err(|e| DomainError::OperationFailed(format!("malformed model output: {e}")))?;
    let num_classes = dims[1] - 4;
    let num_candidates = dims[2];

    let imgsz = params.input_size as f32;
    let sx = orig_w as f32 / imgsz;
    let sy = orig_h as f32 / imgsz;

    let mut candidates = Vec::new();
    for i in 0..num_candidates {
        let scores = view.slice(s![4.., i]);
        let Some((class_id, &max_score)) = scores
            .indexed_iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if max_score > params.conf_threshold {
            let cx = view[[0, i]];
            let cy = view[[1, i]];
            let w = view[[2, i]];
            let h = view[[3, i]];

            let detection = Detection {
                x1: (cx - w / 2.0) * sx,
                y1: (cy - h / 2.0) * sy,
                x2: (cx + w / 2.0) * sx,
                y2: (cy + h / 2.0) * sy,
                score: max_score,
                class_id,
            };
            candidates.push(detection.clip(orig_w, orig_h));
        }
    }

    let detections = non_max_suppression(candidates, params.iou_threshold, params.max_detections);
    let classes = names.cloned().unwrap_or_else(|| fallback_names(num_classes));

    Ok(DetectionResult { detections, classes })
}

fn ort_failure(e: ort::Error) -> DomainError {
    DomainError::OperationFailed(format!("onnx runtime error: {e}"))
}
