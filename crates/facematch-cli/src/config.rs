use std::path::PathBuf;

use facematch_core::ModelPaths;

/// Model locations, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// SCRFD detection model.
    pub detector_model: PathBuf,
    /// 128-d face encoder model.
    pub encoder_model: PathBuf,
}

impl Config {
    /// Load configuration from `FACEMATCH_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let model_dir = lookup("FACEMATCH_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(facematch_core::default_model_dir);
        let defaults = ModelPaths::in_dir(&model_dir);

        Self {
            detector_model: lookup("FACEMATCH_DETECTOR_MODEL")
                .map(PathBuf::from)
                .unwrap_or(defaults.detector),
            encoder_model: lookup("FACEMATCH_ENCODER_MODEL")
                .map(PathBuf::from)
                .unwrap_or(defaults.encoder),
            model_dir,
        }
    }

    pub fn model_paths(&self) -> ModelPaths {
        ModelPaths {
            detector: self.detector_model.clone(),
            encoder: self.encoder_model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn model_dir_sets_both_defaults() {
        let config = Config::from_lookup(lookup(&[("FACEMATCH_MODEL_DIR", "/srv/models")]));
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.detector_model, PathBuf::from("/srv/models/det_10g.onnx"));
        assert_eq!(config.encoder_model, PathBuf::from("/srv/models/mobilefacenet_128.onnx"));
    }

    #[test]
    fn explicit_model_paths_win() {
        let config = Config::from_lookup(lookup(&[
            ("FACEMATCH_MODEL_DIR", "/srv/models"),
            ("FACEMATCH_ENCODER_MODEL", "/tmp/enc.onnx"),
        ]));
        let paths = config.model_paths();
        assert_eq!(paths.detector, PathBuf::from("/srv/models/det_10g.onnx"));
        assert_eq!(paths.encoder, PathBuf::from("/tmp/enc.onnx"));
    }
}
