pub mod use_cases;

pub use use_cases::batch_inference::BatchInferenceUseCase;
pub use use_cases::fine_tuning::FineTuningUseCase;
pub use use_cases::inference::InferenceUseCase;
pub use use_cases::single_inference::SingleInferenceUseCase;
