pub mod trainer;
pub mod train_config;

pub use trainer::TrainingLoop;
pub use train_config::TrainConfig;
