pub mod dataset_builder;
pub mod dataset_service;

pub use dataset_builder::{DatasetError, LakeDatasetBuilder};
pub use dataset_service::DatasetService;
