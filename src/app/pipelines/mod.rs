pub mod extract_pipeline;
