/// Read binary data
pub mod read;

#[derive(Copy, Clone)]
pub enum U16Be {}

#[derive(Copy, Clone)]
pub enum U32Be {}
