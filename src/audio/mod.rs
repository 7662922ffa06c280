// Module audio - CPAL backend, step tone rendering and WAV export

pub mod engine;
pub mod export;
pub mod output;
pub mod render;
pub mod tone;
