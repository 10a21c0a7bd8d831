// Library exports for hapunfold
pub mod complement;
pub mod config;
pub mod enumerate;
pub mod fold;
pub mod gfa;
pub mod graph;
pub mod handle;
pub mod node_mapping;
pub mod path_index;
pub mod pipeline;
pub mod thread_index;
pub mod unfolder;
pub mod union_find;
pub mod verify;
